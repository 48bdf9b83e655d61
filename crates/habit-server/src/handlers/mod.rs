pub mod events;
pub mod sync;
