//! Core types and trait definitions for the Habit event pipeline.
//!
//! This crate is deliberately free of queue, database and HTTP dependencies.
//! Every other crate depends on it; it only knows the three record shapes and
//! the transport seams they travel through.

pub mod archive;
pub mod error;
pub mod kind;
pub mod queue;
pub mod record;

pub use error::{Error, Result};
pub use kind::Kind;
pub use record::{NewRecord, Record};
