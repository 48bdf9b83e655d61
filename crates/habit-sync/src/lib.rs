//! The drain-and-persist pipeline.
//!
//! [`submit`] stamps an accepted payload and pushes it onto its kind's queue.
//! A [`Syncer`] later runs one cycle: restore the last archived snapshot,
//! bootstrap the schema if needed, [`drain`] each queue into a single
//! transactional batch, snapshot the database and upload the snapshot.

mod drain;
mod submit;
mod syncer;

pub mod archive;
pub mod error;

pub use drain::drain;
pub use error::{Error, Result};
pub use submit::submit;
pub use syncer::{CycleReport, Stage, SyncConfig, Syncer};
