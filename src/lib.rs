//! plsof — enumerate every open kernel object handle on the system and
//! resolve each one to its owning process, user, object type and path.
//!
//! The scan is a single point-in-time snapshot, read-only, and resilient:
//! one uncooperative handle (a named pipe that never answers a name query,
//! a process that vanished between snapshot and lookup) costs at most its
//! own entry, never the scan.

pub mod cli;
pub mod console;
pub mod error;
pub mod output;
pub mod system;

pub use system::{scan, HandleRecord, ProcessIdentity, ScanFilter};
