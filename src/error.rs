//! Scan-level failures.
//!
//! Only the snapshot stage can fail as a whole; everything later degrades
//! per handle or per field. Callers receive an empty result list and the
//! cause goes to the log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The kernel rejected the handle-table query for a reason other than
    /// an undersized buffer.
    #[error("system handle query failed with NTSTATUS 0x{0:08X}")]
    SnapshotQuery(i32),

    /// Built for a platform without a system handle table.
    #[error("handle enumeration is only available on Windows")]
    Unsupported,
}
