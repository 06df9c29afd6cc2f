//! Handle introspection: snapshot acquisition, per-handle resolution,
//! process identity and kernel-path normalization.

pub mod handles;
pub mod object;
pub mod process;
pub mod snapshot;
pub mod volume;

use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use crate::output::OutputMode;

/// Default per-query timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// One resolved handle: who owns it and what it points at.
///
/// Fields that could not be resolved are empty strings; a record missing
/// entirely means the handle failed before type/name resolution.
#[derive(Debug, Clone, Serialize)]
pub struct HandleRecord {
    #[serde(rename = "command")]
    pub process_name: String,
    pub pid: u32,
    pub user: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(rename = "name")]
    pub path: String,
    /// Raw handle value in the owning process. Diagnostic only, not
    /// serialized.
    #[serde(skip)]
    pub handle: usize,
}

/// Executable and account names of a process, each best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub name: String,
    pub account: String,
}

/// Filters and limits for one scan, built once from the CLI and read-only
/// from then on.
#[derive(Debug)]
pub struct ScanFilter {
    pub pid: Option<u32>,
    /// Case-insensitive substring against the process display name.
    pub process_name: Option<String>,
    /// Case-insensitive search-anywhere regex against the object path.
    pub path_pattern: Option<Regex>,
    /// Hard ceiling per object-name query, not per scan.
    pub timeout: Duration,
    pub output: OutputMode,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            pid: None,
            process_name: None,
            path_pattern: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output: OutputMode::default(),
        }
    }
}

/// Enumerate every open handle on the system and resolve the ones that
/// survive the filters, in snapshot order.
///
/// A failed snapshot yields an empty list; the status only goes to the
/// log, so scripted callers still get well-formed (empty) output.
#[cfg(windows)]
pub fn scan(filter: &ScanFilter) -> Vec<HandleRecord> {
    let snap = match snapshot::acquire() {
        Ok(snap) => snap,
        Err(err) => {
            log::warn!("handle snapshot unavailable: {err}");
            return Vec::new();
        }
    };
    let entries = snap.entries();
    log::debug!("snapshot holds {} handle entries", entries.len());

    let mut access = handles::SystemHandleAccess::new();
    handles::resolve_all(&entries, &mut access, filter)
}

#[cfg(not(windows))]
pub fn scan(filter: &ScanFilter) -> Vec<HandleRecord> {
    let _ = filter;
    log::warn!("{}", crate::error::ScanError::Unsupported);
    Vec::new()
}

#[cfg(all(test, windows))]
mod windows_tests {
    use super::*;

    #[test]
    fn own_process_appears_in_a_pid_filtered_scan() {
        let filter = ScanFilter {
            pid: Some(std::process::id()),
            ..ScanFilter::default()
        };
        let records = scan(&filter);
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.pid == std::process::id()));
    }
}
