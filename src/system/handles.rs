//! Handle resolution: walk the snapshot, work out who owns each handle
//! and what it names, and apply the configured filters.
//!
//! Per-entry failures are the norm here: protected processes refuse
//! duplication, handles go stale mid-scan, name queries stall. An entry
//! that fails before its object can be examined is silently dropped; an
//! entry that fails per field keeps its record with that field empty.

use std::collections::HashMap;
use std::time::Duration;

use crate::system::snapshot::RawHandleEntry;
use crate::system::{HandleRecord, ProcessIdentity, ScanFilter};

/// Per-handle OS operations the resolution loop needs. Split out so the
/// loop's filter and caching behavior can be exercised without a live
/// handle table.
pub trait HandleAccess {
    /// A duplicated handle owned by the current process.
    type Duplicate;

    /// Executable and account names for a process, best-effort.
    fn process_identity(&mut self, pid: u32) -> ProcessIdentity;

    /// Duplicate `raw_handle` out of `pid` into the current process.
    /// `None` covers open and duplication failures alike.
    fn duplicate(&mut self, pid: u32, raw_handle: usize) -> Option<Self::Duplicate>;

    /// The object's type name ("File", "Key", ...).
    fn object_type(&mut self, dup: &Self::Duplicate) -> Option<String>;

    /// The object's normalized path, bounded by `timeout`. Consumes and
    /// releases the duplicate, so every iteration gives its handle back
    /// no matter which filter fires afterwards.
    fn object_path(&mut self, dup: Self::Duplicate, timeout: Duration) -> Option<String>;
}

/// Resolve every snapshot entry that survives the filters, preserving
/// snapshot order.
pub fn resolve_all<A: HandleAccess>(
    entries: &[RawHandleEntry],
    access: &mut A,
    filter: &ScanFilter,
) -> Vec<HandleRecord> {
    // One lookup per distinct pid per scan, however many handles it owns.
    let mut identities: HashMap<u32, ProcessIdentity> = HashMap::new();
    let mut records = Vec::new();

    let name_needle = filter.process_name.as_deref().map(str::to_lowercase);

    for entry in entries {
        // Cheapest filter first: skips every per-handle syscall below.
        if let Some(wanted) = filter.pid {
            if entry.pid != wanted {
                continue;
            }
        }

        let identity = match identities.get(&entry.pid) {
            Some(known) => known.clone(),
            None => {
                let looked_up = access.process_identity(entry.pid);
                identities.insert(entry.pid, looked_up.clone());
                looked_up
            }
        };

        if let Some(needle) = &name_needle {
            // An unresolvable name never matches.
            if identity.name.is_empty() || !identity.name.to_lowercase().contains(needle) {
                continue;
            }
        }

        let Some(dup) = access.duplicate(entry.pid, entry.handle_value) else {
            continue;
        };

        let object_type = access.object_type(&dup).unwrap_or_default();
        let path = access.object_path(dup, filter.timeout).unwrap_or_default();

        if let Some(pattern) = &filter.path_pattern {
            // A handle with no resolvable path can never match a path
            // filter.
            if path.is_empty() || !pattern.is_match(&path) {
                continue;
            }
        }

        records.push(HandleRecord {
            process_name: identity.name,
            pid: entry.pid,
            user: identity.account,
            object_type,
            path,
            handle: entry.handle_value,
        });
    }

    records
}

/// Live implementation backed by the Win32/NT APIs.
#[cfg(windows)]
pub struct SystemHandleAccess {
    devices: crate::system::volume::DeviceMap,
}

#[cfg(windows)]
impl SystemHandleAccess {
    pub fn new() -> Self {
        Self {
            devices: crate::system::volume::DeviceMap::current(),
        }
    }
}

#[cfg(windows)]
impl Default for SystemHandleAccess {
    fn default() -> Self {
        Self::new()
    }
}

/// A duplicated handle, closed on drop.
#[cfg(windows)]
pub struct DuplicateGuard(windows::Win32::Foundation::HANDLE);

#[cfg(windows)]
impl DuplicateGuard {
    fn raw(&self) -> usize {
        self.0 .0 as usize
    }
}

#[cfg(windows)]
impl Drop for DuplicateGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = windows::Win32::Foundation::CloseHandle(self.0);
        }
    }
}

#[cfg(windows)]
impl HandleAccess for SystemHandleAccess {
    type Duplicate = DuplicateGuard;

    fn process_identity(&mut self, pid: u32) -> ProcessIdentity {
        crate::system::process::identity(pid)
    }

    fn duplicate(&mut self, pid: u32, raw_handle: usize) -> Option<DuplicateGuard> {
        use windows::Win32::Foundation::{
            CloseHandle, DuplicateHandle, DUPLICATE_SAME_ACCESS, HANDLE,
        };
        use windows::Win32::System::Threading::{
            GetCurrentProcess, OpenProcess, PROCESS_DUP_HANDLE,
        };

        unsafe {
            let owner = OpenProcess(PROCESS_DUP_HANDLE, false, pid).ok()?;
            let mut dup = HANDLE::default();
            let copied = DuplicateHandle(
                owner,
                HANDLE(raw_handle as *mut _),
                GetCurrentProcess(),
                &mut dup,
                0,
                false,
                DUPLICATE_SAME_ACCESS,
            );
            let _ = CloseHandle(owner);
            copied.ok()?;
            Some(DuplicateGuard(dup))
        }
    }

    fn object_type(&mut self, dup: &DuplicateGuard) -> Option<String> {
        crate::system::object::type_name(dup.raw())
    }

    fn object_path(&mut self, dup: DuplicateGuard, timeout: Duration) -> Option<String> {
        use crate::system::object::{name_with_timeout, NameQuery};

        match name_with_timeout(dup.raw(), timeout) {
            NameQuery::Done(name) => name.map(|n| self.devices.normalize(&n)),
            NameQuery::TimedOut => {
                // The abandoned worker may still be blocked on this
                // handle. Closing it would let a later duplication reuse
                // the slot under the stale worker; leak it instead.
                std::mem::forget(dup);
                None
            }
        }
    }
}
