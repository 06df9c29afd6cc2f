//! System-wide handle table snapshot.
//!
//! `NtQuerySystemInformation(SystemExtendedHandleInformation)` fills an
//! opaque buffer with an entry count followed by fixed-size entries. The
//! required size is only known after the call, so the buffer is regrown
//! until the kernel accepts it.

#[cfg(windows)]
use crate::error::ScanError;

/// Initial buffer guess; busy systems exceed this and trigger a regrow.
#[cfg(windows)]
const INITIAL_BUFFER_LEN: usize = 1024 * 1024;

/// Slack on top of the kernel-reported size; the table can keep growing
/// between two calls.
#[cfg(windows)]
const REGROW_SLACK: usize = 64 * 1024;

// Layout of SYSTEM_HANDLE_INFORMATION_EX. Undocumented but stable across
// versions; pointer-width fields follow the kernel pointer size.
#[repr(C)]
#[derive(Clone, Copy)]
struct HandleTableHeader {
    number_of_handles: usize,
    reserved: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct HandleTableEntryEx {
    object: usize,
    unique_process_id: usize,
    handle_value: usize,
    granted_access: u32,
    creator_back_trace_index: u16,
    object_type_index: u16,
    handle_attributes: u32,
    reserved: u32,
}

/// One decoded handle-table entry.
#[derive(Debug, Clone, Copy)]
pub struct RawHandleEntry {
    pub pid: u32,
    pub handle_value: usize,
    pub granted_access: u32,
    pub object_type_index: u16,
    /// Kernel address of the object body. Diagnostic only.
    pub object: usize,
}

/// Kernel-populated handle table, kept as raw bytes for the lifetime of
/// one scan and never mutated after the kernel fills it.
pub struct SnapshotBuffer {
    buf: Vec<u8>,
}

impl SnapshotBuffer {
    #[cfg(test)]
    fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    /// Decode the entry array. The advertised count is clamped to what
    /// the buffer can actually hold, so a short or corrupt buffer can
    /// never be read past its end.
    pub fn entries(&self) -> Vec<RawHandleEntry> {
        use std::mem::size_of;

        let header_len = size_of::<HandleTableHeader>();
        let entry_len = size_of::<HandleTableEntryEx>();
        if self.buf.len() < header_len {
            return Vec::new();
        }

        // Unaligned reads throughout: Vec<u8> guarantees no alignment.
        let header =
            unsafe { std::ptr::read_unaligned(self.buf.as_ptr() as *const HandleTableHeader) };
        let capacity = (self.buf.len() - header_len) / entry_len;
        let count = header.number_of_handles.min(capacity);

        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let raw = unsafe {
                std::ptr::read_unaligned(
                    self.buf.as_ptr().add(header_len + i * entry_len) as *const HandleTableEntryEx
                )
            };
            entries.push(RawHandleEntry {
                pid: raw.unique_process_id as u32,
                handle_value: raw.handle_value,
                granted_access: raw.granted_access,
                object_type_index: raw.object_type_index,
                object: raw.object,
            });
        }
        entries
    }
}

/// Ask the kernel for the full handle table, regrowing the buffer until
/// the reported size fits. Retries are unbounded; only allocation failure
/// or a non-size-related status ends them.
#[cfg(windows)]
pub fn acquire() -> Result<SnapshotBuffer, ScanError> {
    use ntapi::ntexapi::{NtQuerySystemInformation, SystemExtendedHandleInformation};

    const STATUS_INFO_LENGTH_MISMATCH: i32 = 0xC000_0004_u32 as i32;

    let mut len = INITIAL_BUFFER_LEN;
    loop {
        let mut buf = vec![0u8; len];
        let mut needed: u32 = 0;
        let status = unsafe {
            NtQuerySystemInformation(
                SystemExtendedHandleInformation,
                buf.as_mut_ptr() as *mut _,
                len as u32,
                &mut needed,
            )
        };

        if status == STATUS_INFO_LENGTH_MISMATCH {
            len = needed as usize + REGROW_SLACK;
            continue;
        }
        if status < 0 {
            return Err(ScanError::SnapshotQuery(status));
        }
        return Ok(SnapshotBuffer { buf });
    }
}
