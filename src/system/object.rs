//! Object type/name queries with a hard per-query deadline.
//!
//! `NtQueryObject(ObjectNameInformation)` can block forever on some object
//! kinds (named pipes, unreadable devices). Each name query therefore runs
//! on its own worker thread with a bounded wait; a worker that misses the
//! deadline is abandoned rather than joined.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Run `work` on a throwaway worker thread and wait at most `timeout` for
/// its result.
///
/// On timeout the worker is abandoned: the underlying call offers no
/// cancellation primitive, so the thread may stay blocked in the kernel
/// until process exit. At most one such thread leaks per timed-out query.
pub fn run_with_timeout<T, F>(timeout: Duration, work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("object-query".into())
        .spawn(move || {
            // The receiver is gone if the deadline already passed.
            let _ = tx.send(work());
        });
    if spawned.is_err() {
        return None;
    }
    rx.recv_timeout(timeout).ok()
}

/// Outcome of a deadline-bound name query. Callers treat the two the same
/// for the record (empty path) but release the handle differently.
#[cfg(windows)]
pub enum NameQuery {
    Done(Option<String>),
    TimedOut,
}

#[cfg(windows)]
const STATUS_INFO_LENGTH_MISMATCH: i32 = 0xC000_0004_u32 as i32;
#[cfg(windows)]
const STATUS_BUFFER_OVERFLOW: i32 = 0x8000_0005_u32 as i32;

/// Query the object's type name ("File", "Key", ...). This information
/// class is not known to block, so it runs untimed.
#[cfg(windows)]
pub fn type_name(raw_handle: usize) -> Option<String> {
    query_unicode(raw_handle, ntapi::ntobapi::ObjectTypeInformation)
}

/// Query the object's namespace path, giving up after `timeout`.
#[cfg(windows)]
pub fn name_with_timeout(raw_handle: usize, timeout: Duration) -> NameQuery {
    let queried = run_with_timeout(timeout, move || {
        query_unicode(raw_handle, ntapi::ntobapi::ObjectNameInformation)
    });
    match queried {
        Some(name) => NameQuery::Done(name),
        None => NameQuery::TimedOut,
    }
}

/// Issue `NtQueryObject` for an information class whose payload starts
/// with a `UNICODE_STRING`, growing the buffer once if the first call
/// reports a larger requirement.
#[cfg(windows)]
fn query_unicode(raw_handle: usize, class: u32) -> Option<String> {
    use ntapi::ntobapi::NtQueryObject;

    let mut buf = vec![0u8; 1024];
    let mut needed: u32 = 0;
    let mut status = unsafe {
        NtQueryObject(
            raw_handle as *mut _,
            class,
            buf.as_mut_ptr() as *mut _,
            buf.len() as u32,
            &mut needed,
        )
    };

    if (status == STATUS_INFO_LENGTH_MISMATCH || status == STATUS_BUFFER_OVERFLOW) && needed > 0 {
        buf = vec![0u8; needed as usize];
        status = unsafe {
            NtQueryObject(
                raw_handle as *mut _,
                class,
                buf.as_mut_ptr() as *mut _,
                buf.len() as u32,
                &mut needed,
            )
        };
    }
    if status != 0 {
        return None;
    }
    decode_unicode(&buf)
}

/// Read the `UNICODE_STRING` at the head of `buf`. Length and pointer are
/// validated before the character span is touched.
#[cfg(windows)]
fn decode_unicode(buf: &[u8]) -> Option<String> {
    use windows::Win32::Foundation::UNICODE_STRING;

    if buf.len() < std::mem::size_of::<UNICODE_STRING>() {
        return None;
    }
    let us = unsafe { std::ptr::read_unaligned(buf.as_ptr() as *const UNICODE_STRING) };
    if us.Buffer.is_null() || us.Length == 0 || us.Length > us.MaximumLength {
        return None;
    }
    let chars = (us.Length / 2) as usize;
    let span = unsafe { std::slice::from_raw_parts(us.Buffer.as_ptr(), chars) };
    Some(String::from_utf16_lossy(span))
}
