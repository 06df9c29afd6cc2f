//! Process identity lookups via Win32: executable name, owning account,
//! and the elevation probe.
//!
//! Everything here is best-effort. A process that denies access or exits
//! between snapshot and query yields empty fields, never an error.

use crate::system::ProcessIdentity;

/// Resolve a process's display name and account. pid 0 and pid 4 are
/// kernel pseudo-processes that cannot be opened and get their well-known
/// names directly.
#[cfg(windows)]
pub fn identity(pid: u32) -> ProcessIdentity {
    match pid {
        0 => ProcessIdentity {
            name: "[System Idle Process]".to_string(),
            account: "SYSTEM".to_string(),
        },
        4 => ProcessIdentity {
            name: "System".to_string(),
            account: "SYSTEM".to_string(),
        },
        _ => ProcessIdentity {
            name: image_name(pid).unwrap_or_default(),
            account: account_name(pid).unwrap_or_default(),
        },
    }
}

#[cfg(not(windows))]
pub fn identity(pid: u32) -> ProcessIdentity {
    let _ = pid;
    ProcessIdentity::default()
}

/// Final path component of a Windows path.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Executable base name of a process.
///
/// `QueryFullProcessImageNameW` works with limited query access and is
/// tried first; `GetModuleBaseNameW` covers processes where the image
/// path query is unavailable.
#[cfg(windows)]
fn image_name(pid: u32) -> Option<String> {
    use windows::Win32::Foundation::{CloseHandle, HMODULE, MAX_PATH};
    use windows::Win32::System::ProcessStatus::GetModuleBaseNameW;
    use windows::Win32::System::Threading::{
        OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
        PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_VM_READ,
    };

    unsafe {
        // VM_READ is only needed by the module-name fallback; retry
        // without it so the primary query still works where VM_READ is
        // denied.
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION | PROCESS_VM_READ, false, pid)
            .or_else(|_| OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid))
            .ok()?;

        let mut buffer = [0u16; MAX_PATH as usize];
        let mut size = buffer.len() as u32;
        let queried = QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            windows::core::PWSTR(buffer.as_mut_ptr()),
            &mut size,
        );
        if queried.is_ok() && size > 0 {
            let _ = CloseHandle(handle);
            let full = String::from_utf16_lossy(&buffer[..size as usize]);
            return Some(base_name(&full).to_string());
        }

        let len = GetModuleBaseNameW(handle, HMODULE(std::ptr::null_mut()), &mut buffer) as usize;
        let _ = CloseHandle(handle);
        if len > 0 {
            Some(String::from_utf16_lossy(&buffer[..len]))
        } else {
            None
        }
    }
}

/// Owning account of a process via its token SID, `DOMAIN\user` when a
/// domain is present.
#[cfg(windows)]
fn account_name(pid: u32) -> Option<String> {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{
        GetTokenInformation, LookupAccountSidW, TokenUser, SID_NAME_USE, TOKEN_QUERY, TOKEN_USER,
    };
    use windows::Win32::System::Threading::{
        OpenProcess, OpenProcessToken, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;

        let mut token = HANDLE::default();
        if OpenProcessToken(handle, TOKEN_QUERY, &mut token).is_err() {
            let _ = CloseHandle(handle);
            return None;
        }

        let mut needed: u32 = 0;
        let _ = GetTokenInformation(token, TokenUser, None, 0, &mut needed);
        if needed == 0 {
            let _ = CloseHandle(token);
            let _ = CloseHandle(handle);
            return None;
        }

        let mut buffer = vec![0u8; needed as usize];
        if GetTokenInformation(
            token,
            TokenUser,
            Some(buffer.as_mut_ptr() as *mut _),
            needed,
            &mut needed,
        )
        .is_err()
        {
            let _ = CloseHandle(token);
            let _ = CloseHandle(handle);
            return None;
        }

        let token_user = &*(buffer.as_ptr() as *const TOKEN_USER);
        let sid = token_user.User.Sid;

        let mut name_len: u32 = 256;
        let mut domain_len: u32 = 256;
        let mut name_buf = vec![0u16; name_len as usize];
        let mut domain_buf = vec![0u16; domain_len as usize];
        let mut sid_type = SID_NAME_USE::default();

        let looked_up = LookupAccountSidW(
            None,
            sid,
            windows::core::PWSTR(name_buf.as_mut_ptr()),
            &mut name_len,
            windows::core::PWSTR(domain_buf.as_mut_ptr()),
            &mut domain_len,
            &mut sid_type,
        );

        let _ = CloseHandle(token);
        let _ = CloseHandle(handle);

        if looked_up.is_err() {
            return None;
        }

        let user = String::from_utf16_lossy(&name_buf[..name_len as usize]);
        let domain = String::from_utf16_lossy(&domain_buf[..domain_len as usize]);
        if domain.is_empty() {
            Some(user)
        } else {
            Some(format!("{domain}\\{user}"))
        }
    }
}

/// True when the current token carries admin elevation. The scan behaves
/// identically either way; callers only use this to decide whether to
/// warn about incomplete results.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    unsafe {
        let mut token = HANDLE::default();
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
            return false;
        }

        let mut elevation = TOKEN_ELEVATION::default();
        let mut size = std::mem::size_of::<TOKEN_ELEVATION>() as u32;
        let queried = GetTokenInformation(
            token,
            TokenElevation,
            Some(&mut elevation as *mut _ as *mut _),
            size,
            &mut size,
        );
        let _ = CloseHandle(token);

        queried.is_ok() && elevation.TokenIsElevated != 0
    }
}

/// No elevation concept off Windows; report true so the warning stays
/// quiet.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_takes_the_final_component() {
        assert_eq!(base_name(r"C:\Windows\System32\notepad.exe"), "notepad.exe");
        assert_eq!(base_name("C:/tools/rg.exe"), "rg.exe");
        assert_eq!(base_name("bare.exe"), "bare.exe");
    }

    #[cfg(windows)]
    #[test]
    fn own_identity_resolves_a_name() {
        let me = identity(std::process::id());
        assert!(!me.name.is_empty());
    }

    #[cfg(windows)]
    #[test]
    fn elevation_probe_answers() {
        // either answer is fine; it must not panic
        let _ = is_elevated();
    }
}
