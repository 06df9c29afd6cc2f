//! NT device path to drive-letter mapping.
//!
//! Object name queries return kernel-namespace paths like
//! `\Device\HarddiskVolume3\Windows\notepad.exe`. The mapping from volume
//! device to drive letter is captured once per scan and applied as a plain
//! prefix swap. Paths outside any mapped volume (named pipes, registry
//! keys) are left in their native form.

/// Volume device prefixes and their drive letters.
#[derive(Debug, Default)]
pub struct DeviceMap {
    /// `("\Device\HarddiskVolume3", "C:")` pairs.
    mappings: Vec<(String, String)>,
}

impl DeviceMap {
    pub fn new(mappings: Vec<(String, String)>) -> Self {
        Self { mappings }
    }

    /// Snapshot the machine's current drive-letter table.
    #[cfg(windows)]
    pub fn current() -> Self {
        use windows::core::PCWSTR;
        use windows::Win32::Storage::FileSystem::{GetLogicalDriveStringsW, QueryDosDeviceW};

        let mut mappings = Vec::new();

        // "C:\<nul>D:\<nul>...<nul>"
        let mut drives = vec![0u16; 512];
        let len = unsafe { GetLogicalDriveStringsW(Some(&mut drives[..])) } as usize;
        if len == 0 || len > drives.len() {
            return Self { mappings };
        }

        for root in drives[..len].split(|&c| c == 0).filter(|s| !s.is_empty()) {
            let root = String::from_utf16_lossy(root);
            let Some(letter) = root.strip_suffix('\\') else {
                continue;
            };

            // QueryDosDeviceW wants "C:", not "C:\"
            let device_name: Vec<u16> = letter.encode_utf16().chain(std::iter::once(0)).collect();
            let mut target = vec![0u16; 260];
            let written =
                unsafe { QueryDosDeviceW(PCWSTR(device_name.as_ptr()), Some(&mut target[..])) }
                    as usize;
            if written == 0 {
                continue;
            }

            // The target is a NUL-separated multi-string; the first entry
            // is the active mapping.
            let device = target[..written.min(target.len())]
                .split(|&c| c == 0)
                .find(|s| !s.is_empty())
                .map(String::from_utf16_lossy);
            if let Some(device) = device {
                mappings.push((device, letter.to_string()));
            }
        }

        Self { mappings }
    }

    /// Rewrite a kernel path to its drive-letter form, or hand it back
    /// unchanged when no volume prefix matches. Already-normalized paths
    /// match no device prefix, so the rewrite is idempotent.
    pub fn normalize(&self, path: &str) -> String {
        for (device, letter) in &self.mappings {
            if let Some(rest) = path.strip_prefix(device.as_str()) {
                return format!("{letter}{rest}");
            }
        }
        path.to_string()
    }
}
