//! JSON rendering of the result list.

use crate::system::HandleRecord;

/// Pretty-printed JSON array; `serde_json` handles all string escaping,
/// so paths with quotes, backslashes or control characters round-trip
/// through any standard parser.
pub fn format_json(records: &[HandleRecord]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(process_name: &str, pid: u32, user: &str, object_type: &str, path: &str) -> HandleRecord {
        HandleRecord {
            process_name: process_name.to_string(),
            pid,
            user: user.to_string(),
            object_type: object_type.to_string(),
            path: path.to_string(),
            handle: 0x1c,
        }
    }

    #[test]
    fn empty_list_is_an_empty_array() {
        assert_eq!(format_json(&[]).unwrap(), "[]\n");
    }

    #[test]
    fn serializes_the_expected_keys_in_order() {
        let json = format_json(&[rec("notepad.exe", 1234, "alice", "File", r"C:\a.txt")]).unwrap();
        let at = |key: &str| json.find(key).unwrap();
        assert!(at("\"command\"") < at("\"pid\""));
        assert!(at("\"pid\"") < at("\"user\""));
        assert!(at("\"user\"") < at("\"type\""));
        assert!(at("\"type\"") < at("\"name\""));
    }

    #[test]
    fn pid_is_a_number_and_awkward_strings_round_trip() {
        let original = rec(
            "note\"pad.exe",
            42,
            r"DESKTOP\alice",
            "File",
            "C:\\with \"quote\"\nand newline.txt",
        );
        let json = format_json(std::slice::from_ref(&original)).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["pid"], 42);
        assert_eq!(parsed[0]["command"], original.process_name);
        assert_eq!(parsed[0]["user"], original.user);
        assert_eq!(parsed[0]["type"], original.object_type);
        assert_eq!(parsed[0]["name"], original.path);
    }

    #[test]
    fn raw_handle_value_stays_out_of_the_json() {
        let json = format_json(&[rec("a.exe", 1, "u", "File", "x")]).unwrap();
        assert!(!json.contains("handle"));
        assert!(!json.contains("0x1c"));
    }
}
