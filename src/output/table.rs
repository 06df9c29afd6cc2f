//! lsof-style column-aligned table.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::system::HandleRecord;

// Width caps keep one pathological cell from blowing up every row. NAME
// is last and stays uncapped.
const MAX_COMMAND_WIDTH: usize = 25;
const MAX_USER_WIDTH: usize = 30;
const MAX_TYPE_WIDTH: usize = 20;
const COLUMN_GAP: usize = 2;

pub fn format_table(records: &[HandleRecord]) -> String {
    if records.is_empty() {
        return "No open handles found.\n".to_string();
    }

    let mut w_command = "COMMAND".len();
    let mut w_pid = "PID".len();
    let mut w_user = "USER".len();
    let mut w_type = "TYPE".len();
    for r in records {
        w_command = w_command.max(r.process_name.width());
        w_pid = w_pid.max(r.pid.to_string().len());
        w_user = w_user.max(r.user.width());
        w_type = w_type.max(r.object_type.width());
    }
    w_command = w_command.min(MAX_COMMAND_WIDTH);
    w_user = w_user.min(MAX_USER_WIDTH);
    w_type = w_type.min(MAX_TYPE_WIDTH);

    let mut out = String::new();
    push_cell(&mut out, "COMMAND", w_command);
    push_cell(&mut out, "PID", w_pid);
    push_cell(&mut out, "USER", w_user);
    push_cell(&mut out, "TYPE", w_type);
    out.push_str("NAME\n");

    for r in records {
        push_cell(&mut out, &clip(&r.process_name, w_command), w_command);
        push_cell(&mut out, &r.pid.to_string(), w_pid);
        push_cell(&mut out, &clip(&r.user, w_user), w_user);
        push_cell(&mut out, &clip(&r.object_type, w_type), w_type);
        out.push_str(&r.path);
        out.push('\n');
    }

    out
}

/// Left-align `cell` into a column `width` wide, plus the inter-column
/// gap.
fn push_cell(out: &mut String, cell: &str, width: usize) {
    out.push_str(cell);
    let pad = width.saturating_sub(cell.width()) + COLUMN_GAP;
    out.extend(std::iter::repeat(' ').take(pad));
}

/// Cut a cell down to `max` display columns, marking the cut with a
/// trailing `~`.
fn clip(cell: &str, max: usize) -> String {
    if cell.width() <= max {
        return cell.to_string();
    }
    let keep = max.saturating_sub(1);
    let mut clipped = String::new();
    let mut used = 0;
    for ch in cell.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > keep {
            break;
        }
        used += w;
        clipped.push(ch);
    }
    clipped.push('~');
    clipped
}
