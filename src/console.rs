//! Console capability detection for the privilege warning.
//!
//! Color enablement is a value handed to whoever prints, not process-wide
//! state: detect once in `main`, pass it along.

use crossterm::style::Stylize;
use crossterm::tty::IsTty;

/// Whether escape sequences may be written to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Detect stderr's capabilities: a real terminal that understands
    /// ANSI sequences.
    pub fn detect() -> Self {
        Self {
            color: std::io::stderr().is_tty() && ansi_supported(),
        }
    }

    /// A palette that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// The not-elevated warning, styled when the console allows it.
    pub fn privilege_warning(&self) -> String {
        let headline = "Not running as Administrator. Results may be incomplete.";
        let advice = "         Run from an elevated command prompt for full results.";
        if self.color {
            format!(
                "{} {}\n{}\n",
                "WARNING:".yellow().bold(),
                headline.yellow(),
                advice.yellow()
            )
        } else {
            format!("WARNING: {headline}\n{advice}\n")
        }
    }
}

/// On Windows this also switches the console into VT mode as a side
/// effect of probing.
fn ansi_supported() -> bool {
    #[cfg(windows)]
    {
        crossterm::ansi_support::supports_ansi()
    }
    #[cfg(not(windows))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_palette_emits_no_escape_codes() {
        let warning = Palette::plain().privilege_warning();
        assert!(warning.starts_with("WARNING:"));
        assert!(!warning.contains('\x1b'));
    }

    #[test]
    fn warning_spells_out_both_lines() {
        let warning = Palette::plain().privilege_warning();
        assert!(warning.contains("Results may be incomplete"));
        assert!(warning.contains("elevated command prompt"));
    }
}
