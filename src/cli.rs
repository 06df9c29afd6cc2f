//! Command-line surface. Deliberately thin: parse, validate, hand a
//! `ScanFilter` to the engine.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use regex::RegexBuilder;

use crate::output::OutputMode;
use crate::system::{ScanFilter, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Parser)]
#[command(
    name = "plsof",
    version,
    about = "List open kernel object handles on Windows",
    after_help = "\
EXAMPLES:
  plsof                          all handles (run elevated for full results)
  plsof -p 1234                  handles of one process
  plsof -c notepad               processes whose name contains \"notepad\"
  plsof -f \"\\.txt$\"              every open .txt file
  plsof -c explorer -f \"\\.dll\"   .dll handles held by explorer
  plsof -p 1234 -j               JSON for scripting
  plsof -t 15                    longer per-handle timeout on busy systems

Without elevation only handles accessible to the current user are shown.
The -f regex is matched case-insensitively anywhere in the object path."
)]
pub struct Cli {
    /// Show only handles owned by this process ID
    #[arg(short = 'p', long = "pid", value_name = "PID")]
    pub pid: Option<u32>,

    /// Show only processes whose name contains this string (case-insensitive)
    #[arg(short = 'c', long = "command", value_name = "NAME")]
    pub command: Option<String>,

    /// Keep only handles whose object path matches this regex (case-insensitive)
    #[arg(short = 'f', long = "filter", value_name = "REGEX")]
    pub filter: Option<String>,

    /// Timeout per handle name query, in seconds
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Output results as JSON
    #[arg(short = 'j', long = "json")]
    pub json: bool,
}

impl Cli {
    /// Build the scan configuration. Empty filter strings mean "no
    /// filter", matching how absent flags behave.
    pub fn into_filter(self) -> Result<ScanFilter> {
        let path_pattern = match self.filter.as_deref().filter(|f| !f.is_empty()) {
            Some(pattern) => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("invalid path filter regex: {pattern}"))?,
            ),
            None => None,
        };

        Ok(ScanFilter {
            pid: self.pid,
            process_name: self.command.filter(|c| !c.is_empty()),
            path_pattern,
            timeout: Duration::from_secs(self.timeout),
            output: if self.json {
                OutputMode::Json
            } else {
                OutputMode::Table
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["plsof"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_to_an_unfiltered_table_scan() {
        let filter = parse(&[]).into_filter().unwrap();
        assert!(filter.pid.is_none());
        assert!(filter.process_name.is_none());
        assert!(filter.path_pattern.is_none());
        assert_eq!(filter.timeout, Duration::from_secs(5));
        assert_eq!(filter.output, OutputMode::Table);
    }

    #[test]
    fn json_flag_switches_output_mode() {
        let filter = parse(&["--json"]).into_filter().unwrap();
        assert_eq!(filter.output, OutputMode::Json);
    }

    #[test]
    fn path_filter_compiles_case_insensitively() {
        let filter = parse(&["-f", r"\.TXT$"]).into_filter().unwrap();
        assert!(filter.path_pattern.unwrap().is_match(r"C:\Users\a.txt"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(parse(&["-f", "("]).into_filter().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["plsof", "-t", "0"]).is_err());
    }

    #[test]
    fn timeout_flows_into_the_filter() {
        let filter = parse(&["-t", "15"]).into_filter().unwrap();
        assert_eq!(filter.timeout, Duration::from_secs(15));
    }

    #[test]
    fn empty_strings_mean_no_filter() {
        let filter = parse(&["-c", "", "-f", ""]).into_filter().unwrap();
        assert!(filter.process_name.is_none());
        assert!(filter.path_pattern.is_none());
    }
}
