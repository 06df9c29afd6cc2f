//! plsof — lsof for Windows.
//!
//! One-shot, read-only scan: snapshot the system handle table, resolve
//! each handle's owning process, user, object type and path, filter,
//! print. Nothing it inspects is modified or closed.

use anyhow::Result;
use clap::Parser;

use plsof::cli::Cli;
use plsof::console::Palette;
use plsof::output::{self, OutputMode};
use plsof::system::{self, process};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let filter = cli.into_filter()?;

    // Warn in table mode only; JSON consumers get clean streams.
    if filter.output == OutputMode::Table && !process::is_elevated() {
        let palette = Palette::detect();
        eprint!("{}", palette.privilege_warning());
        eprintln!();
    }

    let records = system::scan(&filter);
    let rendered = output::render(&records, filter.output)?;
    print!("{rendered}");

    Ok(())
}
