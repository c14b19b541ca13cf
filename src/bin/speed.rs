// Call-convention timer: a million calls per batch, large and small record,
// by value and by reference.

use std::io;
use std::process;

use colored::Colorize;
use tracing::debug;

use memspeed::{logging, run_all, Result, Settings};

fn run() -> Result<()> {
    let settings = Settings::discover_cwd()?;
    logging::init(&settings.log)?;
    debug!(?settings, "settings loaded");

    let stdout = io::stdout();
    run_all(settings.speed.calls, &mut stdout.lock())?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(1);
    }
}
