// Allocator stress: retain a slot from every large buffer and leave a heap
// profile behind for inspection (e.g. with DHAT's dh_view.html).

use std::process;

use colored::Colorize;
use tracing::{debug, info};

use memspeed::{logging, run_cycles, HeapProfile, Result, Settings};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn run() -> Result<()> {
    let settings = Settings::discover_cwd()?;
    logging::init(&settings.log)?;
    debug!(?settings, "settings loaded");

    let memory = &settings.memory;
    let planned = memory.check_retention()?;
    info!(cycles = memory.cycles, slots = memory.slots, planned, "starting allocation cycles");

    let profile = HeapProfile::start(memory)?;
    let retained = run_cycles(memory.cycles, memory.slots, &mut rand::thread_rng());

    let snapshot = profile.snapshot();
    info!(
        retained = retained.len(),
        retained_bytes = retained.retained_bytes(),
        curr_bytes = snapshot.curr_bytes,
        max_bytes = snapshot.max_bytes,
        "allocation cycles finished"
    );
    eprintln!(
        "{} {} buffers, {} bytes live, peak {} bytes",
        "retained".green().bold(),
        retained.len(),
        snapshot.curr_bytes,
        snapshot.max_bytes
    );

    // The profile must be written while the buffers are still reachable.
    let path = profile.finish();
    debug!(path = %path.display(), "profile written");
    drop(retained);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(1);
    }
}
