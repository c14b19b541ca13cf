use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;
use crate::error::{Error, Result};

/// Installs a `fmt` subscriber on stderr at the configured level.
///
/// Stdout stays reserved for program output.
pub fn init(settings: &LogSettings) -> Result<()> {
    let level = settings.level_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::default().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
