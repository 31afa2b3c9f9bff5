/// File-backed logging via `env_logger`.
///
/// The renderer owns the terminal (alternate screen, raw mode), so log
/// records go to a file instead of stderr. Nothing is installed unless
/// `general.log_level` is set; the `log` macros are no-ops otherwise.

use std::fs::File;

use env_logger::{Builder, Target};

use crate::config::GeneralConfig;

/// Install the global logger. Returns `Ok(false)` when logging is off.
pub fn init(general: &GeneralConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let filter = match general.log_level.as_deref() {
        Some(f) => f,
        None => return Ok(false),
    };

    let file = File::create(&general.log_file)?;
    Builder::new()
        .parse_filters(filter)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()?;

    log::info!("logging to {} at '{}'", general.log_file.display(), filter);
    Ok(true)
}
