pub mod formats;

use flexi_logger::Logger;

use crate::Error;

/// Logs go to stderr; stdout carries command output.
pub fn init(verbose: bool) -> Result<(), Error> {
    let default = if verbose { "debug" } else { "warn" };
    Logger::try_with_env_or_str(default)?
        .format(formats::cli_format)
        .log_to_stderr()
        .start()?;

    Ok(())
}
