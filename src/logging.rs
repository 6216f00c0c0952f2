//! Log setup for the CLI.
//!
//! Library code only talks to the `log` facade. The binary installs
//! `env_logger` here; `RUST_LOG` overrides the default level.

use env_logger::{Builder, Env};
use std::io::Write;
use std::time::Duration;

/// Install the global logger. `verbose` lowers the default level to `debug`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let logging_env = Env::default().filter_or("RUST_LOG", default_level);
    let _ = Builder::from_env(logging_env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.target().to_ascii_lowercase(),
                record.args()
            )
        })
        .try_init();
}

/// Human-sized duration: `2m`, `3s`, `140ms`, `85μs`.
pub fn format_elapsed(elapsed: Duration) -> String {
    match elapsed.as_secs() {
        secs if secs >= 120 => format!("{}m", secs / 60),
        secs if secs > 0 => format!("{secs}s"),
        _ => match elapsed.as_millis() {
            millis if millis > 0 => format!("{millis}ms"),
            _ => format!("{}μs", elapsed.as_micros()),
        },
    }
}
