use cap_std::fs_utf8::camino::Utf8Path;
use miette::{Context, IntoDiagnostic, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "RAIDMAP_LOG";
pub const LOG_FILE_NAME: &str = "raidmap.log";

/// Installs the global subscriber: one layer to stderr and one to `raidmap.log` inside `log_dir`.
/// The filter comes from `RAIDMAP_LOG` and defaults to `info`.
/// Keep the returned guard alive until exit or the tail of the log file is lost.
pub fn install_tracing(log_dir: &Utf8Path) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = tracing_appender::rolling::never(log_dir.as_std_path(), LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .into_diagnostic()
        .wrap_err("failed to install global tracing subscriber")?;
    Ok(guard)
}
