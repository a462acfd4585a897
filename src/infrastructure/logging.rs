use std::{
    env,
    io::{self, IsTerminal},
    path::Path,
};

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, fmt::time::UtcTime, prelude::*, EnvFilter};

use crate::{config::AppConfig, infrastructure::directories::ResolvedPaths};

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

const LOG_FILE_PREFIX: &str = "tracker.log";
// HTTP and database internals are only interesting when asked for by RUST_LOG.
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,sqlx=warn";

pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    FILE_GUARD
        .get_or_try_init(|| install(&config.logging.level, &paths.logs_dir))
        .map(|_| ())
}

fn install(level: &str, logs_dir: &Path) -> Result<WorkerGuard> {
    let rust_log = env::var("RUST_LOG").ok();
    let filter = filter_for(level, rust_log.as_deref());

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stdout)
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(io::stdout().is_terminal()),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(false),
        )
        .try_init()?;

    tracing::info!(logs = %logs_dir.display(), "tracing initialized");
    Ok(guard)
}

/// `RUST_LOG` wins outright; otherwise the configured level applies with
/// chatty dependencies held at warn.
fn filter_for(level: &str, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    EnvFilter::try_new(format!("{level},{QUIET_DEPENDENCIES}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_DEPENDENCIES}")))
}
