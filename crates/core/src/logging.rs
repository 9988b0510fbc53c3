use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Overrides the directory generation logs are written to.
pub const LOG_DIR_ENV: &str = "XCBRIDGE_LOG_DIR";
const DEFAULT_DIRECTIVES: &str = "xcbridge_core=info,xcbridge_cli=info,warn";

fn resolve_log_dir(explicit: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    explicit
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(".xcbridge")
                .join("logs")
        })
}

/// Sends generator events to `<log dir>/<component>.log.<date>` and, when
/// `to_stderr` is set, to the terminal. `RUST_LOG` replaces the default
/// directives. Keep the returned guard alive until the pass ends.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let dir = resolve_log_dir(std::env::var_os(LOG_DIR_ENV).map(PathBuf::from), dirs::home_dir());
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("xcbridge: cannot create log directory {}: {}", dir.display(), e);
    }

    let appender = tracing_appender::rolling::daily(&dir, format!("{}.log", component));
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true),
        )
        .with(stderr_layer)
        .init();

    guard
}
