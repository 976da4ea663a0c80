//! Tracing subscriber setup.

use pictor_core::config::PictorConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose request-level chatter stays at warn.
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls"];

/// Build the filter: `RUST_LOG` wins, otherwise the configured level with
/// noisy HTTP crates held at warn.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: &str) -> String {
    let mut directives = vec![level.to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|t| format!("{t}=warn")));
    directives.join(",")
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process so buffered file logs are flushed.
pub fn init(cfg: &PictorConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let stdout = fmt::layer().with_target(true);

    match cfg.log_dir.as_deref() {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "pictor.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter(&cfg.log_level))
                .with(stdout)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter(&cfg.log_level))
                .with(stdout)
                .try_init()?;
            Ok(None)
        }
    }
}
