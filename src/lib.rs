pub mod config;
pub mod pipeline_config;
pub mod pipeline;
pub mod shell; // Interactive read-eval-print loop over any BufRead/Write pair

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so the JSON payloads written to stdout stay clean.
/// `RUST_LOG` wins over `filter`, which wins over [`config::default_log_filter`].
pub fn init_tracing(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(filter.unwrap_or(config::default_log_filter()))
    });

    // try_init: tests and embedders may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
