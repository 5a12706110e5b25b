use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// `RUST_LOG` wins over the crate default.
fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn cli_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .without_time()
        .compact()
}

fn json_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(false)
}

/// Compact human-readable output for the command line tools.
pub fn init_cli_logger(verbose: bool) {
    let filter = env_filter(if verbose {
        "clause_etl=debug,info"
    } else {
        "clause_etl=info"
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(cli_layer())
        .init();
}

/// 一行一筆 JSON，給收集日誌的主機使用
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(env_filter("clause_etl=info"))
        .with(json_layer())
        .init();
}
