use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Build a JSON-formatting subscriber writing to `sink`.
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn get_subscriber<Sink>(default_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .json()
        .with_current_span(true);

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Install `subscriber` as the process-wide default. Can only succeed once.
pub fn init_subscriber(
    subscriber: impl Subscriber + Send + Sync,
) -> Result<(), SetGlobalDefaultError> {
    set_global_default(subscriber)
}

/// Structured JSON logging to stdout, `info` unless `RUST_LOG` says otherwise.
pub fn init_telemetry() -> Result<(), SetGlobalDefaultError> {
    init_subscriber(get_subscriber("info", std::io::stdout))
}
