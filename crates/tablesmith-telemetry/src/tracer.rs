//! Tracer setup and management

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{SimpleSpanProcessor, TracerProvider};
use std::sync::{Arc, Mutex, OnceLock};
use tablesmith_core::ObservabilityConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

/// Global tracer provider holder
static TRACER_PROVIDER: OnceLock<Arc<TracerProvider>> = OnceLock::new();

/// Global span processor builders (registered before initialization)
type ProcessorBuilder = Box<dyn FnOnce() -> SimpleSpanProcessor + Send>;
static SPAN_PROCESSOR_BUILDERS: Mutex<Option<Vec<ProcessorBuilder>>> = Mutex::new(Some(Vec::new()));

/// Register a span processor builder to be used when telemetry is initialized.
///
/// Exporters (OTLP, Jaeger, stdout) are supplied by the embedding
/// application this way. Must be called BEFORE `init_telemetry()`.
///
/// # Example
///
/// ```ignore
/// use tablesmith_telemetry::{register_span_processor, init_telemetry};
/// use opentelemetry_sdk::trace::SimpleSpanProcessor;
///
/// register_span_processor(Box::new(|| {
///     SimpleSpanProcessor::new(Box::new(/* your exporter */))
/// }));
/// init_telemetry(&Default::default())?;
/// ```
pub fn register_span_processor(builder: ProcessorBuilder) {
    let Ok(mut builders) = SPAN_PROCESSOR_BUILDERS.lock() else {
        tracing::warn!("Span processor registry is poisoned, ignoring registration");
        return;
    };

    if let Some(ref mut vec) = *builders {
        vec.push(builder);
    } else {
        tracing::warn!("Attempted to register span processor after telemetry initialization");
    }
}

/// Initialize logging and tracing.
///
/// This sets up:
/// - A tracer provider with any registered span processors
/// - Integration with the tracing subscriber
/// - Human readable or JSON log output on stderr, filtered by `RUST_LOG`
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use tablesmith_core::ObservabilityConfig;
/// use tablesmith_telemetry::init_telemetry;
///
/// init_telemetry(&ObservabilityConfig::default()).expect("telemetry");
/// ```
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    // Take the span processor builders (can only initialize once)
    let builders = SPAN_PROCESSOR_BUILDERS
        .lock()
        .map(|mut builders| builders.take().unwrap_or_default())
        .unwrap_or_default();

    let mut provider_builder = TracerProvider::builder();
    for builder in builders {
        provider_builder = provider_builder.with_span_processor(builder());
    }
    let tracer_provider = provider_builder.build();

    let tracer = tracer_provider.tracer(config.service_name.clone());
    let _ = TRACER_PROVIDER.set(Arc::new(tracer_provider));

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let json_layer = config
        .json_logs
        .then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true)
        });
    let text_layer = (!config.json_logs).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_line_number(true)
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(json_layer)
        .with(text_layer)
        .with(filter)
        .try_init()
}

/// Get the global tracer provider if initialized
pub fn tracer_provider() -> Option<Arc<TracerProvider>> {
    TRACER_PROVIDER.get().cloned()
}
