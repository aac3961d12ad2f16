//! Logging and tracing setup
//!
//! The message model itself only emits `tracing` events (linking, decode
//! failures, fingerprints). Nothing is printed unless the host application
//! installs a subscriber. [`init_observability`] installs one:
//!
//! - an `EnvFilter` taken from `RUST_LOG`, falling back to the configured level
//! - a formatting layer, JSON or human readable
//! - an OpenTelemetry layer exporting spans over OTLP/gRPC when traces are enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use rpc_common_core::observability::{init_observability, shutdown_observability, ObservabilityConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("billing-gateway")
//!         .with_endpoint("http://collector:4317")
//!         .with_log_level("rpc_common_core=debug,info");
//!
//!     init_observability(config).expect("observability init");
//!     // ...
//!     shutdown_observability();
//! }
//! ```
//!
//! Span export uses the tokio runtime, so enable traces only inside one.

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Boxed error returned by the setup functions
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_ENDPOINT: &str = "http://localhost:4317";

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name reported on exported spans
    pub service_name: String,
    /// Service version reported on exported spans
    pub service_version: String,
    /// OTLP collector endpoint (gRPC)
    pub otlp_endpoint: String,
    /// Export spans over OTLP
    pub enable_traces: bool,
    /// Emit log lines as JSON instead of human readable text
    pub json_logs: bool,
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    /// Reads `OTEL_EXPORTER_OTLP_ENDPOINT` and `RUST_LOG`; traces are off.
    fn default() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            enable_traces: false,
            json_logs: false,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Default configuration for the named service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the fallback filter directive
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Switch between JSON and human readable log lines
    pub fn with_json_logs(mut self, enable: bool) -> Self {
        self.json_logs = enable;
        self
    }

    fn filter(&self) -> Result<EnvFilter, InitError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(&self.log_level)?),
        }
    }
}

/// Install the global subscriber (and tracer provider when traces are on)
///
/// # Errors
///
/// Fails when the filter directive is invalid, the exporter cannot be built,
/// or a global subscriber or tracer provider is already installed.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), InitError> {
    let filter = config.filter()?;
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));
    let json_layer = config.json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });
    let text_layer = (!config.json_logs).then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}

fn init_tracer(config: &ObservabilityConfig) -> Result<opentelemetry_sdk::trace::Tracer, InitError> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};
    use opentelemetry_sdk::Resource;

    let resource = Resource::builder_empty()
        .with_attributes(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                config.service_name.clone(),
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                config.service_version.clone(),
            ),
        ])
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    let tracer = provider.tracer(config.service_name.clone());
    install_provider(provider)?;

    Ok(tracer)
}

fn install_provider(provider: SdkTracerProvider) -> Result<(), InitError> {
    if TRACER_PROVIDER.set(provider.clone()).is_err() {
        return Err("tracer provider already installed".into());
    }
    global::set_tracer_provider(provider);
    Ok(())
}

/// Flush and shut down the tracer provider installed by [`init_observability`]
///
/// Spans still queued in the batch exporter are exported before this
/// returns. Does nothing when traces were never enabled.
pub fn shutdown_observability() {
    tracing::info!("Shutting down observability");

    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::error!("Error shutting down tracer provider: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "rpc-common-core");
        assert!(!config.enable_traces);
        assert!(!config.json_logs);
        assert!(!config.otlp_endpoint.is_empty());
    }

    #[test]
    fn test_builder_chaining() {
        let config = ObservabilityConfig::new("gateway")
            .with_version("2.1.0")
            .with_endpoint("http://collector:4317")
            .with_log_level("debug")
            .with_traces(true)
            .with_json_logs(true);

        assert_eq!(config.service_name, "gateway");
        assert_eq!(config.service_version, "2.1.0");
        assert_eq!(config.otlp_endpoint, "http://collector:4317");
        assert_eq!(config.log_level, "debug");
        assert!(config.enable_traces);
        assert!(config.json_logs);
    }

    #[test]
    fn test_filter_directives() {
        for level in ["trace", "info", "rpc_common_core=debug,warn"] {
            let config = ObservabilityConfig::new("svc").with_log_level(level);
            assert!(config.filter().is_ok());
        }
    }

    #[test]
    fn test_shutdown_without_init() {
        shutdown_observability();
        shutdown_observability();
    }

    #[test]
    fn test_shutdown_reaches_installed_provider() {
        install_provider(SdkTracerProvider::builder().build()).unwrap();
        assert!(install_provider(SdkTracerProvider::builder().build()).is_err());

        shutdown_observability();

        // already shut down by the call above
        assert!(TRACER_PROVIDER.get().unwrap().shutdown().is_err());
    }
}
