use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

/// What the catalog service logs and where its spans go
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_level: String,
    pub jaeger_endpoint: Option<String>,
    pub enable_jaeger: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "catalog-service".to_string(),
            log_level: "info".to_string(),
            jaeger_endpoint: None,
            enable_jaeger: false,
        }
    }
}

impl TelemetryConfig {
    pub fn from_app_config(service_name: &str, config: &AppConfig) -> Self {
        Self {
            service_name: service_name.to_string(),
            log_level: config.log_level.clone(),
            jaeger_endpoint: config.jaeger_endpoint.clone(),
            enable_jaeger: config.enable_jaeger,
        }
    }
}

/// Jaeger agent used when tracing is enabled without an explicit endpoint
pub const DEFAULT_JAEGER_AGENT: &str = "localhost:6831";

impl TelemetryConfig {
    pub fn jaeger_agent(&self) -> &str {
        self.jaeger_endpoint.as_deref().unwrap_or(DEFAULT_JAEGER_AGENT)
    }
}

/// Install the global subscriber: env-filtered JSON lines on stdout, plus
/// span export to a Jaeger agent when enabled. Fails if a subscriber is
/// already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .json();

    let jaeger_layer = if config.enable_jaeger {
        let tracer = opentelemetry_jaeger::new_agent_pipeline()
            .with_service_name(&config.service_name)
            .with_endpoint(config.jaeger_agent())
            .install_batch(opentelemetry_sdk::runtime::Tokio)?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(jaeger_layer)
        .try_init()?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        jaeger = config.enable_jaeger,
        "Logging ready"
    );
    Ok(())
}

/// Flush pending spans to the Jaeger agent
pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}
