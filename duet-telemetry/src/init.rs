//! Telemetry initialization

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize console logging. Later calls are no-ops.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
///
/// # Example
/// ```
/// use duet_telemetry::init_telemetry;
/// init_telemetry("duet").expect("Failed to initialize telemetry");
/// ```
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    INIT.call_once(|| {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
            .try_init();

        if installed.is_ok() {
            tracing::info!(service.name = service_name, "Telemetry initialized");
        }
    });

    Ok(())
}

/// Initialize console logging plus OTLP span export.
///
/// # Arguments
/// * `service_name` - Reported as the `service.name` resource attribute
/// * `endpoint` - OTLP collector endpoint (e.g., "http://localhost:4317")
pub fn init_with_otlp(
    service_name: &str,
    endpoint: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use opentelemetry_otlp::WithExportConfig;
    use tracing_opentelemetry::OpenTelemetryLayer;

    let mut result: Result<(), Box<dyn std::error::Error>> = Ok(());

    INIT.call_once(|| {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
            .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                    "service.name",
                    service_name.to_string(),
                )]),
            ))
            .install_batch(opentelemetry_sdk::runtime::Tokio);

        let tracer = match tracer {
            Ok(tracer) => tracer,
            Err(e) => {
                result = Err(Box::new(e));
                return;
            }
        };

        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
            .with(OpenTelemetryLayer::new(tracer))
            .try_init();

        match installed {
            Ok(()) => tracing::info!(
                service.name = service_name,
                otlp.endpoint = endpoint,
                "Telemetry initialized with OpenTelemetry"
            ),
            Err(e) => result = Err(Box::new(e)),
        }
    });

    result
}

/// Flush pending spans. Call before exit when OTLP export is enabled.
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_is_idempotent() {
        assert!(init_telemetry("duet-test").is_ok());
        assert!(init_telemetry("duet-test").is_ok());
    }
}
