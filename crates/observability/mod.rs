mod alerts;
mod config;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use alerts::{AlertLayer, AlertSink};
use config::ObservabilityConfig;

/// Installs the global subscriber. Must run inside a tokio runtime when an
/// alert webhook is configured.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);

    let alert_layer = config.alerts.as_ref().map(|alerts| {
        let sink = AlertSink::spawn(alerts.webhook_url.clone());
        AlertLayer::new(sink, config.service.clone())
            .with_filter(LevelFilter::from_level(alerts.min_level))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Local offset so operators see their own timezone.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    for warning in &config.warnings {
        warn!(
            service = %config.service.name,
            stage = %config.service.stage,
            warning = %warning,
            "observability: config warning"
        );
    }

    info!(
        service = %config.service.name,
        stage = %config.service.stage,
        component = %config.service.component,
        alerts_enabled = config.alerts.is_some(),
        "observability: initialized"
    );

    Ok(())
}
