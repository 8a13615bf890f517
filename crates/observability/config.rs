use std::env;

use tracing::Level;
use url::Url;

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) name: String,
    pub(crate) stage: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct AlertConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service: ServiceContext,
    pub(crate) alerts: Option<AlertConfig>,
    /// Logged once the subscriber exists.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(component: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let component = component.trim().to_string();

        let service = ServiceContext {
            name: non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            stage: non_empty("STAGE").unwrap_or_else(|| "unknown".to_string()),
            component,
        };

        let mut warnings = Vec::new();
        let alerts = non_empty("ALERT_WEBHOOK_URL").and_then(|raw| match Url::parse(&raw) {
            Ok(webhook_url) => {
                let min_level = match non_empty("ALERT_MIN_LEVEL") {
                    None => Level::ERROR,
                    Some(raw_level) => parse_level(&raw_level).unwrap_or_else(|| {
                        warnings.push(format!(
                            "ALERT_MIN_LEVEL is invalid (value: {raw_level}); defaulting to ERROR"
                        ));
                        Level::ERROR
                    }),
                };
                Some(AlertConfig {
                    webhook_url,
                    min_level,
                })
            }
            Err(err) => {
                // The URL embeds a token, so only the parse error is reported.
                warnings.push(format!(
                    "ALERT_WEBHOOK_URL is set but invalid; alerts disabled (parse error: {err})"
                ));
                None
            }
        });

        Self {
            service,
            alerts,
            warnings,
        }
    }
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
