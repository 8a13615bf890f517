use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use super::config::ServiceContext;

const QUEUE_CAPACITY: usize = 256;
const MESSAGE_LIMIT: usize = 2000;

#[derive(Clone, Debug)]
pub(crate) struct Alert {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) service: ServiceContext,
    pub(crate) target: String,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
}

impl Alert {
    pub(crate) fn render(&self) -> String {
        let mut lines = vec![format!(
            "**{}** `{}` `{}` `{}`",
            self.service.name,
            self.service.stage,
            self.service.component,
            self.level.as_str()
        )];
        lines.push(format!(
            "`{}` `{}`",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.target
        ));
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            lines.push(format!("> {}", message.trim()));
        }
        for (key, value) in &self.fields {
            lines.push(format!("- `{key}` = `{value}`"));
        }
        truncate(lines.join("\n"), MESSAGE_LIMIT)
    }
}

/// Posts alerts to a chat webhook from a background task. Sending never
/// blocks the logging call site; a full queue drops the alert.
#[derive(Clone)]
pub(crate) struct AlertSink {
    tx: mpsc::Sender<Alert>,
}

impl AlertSink {
    pub(crate) fn spawn(webhook_url: url::Url) -> Self {
        let (tx, mut rx) = mpsc::channel::<Alert>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            let client = match reqwest::Client::builder()
                .timeout(Duration::from_secs(3))
                .build()
            {
                Ok(client) => client,
                Err(_) => return,
            };

            while let Some(alert) = rx.recv().await {
                let content = alert.render();
                let result = client
                    .post(webhook_url.clone())
                    .json(&json!({ "content": content, "text": content }))
                    .send()
                    .await;

                // Errors are printed, not traced, so a failing webhook cannot
                // feed alerts back into itself.
                match result {
                    Ok(resp) if resp.status().is_success() => {}
                    Ok(resp) => eprintln!("alert webhook returned status {}", resp.status()),
                    Err(err) if err.is_timeout() => eprintln!("alert webhook timed out"),
                    Err(_) => eprintln!("alert webhook request failed"),
                }
            }
        });

        Self { tx }
    }

    #[cfg(test)]
    pub(crate) fn from_sender(tx: mpsc::Sender<Alert>) -> Self {
        Self { tx }
    }

    fn try_send(&self, alert: Alert) {
        if self.tx.try_send(alert).is_err() {
            eprintln!("alert queue full or closed; dropping alert");
        }
    }
}

pub(crate) struct AlertLayer {
    sink: AlertSink,
    service: ServiceContext,
}

impl AlertLayer {
    pub(crate) fn new(sink: AlertSink, service: ServiceContext) -> Self {
        Self { sink, service }
    }
}

#[derive(Default)]
struct FieldCollector {
    values: BTreeMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        self.values
            .insert(field.name().to_string(), redact(field.name(), value));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }
}

impl<S: Subscriber> Layer<S> for AlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let message = collector.values.remove("message");

        self.sink.try_send(Alert {
            level: *event.metadata().level(),
            timestamp: Utc::now(),
            service: self.service.clone(),
            target: event.metadata().target().to_string(),
            message,
            fields: collector.values,
        });
    }
}

fn redact(field_name: &str, value: String) -> String {
    let field = field_name.to_ascii_lowercase();
    let sensitive = ["webhook", "secret", "password", "token", "authorization", "api_key"]
        .iter()
        .any(|needle| field.contains(needle));
    if sensitive { "[REDACTED]".to_string() } else { value }
}

fn truncate(content: String, limit: usize) -> String {
    const SUFFIX: &str = "\n… (truncated)";
    if content.chars().count() <= limit {
        return content;
    }
    let keep = limit.saturating_sub(SUFFIX.chars().count());
    let mut out: String = content.chars().take(keep).collect();
    out.push_str(SUFFIX);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn service() -> ServiceContext {
        ServiceContext {
            name: "jobtrail".into(),
            stage: "test".into(),
            component: "backend".into(),
        }
    }

    #[test]
    fn layer_captures_fields_and_redacts_secrets() {
        let (tx, mut rx) = mpsc::channel(8);
        let layer = AlertLayer::new(AlertSink::from_sender(tx), service());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(user_id = "u1", api_key = "sk-live", "stripe: sync failed");
        });

        let alert = rx.try_recv().unwrap();
        assert_eq!(alert.level, Level::ERROR);
        assert_eq!(alert.message.as_deref(), Some("stripe: sync failed"));
        assert_eq!(alert.fields["user_id"], "u1");
        assert_eq!(alert.fields["api_key"], "[REDACTED]");
    }

    #[test]
    fn render_is_bounded() {
        let alert = Alert {
            level: Level::ERROR,
            timestamp: Utc::now(),
            service: service(),
            target: "backend".into(),
            message: Some("x".repeat(5000)),
            fields: BTreeMap::new(),
        };
        let rendered = alert.render();
        assert!(rendered.chars().count() <= MESSAGE_LIMIT);
        assert!(rendered.ends_with("(truncated)"));
    }
}
