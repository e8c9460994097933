use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::application::dto::NotificationPayload;
use crate::application::ports::NotifierPort;
use crate::domain::errors::DomainResult;
use crate::domain::monitor::DeliveryReceipt;

/// Envía las alertas al backend de la granja. Cada envío se lanza en el
/// runtime de Tokio y nunca bloquea al hilo de monitorización.
pub struct BackendNotifier {
    client: reqwest::Client,
    endpoint: String,
    user_id: i64,
    barn_id: i64,
    tokio_handle: Handle,
}

impl BackendNotifier {
    pub fn new(endpoint: String, user_id: i64, barn_id: i64, timeout_secs: u64, handle: Handle) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint,
            user_id,
            barn_id,
            tokio_handle: handle,
        }
    }

    fn payload(&self, message: &str) -> NotificationPayload {
        NotificationPayload {
            body: message.to_string(),
            user_id: self.user_id,
            barn_id: self.barn_id,
            is_read: false,
        }
    }
}

impl NotifierPort for BackendNotifier {
    fn notify(&self, message: &str, receipt: DeliveryReceipt) -> DomainResult<()> {
        let client = self.client.clone();
        let url = self.endpoint.clone();
        let body = self.payload(message);

        self.tokio_handle.spawn(async move {
            match client.post(&url).json(&body).send().await {
                Ok(res) => {
                    let status = res.status();
                    let text = res.text().await.unwrap_or_default();
                    if status.is_success() {
                        info!("✅ Notificación enviada: {} {}", status, text);
                        receipt.delivered();
                    } else {
                        warn!("⚠️ El backend rechazó la notificación: {} {}", status, text);
                        receipt.failed();
                    }
                }
                Err(e) => {
                    error!("❌ Error de notificación: {}", e);
                    receipt.failed();
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

    use crate::domain::monitor::{MonitorStatsSnapshot, MonitorStatus};

    type Received = Arc<Mutex<Vec<NotificationPayload>>>;

    async fn capture(State(received): State<Received>, Json(body): Json<NotificationPayload>) -> StatusCode {
        received.lock().unwrap().push(body);
        StatusCode::OK
    }

    async fn settled(status: &MonitorStatus) -> MonitorStatsSnapshot {
        for _ in 0..150 {
            let stats = status.stats.snapshot();
            if stats.alerts_delivered + stats.dispatch_failures > 0 {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        status.stats.snapshot()
    }

    #[tokio::test]
    async fn posts_the_backend_payload_and_confirms_delivery() {
        let received: Received = Arc::default();
        let app = Router::new()
            .route("/api/Notifiactions/CreateNotification", post(capture))
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let notifier = BackendNotifier::new(
            format!("http://{addr}/api/Notifiactions/CreateNotification"),
            24,
            3,
            5,
            Handle::current(),
        );
        let status = Arc::new(MonitorStatus::default());
        notifier.notify("🚨 dead", DeliveryReceipt::new(status.clone())).unwrap();

        let stats = settled(&status).await;
        assert_eq!(stats.alerts_delivered, 1);
        assert_eq!(stats.dispatch_failures, 0);
        let received = received.lock().unwrap();
        assert_eq!(
            received.as_slice(),
            &[NotificationPayload { body: "🚨 dead".into(), user_id: 24, barn_id: 3, is_read: false }]
        );
    }

    #[tokio::test]
    async fn rejected_notification_counts_as_a_failure() {
        let app = Router::new().route("/notify", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let notifier = BackendNotifier::new(format!("http://{addr}/notify"), 1, 1, 5, Handle::current());
        let status = Arc::new(MonitorStatus::default());
        notifier.notify("hola", DeliveryReceipt::new(status.clone())).unwrap();

        let stats = settled(&status).await;
        assert_eq!(stats.dispatch_failures, 1);
        assert_eq!(stats.alerts_delivered, 0);
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_later_not_to_the_caller() {
        let notifier = BackendNotifier::new("http://127.0.0.1:9/unreachable".into(), 1, 1, 1, Handle::current());
        let status = Arc::new(MonitorStatus::default());
        assert!(notifier.notify("hola", DeliveryReceipt::new(status.clone())).is_ok());

        let stats = settled(&status).await;
        assert_eq!(stats.dispatch_failures, 1);
        assert_eq!(stats.alerts_delivered, 0);
    }
}
