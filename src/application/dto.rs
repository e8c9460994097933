use serde::{Deserialize, Serialize};

use crate::application::services::MonitorReport;
use crate::domain::monitor::{MonitorState, MonitorStatsSnapshot};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartMonitoringRequest {
    #[serde(default)]
    pub camera_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub camera_url: Option<String>,
    pub state: MonitorState,
    pub stats: MonitorStatsSnapshot,
}

impl From<MonitorReport> for StatusResponse {
    fn from(r: MonitorReport) -> Self {
        Self {
            camera_url: r.camera_url.map(|u| u.as_str().to_string()),
            state: r.state,
            stats: r.stats,
        }
    }
}

/// Cuerpo que recibe el backend de la granja por cada alerta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub body: String,
    pub user_id: i64,
    pub barn_id: i64,
    pub is_read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_payload_uses_backend_field_names() {
        let payload = NotificationPayload {
            body: "hola".into(),
            user_id: 24,
            barn_id: 3,
            is_read: false,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "body": "hola", "userId": 24, "barnId": 3, "isRead": false })
        );
    }

    #[test]
    fn missing_camera_url_deserializes_as_none() {
        let req: StartMonitoringRequest = serde_json::from_str("{}").unwrap();
        assert!(req.camera_url.is_none());
    }
}
