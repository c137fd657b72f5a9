// Allow dead code: Notification surface exercised by the worker and its tests
#![allow(dead_code)]

//! Push notification payloads and click handling.

use serde::{Deserialize, Serialize};

/// Incoming push payload. Every field is optional; missing fields fall
/// back to the defaults in [`Notification::from_payload`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "primaryKey")]
    pub primary_key: Option<u64>,
}

/// Default notification title.
const DEFAULT_TITLE: &str = "Glasgow Scale";
/// Default notification body.
const DEFAULT_BODY: &str = "Nueva notificación de Glasgow Scale";
/// Default primary key when the payload carries none.
const DEFAULT_PRIMARY_KEY: u64 = 1;

const ICON: &str = "/icon-192x192.png";
const BADGE: &str = "/icon-72x72.png";

/// Identifier of a notification action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickAction {
    /// Open or focus the application window.
    Explore,
    /// Dismiss the notification.
    Close,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationAction {
    pub action: ClickAction,
    pub title: String,
    pub icon: String,
}

/// A user-visible notification built from a push payload.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub primary_key: u64,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build a notification, tolerating missing payload fields.
    pub fn from_payload(payload: PushPayload) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: ICON.to_string(),
            badge: BADGE.to_string(),
            primary_key: payload.primary_key.unwrap_or(DEFAULT_PRIMARY_KEY),
            actions: vec![
                NotificationAction {
                    action: ClickAction::Explore,
                    title: "Abrir aplicación".to_string(),
                    icon: BADGE.to_string(),
                },
                NotificationAction {
                    action: ClickAction::Close,
                    title: "Cerrar".to_string(),
                    icon: BADGE.to_string(),
                },
            ],
        }
    }

    /// Parse a push payload from raw JSON and build the notification.
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        let payload: PushPayload = serde_json::from_slice(data)?;
        Ok(Self::from_payload(payload))
    }
}

/// An open application window known to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWindow {
    pub id: u64,
    pub url: String,
}

/// What a notification click should do with the application window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowAction {
    /// Focus an already-open window.
    Focus(u64),
    /// Open a new window at the given path.
    Open(String),
}

/// Decide the window action for a notification click. The open-app action
/// focuses an existing root window when one exists, otherwise opens a new
/// one; dismiss does nothing.
pub fn on_notification_click(action: ClickAction, clients: &[ClientWindow]) -> Option<WindowAction> {
    match action {
        ClickAction::Close => None,
        ClickAction::Explore => {
            if let Some(client) = clients.iter().find(|c| c.url == "/") {
                Some(WindowAction::Focus(client.id))
            } else {
                Some(WindowAction::Open("/".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_payload() {
        let n = Notification::from_json(b"{}").unwrap();
        assert_eq!(n.title, DEFAULT_TITLE);
        assert_eq!(n.body, DEFAULT_BODY);
        assert_eq!(n.primary_key, DEFAULT_PRIMARY_KEY);
        assert_eq!(n.actions.len(), 2);
    }

    #[test]
    fn test_payload_fields_override_defaults() {
        let n =
            Notification::from_json(r#"{"title":"Aviso","body":"Revisión","primaryKey":7}"#.as_bytes())
                .unwrap();
        assert_eq!(n.title, "Aviso");
        assert_eq!(n.body, "Revisión");
        assert_eq!(n.primary_key, 7);
    }

    #[test]
    fn test_click_focuses_existing_root_window() {
        let clients = vec![
            ClientWindow { id: 1, url: "/history".to_string() },
            ClientWindow { id: 2, url: "/".to_string() },
        ];
        assert_eq!(
            on_notification_click(ClickAction::Explore, &clients),
            Some(WindowAction::Focus(2))
        );
    }

    #[test]
    fn test_click_opens_window_when_none_open() {
        assert_eq!(
            on_notification_click(ClickAction::Explore, &[]),
            Some(WindowAction::Open("/".to_string()))
        );
    }

    #[test]
    fn test_close_does_nothing() {
        assert_eq!(on_notification_click(ClickAction::Close, &[]), None);
    }
}
