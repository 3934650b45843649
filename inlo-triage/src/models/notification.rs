//! Notification payload sent for severe cases

use serde::{Deserialize, Serialize};

/// Message handed to the notification sink
///
/// Serializes to the webhook's expected `{to, cc, subject, body}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}
