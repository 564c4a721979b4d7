//! Typed endpoint wrappers
//!
//! Thin, typed calls for the endpoint families page-level code polls
//! constantly: notifications, unread message count, and the site name.
//! Everything goes through [`ApiClient::call`], so these inherit the full
//! auth behavior (bearer attach, silent refresh) without any of their own.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

/// A notification as the backend serializes it.
///
/// Only the fields the client reads are typed; the rest (receiver number,
/// creation date) ride along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Fetch the logged-in user's notifications, newest first.
pub async fn fetch_notifications(client: &ApiClient) -> Result<Vec<Notification>> {
    client.get("/notifications").await?.json()
}

/// Number of unread notifications. The body is a bare JSON number.
pub async fn unread_notification_count(client: &ApiClient) -> Result<u64> {
    client.get("/notifications/unread-count").await?.json()
}

/// Mark one notification as read. The server answers 204.
pub async fn mark_notification_read(client: &ApiClient, id: u64) -> Result<()> {
    client
        .call(
            reqwest::Method::POST,
            &format!("/notifications/{id}/read"),
            None,
            None,
        )
        .await?;
    Ok(())
}

/// Mark every notification as read.
pub async fn mark_all_notifications_read(client: &ApiClient) -> Result<()> {
    client
        .call(reqwest::Method::POST, "/notifications/read-all", None, None)
        .await?;
    Ok(())
}

/// Number of unread direct messages.
pub async fn unread_message_count(client: &ApiClient) -> Result<u64> {
    client.get("/message/unread-count").await?.json()
}

/// The configured site name. Public read; the body is plain text.
pub async fn site_name(client: &ApiClient) -> Result<String> {
    Ok(client.get("/site/name").await?.text())
}

/// Rename the site. Admin only server-side.
pub async fn update_site_name(client: &ApiClient, name: &str) -> Result<()> {
    client
        .put_json("/site/name", &serde_json::json!({ "siteName": name }))
        .await?;
    Ok(())
}
