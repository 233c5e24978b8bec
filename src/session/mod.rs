use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// Reference to the most recent position view sent to a user, used by refresh
/// operations. Expires after 23 hours, mirroring Telegram's edit window.
#[derive(Debug, Clone)]
pub struct LastSwapMessage {
    pub message_id: i32,
    pub expires_at: DateTime<Utc>,
}

impl LastSwapMessage {
    fn new(message_id: i32) -> Self {
        Self {
            message_id,
            expires_at: Utc::now() + Duration::hours(23),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Default)]
struct UserSession {
    last_swap_message: Option<LastSwapMessage>,
    /// Transient message ids to delete before the next position view.
    wait_clean: Vec<i32>,
}

/// Per-user chat state shared by every pipeline worker.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<i64, UserSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_swap_message(&self, chat_id: i64) -> Option<LastSwapMessage> {
        let sessions = self.inner.read().await;
        sessions
            .get(&chat_id)
            .and_then(|s| s.last_swap_message.clone())
            .filter(|m| !m.is_expired())
    }

    /// Records the latest position view and queues it for cleanup the next
    /// time one is sent.
    pub async fn set_last_swap_message(&self, chat_id: i64, message_id: i32) {
        let mut sessions = self.inner.write().await;
        let session = sessions.entry(chat_id).or_default();
        session.last_swap_message = Some(LastSwapMessage::new(message_id));
        session.wait_clean.push(message_id);
    }

    /// Drains the ids of messages waiting to be cleaned up.
    pub async fn take_wait_clean(&self, chat_id: i64) -> Vec<i32> {
        let mut sessions = self.inner.write().await;
        sessions
            .get_mut(&chat_id)
            .map(|s| std::mem::take(&mut s.wait_clean))
            .unwrap_or_default()
    }
}
