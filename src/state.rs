use std::collections::HashMap;

use chrono::{DateTime, Utc};
use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::payload::WebAppPayload;

/// Last payload a chat submitted from the Mini App.
#[derive(Debug, Clone)]
pub struct Received {
    pub payload: WebAppPayload,
    pub received_at: DateTime<Utc>,
}

/// In-memory record of the most recent payload per chat. Lost on restart.
#[derive(Debug, Default)]
pub struct RecentData {
    entries: Mutex<HashMap<ChatId, Received>>,
}

impl RecentData {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, chat_id: ChatId, payload: WebAppPayload) {
        self.record_at(chat_id, payload, Utc::now()).await;
    }

    pub async fn record_at(&self, chat_id: ChatId, payload: WebAppPayload, at: DateTime<Utc>) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            chat_id,
            Received {
                payload,
                received_at: at,
            },
        );
    }

    pub async fn latest(&self, chat_id: ChatId) -> Option<Received> {
        self.entries.lock().await.get(&chat_id).cloned()
    }
}
