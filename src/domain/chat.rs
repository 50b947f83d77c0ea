use crate::db::models::{Message, MessageKind};
use crate::db::store::Store;
use crate::error::ClubError;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// In-club chat messages.
#[derive(Clone)]
pub struct ClubChat {
    store: Arc<dyn Store>,
}

impl ClubChat {
    pub fn new(store: Arc<dyn Store>) -> Self {
        ClubChat { store }
    }

    async fn require_club(&self, club_id: Uuid) -> Result<(), ClubError> {
        self.store
            .get_club(club_id)
            .await?
            .map(|_| ())
            .ok_or(ClubError::NotFound("Club"))
    }

    pub async fn post(
        &self,
        club_id: Uuid,
        user_id: Uuid,
        content: String,
        kind: MessageKind,
    ) -> Result<Message, ClubError> {
        if content.trim().is_empty() {
            return Err(ClubError::invalid("content must not be empty"));
        }
        self.require_club(club_id).await?;

        let message = Message {
            id: Uuid::new_v4(),
            club_id,
            user_id,
            content,
            kind,
            timestamp: Utc::now(),
        };
        self.store.insert_message(&message).await?;

        debug!(club_id = %club_id, message_id = %message.id, "message posted");
        Ok(message)
    }

    /// Newest message first.
    pub async fn history(&self, club_id: Uuid) -> Result<Vec<Message>, ClubError> {
        self.require_club(club_id).await?;
        Ok(self.store.list_messages(club_id).await?)
    }
}
