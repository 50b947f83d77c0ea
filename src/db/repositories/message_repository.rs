use crate::db::connection::PgStore;
use crate::db::models::Message;
use crate::db::store::{MessageStore, StoreResult};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl MessageStore for PgStore {
    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, club_id, user_id, content, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.club_id)
        .bind(message.user_id)
        .bind(&message.content)
        .bind(message.kind)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_messages(&self, club_id: Uuid) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, club_id, user_id, content, kind, created_at
            FROM messages WHERE club_id = $1 ORDER BY created_at DESC
            "#,
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
