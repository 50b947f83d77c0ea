use crate::db::connection::PgStore;
use crate::db::models::Event;
use crate::db::store::{EventStore, StoreResult};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, club_id, title, description, start_date, end_date, created_by, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.id)
        .bind(event.club_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.created_by)
        .bind(event.location.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, club_id, title, description, start_date, end_date, created_by, location
            FROM events WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_events(&self, club_id: Uuid) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, club_id, title, description, start_date, end_date, created_by, location
            FROM events WHERE club_id = $1 ORDER BY start_date
            "#,
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn is_attending(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM event_attendees WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn insert_attendee(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO event_attendees (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_attendees(&self, event_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM event_attendees WHERE event_id = $1 ORDER BY joined_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
