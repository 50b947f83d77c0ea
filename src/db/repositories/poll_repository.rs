use crate::db::connection::PgStore;
use crate::db::models::{Poll, PollOption};
use crate::db::store::{PollStore, StoreResult};
use async_trait::async_trait;
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait]
impl PollStore for PgStore {
    async fn insert_poll(&self, poll: &Poll, options: &[PollOption]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO polls (id, club_id, question, created_by, created_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(poll.id)
        .bind(poll.club_id)
        .bind(&poll.question)
        .bind(poll.created_by)
        .bind(poll.created_at)
        .bind(poll.ends_at)
        .execute(&mut *tx)
        .await?;

        for option in options {
            sqlx::query("INSERT INTO poll_options (id, poll_id, option_text) VALUES ($1, $2, $3)")
                .bind(option.id)
                .bind(option.poll_id)
                .bind(&option.text)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_poll(&self, poll_id: Uuid) -> StoreResult<Option<Poll>> {
        let row = sqlx::query_as::<_, Poll>(
            "SELECT id, club_id, question, created_by, created_at, ends_at FROM polls WHERE id = $1",
        )
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_polls(&self, club_id: Uuid) -> StoreResult<Vec<Poll>> {
        let rows = sqlx::query_as::<_, Poll>(
            r#"
            SELECT id, club_id, question, created_by, created_at, ends_at
            FROM polls WHERE club_id = $1 ORDER BY created_at DESC
            "#,
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_option(&self, option: &PollOption) -> StoreResult<()> {
        sqlx::query("INSERT INTO poll_options (id, poll_id, option_text) VALUES ($1, $2, $3)")
            .bind(option.id)
            .bind(option.poll_id)
            .bind(&option.text)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_option(&self, option_id: Uuid) -> StoreResult<Option<PollOption>> {
        let Some(row) =
            sqlx::query("SELECT id, poll_id, option_text FROM poll_options WHERE id = $1")
                .bind(option_id)
                .fetch_optional(&self.pool)
                .await?
        else {
            return Ok(None);
        };

        let voters = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM poll_votes WHERE option_id = $1 ORDER BY created_at",
        )
        .bind(option_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PollOption {
            id: row.try_get("id")?,
            poll_id: row.try_get("poll_id")?,
            text: row.try_get("option_text")?,
            voters,
        }))
    }

    async fn list_options(&self, poll_id: Uuid) -> StoreResult<Vec<PollOption>> {
        let rows = sqlx::query(
            "SELECT id, poll_id, option_text FROM poll_options WHERE poll_id = $1 ORDER BY seq",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        let votes = sqlx::query(
            "SELECT option_id, user_id FROM poll_votes WHERE poll_id = $1 ORDER BY created_at",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        let mut voters: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for vote in votes {
            voters
                .entry(vote.try_get("option_id")?)
                .or_default()
                .push(vote.try_get("user_id")?);
        }

        rows.into_iter()
            .map(|r| -> StoreResult<PollOption> {
                let id: Uuid = r.try_get("id")?;
                Ok(PollOption {
                    id,
                    poll_id: r.try_get("poll_id")?,
                    text: r.try_get("option_text")?,
                    voters: voters.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn update_poll(&self, poll: &Poll) -> StoreResult<()> {
        sqlx::query("UPDATE polls SET question = $2, ends_at = $3 WHERE id = $1")
            .bind(poll.id)
            .bind(&poll.question)
            .bind(poll.ends_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_poll(&self, poll_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM polls WHERE id = $1")
            .bind(poll_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
