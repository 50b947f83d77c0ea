use crate::db::connection::PgStore;
use crate::db::store::{StoreResult, VoteStore};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl VoteStore for PgStore {
    // The primary key on (option_id, user_id) makes this the single
    // conditional write; two racing submissions cannot both insert.
    async fn insert_vote(
        &self,
        poll_id: Uuid,
        option_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO poll_votes (poll_id, option_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (option_id, user_id) DO NOTHING
            "#,
        )
        .bind(poll_id)
        .bind(option_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
