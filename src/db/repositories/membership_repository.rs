use crate::db::connection::PgStore;
use crate::db::models::Membership;
use crate::db::store::{MembershipStore, StoreResult};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl MembershipStore for PgStore {
    async fn find_membership(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let row = sqlx::query_as::<_, Membership>(
            "SELECT club_id, user_id, role, joined_at FROM club_members WHERE club_id = $1 AND user_id = $2",
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_membership(&self, membership: &Membership) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO club_members (club_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (club_id, user_id) DO NOTHING
            "#,
        )
        .bind(membership.club_id)
        .bind(membership.user_id)
        .bind(membership.role)
        .bind(membership.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_membership(&self, club_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM club_members WHERE club_id = $1 AND user_id = $2")
            .bind(club_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_memberships(&self, club_id: Uuid) -> StoreResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, Membership>(
            "SELECT club_id, user_id, role, joined_at FROM club_members WHERE club_id = $1 ORDER BY joined_at",
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_members(&self, club_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM club_members WHERE club_id = $1")
            .bind(club_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
