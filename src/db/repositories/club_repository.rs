use crate::db::connection::PgStore;
use crate::db::models::{Club, Membership};
use crate::db::store::{ClubStore, StoreResult};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl ClubStore for PgStore {
    async fn insert_club(&self, club: &Club, founder: &Membership) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO clubs (id, name, description, logo, is_public, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(club.id)
        .bind(&club.name)
        .bind(&club.description)
        .bind(club.logo.as_deref())
        .bind(club.is_public)
        .bind(club.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO club_members (club_id, user_id, role, joined_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(founder.club_id)
        .bind(founder.user_id)
        .bind(founder.role)
        .bind(founder.joined_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn get_club(&self, club_id: Uuid) -> StoreResult<Option<Club>> {
        let row = sqlx::query_as::<_, Club>(
            "SELECT id, name, description, logo, is_public, created_at FROM clubs WHERE id = $1",
        )
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_clubs(&self) -> StoreResult<Vec<Club>> {
        let rows = sqlx::query_as::<_, Club>(
            "SELECT id, name, description, logo, is_public, created_at FROM clubs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update_club(&self, club: &Club) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clubs SET name = $2, description = $3, logo = $4, is_public = $5
            WHERE id = $1
            "#,
        )
        .bind(club.id)
        .bind(&club.name)
        .bind(&club.description)
        .bind(club.logo.as_deref())
        .bind(club.is_public)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(e),
        }
    }

    // Dependent rows go through ON DELETE CASCADE.
    async fn delete_club(&self, club_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(club_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
