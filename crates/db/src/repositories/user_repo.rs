//! Repository for the `users` table.

use genera_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, full_name, is_active, created_at, updated_at";

/// The engine only needs to page through active users; `create` exists for
/// seeding.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, full_name, is_active)
             VALUES ($1, $2, COALESCE($3, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// One keyset page of active user IDs strictly greater than `after`,
    /// in ascending order.
    pub async fn active_ids_after(
        pool: &PgPool,
        after: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM users \
             WHERE is_active = true AND ($1::BIGINT IS NULL OR id > $1) \
             ORDER BY id \
             LIMIT $2",
        )
        .bind(after)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
