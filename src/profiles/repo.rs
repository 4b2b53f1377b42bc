use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use super::dto::RegisterProfileRequest;

/// Stored user profile. The sole source of truth for derived calorie targets;
/// upserts replace the row in full.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub age: i64,
    pub sex: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: String,
    pub goal_weight_kg: f64,
    pub goal_rate_kg_per_week: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl UserProfile {
    /// Full-replace upsert keyed by user_id.
    pub async fn upsert(
        db: &SqlitePool,
        req: &RegisterProfileRequest,
    ) -> Result<UserProfile, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO profiles
                (user_id, name, age, sex, height_cm, weight_kg, activity_level,
                 goal_weight_kg, goal_rate_kg_per_week, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                age = excluded.age,
                sex = excluded.sex,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                activity_level = excluded.activity_level,
                goal_weight_kg = excluded.goal_weight_kg,
                goal_rate_kg_per_week = excluded.goal_rate_kg_per_week,
                created_at = excluded.created_at
            RETURNING user_id, name, age, sex, height_cm, weight_kg, activity_level,
                      goal_weight_kg, goal_rate_kg_per_week, created_at
            "#,
        )
        .bind(&req.user_id)
        .bind(&req.name)
        .bind(req.age)
        .bind(&req.sex)
        .bind(req.height_cm)
        .bind(req.weight_kg)
        .bind(&req.activity_level)
        .bind(req.goal_weight_kg)
        .bind(req.goal_rate_kg_per_week)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
    }

    pub async fn find(db: &SqlitePool, user_id: &str) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, name, age, sex, height_cm, weight_kg, activity_level,
                   goal_weight_kg, goal_rate_kg_per_week, created_at
            FROM profiles
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_pool;

    fn request(user_id: &str, weight_kg: f64) -> RegisterProfileRequest {
        RegisterProfileRequest {
            user_id: user_id.to_string(),
            name: Some("Test".to_string()),
            age: 25,
            sex: "male".to_string(),
            height_cm: 175.0,
            weight_kg,
            activity_level: "moderate".to_string(),
            goal_weight_kg: 75.0,
            goal_rate_kg_per_week: 0.25,
        }
    }

    #[tokio::test]
    async fn upsert_then_find() {
        let db = test_pool().await;
        let stored = UserProfile::upsert(&db, &request("u1", 70.0)).await.unwrap();
        assert_eq!(stored.user_id, "u1");
        assert_eq!(stored.weight_kg, 70.0);

        let found = UserProfile::find(&db, "u1").await.unwrap().expect("exists");
        assert_eq!(found.age, 25);
        assert_eq!(found.activity_level, "moderate");
    }

    #[tokio::test]
    async fn find_unknown_user_is_none() {
        let db = test_pool().await;
        assert!(UserProfile::find(&db, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let db = test_pool().await;
        let req = request("u1", 70.0);
        let first = UserProfile::upsert(&db, &req).await.unwrap();
        let second = UserProfile::upsert(&db, &req).await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.weight_kg, second.weight_kg);
        assert_eq!(first.goal_rate_kg_per_week, second.goal_rate_kg_per_week);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn upsert_replaces_the_row_in_full() {
        let db = test_pool().await;
        UserProfile::upsert(&db, &request("u1", 70.0)).await.unwrap();

        let mut updated = request("u1", 72.5);
        updated.name = None;
        updated.activity_level = "active".to_string();
        UserProfile::upsert(&db, &updated).await.unwrap();

        let found = UserProfile::find(&db, "u1").await.unwrap().unwrap();
        assert_eq!(found.weight_kg, 72.5);
        assert_eq!(found.activity_level, "active");
        // a full replace clears fields omitted from the new payload
        assert_eq!(found.name, None);
    }
}
