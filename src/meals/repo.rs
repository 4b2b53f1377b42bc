use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

/// A logged meal. Append-only: rows are never updated after insert.
///
/// `grams` and `kcal_per_100g` are present together on the log-by-ratio path;
/// `kcal` is derived by the caller before storage and persisted as given.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealRecord {
    pub id: String,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub description: String,
    pub kcal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grams: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kcal_per_100g: Option<f64>,
}

impl MealRecord {
    /// Appends a record stamped with the current UTC time.
    pub async fn insert(
        db: &SqlitePool,
        user_id: &str,
        description: &str,
        kcal: f64,
        grams: Option<f64>,
        kcal_per_100g: Option<f64>,
    ) -> Result<MealRecord, sqlx::Error> {
        Self::insert_at(
            db,
            user_id,
            description,
            kcal,
            grams,
            kcal_per_100g,
            OffsetDateTime::now_utc(),
        )
        .await
    }

    pub async fn insert_at(
        db: &SqlitePool,
        user_id: &str,
        description: &str,
        kcal: f64,
        grams: Option<f64>,
        kcal_per_100g: Option<f64>,
        timestamp: OffsetDateTime,
    ) -> Result<MealRecord, sqlx::Error> {
        let record = MealRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            timestamp,
            description: description.to_string(),
            kcal,
            grams,
            kcal_per_100g,
        };
        sqlx::query(
            r#"
            INSERT INTO meals (id, user_id, timestamp, description, kcal, grams, kcal_per_100g)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(record.timestamp)
        .bind(&record.description)
        .bind(record.kcal)
        .bind(record.grams)
        .bind(record.kcal_per_100g)
        .execute(db)
        .await?;
        Ok(record)
    }

    /// Meals for one UTC calendar day, ascending by timestamp.
    ///
    /// The range is half-open, `[start_of_day, start_of_next_day)`, so
    /// sub-second timestamps just before midnight land on the earlier day.
    ///
    /// Timestamps are stored as RFC 3339 text in which the subsecond field is
    /// omitted when zero, so raw string comparison would misorder values of
    /// different widths (`'.'` sorts before `'Z'`). `julianday()` normalizes
    /// both the column and the bounds to a numeric instant before comparing.
    pub async fn list_for_day(
        db: &SqlitePool,
        user_id: &str,
        date: Date,
    ) -> Result<Vec<MealRecord>, sqlx::Error> {
        let start = date.midnight().assume_utc();
        let end = (date.midnight() + Duration::days(1)).assume_utc();
        sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, timestamp, description, kcal, grams, kcal_per_100g
            FROM meals
            WHERE user_id = ?1
              AND julianday(timestamp) >= julianday(?2)
              AND julianday(timestamp) < julianday(?3)
            ORDER BY julianday(timestamp) ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_pool;
    use time::macros::{date, datetime};

    async fn seed_user(db: &SqlitePool, user_id: &str) {
        sqlx::query(
            r#"
            INSERT INTO profiles
                (user_id, age, sex, height_cm, weight_kg, activity_level,
                 goal_weight_kg, goal_rate_kg_per_week, created_at)
            VALUES (?1, 25, 'male', 175.0, 70.0, 'moderate', 75.0, 0.25, ?2)
            "#,
        )
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn daily_list_is_sorted_ascending() {
        let db = test_pool().await;
        seed_user(&db, "u1").await;

        let day = date!(2026 - 03 - 14);
        for ts in [
            datetime!(2026-03-14 19:30:00 UTC),
            datetime!(2026-03-14 07:15:00 UTC),
            datetime!(2026-03-14 12:00:00 UTC),
        ] {
            MealRecord::insert_at(&db, "u1", "meal", 300.0, None, None, ts)
                .await
                .unwrap();
        }

        let meals = MealRecord::list_for_day(&db, "u1", day).await.unwrap();
        let hours: Vec<_> = meals.iter().map(|m| m.timestamp.hour()).collect();
        assert_eq!(hours, vec![7, 12, 19]);
    }

    #[tokio::test]
    async fn day_boundaries_are_half_open() {
        let db = test_pool().await;
        seed_user(&db, "u1").await;

        // sub-second timestamp just before midnight
        MealRecord::insert_at(
            &db,
            "u1",
            "late snack",
            120.0,
            None,
            None,
            datetime!(2026-03-14 23:59:59.5 UTC),
        )
        .await
        .unwrap();
        // exactly midnight belongs to the next day
        MealRecord::insert_at(
            &db,
            "u1",
            "midnight snack",
            80.0,
            None,
            None,
            datetime!(2026-03-15 00:00:00 UTC),
        )
        .await
        .unwrap();

        let day_one = MealRecord::list_for_day(&db, "u1", date!(2026 - 03 - 14))
            .await
            .unwrap();
        assert_eq!(day_one.len(), 1);
        assert_eq!(day_one[0].description, "late snack");

        let day_two = MealRecord::list_for_day(&db, "u1", date!(2026 - 03 - 15))
            .await
            .unwrap();
        assert_eq!(day_two.len(), 1);
        assert_eq!(day_two[0].description, "midnight snack");
    }

    #[tokio::test]
    async fn fractional_timestamps_just_after_midnight_stay_on_their_day() {
        let db = test_pool().await;
        seed_user(&db, "u1").await;

        // stored text carries a subsecond field the midnight bound lacks;
        // a raw string comparison would misfile this on the previous day
        MealRecord::insert_at(
            &db,
            "u1",
            "early breakfast",
            90.0,
            None,
            None,
            datetime!(2026-03-15 00:00:00.3 UTC),
        )
        .await
        .unwrap();

        let day_fifteen = MealRecord::list_for_day(&db, "u1", date!(2026 - 03 - 15))
            .await
            .unwrap();
        assert_eq!(day_fifteen.len(), 1);
        assert_eq!(day_fifteen[0].description, "early breakfast");

        let day_fourteen = MealRecord::list_for_day(&db, "u1", date!(2026 - 03 - 14))
            .await
            .unwrap();
        assert!(day_fourteen.is_empty());
    }

    #[tokio::test]
    async fn empty_day_is_an_empty_vec() {
        let db = test_pool().await;
        seed_user(&db, "u1").await;
        let meals = MealRecord::list_for_day(&db, "u1", date!(2026 - 03 - 14))
            .await
            .unwrap();
        assert!(meals.is_empty());
    }

    #[tokio::test]
    async fn meals_are_scoped_per_user() {
        let db = test_pool().await;
        seed_user(&db, "u1").await;
        seed_user(&db, "u2").await;

        let ts = datetime!(2026-03-14 12:00:00 UTC);
        MealRecord::insert_at(&db, "u1", "lunch", 500.0, None, None, ts)
            .await
            .unwrap();
        MealRecord::insert_at(&db, "u2", "lunch", 650.0, None, None, ts)
            .await
            .unwrap();

        let meals = MealRecord::list_for_day(&db, "u1", date!(2026 - 03 - 14))
            .await
            .unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].kcal, 500.0);
    }

    #[tokio::test]
    async fn ratio_fields_round_trip() {
        let db = test_pool().await;
        seed_user(&db, "u1").await;

        MealRecord::insert(&db, "u1", "rice", 195.0, Some(150.0), Some(130.0))
            .await
            .unwrap();

        let today = OffsetDateTime::now_utc().date();
        let meals = MealRecord::list_for_day(&db, "u1", today).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].grams, Some(150.0));
        assert_eq!(meals[0].kcal_per_100g, Some(130.0));
        assert_eq!(meals[0].kcal, 195.0);
    }
}
