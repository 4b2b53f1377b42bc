use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use time::macros::format_description;
use time::Date;
use tracing::instrument;

use crate::error::ApiError;
use crate::profiles::repo::UserProfile;
use crate::state::AppState;

use super::dto::{
    DailySummaryQuery, DailySummaryResponse, LogByNameRequest, LogExactMealRequest,
    MealLoggedResponse,
};
use super::repo::MealRecord;

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/meals/daily", get(daily_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/exact", post(log_exact_meal))
        .route("/meals/by-name", post(log_meal_by_name))
}

/// kcal derivation for the log-by-ratio path. This is the only place it is
/// computed; storage persists the result as given.
fn kcal_from_ratio(grams: f64, kcal_per_100g: f64) -> f64 {
    kcal_per_100g * grams / 100.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn validate_ratio(grams: f64, kcal_per_100g: f64) -> Result<(), ApiError> {
    if !grams.is_finite() || grams <= 0.0 {
        return Err(ApiError::InvalidInput("grams must be positive".into()));
    }
    if !kcal_per_100g.is_finite() || kcal_per_100g <= 0.0 {
        return Err(ApiError::InvalidInput("kcal_per_100g must be positive".into()));
    }
    Ok(())
}

async fn require_profile(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    UserProfile::find(&state.db, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("user '{user_id}'")))
}

#[instrument(skip(state))]
async fn log_exact_meal(
    State(state): State<AppState>,
    Json(body): Json<LogExactMealRequest>,
) -> Result<Json<MealLoggedResponse>, ApiError> {
    validate_ratio(body.grams, body.kcal_per_100g)?;
    require_profile(&state, &body.user_id).await?;

    let kcal = kcal_from_ratio(body.grams, body.kcal_per_100g);
    let record = MealRecord::insert(
        &state.db,
        &body.user_id,
        &body.description,
        kcal,
        Some(body.grams),
        Some(body.kcal_per_100g),
    )
    .await?;

    tracing::info!(user_id = %body.user_id, kcal, "meal logged");
    Ok(Json(MealLoggedResponse { id: record.id, kcal_logged: round2(kcal) }))
}

#[instrument(skip(state))]
async fn log_meal_by_name(
    State(state): State<AppState>,
    Json(body): Json<LogByNameRequest>,
) -> Result<Json<MealLoggedResponse>, ApiError> {
    if !body.grams.is_finite() || body.grams <= 0.0 {
        return Err(ApiError::InvalidInput("grams must be positive".into()));
    }
    require_profile(&state, &body.user_id).await?;

    let entry = state
        .nutrition
        .lookup(&body.name)
        .ok_or_else(|| ApiError::NotFound(format!("food '{}'", body.name)))?;

    let kcal = kcal_from_ratio(body.grams, entry.kcal_per_100g);
    let description = body.description.as_deref().unwrap_or(&entry.name);
    let record = MealRecord::insert(
        &state.db,
        &body.user_id,
        description,
        kcal,
        Some(body.grams),
        Some(entry.kcal_per_100g),
    )
    .await?;

    tracing::info!(user_id = %body.user_id, food = %entry.name, kcal, "meal logged by name");
    Ok(Json(MealLoggedResponse { id: record.id, kcal_logged: round2(kcal) }))
}

#[instrument(skip(state))]
async fn daily_summary(
    State(state): State<AppState>,
    Query(query): Query<DailySummaryQuery>,
) -> Result<Json<DailySummaryResponse>, ApiError> {
    require_profile(&state, &query.user_id).await?;

    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(&query.date, &format)
        .map_err(|_| ApiError::InvalidInput(format!("date '{}' is not YYYY-MM-DD", query.date)))?;

    let meals = MealRecord::list_for_day(&state.db, &query.user_id, date).await?;
    let total_kcal = round2(meals.iter().map(|m| m.kcal).sum());

    Ok(Json(DailySummaryResponse {
        user_id: query.user_id,
        date: query.date,
        total_kcal,
        meals,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kcal_derivation_is_exact() {
        assert_eq!(kcal_from_ratio(150.0, 200.0), 300.0);
        assert_eq!(kcal_from_ratio(100.0, 52.0), 52.0);
        assert_eq!(round2(kcal_from_ratio(130.0, 165.0)), 214.5);
    }

    #[test]
    fn ratio_validation() {
        assert!(validate_ratio(150.0, 200.0).is_ok());
        assert!(validate_ratio(0.0, 200.0).is_err());
        assert!(validate_ratio(-10.0, 200.0).is_err());
        assert!(validate_ratio(150.0, 0.0).is_err());
        assert!(validate_ratio(f64::NAN, 200.0).is_err());
    }
}
