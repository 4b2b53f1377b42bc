use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::instrument;

use crate::error::ApiError;
use crate::formulas::{self, ActivityLevel, MacroSplit, Sex};
use crate::state::AppState;

use super::dto::{
    MacroPlanQuery, MacroPlanResponse, MaintenanceResponse, ProfileResponse,
    RegisterProfileRequest,
};
use super::repo::UserProfile;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles/:user_id", get(get_profile))
        .route("/profiles/:user_id/maintenance", get(get_maintenance))
        .route("/profiles/:user_id/macro-plan", get(get_macro_plan))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/profiles", post(register_profile))
}

/// Maintenance calories for a stored profile, unrounded.
fn maintenance_for(profile: &UserProfile) -> f64 {
    formulas::tdee(
        profile.weight_kg,
        profile.height_cm,
        profile.age,
        Sex::from_input(&profile.sex),
        ActivityLevel::from_input(&profile.activity_level),
    )
}

async fn require_profile(state: &AppState, user_id: &str) -> Result<UserProfile, ApiError> {
    UserProfile::find(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user '{user_id}'")))
}

#[instrument(skip(state))]
async fn register_profile(
    State(state): State<AppState>,
    Json(body): Json<RegisterProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    validate_profile(&body)?;
    let stored = UserProfile::upsert(&state.db, &body).await?;
    tracing::info!(user_id = %stored.user_id, "profile registered");
    Ok(Json(stored))
}

fn validate_profile(body: &RegisterProfileRequest) -> Result<(), ApiError> {
    if body.user_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("user_id must be non-empty".into()));
    }
    if body.age <= 0 {
        return Err(ApiError::InvalidInput("age must be positive".into()));
    }
    for (field, value) in [
        ("height_cm", body.height_cm),
        ("weight_kg", body.weight_kg),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ApiError::InvalidInput(format!("{field} must be positive")));
        }
    }
    for (field, value) in [
        ("goal_weight_kg", body.goal_weight_kg),
        ("goal_rate_kg_per_week", body.goal_rate_kg_per_week),
    ] {
        if !value.is_finite() {
            return Err(ApiError::InvalidInput(format!("{field} must be a finite number")));
        }
    }
    Ok(())
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = require_profile(&state, &user_id).await?;
    let tdee = formulas::round1(maintenance_for(&user));
    Ok(Json(ProfileResponse { user, tdee }))
}

#[instrument(skip(state))]
async fn get_maintenance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let user = require_profile(&state, &user_id).await?;
    let maintenance_kcal = formulas::round1(maintenance_for(&user));
    Ok(Json(MaintenanceResponse { user_id: user.user_id, maintenance_kcal }))
}

#[instrument(skip(state))]
async fn get_macro_plan(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<MacroPlanQuery>,
) -> Result<Json<MacroPlanResponse>, ApiError> {
    if !query.protein_per_kg.is_finite() || query.protein_per_kg <= 0.0 {
        return Err(ApiError::InvalidInput("protein_per_kg must be positive".into()));
    }

    let user = require_profile(&state, &user_id).await?;
    let maintenance = maintenance_for(&user);
    let split = MacroSplit::parse_or_default(&query.carbs_fat_split);

    let plan = formulas::macro_plan(
        user.weight_kg,
        user.goal_rate_kg_per_week,
        maintenance,
        query.protein_per_kg,
        split,
    );

    Ok(Json(MacroPlanResponse {
        user_id: user.user_id,
        maintenance_kcal: formulas::round1(maintenance),
        plan,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterProfileRequest {
        RegisterProfileRequest {
            user_id: "u1".to_string(),
            name: None,
            age: 25,
            sex: "male".to_string(),
            height_cm: 175.0,
            weight_kg: 70.0,
            activity_level: "moderate".to_string(),
            goal_weight_kg: 75.0,
            goal_rate_kg_per_week: 0.25,
        }
    }

    #[test]
    fn validation_accepts_a_sane_profile() {
        assert!(validate_profile(&request()).is_ok());
    }

    #[test]
    fn validation_rejects_bad_numerics() {
        let mut bad = request();
        bad.age = 0;
        assert!(validate_profile(&bad).is_err());

        let mut bad = request();
        bad.weight_kg = -70.0;
        assert!(validate_profile(&bad).is_err());

        let mut bad = request();
        bad.height_cm = f64::NAN;
        assert!(validate_profile(&bad).is_err());

        let mut bad = request();
        bad.goal_rate_kg_per_week = f64::INFINITY;
        assert!(validate_profile(&bad).is_err());
    }

    #[test]
    fn validation_keeps_sex_lenient() {
        // unrecognized sex values are stored as-is and take the female
        // formula branch; they are not a validation failure
        let mut odd = request();
        odd.sex = "other".to_string();
        assert!(validate_profile(&odd).is_ok());
    }
}
