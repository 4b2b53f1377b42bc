use serde::{Deserialize, Serialize};

use crate::meals::repo::MealRecord;

#[derive(Debug, Deserialize)]
pub struct LogExactMealRequest {
    pub user_id: String,
    pub description: String,
    pub grams: f64,
    pub kcal_per_100g: f64,
}

#[derive(Debug, Deserialize)]
pub struct LogByNameRequest {
    pub user_id: String,
    pub name: String,
    pub grams: f64,
    /// Defaults to the matched food name.
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealLoggedResponse {
    pub id: String,
    pub kcal_logged: f64,
}

#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    pub user_id: String,
    /// Calendar date, `YYYY-MM-DD`, interpreted as a UTC day.
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct DailySummaryResponse {
    pub user_id: String,
    pub date: String,
    pub total_kcal: f64,
    pub meals: Vec<MealRecord>,
}
