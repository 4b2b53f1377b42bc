//! Metabolic-rate and macro-planning formulas.
//!
//! Everything here is pure arithmetic over already-validated numbers: no I/O,
//! no errors. Range validation happens at the HTTP boundary.

use serde::Serialize;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Energy equivalent of one kilogram of body mass.
pub const KCAL_PER_KG_BODY_MASS: f64 = 7700.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Lenient mapping: `"m"`/`"male"` (any case) select the male branch,
    /// every other value falls through to female. Callers that want strict
    /// validation must reject unknown values before storing them.
    pub fn from_input(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "m" | "male" => Self::Male,
            _ => Self::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Unknown levels default to `Light` rather than failing.
    pub fn from_input(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "sedentary" => Self::Sedentary,
            "light" => Self::Light,
            "moderate" => Self::Moderate,
            "active" => Self::Active,
            "very_active" => Self::VeryActive,
            _ => Self::Light,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Basal metabolic rate, Mifflin-St Jeor equation, in kcal/day.
pub fn bmr(weight_kg: f64, height_cm: f64, age: i64, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Total daily energy expenditure: BMR scaled by the activity multiplier.
pub fn tdee(weight_kg: f64, height_cm: f64, age: i64, sex: Sex, activity: ActivityLevel) -> f64 {
    bmr(weight_kg, height_cm, age, sex) * activity.multiplier()
}

/// Allocation of non-protein calories between carbs and fat.
///
/// The fractions are not required to sum to 1.0; they are only ever used as
/// multipliers, so a lopsided split degrades the plan but cannot fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroSplit {
    pub carbs: f64,
    pub fat: f64,
}

impl Default for MacroSplit {
    fn default() -> Self {
        Self { carbs: 0.5, fat: 0.5 }
    }
}

impl MacroSplit {
    /// Parses `"<carbs_pct>-<fat_pct>"`, e.g. `"60-40"`.
    ///
    /// Any malformed input (wrong shape, non-numeric, negative, non-finite)
    /// silently falls back to the 50/50 default. Lenient by contract: a bad
    /// split string must never fail a request.
    pub fn parse_or_default(s: &str) -> Self {
        let mut parts = s.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(carbs), Some(fat), None) => {
                match (carbs.trim().parse::<f64>(), fat.trim().parse::<f64>()) {
                    (Ok(c), Ok(f)) if c.is_finite() && f.is_finite() && c >= 0.0 && f >= 0.0 => {
                        Self { carbs: c / 100.0, fat: f / 100.0 }
                    }
                    _ => Self::default(),
                }
            }
            _ => Self::default(),
        }
    }
}

/// Daily calorie and macronutrient targets, rounded to one decimal for display.
#[derive(Debug, Clone, Serialize)]
pub struct MacroPlan {
    pub target_calories: f64,
    pub daily_surplus_deficit: f64,
    pub protein_g: f64,
    pub protein_kcal: f64,
    pub carbs_g: f64,
    pub carbs_kcal: f64,
    pub fat_g: f64,
    pub fat_kcal: f64,
}

/// Derives daily macro targets from a goal rate of weight change.
///
/// `goal_rate_kg_per_week` may be negative (loss), zero (maintenance) or
/// positive (gain). When the protein budget alone exceeds the calorie target,
/// the remaining-calorie pool is clamped to `max(0, target * 0.2)` so carbs
/// and fat targets never go negative.
pub fn macro_plan(
    current_weight_kg: f64,
    goal_rate_kg_per_week: f64,
    maintenance_kcal: f64,
    protein_per_kg: f64,
    split: MacroSplit,
) -> MacroPlan {
    let kcal_change_per_day = goal_rate_kg_per_week * KCAL_PER_KG_BODY_MASS / 7.0;
    let target_calories = maintenance_kcal + kcal_change_per_day;

    let protein_g = protein_per_kg * current_weight_kg;
    let protein_kcal = protein_g * KCAL_PER_G_PROTEIN;

    let mut remaining_kcal = target_calories - protein_kcal;
    if remaining_kcal < 0.0 {
        remaining_kcal = (target_calories * 0.2).max(0.0);
    }

    let carbs_kcal = remaining_kcal * split.carbs;
    let fat_kcal = remaining_kcal * split.fat;

    MacroPlan {
        target_calories: round1(target_calories),
        daily_surplus_deficit: round1(kcal_change_per_day),
        protein_g: round1(protein_g),
        protein_kcal: round1(protein_kcal),
        carbs_g: round1(carbs_kcal / KCAL_PER_G_CARBS),
        carbs_kcal: round1(carbs_kcal),
        fat_g: round1(fat_kcal / KCAL_PER_G_FAT),
        fat_kcal: round1(fat_kcal),
    }
}

/// Round to one decimal place for display values.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
