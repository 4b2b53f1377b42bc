use serde::{Deserialize, Serialize};

use crate::formulas::MacroPlan;
use crate::profiles::repo::UserProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterProfileRequest {
    pub user_id: String,
    pub name: Option<String>,
    pub age: i64,
    pub sex: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: String,
    pub goal_weight_kg: f64,
    pub goal_rate_kg_per_week: f64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
    pub tdee: f64,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub user_id: String,
    pub maintenance_kcal: f64,
}

#[derive(Debug, Deserialize)]
pub struct MacroPlanQuery {
    #[serde(default = "default_protein_per_kg")]
    pub protein_per_kg: f64,
    #[serde(default = "default_split")]
    pub carbs_fat_split: String,
}

fn default_protein_per_kg() -> f64 {
    2.0
}

fn default_split() -> String {
    "50-50".to_string()
}

#[derive(Debug, Serialize)]
pub struct MacroPlanResponse {
    pub user_id: String,
    pub maintenance_kcal: f64,
    #[serde(flatten)]
    pub plan: MacroPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_plan_query_defaults() {
        let q: MacroPlanQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.protein_per_kg, 2.0);
        assert_eq!(q.carbs_fat_split, "50-50");
    }

    #[test]
    fn maintenance_response_serialization() {
        let resp = MaintenanceResponse { user_id: "u1".into(), maintenance_kcal: 2594.3 };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["maintenance_kcal"], 2594.3);
    }

    #[test]
    fn macro_plan_response_flattens_plan() {
        let plan = crate::formulas::macro_plan(
            70.0,
            0.25,
            2000.0,
            2.0,
            crate::formulas::MacroSplit::default(),
        );
        let resp = MacroPlanResponse {
            user_id: "u1".into(),
            maintenance_kcal: 2000.0,
            plan,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["user_id"], "u1");
        // flattened plan fields sit at the top level
        assert_eq!(json["protein_g"], 140.0);
        assert_eq!(json["target_calories"], 2275.0);
    }
}
