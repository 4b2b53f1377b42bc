//! Static nutrition reference table.
//!
//! Loaded once at startup from a JSON file (name -> per-100g facts) and shared
//! read-only through `AppState`; lookups are case-insensitive exact matches.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use axum::extract::{Path as UrlPath, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct NutritionEntry {
    pub name: String,
    pub kcal_per_100g: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_g_per_100g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g_per_100g: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFacts {
    kcal_per_100g: f64,
    #[serde(default)]
    protein_g_per_100g: Option<f64>,
    #[serde(default)]
    carbs_g_per_100g: Option<f64>,
    #[serde(default)]
    fat_g_per_100g: Option<f64>,
}

/// In-memory reference table, keyed by lowercased food name.
#[derive(Debug, Default)]
pub struct NutritionTable {
    entries: HashMap<String, NutritionEntry>,
}

impl NutritionTable {
    /// Loads the table from a JSON file of `name -> facts`.
    ///
    /// A missing file yields an empty table rather than an error; entries
    /// with a non-positive kcal density are skipped with a warning.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "nutrition db file missing; lookups will find nothing");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read nutrition db {}", path.display()))?;
        let parsed: HashMap<String, RawFacts> =
            serde_json::from_str(&raw).context("parse nutrition db json")?;

        let table = Self::from_facts(parsed);
        tracing::info!(foods = table.len(), "nutrition table loaded");
        Ok(table)
    }

    fn from_facts(parsed: HashMap<String, RawFacts>) -> Self {
        let mut entries = HashMap::with_capacity(parsed.len());
        for (name, facts) in parsed {
            if !(facts.kcal_per_100g > 0.0) {
                tracing::warn!(food = %name, kcal_per_100g = facts.kcal_per_100g, "skipping entry with non-positive kcal density");
                continue;
            }
            entries.insert(
                name.to_lowercase(),
                NutritionEntry {
                    name,
                    kcal_per_100g: facts.kcal_per_100g,
                    protein_g_per_100g: facts.protein_g_per_100g,
                    carbs_g_per_100g: facts.carbs_g_per_100g,
                    fat_g_per_100g: facts.fat_g_per_100g,
                },
            );
        }
        Self { entries }
    }

    /// Case-insensitive exact match; no fuzzy search.
    pub fn lookup(&self, name: &str) -> Option<&NutritionEntry> {
        self.entries.get(&name.to_lowercase())
    }

    /// All entries, sorted by name.
    pub fn list(&self) -> Vec<&NutritionEntry> {
        let mut all: Vec<_> = self.entries.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nutrition", get(list_foods))
        .route("/nutrition/:name", get(lookup_food))
}

async fn list_foods(State(state): State<AppState>) -> Json<Vec<NutritionEntry>> {
    Json(state.nutrition.list().into_iter().cloned().collect())
}

async fn lookup_food(
    State(state): State<AppState>,
    UrlPath(name): UrlPath<String>,
) -> Result<Json<NutritionEntry>, ApiError> {
    state
        .nutrition
        .lookup(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("food '{name}'")))
}
