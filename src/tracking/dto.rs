use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::FoodEntry;
use super::service::NutrientTotals;
use crate::nutrition::goals::GoalTargets;

#[derive(Debug, Deserialize)]
pub struct CreateFoodEntryRequest {
    pub name: String,
    pub calories: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFoodEntryRequest {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
}

/// `?date=` accepts YYYY-MM-DD or RFC 3339; omitted means today.
#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntryResponse {
    pub id: Uuid,
    pub name: String,
    pub calories: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FoodEntry> for FoodEntryResponse {
    fn from(e: FoodEntry) -> Self {
        Self {
            id: e.id,
            name: e.name,
            calories: e.calories,
            carbohydrates: e.carbohydrates,
            proteins: e.proteins,
            fats: e.fats,
            time: e.time,
            created_at: e.created_at,
        }
    }
}

/// Day totals next to the targets they are measured against.
#[derive(Debug, Serialize)]
pub struct DailyNutrientsResponse {
    #[serde(flatten)]
    pub totals: NutrientTotals,
    pub goals: GoalTargets,
}
