use serde::{Deserialize, Serialize};

/// Biological sex used by the Mifflin-St Jeor formula. Payloads carrying any
/// other value fail deserialization, so the formula never sees one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "goal_direction", rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "activity_level", rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

/// Mutually non-exclusive flags. Ratio selection applies them in a fixed
/// priority order, first match wins (see `calculator::select_macro_ratios`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DietaryPreferences {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub low_cholesterol: bool,
    pub diabetes_friendly: bool,
}

/// Fractional split of daily calories. Expected to sum to 1.0 within a 0.01
/// tolerance when used to derive gram targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroRatios {
    pub const fn new(protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            protein,
            carbs,
            fats,
        }
    }

    pub fn sum(&self) -> f64 {
        self.protein + self.carbs + self.fats
    }
}
