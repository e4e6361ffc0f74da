use serde::{Deserialize, Serialize};

use super::types::MacroRatios;

const RATIO_SUM_TOLERANCE: f64 = 0.01;

/// Substitute targets used whenever a user has no stored goals, or the
/// stored ratios fail validation.
pub const DEFAULT_GOAL_TARGETS: GoalTargets = GoalTargets {
    calories: 2000.0,
    carbohydrates: 250.0,
    proteins: 150.0,
    fats: 65.0,
};

/// Goals persisted on the user record at onboarding time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalGoals {
    pub daily_calories: f64,
    pub macronutrient_ratios: MacroRatios,
}

/// Absolute daily targets, kcal plus grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTargets {
    pub calories: f64,
    pub carbohydrates: f64,
    pub proteins: f64,
    pub fats: f64,
}

impl NutritionalGoals {
    /// Ratios must sum to 1.0 within tolerance and the calorie base must be
    /// usable before gram targets can be derived from them.
    pub fn is_valid(&self) -> bool {
        self.daily_calories.is_finite()
            && self.daily_calories > 0.0
            && (self.macronutrient_ratios.sum() - 1.0).abs() <= RATIO_SUM_TOLERANCE
    }

    fn targets(&self) -> GoalTargets {
        let calories = self.daily_calories;
        let r = &self.macronutrient_ratios;
        GoalTargets {
            calories: calories.round(),
            carbohydrates: (calories * r.carbs / 4.0).round(),
            proteins: (calories * r.protein / 4.0).round(),
            fats: (calories * r.fats / 9.0).round(),
        }
    }
}

/// Resolves stored goals to absolute targets, falling back to the fixed
/// default set when they are absent or invalid.
pub fn goal_targets(stored: Option<&NutritionalGoals>) -> GoalTargets {
    match stored {
        Some(goals) if goals.is_valid() => goals.targets(),
        _ => DEFAULT_GOAL_TARGETS,
    }
}
