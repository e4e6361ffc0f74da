use thiserror::Error;

use super::types::{ActivityLevel, DietaryPreferences, Gender, Goal, MacroRatios};
use serde::Serialize;

/// Body metrics collected at onboarding.
#[derive(Debug, Clone, Copy)]
pub struct BodyProfile {
    pub age: i32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{0} must be a positive number")]
    NonPositive(&'static str),
}

/// Daily targets derived from a body profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNeeds {
    pub calories: f64,
    pub proteins: f64,
    pub carbohydrates: f64,
    pub fats: f64,
    pub fiber: f64,
    pub iron: f64,
    pub calcium: f64,
    pub vitamin_d: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ComputedGoals {
    pub needs: DailyNeeds,
    pub ratios: MacroRatios,
}

/// Ratio selection rules, applied top to bottom; the first matching flag
/// wins and the rest are ignored, even when several flags are set.
static RATIO_RULES: &[(fn(&DietaryPreferences) -> bool, MacroRatios)] = &[
    (|p| p.vegan, MacroRatios::new(0.25, 0.55, 0.20)),
    (|p| p.vegetarian, MacroRatios::new(0.30, 0.50, 0.20)),
    (|p| p.gluten_free, MacroRatios::new(0.30, 0.45, 0.25)),
    (|p| p.low_cholesterol, MacroRatios::new(0.30, 0.45, 0.25)),
    (|p| p.diabetes_friendly, MacroRatios::new(0.30, 0.40, 0.30)),
];

const DEFAULT_RATIOS: MacroRatios = MacroRatios::new(0.30, 0.45, 0.25);

pub fn select_macro_ratios(prefs: &DietaryPreferences) -> MacroRatios {
    RATIO_RULES
        .iter()
        .find(|(matches, _)| matches(prefs))
        .map(|(_, ratios)| *ratios)
        .unwrap_or(DEFAULT_RATIOS)
}

/// Mifflin-St Jeor resting expenditure.
pub fn basal_metabolic_rate(profile: &BodyProfile) -> f64 {
    let base =
        10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
    }
}

fn validate(profile: &BodyProfile) -> Result<(), ProfileError> {
    if profile.age <= 0 {
        return Err(ProfileError::NonPositive("age"));
    }
    if !(profile.weight_kg.is_finite() && profile.weight_kg > 0.0) {
        return Err(ProfileError::NonPositive("weight"));
    }
    if !(profile.height_cm.is_finite() && profile.height_cm > 0.0) {
        return Err(ProfileError::NonPositive("height"));
    }
    Ok(())
}

/// Derives daily calorie, macro and micronutrient targets. Rejects
/// non-positive measurements up front; downstream goal math divides by
/// these values and must never see NaN.
pub fn compute_goals(
    profile: &BodyProfile,
    prefs: &DietaryPreferences,
) -> Result<ComputedGoals, ProfileError> {
    validate(profile)?;

    let bmr = basal_metabolic_rate(profile);
    let tdee = bmr * activity_multiplier(profile.activity_level);

    let target_calories = match profile.goal {
        Goal::Lose => tdee * 0.8,
        Goal::Gain => tdee * 1.1,
        Goal::Maintain => tdee,
    };

    let ratios = select_macro_ratios(prefs);

    let needs = DailyNeeds {
        calories: target_calories.round(),
        proteins: (target_calories * ratios.protein / 4.0).round(),
        carbohydrates: (target_calories * ratios.carbs / 4.0).round(),
        fats: (target_calories * ratios.fats / 9.0).round(),
        fiber: (target_calories / 1000.0 * 14.0).round(),
        iron: match profile.gender {
            Gender::Female => 18.0,
            Gender::Male => 8.0,
        },
        calcium: 1000.0,
        vitamin_d: 600.0,
    };

    Ok(ComputedGoals { needs, ratios })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_profile() -> BodyProfile {
        BodyProfile {
            age: 30,
            gender: Gender::Male,
            weight_kg: 70.0,
            height_cm: 175.0,
            goal: Goal::Maintain,
            activity_level: ActivityLevel::Moderate,
        }
    }

    #[test]
    fn bmr_reference_values() {
        let male = reference_profile();
        assert_eq!(basal_metabolic_rate(&male), 1648.75);

        let female = BodyProfile {
            gender: Gender::Female,
            ..male
        };
        assert_eq!(basal_metabolic_rate(&female), 1648.75 - 166.0);
    }

    #[test]
    fn maintain_moderate_reference_targets() {
        let goals = compute_goals(&reference_profile(), &DietaryPreferences::default())
            .expect("valid profile");
        // TDEE = 1648.75 * 1.55 = 2555.5625, maintain leaves it unchanged
        assert_eq!(goals.needs.calories, 2556.0);
        assert_eq!(goals.needs.proteins, 192.0);
        assert_eq!(goals.needs.carbohydrates, 288.0);
        assert_eq!(goals.needs.fats, 71.0);
        assert_eq!(goals.needs.fiber, 36.0);
        assert_eq!(goals.needs.iron, 8.0);
        assert_eq!(goals.needs.calcium, 1000.0);
        assert_eq!(goals.needs.vitamin_d, 600.0);
        assert_eq!(goals.ratios, MacroRatios::new(0.30, 0.45, 0.25));
    }

    #[test]
    fn goal_direction_scales_calories() {
        let base = reference_profile();
        let maintain = compute_goals(&base, &DietaryPreferences::default()).unwrap();
        let lose = compute_goals(
            &BodyProfile {
                goal: Goal::Lose,
                ..base
            },
            &DietaryPreferences::default(),
        )
        .unwrap();
        let gain = compute_goals(
            &BodyProfile {
                goal: Goal::Gain,
                ..base
            },
            &DietaryPreferences::default(),
        )
        .unwrap();

        assert_eq!(lose.needs.calories, (2555.5625_f64 * 0.8).round());
        assert_eq!(gain.needs.calories, (2555.5625_f64 * 1.1).round());
        assert!(lose.needs.calories < maintain.needs.calories);
        assert!(gain.needs.calories > maintain.needs.calories);
    }

    #[test]
    fn activity_multipliers_match_table() {
        assert_eq!(activity_multiplier(ActivityLevel::Sedentary), 1.2);
        assert_eq!(activity_multiplier(ActivityLevel::Light), 1.375);
        assert_eq!(activity_multiplier(ActivityLevel::Moderate), 1.55);
        assert_eq!(activity_multiplier(ActivityLevel::Active), 1.725);
    }

    #[test]
    fn first_matching_preference_wins() {
        let prefs = DietaryPreferences {
            vegan: true,
            gluten_free: true,
            ..Default::default()
        };
        // vegan outranks glutenFree; flags are never combined
        assert_eq!(select_macro_ratios(&prefs), MacroRatios::new(0.25, 0.55, 0.20));

        let prefs = DietaryPreferences {
            low_cholesterol: true,
            diabetes_friendly: true,
            ..Default::default()
        };
        assert_eq!(select_macro_ratios(&prefs), MacroRatios::new(0.30, 0.45, 0.25));

        assert_eq!(
            select_macro_ratios(&DietaryPreferences::default()),
            MacroRatios::new(0.30, 0.45, 0.25)
        );
    }

    #[test]
    fn all_ratio_rows_sum_to_one() {
        for (_, ratios) in RATIO_RULES {
            assert!((ratios.sum() - 1.0).abs() < 1e-9);
        }
        assert!((DEFAULT_RATIOS.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gram_targets_are_proportionally_consistent() {
        let profiles = [
            reference_profile(),
            BodyProfile {
                age: 52,
                gender: Gender::Female,
                weight_kg: 61.5,
                height_cm: 164.0,
                goal: Goal::Lose,
                activity_level: ActivityLevel::Light,
            },
            BodyProfile {
                age: 19,
                gender: Gender::Male,
                weight_kg: 88.0,
                height_cm: 190.0,
                goal: Goal::Gain,
                activity_level: ActivityLevel::Active,
            },
        ];
        let prefs = [
            DietaryPreferences::default(),
            DietaryPreferences {
                vegan: true,
                ..Default::default()
            },
            DietaryPreferences {
                diabetes_friendly: true,
                ..Default::default()
            },
        ];
        for profile in &profiles {
            for pref in &prefs {
                let g = compute_goals(profile, pref).unwrap();
                let rebuilt = g.needs.proteins * 4.0 + g.needs.carbohydrates * 4.0 + g.needs.fats * 9.0;
                // each of the three terms rounds by at most half a unit of 4/4/9 kcal
                assert!(
                    (rebuilt - g.needs.calories).abs() <= 9.0,
                    "rebuilt {} vs target {}",
                    rebuilt,
                    g.needs.calories
                );
                assert!(g.needs.proteins >= 0.0);
                assert!(g.needs.carbohydrates >= 0.0);
                assert!(g.needs.fats >= 0.0);
            }
        }
    }

    #[test]
    fn iron_depends_on_gender() {
        let male = compute_goals(&reference_profile(), &DietaryPreferences::default()).unwrap();
        let female = compute_goals(
            &BodyProfile {
                gender: Gender::Female,
                ..reference_profile()
            },
            &DietaryPreferences::default(),
        )
        .unwrap();
        assert_eq!(male.needs.iron, 8.0);
        assert_eq!(female.needs.iron, 18.0);
    }

    #[test]
    fn rejects_non_positive_measurements() {
        let base = reference_profile();
        let zero_weight = BodyProfile {
            weight_kg: 0.0,
            ..base
        };
        assert_eq!(
            compute_goals(&zero_weight, &DietaryPreferences::default()).unwrap_err(),
            ProfileError::NonPositive("weight")
        );

        let negative_age = BodyProfile { age: -1, ..base };
        assert_eq!(
            compute_goals(&negative_age, &DietaryPreferences::default()).unwrap_err(),
            ProfileError::NonPositive("age")
        );

        let nan_height = BodyProfile {
            height_cm: f64::NAN,
            ..base
        };
        assert_eq!(
            compute_goals(&nan_height, &DietaryPreferences::default()).unwrap_err(),
            ProfileError::NonPositive("height")
        );
    }
}
