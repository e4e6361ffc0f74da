use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::calculator::DailyNeeds;
use crate::nutrition::goals::NutritionalGoals;
use crate::nutrition::types::{ActivityLevel, DietaryPreferences, Gender, Goal};
use crate::users::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: ProfileResponse,
}

/// Body metrics section of the profile, absent fields until onboarding.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    pub onboarding_completed: bool,
}

/// Public view of a user record. The password hash never leaves the repo.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile: ProfileSection,
    pub dietary_preferences: DietaryPreferences,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutritional_goals: Option<NutritionalGoals>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            profile: ProfileSection {
                age: u.age,
                gender: u.gender,
                weight: u.weight_kg,
                height: u.height_cm,
                goal: u.goal,
                activity_level: u.activity_level,
                onboarding_completed: u.onboarding_completed,
            },
            dietary_preferences: u.dietary_preferences.0,
            nutritional_goals: u.nutritional_goals.map(|g| g.0),
            created_at: u.created_at,
        }
    }
}

/// Request body for account updates.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// One-time onboarding payload: body metrics plus dietary preferences.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub age: i32,
    pub gender: Gender,
    pub weight: f64,
    pub height: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub dietary_preferences: DietaryPreferences,
}

/// Profile after onboarding plus the derived daily targets.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResponse {
    pub user: ProfileResponse,
    pub daily_needs: DailyNeeds,
}
