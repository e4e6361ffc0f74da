use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::jwt::{AuthUser, JwtKeys};
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::nutrition::calculator::{compute_goals, BodyProfile};
use crate::nutrition::goals::NutritionalGoals;
use crate::state::AppState;
use crate::users::dto::{
    LoginRequest, LoginResponse, OnboardingRequest, OnboardingResponse, ProfileResponse,
    RegisterRequest, RegisterResponse, UpdateProfileRequest,
};
use crate::users::repo::User;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.username.len() < 3 {
        warn!("username too short");
        return Err(ApiError::validation("Username too short"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    // Ensure neither identity field is taken
    if User::find_by_username_or_email(&state.db, &payload.username, &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "username or email already registered");
        return Err(ApiError::Conflict(
            "Username or email already registered".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let email = match payload.email {
        Some(raw) => {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(ApiError::validation("Invalid email"));
            }
            if let Some(existing) = User::find_by_email(&state.db, &email).await? {
                if existing.id != user_id {
                    return Err(ApiError::Conflict("Email already registered".into()));
                }
            }
            Some(email)
        }
        None => None,
    };

    let username = match payload.username {
        Some(raw) => {
            let username = raw.trim().to_string();
            if username.len() < 3 {
                return Err(ApiError::validation("Username too short"));
            }
            Some(username)
        }
        None => None,
    };

    let user = User::update_account(&state.db, user_id, username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<RegisterResponse>, ApiError> {
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id = %user_id, "user deleted");
    Ok(Json(RegisterResponse {
        message: "User deleted successfully",
    }))
}

/// Persists body metrics and preferences, derives the nutritional goals the
/// daily aggregation will compare against from now on.
#[instrument(skip(state, payload))]
pub async fn save_onboarding_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, ApiError> {
    let body = BodyProfile {
        age: payload.age,
        gender: payload.gender,
        weight_kg: payload.weight,
        height_cm: payload.height,
        goal: payload.goal,
        activity_level: payload.activity_level,
    };

    let computed = compute_goals(&body, &payload.dietary_preferences)?;
    let goals = NutritionalGoals {
        daily_calories: computed.needs.calories,
        macronutrient_ratios: computed.ratios,
    };

    let user = User::complete_onboarding(
        &state.db,
        user_id,
        &body,
        &payload.dietary_preferences,
        &goals,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(
        user_id = %user.id,
        daily_calories = goals.daily_calories,
        "onboarding completed"
    );
    Ok(Json(OnboardingResponse {
        user: user.into(),
        daily_needs: computed.needs,
    }))
}
