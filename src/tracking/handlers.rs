use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateFoodEntryRequest, DailyNutrientsResponse, DailyQuery, FoodEntryResponse,
    UpdateFoodEntryRequest,
};
use super::repo::FoodEntry;
use super::service::{day_bounds, parse_day, sum_entries};
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::nutrition::goals::goal_targets;
use crate::state::AppState;
use crate::users::repo::User;

fn resolve_day(raw: Option<&str>) -> Result<Date, ApiError> {
    match raw {
        Some(s) => parse_day(s).map_err(|e| ApiError::validation(e.to_string())),
        None => Ok(OffsetDateTime::now_utc().date()),
    }
}

fn validate_nutrients(fields: [(&'static str, Option<f64>); 4]) -> Result<(), ApiError> {
    for (name, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ApiError::validation(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateFoodEntryRequest>,
) -> Result<(StatusCode, Json<FoodEntryResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Food name is required"));
    }
    validate_nutrients([
        ("calories", payload.calories),
        ("carbohydrates", payload.carbohydrates),
        ("proteins", payload.proteins),
        ("fats", payload.fats),
    ])?;

    let entry = FoodEntry::insert(
        &state.db,
        user_id,
        name,
        payload.calories,
        payload.carbohydrates,
        payload.proteins,
        payload.fats,
        payload.time,
    )
    .await?;

    info!(user_id = %user_id, entry_id = %entry.id, "food entry created");
    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[instrument(skip(state))]
pub async fn list_daily_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<FoodEntryResponse>>, ApiError> {
    let day = resolve_day(query.date.as_deref())?;
    let (start, end) = day_bounds(day);
    let entries = FoodEntry::list_between(&state.db, user_id, start, end).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Read-only aggregation: totals for the day next to the user's goals.
#[instrument(skip(state))]
pub async fn get_daily_nutrients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailyNutrientsResponse>, ApiError> {
    let day = resolve_day(query.date.as_deref())?;
    let (start, end) = day_bounds(day);

    let entries = FoodEntry::list_between(&state.db, user_id, start, end).await?;
    let totals = sum_entries(&entries);

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let goals = goal_targets(user.nutritional_goals.as_ref().map(|g| &g.0));

    Ok(Json(DailyNutrientsResponse { totals, goals }))
}

#[instrument(skip(state, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<UpdateFoodEntryRequest>,
) -> Result<Json<FoodEntryResponse>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Food name cannot be empty"));
        }
    }
    validate_nutrients([
        ("calories", payload.calories),
        ("carbohydrates", payload.carbohydrates),
        ("proteins", payload.proteins),
        ("fats", payload.fats),
    ])?;

    let entry = FoodEntry::update(
        &state.db,
        user_id,
        entry_id,
        payload.name.as_deref().map(str::trim),
        payload.calories,
        payload.carbohydrates,
        payload.proteins,
        payload.fats,
        payload.time,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Food entry not found"))?;

    info!(user_id = %user_id, entry_id = %entry.id, "food entry updated");
    Ok(Json(entry.into()))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !FoodEntry::delete(&state.db, user_id, entry_id).await? {
        return Err(ApiError::not_found("Food entry not found"));
    }
    info!(user_id = %user_id, entry_id = %entry_id, "food entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_day_defaults_to_today() {
        let today = OffsetDateTime::now_utc().date();
        assert_eq!(resolve_day(None).unwrap(), today);
    }

    #[test]
    fn resolve_day_rejects_garbage() {
        assert!(matches!(
            resolve_day(Some("yesterday-ish")),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn nutrient_validation_rejects_negative_and_nan() {
        assert!(validate_nutrients([
            ("calories", Some(-1.0)),
            ("carbohydrates", None),
            ("proteins", None),
            ("fats", None),
        ])
        .is_err());
        assert!(validate_nutrients([
            ("calories", Some(f64::NAN)),
            ("carbohydrates", None),
            ("proteins", None),
            ("fats", None),
        ])
        .is_err());
        assert!(validate_nutrients([
            ("calories", Some(240.0)),
            ("carbohydrates", Some(0.0)),
            ("proteins", Some(12.5)),
            ("fats", None),
        ])
        .is_ok());
    }
}
