use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::calculator::BodyProfile;
use crate::nutrition::goals::NutritionalGoals;
use crate::nutrition::types::{ActivityLevel, DietaryPreferences, Gender, Goal};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub goal: Option<Goal>,
    pub activity_level: Option<ActivityLevel>,
    pub onboarding_completed: bool,
    pub dietary_preferences: Json<DietaryPreferences>,
    pub nutritional_goals: Option<Json<NutritionalGoals>>,
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash,
    age, gender, weight_kg, height_cm, goal, activity_level,
    onboarding_completed, dietary_preferences, nutritional_goals, created_at
"#;

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Duplicate check for registration: either field taken means taken.
    pub async fn find_by_username_or_email(
        db: &PgPool,
        username: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Update account identity fields, leaving absent ones untouched.
    pub async fn update_account(
        db: &PgPool,
        id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Persists body metrics, preferences and the computed goals in one shot
    /// and marks onboarding as completed.
    pub async fn complete_onboarding(
        db: &PgPool,
        id: Uuid,
        body: &BodyProfile,
        prefs: &DietaryPreferences,
        goals: &NutritionalGoals,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET age = $2,
                gender = $3,
                weight_kg = $4,
                height_cm = $5,
                goal = $6,
                activity_level = $7,
                dietary_preferences = $8,
                nutritional_goals = $9,
                onboarding_completed = TRUE
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(body.age)
        .bind(body.gender)
        .bind(body.weight_kg)
        .bind(body.height_cm)
        .bind(body.goal)
        .bind(body.activity_level)
        .bind(Json(prefs))
        .bind(Json(goals))
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
