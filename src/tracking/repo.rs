use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One logged meal. Nutrient fields are nullable; aggregation treats an
/// absent value as zero.
#[derive(Debug, Clone, FromRow)]
pub struct FoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub time: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

const ENTRY_COLUMNS: &str = r#"
    id, user_id, name, calories, carbohydrates, proteins, fats, "time", created_at
"#;

impl FoodEntry {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        name: &str,
        calories: Option<f64>,
        carbohydrates: Option<f64>,
        proteins: Option<f64>,
        fats: Option<f64>,
        time: Option<OffsetDateTime>,
    ) -> anyhow::Result<FoodEntry> {
        let entry = sqlx::query_as::<_, FoodEntry>(&format!(
            r#"
            INSERT INTO food_entries (user_id, name, calories, carbohydrates, proteins, fats, "time")
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, now()))
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(calories)
        .bind(carbohydrates)
        .bind(proteins)
        .bind(fats)
        .bind(time)
        .fetch_one(db)
        .await?;
        Ok(entry)
    }

    /// Entries whose timestamp falls inside the inclusive window, ascending
    /// by timestamp for stable list rendering.
    pub async fn list_between(
        db: &PgPool,
        user_id: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        let rows = sqlx::query_as::<_, FoodEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM food_entries
            WHERE user_id = $1 AND "time" >= $2 AND "time" <= $3
            ORDER BY "time" ASC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Update of an entry the caller owns; absent fields stay untouched.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        entry_id: Uuid,
        name: Option<&str>,
        calories: Option<f64>,
        carbohydrates: Option<f64>,
        proteins: Option<f64>,
        fats: Option<f64>,
        time: Option<OffsetDateTime>,
    ) -> anyhow::Result<Option<FoodEntry>> {
        let entry = sqlx::query_as::<_, FoodEntry>(&format!(
            r#"
            UPDATE food_entries
            SET name = COALESCE($3, name),
                calories = COALESCE($4, calories),
                carbohydrates = COALESCE($5, carbohydrates),
                proteins = COALESCE($6, proteins),
                fats = COALESCE($7, fats),
                "time" = COALESCE($8, "time")
            WHERE id = $2 AND user_id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(entry_id)
        .bind(name)
        .bind(calories)
        .bind(carbohydrates)
        .bind(proteins)
        .bind(fats)
        .bind(time)
        .fetch_optional(db)
        .await?;
        Ok(entry)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM food_entries WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(entry_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
