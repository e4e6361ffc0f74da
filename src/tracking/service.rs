use serde::Serialize;
use thiserror::Error;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, macros::time, Date,
    OffsetDateTime, UtcOffset,
};

use super::repo::FoodEntry;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid date, expected YYYY-MM-DD or an RFC 3339 timestamp")]
pub struct InvalidDate;

/// Resolves the `date` query parameter to a calendar day (UTC). Accepts a
/// bare date or a full timestamp, since clients send both.
pub fn parse_day(raw: &str) -> Result<Date, InvalidDate> {
    let raw = raw.trim();
    if let Ok(day) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Ok(day);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(|t| t.to_offset(UtcOffset::UTC).date())
        .map_err(|_| InvalidDate)
}

/// Inclusive aggregation window for one calendar day:
/// [00:00:00.000000, 23:59:59.999999].
pub fn day_bounds(day: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = day.midnight().assume_utc();
    let end = day.with_time(time!(23:59:59.999999)).assume_utc();
    (start, end)
}

/// Running totals over a day's entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientTotals {
    pub calories: f64,
    pub carbohydrates: f64,
    pub proteins: f64,
    pub fats: f64,
}

/// Order-independent fold; a missing field counts as zero so a partially
/// populated entry can never poison the totals.
pub fn sum_entries(entries: &[FoodEntry]) -> NutrientTotals {
    entries.iter().fold(NutrientTotals::default(), |acc, e| {
        NutrientTotals {
            calories: acc.calories + e.calories.unwrap_or(0.0),
            carbohydrates: acc.carbohydrates + e.carbohydrates.unwrap_or(0.0),
            proteins: acc.proteins + e.proteins.unwrap_or(0.0),
            fats: acc.fats + e.fats.unwrap_or(0.0),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn entry(
        time: OffsetDateTime,
        calories: Option<f64>,
        carbohydrates: Option<f64>,
        proteins: Option<f64>,
        fats: Option<f64>,
    ) -> FoodEntry {
        FoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "test food".into(),
            calories,
            carbohydrates,
            proteins,
            fats,
            time,
            created_at: time,
        }
    }

    #[test]
    fn parses_bare_date() {
        assert_eq!(parse_day("2024-03-07"), Ok(date!(2024 - 03 - 07)));
    }

    #[test]
    fn parses_rfc3339_timestamp_to_utc_day() {
        assert_eq!(
            parse_day("2024-03-07T18:30:00Z"),
            Ok(date!(2024 - 03 - 07))
        );
        // an offset that crosses midnight resolves to the UTC day
        assert_eq!(
            parse_day("2024-03-08T01:30:00+03:00"),
            Ok(date!(2024 - 03 - 07))
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_day("not-a-date"), Err(InvalidDate));
        assert_eq!(parse_day("2024-13-40"), Err(InvalidDate));
    }

    #[test]
    fn day_bounds_are_inclusive_edges_of_the_day() {
        let (start, end) = day_bounds(date!(2024 - 03 - 07));
        assert_eq!(start, datetime!(2024-03-07 00:00:00 UTC));
        assert_eq!(end, datetime!(2024-03-07 23:59:59.999999 UTC));

        // boundary entries fall inside the window, next-day midnight outside
        let first = datetime!(2024-03-07 00:00:00 UTC);
        let last = datetime!(2024-03-07 23:59:59.999999 UTC);
        let next_day = datetime!(2024-03-08 00:00:00 UTC);
        assert!(first >= start && first <= end);
        assert!(last >= start && last <= end);
        assert!(next_day > end);
    }

    #[test]
    fn empty_day_sums_to_zero() {
        assert_eq!(sum_entries(&[]), NutrientTotals::default());
    }

    #[test]
    fn sums_all_four_fields() {
        let t = datetime!(2024-03-07 12:00:00 UTC);
        let entries = vec![
            entry(t, Some(350.0), Some(45.0), Some(20.0), Some(10.0)),
            entry(t, Some(150.5), Some(20.0), Some(5.5), Some(3.0)),
        ];
        let totals = sum_entries(&entries);
        assert_eq!(totals.calories, 500.5);
        assert_eq!(totals.carbohydrates, 65.0);
        assert_eq!(totals.proteins, 25.5);
        assert_eq!(totals.fats, 13.0);
    }

    #[test]
    fn missing_fields_count_as_zero() {
        let t = datetime!(2024-03-07 08:00:00 UTC);
        let entries = vec![
            entry(t, Some(200.0), None, Some(12.0), None),
            entry(t, None, Some(30.0), None, None),
        ];
        let totals = sum_entries(&entries);
        assert_eq!(totals.calories, 200.0);
        assert_eq!(totals.carbohydrates, 30.0);
        assert_eq!(totals.proteins, 12.0);
        assert_eq!(totals.fats, 0.0);
    }

    #[test]
    fn sum_is_order_independent_and_repeatable() {
        let t = datetime!(2024-03-07 09:00:00 UTC);
        let mut entries = vec![
            entry(t, Some(100.0), Some(10.0), Some(5.0), Some(1.0)),
            entry(t, Some(250.0), Some(30.0), Some(8.0), Some(12.0)),
            entry(t, Some(75.0), Some(9.0), Some(2.0), Some(0.5)),
        ];
        let forward = sum_entries(&entries);
        entries.reverse();
        let backward = sum_entries(&entries);
        assert_eq!(forward, backward);
        assert_eq!(sum_entries(&entries), backward);
    }
}
