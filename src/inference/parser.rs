use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::NutrientEstimate;

const MODEL_CONFIDENCE: f64 = 0.8;

pub const CALORIES_MAX: f64 = 1000.0;
pub const GRAMS_MAX: f64 = 100.0;

/// The model reply carried no run of exactly four comma-separated decimal
/// numbers, or the run it carried was clearly degenerate.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("no nutrient quad found in model output")]
pub struct NoNumberQuad;

lazy_static! {
    static ref NUMBER_RUN: Regex =
        Regex::new(r"-?\d+(?:\.\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?)*").unwrap();
}

/// Finds the first run of exactly four comma-separated decimal numbers.
/// Runs of any other length are skipped, so a stray "1, 2" earlier in the
/// reply cannot shadow the real answer.
pub fn extract_number_quad(text: &str) -> Result<[f64; 4], NoNumberQuad> {
    for run in NUMBER_RUN.find_iter(text) {
        let tokens: Vec<&str> = run.as_str().split(',').map(str::trim).collect();
        if tokens.len() != 4 {
            continue;
        }
        let mut quad = [0.0; 4];
        let mut ok = true;
        for (slot, token) in quad.iter_mut().zip(&tokens) {
            match token.parse::<f64>() {
                Ok(v) => *slot = v,
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if ok {
            return Ok(quad);
        }
    }
    Err(NoNumberQuad)
}

/// Parses a generated reply into a clamped estimate for `label`.
/// An estimate below one calorie is treated the same as no match at all;
/// the caller falls back to the lookup table either way.
pub fn parse_estimate(generated: &str, label: &str) -> Result<NutrientEstimate, NoNumberQuad> {
    let quad = extract_number_quad(generated)?;
    let calories = quad[0].clamp(0.0, CALORIES_MAX);
    if calories < 1.0 {
        return Err(NoNumberQuad);
    }
    Ok(NutrientEstimate {
        calories,
        carbohydrates: quad[1].clamp(0.0, GRAMS_MAX),
        proteins: quad[2].clamp(0.0, GRAMS_MAX),
        fats: quad[3].clamp(0.0, GRAMS_MAX),
        confidence: MODEL_CONFIDENCE,
        food_label: Some(label.to_string()),
        image_url: None,
    })
}
