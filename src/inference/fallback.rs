use super::NutrientEstimate;

const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Per-serving estimates for common foods, used when the upstream model is
/// unreachable or returns nothing usable. Matched by case-insensitive
/// substring against the description or classifier label.
const KNOWN_FOODS: &[(&str, [f64; 4])] = &[
    // name, [kcal, carbs g, protein g, fat g]
    ("banana", [105.0, 27.0, 1.3, 0.4]),
    ("apple", [95.0, 25.0, 0.5, 0.3]),
    ("orange", [62.0, 15.4, 1.2, 0.2]),
    ("rice", [130.0, 28.0, 2.7, 0.3]),
    ("bread", [79.0, 14.0, 2.7, 1.0]),
    ("pasta", [131.0, 25.0, 5.0, 1.1]),
    ("potato", [161.0, 37.0, 4.3, 0.2]),
    ("chicken", [165.0, 0.0, 31.0, 3.6]),
    ("egg", [78.0, 0.6, 6.3, 5.3]),
    ("milk", [103.0, 12.0, 8.0, 2.4]),
    ("yogurt", [59.0, 3.6, 10.0, 0.4]),
    ("salad", [33.0, 6.0, 2.0, 0.5]),
];

pub fn lookup(query: &str) -> Option<NutrientEstimate> {
    let normalized = query.to_lowercase();
    KNOWN_FOODS
        .iter()
        .find(|(name, _)| normalized.contains(name))
        .map(|(name, [calories, carbs, protein, fat])| NutrientEstimate {
            calories: *calories,
            carbohydrates: *carbs,
            proteins: *protein,
            fats: *fat,
            confidence: FALLBACK_CONFIDENCE,
            food_label: Some((*name).to_string()),
            image_url: None,
        })
}
