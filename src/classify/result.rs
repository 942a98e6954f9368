use serde::{Deserialize, Serialize};

use super::error::ClassificationFailed;

pub const FALLBACK_TITLE: &str = "Detected Food Item";
pub const FALLBACK_DESCRIPTION: &str =
    "AI analysis unavailable (Missing Key). Please fill details manually.";
pub const FALLBACK_CATEGORY: &str = "Unknown";
pub const FALLBACK_FRESHNESS: f64 = 8.0;
pub const FALLBACK_TAG: &str = "Pending";

/// Structured food metadata produced by a classification call.
///
/// Every field is always populated, including on the degraded path.
/// `freshness_score` is advisory (intended 1..=10) and is never clamped here;
/// range enforcement belongs to whoever presents it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub title: String,
    pub description: String,
    pub category: String,
    pub is_halal: bool,
    pub is_veg: bool,
    pub freshness_score: f64,
    pub safety_check: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ClassificationResult {
    /// Deterministic stand-in returned when no credential is configured.
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
            category: FALLBACK_CATEGORY.to_string(),
            is_halal: false,
            is_veg: false,
            freshness_score: FALLBACK_FRESHNESS,
            safety_check: true,
            tags: vec![FALLBACK_TAG.to_string()],
        }
    }

    /// Parse a model-produced JSON document and check the parts serde cannot.
    pub fn from_model_json(raw: &str) -> Result<Self, ClassificationFailed> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClassificationFailed::EmptyResponse);
        }
        let parsed: ClassificationResult = serde_json::from_str(trimmed)
            .map_err(|e| ClassificationFailed::MalformedResponse(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), ClassificationFailed> {
        if self.title.trim().is_empty() {
            return Err(ClassificationFailed::InvalidShape(
                "title must not be empty".to_string(),
            ));
        }
        if !self.freshness_score.is_finite() {
            return Err(ClassificationFailed::InvalidShape(
                "freshnessScore must be a finite number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_matches_degraded_table() {
        let fallback = ClassificationResult::fallback();
        assert_eq!(fallback.title, "Detected Food Item");
        assert_eq!(
            fallback.description,
            "AI analysis unavailable (Missing Key). Please fill details manually."
        );
        assert_eq!(fallback.category, "Unknown");
        assert!(!fallback.is_halal);
        assert!(!fallback.is_veg);
        assert_eq!(fallback.freshness_score, 8.0);
        assert!(fallback.safety_check);
        assert_eq!(fallback.tags, vec!["Pending".to_string()]);
        assert!(fallback.is_fallback());
    }

    #[test]
    fn parses_camel_case_payload() {
        let raw = r#"{
            "title": "Veg Lasagna",
            "description": "Two portions",
            "category": "Pasta",
            "isHalal": true,
            "isVeg": true,
            "freshnessScore": 9,
            "safetyCheck": true,
            "tags": ["Homemade", "Cheese", "Warm"]
        }"#;
        let result = ClassificationResult::from_model_json(raw).expect("parse");
        assert_eq!(result.title, "Veg Lasagna");
        assert_eq!(result.freshness_score, 9.0);
        assert_eq!(result.tags.len(), 3);
        assert!(!result.is_fallback());
    }

    #[test]
    fn missing_tags_become_empty() {
        let raw = r#"{"title":"Soup","description":"","category":"Pantry","isHalal":false,
            "isVeg":false,"freshnessScore":7.5,"safetyCheck":true}"#;
        let result = ClassificationResult::from_model_json(raw).expect("parse");
        assert!(result.tags.is_empty());
        assert!(result.description.is_empty());
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let raw = r#"{"title":"Soup","category":"Pantry"}"#;
        let err = ClassificationResult::from_model_json(raw).unwrap_err();
        assert!(matches!(err, ClassificationFailed::MalformedResponse(_)));
    }

    #[test]
    fn blank_title_is_rejected() {
        let raw = r#"{"title":"  ","description":"","category":"Pantry","isHalal":false,
            "isVeg":false,"freshnessScore":7,"safetyCheck":true,"tags":[]}"#;
        let err = ClassificationResult::from_model_json(raw).unwrap_err();
        assert!(matches!(err, ClassificationFailed::InvalidShape(_)));
    }

    #[test]
    fn empty_text_is_empty_response() {
        let err = ClassificationResult::from_model_json("   ").unwrap_err();
        assert!(matches!(err, ClassificationFailed::EmptyResponse));
    }

    #[test]
    fn out_of_range_freshness_is_kept() {
        let raw = r#"{"title":"Bread","description":"","category":"Bakery","isHalal":true,
            "isVeg":true,"freshnessScore":42,"safetyCheck":false,"tags":["a","a"]}"#;
        let result = ClassificationResult::from_model_json(raw).expect("parse");
        assert_eq!(result.freshness_score, 42.0);
        assert_eq!(result.tags, vec!["a".to_string(), "a".to_string()]);
    }
}
