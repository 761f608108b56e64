//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP query strings.

use serde::Deserialize;

use crate::topics::MAX_LIMIT;

fn default_limit() -> usize {
    5
}

/// Query string for the topics endpoint (GET /topics)
///
/// # Fields
/// - `brand`: Brand to generate topics for
/// - `limit`: Number of topics (default 5, at most 20)
/// - `ttl`: Optional TTL in seconds for the cached result
#[derive(Debug, Clone, Deserialize)]
pub struct TopicsQuery {
    /// The brand name
    pub brand: String,
    /// Number of topics to generate
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl TopicsQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.brand.trim().is_empty() {
            return Some("Brand cannot be empty".to_string());
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Some(format!("Limit must be between 1 and {}", MAX_LIMIT));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_query_deserialize() {
        let json = r#"{"brand": "BrandX"}"#;
        let query: TopicsQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.brand, "BrandX");
        assert_eq!(query.limit, 5);
        assert!(query.ttl.is_none());
    }

    #[test]
    fn test_topics_query_with_ttl() {
        let json = r#"{"brand": "BrandX", "limit": 3, "ttl": 60}"#;
        let query: TopicsQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.limit, 3);
        assert_eq!(query.ttl, Some(60));
    }

    #[test]
    fn test_validate_empty_brand() {
        let query = TopicsQuery {
            brand: "  ".to_string(),
            limit: 5,
            ttl: None,
        };
        assert!(query.validate().is_some());
    }

    #[test]
    fn test_validate_limit_bounds() {
        let mut query = TopicsQuery {
            brand: "BrandX".to_string(),
            limit: 0,
            ttl: None,
        };
        assert!(query.validate().is_some());

        query.limit = MAX_LIMIT + 1;
        assert!(query.validate().is_some());

        query.limit = MAX_LIMIT;
        assert!(query.validate().is_none());
    }
}
