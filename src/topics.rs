//! Topic Generation
//!
//! A deterministic topic generator, cached under the `topic-generation`
//! namespace. Stands in for the expensive generators route handlers call.

use crate::cache::{CallArgs, Computation};
use crate::error::CacheError;

/// Namespace topic results are cached under.
pub const NAMESPACE: &str = "topic-generation";

/// Upper bound on topics returned per request.
pub const MAX_LIMIT: usize = 20;

const TEMPLATES: &[&str] = &[
    "Why {} customers keep coming back",
    "{} behind the scenes",
    "5 myths about {}",
    "How {} started",
    "A day in the life at {}",
    "{} vs. the competition",
    "What's next for {}",
    "The {} buyer's guide",
    "{} community spotlight",
    "Lessons learned building {}",
];

// == Generate ==
/// Produces up to `limit` topic titles for `brand`.
///
/// Output depends only on the inputs. The starting template rotates with a
/// stable checksum of the brand name so different brands lead with
/// different topics.
pub fn generate_topics(brand: &str, limit: usize) -> Vec<String> {
    let brand = brand.trim();
    if brand.is_empty() {
        return Vec::new();
    }

    let offset = brand.bytes().fold(0usize, |acc, b| acc.wrapping_add(b as usize)) % TEMPLATES.len();
    let limit = limit.min(MAX_LIMIT);

    (0..limit)
        .map(|i| {
            let template = TEMPLATES[(offset + i) % TEMPLATES.len()];
            let title = template.replace("{}", brand);
            let round = i / TEMPLATES.len();
            if round == 0 {
                title
            } else {
                format!("{} (part {})", title, round + 1)
            }
        })
        .collect()
}

// == Topic Request ==
/// A cacheable topic-generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRequest {
    pub brand: String,
    pub limit: usize,
    pub ttl_seconds: Option<u64>,
}

impl TopicRequest {
    pub fn new(brand: impl Into<String>, limit: usize) -> Self {
        Self {
            brand: brand.into(),
            limit,
            ttl_seconds: None,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }
}

impl Computation for TopicRequest {
    type Output = Vec<String>;
    type Error = CacheError;

    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn ttl_seconds(&self) -> Option<u64> {
        self.ttl_seconds
    }

    fn args(&self) -> CallArgs {
        CallArgs::new()
            .arg(self.brand.clone())
            .named("limit", self.limit)
    }

    fn compute(&self) -> Result<Vec<String>, CacheError> {
        Ok(generate_topics(&self.brand, self.limit))
    }
}
