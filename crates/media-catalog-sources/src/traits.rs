use crate::error::FetchError;
use async_trait::async_trait;
use media_catalog_models::MediaRecord;
use std::fmt;

/// Year restriction passed along with a title query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearQualifier {
    Exact(u32),
    /// Inclusive range, always stored low..high
    Range(u32, u32),
}

impl YearQualifier {
    /// Build a qualifier from optional bounds
    ///
    /// A single bound, or two equal bounds, is an exact year. Two different
    /// bounds form a range regardless of the order they were given in.
    pub fn from_bounds(min: Option<u32>, max: Option<u32>) -> Option<Self> {
        match (min, max) {
            (Some(a), Some(b)) if a == b => Some(YearQualifier::Exact(a)),
            (Some(a), Some(b)) => Some(YearQualifier::Range(a.min(b), a.max(b))),
            (Some(a), None) | (None, Some(a)) => Some(YearQualifier::Exact(a)),
            (None, None) => None,
        }
    }

    pub fn contains(&self, year: u32) -> bool {
        match *self {
            YearQualifier::Exact(y) => y == year,
            YearQualifier::Range(lo, hi) => (lo..=hi).contains(&year),
        }
    }
}

impl fmt::Display for YearQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearQualifier::Exact(year) => write!(f, "{}", year),
            YearQualifier::Range(lo, hi) => write!(f, "{}-{}", lo, hi),
        }
    }
}

/// External metadata lookup by title
///
/// Implementations must return (possibly empty) within a bounded time. An empty
/// result is `Ok(vec![])`; errors are reserved for an unreachable or failing service.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch(&self, title: &str, year: Option<YearQualifier>) -> Result<Vec<MediaRecord>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bounds() {
        assert_eq!(YearQualifier::from_bounds(None, None), None);
        assert_eq!(YearQualifier::from_bounds(Some(1999), None), Some(YearQualifier::Exact(1999)));
        assert_eq!(YearQualifier::from_bounds(None, Some(2001)), Some(YearQualifier::Exact(2001)));
        assert_eq!(YearQualifier::from_bounds(Some(1999), Some(1999)), Some(YearQualifier::Exact(1999)));
        assert_eq!(YearQualifier::from_bounds(Some(2005), Some(1990)), Some(YearQualifier::Range(1990, 2005)));
    }

    #[test]
    fn test_display_is_the_query_token() {
        assert_eq!(YearQualifier::Exact(1999).to_string(), "1999");
        assert_eq!(YearQualifier::Range(1990, 1999).to_string(), "1990-1999");
    }

    #[test]
    fn test_contains() {
        let range = YearQualifier::Range(1990, 1999);
        assert!(range.contains(1990));
        assert!(range.contains(1999));
        assert!(!range.contains(2000));
        assert!(YearQualifier::Exact(1997).contains(1997));
    }
}
