use super::CollectionManager;
use crate::filter::{FilterField, FilterOperator, Predicate};
use media_catalog_sources::{FetchError, YearQualifier};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Title and year bounds for a metadata lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    pub title: String,
    pub year_min: Option<u32>,
    pub year_max: Option<u32>,
}

impl FetchQuery {
    /// Derive a lookup from filter predicates
    ///
    /// The title comes from the first TITLE predicate. RELEASED predicates
    /// supply the year bounds: `>=` sets the lower one, `<=` the upper one and
    /// any other operator both. `None` when there is no usable title.
    pub fn from_predicates(predicates: &[Predicate]) -> Option<Self> {
        let title = predicates
            .iter()
            .find(|p| p.field == FilterField::Title)
            .map(|p| p.value.trim())
            .filter(|t| !t.is_empty())?;

        let mut query = FetchQuery {
            title: title.to_string(),
            year_min: None,
            year_max: None,
        };
        for predicate in predicates.iter().filter(|p| p.field == FilterField::Released) {
            let Ok(year) = predicate.value.trim().parse::<u32>() else {
                debug!("Ignoring non-numeric year '{}' for fetch", predicate.value);
                continue;
            };
            match predicate.operator {
                FilterOperator::GreaterOrEqual => query.year_min = Some(year),
                FilterOperator::LessOrEqual => query.year_max = Some(year),
                FilterOperator::Equals | FilterOperator::Contains => {
                    query.year_min = Some(year);
                    query.year_max = Some(year);
                }
            }
        }
        Some(query)
    }

    pub fn qualifier(&self) -> Option<YearQualifier> {
        YearQualifier::from_bounds(self.year_min, self.year_max)
    }
}

impl CollectionManager {
    /// Look `title` up in the metadata source and merge the results into the catalog
    ///
    /// Returns how many records were new. A missing source, a failed lookup or
    /// a timeout all count as zero results. The catalog is only written when
    /// it grew.
    pub async fn fetch_and_merge_by_title(&mut self, title: &str, year_min: Option<u32>, year_max: Option<u32>) -> usize {
        let title = title.trim();
        if title.is_empty() {
            return 0;
        }
        let Some(fetcher) = self.fetcher.as_deref() else {
            debug!("No metadata source configured, skipping lookup for '{}'", title);
            return 0;
        };

        let qualifier = YearQualifier::from_bounds(year_min, year_max);
        let result = match timeout(self.fetch_timeout, fetcher.fetch(title, qualifier)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout.as_secs())),
        };
        let candidates = match result {
            Ok(records) => records,
            Err(e) => {
                warn!("{} lookup for '{}' failed: {}", fetcher.source_name(), title, e);
                return 0;
            }
        };

        let fetched = candidates.len();
        let inserted = self.store.merge_all(candidates);
        if inserted > 0 {
            self.persist_store();
        }
        info!(
            "Lookup for '{}' ({}) returned {} record(s), {} new",
            title,
            qualifier.map(|q| q.to_string()).unwrap_or_else(|| "any year".to_string()),
            fetched,
            inserted
        );
        inserted
    }

    /// Fetch using the title and years found in `predicates`
    pub async fn fetch_for_filter(&mut self, predicates: &[Predicate]) -> usize {
        match FetchQuery::from_predicates(predicates) {
            Some(query) => {
                self.fetch_and_merge_by_title(&query.title, query.year_min, query.year_max)
                    .await
            }
            None => {
                debug!("Filter has no title, nothing to fetch");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_title_and_range() {
        let predicates = vec![
            Predicate::new(FilterField::Genre, FilterOperator::Contains, "drama"),
            Predicate::new(FilterField::Title, FilterOperator::Contains, " matrix "),
            Predicate::new(FilterField::Released, FilterOperator::GreaterOrEqual, "1990"),
            Predicate::new(FilterField::Released, FilterOperator::LessOrEqual, "2005"),
        ];
        let query = FetchQuery::from_predicates(&predicates).unwrap();
        assert_eq!(query.title, "matrix");
        assert_eq!(query.qualifier(), Some(YearQualifier::Range(1990, 2005)));
    }

    #[test]
    fn test_query_single_year_is_exact() {
        let predicates = vec![
            Predicate::new(FilterField::Title, FilterOperator::Equals, "Titanic"),
            Predicate::new(FilterField::Released, FilterOperator::GreaterOrEqual, "1997"),
        ];
        let query = FetchQuery::from_predicates(&predicates).unwrap();
        assert_eq!(query.qualifier(), Some(YearQualifier::Exact(1997)));
    }

    #[test]
    fn test_query_needs_a_title() {
        let predicates = vec![Predicate::new(FilterField::Released, FilterOperator::Equals, "1999")];
        assert_eq!(FetchQuery::from_predicates(&predicates), None);
    }
}
