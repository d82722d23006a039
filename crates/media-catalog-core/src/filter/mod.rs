//! Predicate filtering over catalog records
//!
//! A filter is a list of [`Predicate`]s combined with AND. Each predicate names
//! a record field, a comparison and a literal. Text comparisons ignore case;
//! ordered comparisons parse both sides as numbers and exclude the record when
//! either side does not parse.

mod options;

pub use options::{format_currency, FilterOptions};

use media_catalog_models::{parse_currency_amount, MediaRecord};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid filter '{0}', expected FIELD:OPERATOR:VALUE")]
    Malformed(String),

    #[error("Filter on {0} has an empty value")]
    EmptyValue(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Title,
    Genre,
    /// MPA rating, e.g. "PG-13"
    Mpa,
    /// Release year
    Released,
    /// IMDb user rating
    Imdb,
    BoxOffice,
    Director,
    Actor,
    Writer,
    Language,
    Country,
    ContentType,
    Runtime,
}

impl FilterField {
    pub const ALL: [FilterField; 13] = [
        FilterField::Title,
        FilterField::Genre,
        FilterField::Mpa,
        FilterField::Released,
        FilterField::Imdb,
        FilterField::BoxOffice,
        FilterField::Director,
        FilterField::Actor,
        FilterField::Writer,
        FilterField::Language,
        FilterField::Country,
        FilterField::ContentType,
        FilterField::Runtime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterField::Title => "TITLE",
            FilterField::Genre => "GENRE",
            FilterField::Mpa => "MPA",
            FilterField::Released => "RELEASED",
            FilterField::Imdb => "IMDB",
            FilterField::BoxOffice => "BOX_OFFICE",
            FilterField::Director => "DIRECTOR",
            FilterField::Actor => "ACTOR",
            FilterField::Writer => "WRITER",
            FilterField::Language => "LANGUAGE",
            FilterField::Country => "COUNTRY",
            FilterField::ContentType => "TYPE",
            FilterField::Runtime => "RUNTIME",
        }
    }

    /// Text of the field as compared by `Contains`/`Equals`; list fields join with ", "
    ///
    /// Ratings keep one decimal, the way they are displayed (8.0, not 8).
    fn text<'r>(&self, record: &'r MediaRecord) -> Cow<'r, str> {
        match self {
            FilterField::Title => Cow::Borrowed(&record.title),
            FilterField::Genre => Cow::Owned(record.genres_joined()),
            FilterField::Mpa => Cow::Borrowed(&record.rated),
            FilterField::Released => Cow::Owned(record.year.map(|y| y.to_string()).unwrap_or_default()),
            FilterField::Imdb => Cow::Owned(record.imdb_rating.map(|r| format!("{:.1}", r)).unwrap_or_default()),
            FilterField::BoxOffice => Cow::Borrowed(&record.box_office),
            FilterField::Director => Cow::Borrowed(&record.director),
            FilterField::Actor => Cow::Borrowed(&record.actors),
            FilterField::Writer => Cow::Borrowed(&record.writer),
            FilterField::Language => Cow::Owned(record.languages_joined()),
            FilterField::Country => Cow::Owned(record.countries_joined()),
            FilterField::ContentType => Cow::Borrowed(&record.media_type),
            FilterField::Runtime => Cow::Owned(record.runtime_minutes.map(|m| m.to_string()).unwrap_or_default()),
        }
    }

    /// Individual values of a list field, `None` for scalar fields
    fn values<'r>(&self, record: &'r MediaRecord) -> Option<&'r [String]> {
        match self {
            FilterField::Genre => Some(&record.genres),
            FilterField::Language => Some(&record.languages),
            FilterField::Country => Some(&record.countries),
            _ => None,
        }
    }

    fn number(&self, record: &MediaRecord) -> Option<f64> {
        match self {
            FilterField::Released => record.year.map(f64::from),
            FilterField::Imdb => record.imdb_rating,
            FilterField::BoxOffice => record.box_office_amount().map(|amount| amount as f64),
            FilterField::Runtime => record.runtime_minutes.map(f64::from),
            _ => self.text(record).trim().parse().ok(),
        }
    }

    /// Parse a literal the same way the field itself is read
    fn parse_literal(&self, literal: &str) -> Option<f64> {
        let literal = literal.trim();
        match self {
            FilterField::Released | FilterField::Runtime => literal.parse::<i64>().ok().map(|n| n as f64),
            FilterField::BoxOffice => parse_currency_amount(literal).map(|amount| amount as f64),
            _ => literal.parse().ok(),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        let field = match normalized.as_str() {
            "TITLE" => FilterField::Title,
            "GENRE" | "GENRES" => FilterField::Genre,
            "MPA" | "RATED" => FilterField::Mpa,
            "RELEASED" | "YEAR" => FilterField::Released,
            "IMDB" | "RATING" | "IMDB_RATING" => FilterField::Imdb,
            "BOX_OFFICE" | "BOXOFFICE" => FilterField::BoxOffice,
            "DIRECTOR" => FilterField::Director,
            "ACTOR" | "ACTORS" => FilterField::Actor,
            "WRITER" => FilterField::Writer,
            "LANGUAGE" | "LANGUAGES" => FilterField::Language,
            "COUNTRY" | "COUNTRIES" => FilterField::Country,
            "TYPE" | "CONTENT_TYPE" => FilterField::ContentType,
            "RUNTIME" => FilterField::Runtime,
            _ => return Err(FilterError::UnknownField(s.to_string())),
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Case-insensitive substring
    Contains,
    /// Case-insensitive equality
    Equals,
    GreaterOrEqual,
    LessOrEqual,
}

impl FilterOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "~",
            FilterOperator::Equals => "==",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::GreaterOrEqual => "gte",
            FilterOperator::LessOrEqual => "lte",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "contains" | "~" => FilterOperator::Contains,
            "equals" | "eq" | "==" | "=" => FilterOperator::Equals,
            "gte" | "greaterorequal" | ">=" => FilterOperator::GreaterOrEqual,
            "lte" | "lessorequal" | "<=" => FilterOperator::LessOrEqual,
            _ => return Err(FilterError::UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

/// One `field operator literal` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: FilterField,
    pub operator: FilterOperator,
    pub value: String,
}

impl Predicate {
    pub fn new(field: FilterField, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &MediaRecord) -> bool {
        match self.operator {
            FilterOperator::Contains => {
                let needle = self.value.to_lowercase();
                match self.field.values(record) {
                    Some(values) => values.iter().any(|v| v.to_lowercase().contains(&needle)),
                    None => self.field.text(record).to_lowercase().contains(&needle),
                }
            }
            FilterOperator::Equals => {
                let literal = self.value.trim().to_lowercase();
                let element_match = self
                    .field
                    .values(record)
                    .map(|values| values.iter().any(|v| v.to_lowercase() == literal))
                    .unwrap_or(false);
                element_match || self.field.text(record).trim().to_lowercase() == literal
            }
            FilterOperator::GreaterOrEqual => self.compare(record, |actual, bound| actual >= bound),
            FilterOperator::LessOrEqual => self.compare(record, |actual, bound| actual <= bound),
        }
    }

    fn compare(&self, record: &MediaRecord, cmp: impl Fn(f64, f64) -> bool) -> bool {
        match (self.field.number(record), self.field.parse_literal(&self.value)) {
            (Some(actual), Some(bound)) => cmp(actual, bound),
            _ => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator.symbol(), self.value)
    }
}

impl FromStr for Predicate {
    type Err = FilterError;

    /// `FIELD:OPERATOR:VALUE`, e.g. `genre:contains:drama` or `year:>=:1990`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (field, operator, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(operator), Some(value)) => (field, operator, value),
            _ => return Err(FilterError::Malformed(s.to_string())),
        };

        let field: FilterField = field.parse()?;
        let operator: FilterOperator = operator.parse()?;
        if value.trim().is_empty() {
            return Err(FilterError::EmptyValue(field.to_string()));
        }
        Ok(Predicate::new(field, operator, value.trim()))
    }
}

/// Build a predicate list from optional inputs, dropping blank ones
pub fn build_predicates<I, S>(entries: I) -> Vec<Predicate>
where
    I: IntoIterator<Item = (FilterField, FilterOperator, Option<S>)>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter_map(|(field, operator, value)| {
            let value = value?;
            let value = value.as_ref().trim();
            if value.is_empty() {
                None
            } else {
                Some(Predicate::new(field, operator, value))
            }
        })
        .collect()
}

/// Records satisfying every predicate, in input order
///
/// Lazy: records are tested as the result is consumed. An empty predicate list
/// passes everything through.
pub fn evaluate<'a, I>(predicates: &'a [Predicate], records: I) -> impl Iterator<Item = &'a MediaRecord> + 'a
where
    I: IntoIterator<Item = &'a MediaRecord>,
    I::IntoIter: 'a,
{
    records
        .into_iter()
        .filter(move |record| predicates.iter().all(|p| p.matches(record)))
}
