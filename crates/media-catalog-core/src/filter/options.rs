use media_catalog_models::MediaRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Values a filter can meaningfully be built from, derived from a record set
///
/// Categorical lists are sorted and distinct. Ranges are `None` when no record
/// carries a usable value for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub content_types: Vec<String>,
    pub genres: Vec<String>,
    pub ratings: Vec<String>,
    pub languages: Vec<String>,
    pub countries: Vec<String>,
    pub year_range: Option<(u32, u32)>,
    pub imdb_rating_range: Option<(f64, f64)>,
    pub box_office_range: Option<(u64, u64)>,
}

fn widen<T: PartialOrd + Copy>(range: &mut Option<(T, T)>, value: T) {
    *range = match *range {
        None => Some((value, value)),
        Some((lo, hi)) => Some((
            if value < lo { value } else { lo },
            if value > hi { value } else { hi },
        )),
    };
}

fn insert_text(set: &mut BTreeSet<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !value.eq_ignore_ascii_case("N/A") {
        set.insert(value.to_string());
    }
}

impl FilterOptions {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a MediaRecord>,
    {
        let mut content_types = BTreeSet::new();
        let mut genres = BTreeSet::new();
        let mut ratings = BTreeSet::new();
        let mut languages = BTreeSet::new();
        let mut countries = BTreeSet::new();
        let mut options = FilterOptions::default();

        for record in records {
            insert_text(&mut content_types, &record.media_type);
            insert_text(&mut ratings, &record.rated);
            record.genres.iter().for_each(|g| insert_text(&mut genres, g));
            record.languages.iter().for_each(|l| insert_text(&mut languages, l));
            record.countries.iter().for_each(|c| insert_text(&mut countries, c));

            if let Some(year) = record.year {
                widen(&mut options.year_range, year);
            }
            if let Some(rating) = record.imdb_rating.filter(|r| r.is_finite()) {
                widen(&mut options.imdb_rating_range, rating);
            }
            if let Some(amount) = record.box_office_amount() {
                widen(&mut options.box_office_range, amount);
            }
        }

        options.content_types = content_types.into_iter().collect();
        options.genres = genres.into_iter().collect();
        options.ratings = ratings.into_iter().collect();
        options.languages = languages.into_iter().collect();
        options.countries = countries.into_iter().collect();
        options
    }

    /// Box office range as currency text, e.g. ("$1,000", "$2,500,000")
    pub fn box_office_range_display(&self) -> Option<(String, String)> {
        self.box_office_range
            .map(|(lo, hi)| (format_currency(lo), format_currency(hi)))
    }
}

/// 1234567 -> "$1,234,567"
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}
