use crate::error::CodecError;
use media_catalog_models::{split_list, MediaRecord};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::debug;

/// Flat row layout: list fields are joined with ", "
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    imdb_id: String,
    title: String,
    year: Option<u32>,
    #[serde(default)]
    genres: String,
    #[serde(default)]
    rated: String,
    #[serde(default)]
    released: Option<String>,
    #[serde(default)]
    runtime_minutes: Option<u32>,
    #[serde(default)]
    director: String,
    #[serde(default)]
    writer: String,
    #[serde(default)]
    actors: String,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    languages: String,
    #[serde(default)]
    countries: String,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    imdb_rating: Option<f64>,
    #[serde(default)]
    box_office: String,
    #[serde(default)]
    media_type: String,
    #[serde(default)]
    watched: Option<bool>,
    #[serde(default)]
    my_rating: Option<f64>,
}

impl From<&MediaRecord> for CsvRow {
    fn from(record: &MediaRecord) -> Self {
        Self {
            imdb_id: record.imdb_id.clone(),
            title: record.title.clone(),
            year: record.year,
            genres: record.genres_joined(),
            rated: record.rated.clone(),
            released: record.released.clone(),
            runtime_minutes: record.runtime_minutes,
            director: record.director.clone(),
            writer: record.writer.clone(),
            actors: record.actors.clone(),
            plot: record.plot.clone(),
            languages: record.languages_joined(),
            countries: record.countries_joined(),
            poster: record.poster.clone(),
            imdb_rating: record.imdb_rating,
            box_office: record.box_office.clone(),
            media_type: record.media_type.clone(),
            watched: Some(record.watched),
            my_rating: record.my_rating,
        }
    }
}

impl CsvRow {
    fn into_record(self) -> MediaRecord {
        let mut record = MediaRecord::new(self.imdb_id, self.title, self.year);
        record.genres = split_list(&self.genres);
        record.rated = self.rated;
        record.released = self.released.filter(|s| !s.is_empty());
        record.runtime_minutes = self.runtime_minutes;
        record.director = self.director;
        record.writer = self.writer;
        record.actors = self.actors;
        record.plot = self.plot.filter(|s| !s.is_empty());
        record.languages = split_list(&self.languages);
        record.countries = split_list(&self.countries);
        record.poster = self.poster.filter(|s| !s.is_empty());
        record.imdb_rating = self.imdb_rating;
        if !self.box_office.is_empty() {
            record.box_office = self.box_office;
        }
        if !self.media_type.is_empty() {
            record.media_type = self.media_type;
        }
        record.watched = self.watched.unwrap_or(false);
        record.my_rating = self.my_rating;
        record
    }
}

pub(super) fn read<R: Read>(reader: R) -> Result<Vec<MediaRecord>, CodecError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (row_index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        if row.imdb_id.trim().is_empty() {
            return Err(CodecError::invalid(format!("CSV row {} has an empty imdb_id", row_index + 1)));
        }
        if row_index < 3 {
            debug!(row = row_index + 1, imdb_id = %row.imdb_id, title = %row.title, "Parsing CSV row");
        }
        records.push(row.into_record());
    }

    Ok(records)
}

pub(super) fn write<'a, I, W>(records: I, writer: W) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
    W: Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
