use crate::error::CodecError;
use media_catalog_models::MediaRecord;
use std::io::Write;

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Human-readable listing, one block per record
pub(super) fn write<'a, I, W>(records: I, mut writer: W) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
    W: Write,
{
    for (i, record) in records.into_iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        match record.year {
            Some(year) => writeln!(writer, "{} ({})", record.title, year)?,
            None => writeln!(writer, "{}", record.title)?,
        }
        writeln!(writer, "  IMDb ID:     {}", record.imdb_id)?;
        writeln!(writer, "  Type:        {}", or_na(&record.media_type))?;
        writeln!(writer, "  Rated:       {}", or_na(&record.rated))?;
        writeln!(writer, "  Released:    {}", or_na(record.released.as_deref().unwrap_or("")))?;
        match record.runtime_minutes {
            Some(minutes) => writeln!(writer, "  Runtime:     {} min", minutes)?,
            None => writeln!(writer, "  Runtime:     N/A")?,
        }
        writeln!(writer, "  Genres:      {}", or_na(&record.genres_joined()))?;
        writeln!(writer, "  Director:    {}", or_na(&record.director))?;
        writeln!(writer, "  Writer:      {}", or_na(&record.writer))?;
        writeln!(writer, "  Actors:      {}", or_na(&record.actors))?;
        writeln!(writer, "  Languages:   {}", or_na(&record.languages_joined()))?;
        writeln!(writer, "  Countries:   {}", or_na(&record.countries_joined()))?;
        match record.imdb_rating {
            Some(rating) => writeln!(writer, "  IMDb Rating: {:.1}", rating)?,
            None => writeln!(writer, "  IMDb Rating: N/A")?,
        }
        writeln!(writer, "  Box Office:  {}", or_na(&record.box_office))?;
        writeln!(writer, "  Watched:     {}", if record.watched { "yes" } else { "no" })?;
        if let Some(rating) = record.my_rating {
            writeln!(writer, "  My Rating:   {:.1}", rating)?;
        }
        if let Some(plot) = record.plot.as_deref().filter(|p| !p.is_empty()) {
            writeln!(writer, "  Plot:        {}", plot)?;
        }
    }
    Ok(())
}
