use crate::error::CodecError;
use media_catalog_models::MediaRecord;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;
use std::io::{BufRead, Write};

// Layout:
// <records>
//   <record>
//     <imdb_id>tt0133093</imdb_id>
//     <genres><genre>Action</genre></genres>
//     ...
//   </record>
// </records>

pub(super) fn read<R: BufRead>(reader: R) -> Result<Vec<MediaRecord>, CodecError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut records = Vec::new();
    let mut seen_root = false;
    let mut current_tag = String::new();
    let mut current: Option<MediaRecord> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag_name.as_str() {
                    "records" => seen_root = true,
                    "record" => current = Some(MediaRecord::new(String::new(), String::new(), None)),
                    _ => current_tag = tag_name,
                }
            }
            Event::Text(ref e) => {
                if let Some(ref mut record) = current {
                    let text = e.unescape()?.to_string();
                    apply_field(record, &current_tag, text)?;
                }
            }
            Event::End(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag_name == "record" {
                    if let Some(record) = current.take() {
                        if record.imdb_id.trim().is_empty() {
                            return Err(CodecError::invalid(format!(
                                "XML record #{} has no imdb_id",
                                records.len() + 1
                            )));
                        }
                        records.push(record);
                    }
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(CodecError::invalid("missing <records> root element"));
    }

    Ok(records)
}

fn parse_number<T: std::str::FromStr>(tag: &str, text: &str) -> Result<T, CodecError> {
    text.trim()
        .parse()
        .map_err(|_| CodecError::invalid(format!("invalid <{}> value: {}", tag, text)))
}

fn apply_field(record: &mut MediaRecord, tag: &str, text: String) -> Result<(), CodecError> {
    match tag {
        "imdb_id" => record.imdb_id = text,
        "title" => record.title = text,
        "year" => record.year = Some(parse_number(tag, &text)?),
        "genre" => record.genres.push(text),
        "rated" => record.rated = text,
        "released" => record.released = Some(text),
        "runtime_minutes" => record.runtime_minutes = Some(parse_number(tag, &text)?),
        "director" => record.director = text,
        "writer" => record.writer = text,
        "actors" => record.actors = text,
        "plot" => record.plot = Some(text),
        "language" => record.languages.push(text),
        "country" => record.countries.push(text),
        "poster" => record.poster = Some(text),
        "imdb_rating" => record.imdb_rating = Some(parse_number(tag, &text)?),
        "box_office" => record.box_office = text,
        "media_type" => record.media_type = text,
        "watched" => record.watched = parse_number(tag, &text)?,
        "my_rating" => record.my_rating = Some(parse_number(tag, &text)?),
        _ => {}
    }
    Ok(())
}

fn write_text<W: Write>(xml: &mut Writer<W>, tag: &str, text: &str) -> Result<(), CodecError> {
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_list<W: Write>(xml: &mut Writer<W>, outer: &str, inner: &str, values: &[String]) -> Result<(), CodecError> {
    xml.write_event(Event::Start(BytesStart::new(outer)))?;
    for value in values {
        write_text(xml, inner, value)?;
    }
    xml.write_event(Event::End(BytesEnd::new(outer)))?;
    Ok(())
}

pub(super) fn write<'a, I, W>(records: I, writer: W) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
    W: Write,
{
    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new("records")))?;

    for record in records {
        xml.write_event(Event::Start(BytesStart::new("record")))?;
        write_text(&mut xml, "imdb_id", &record.imdb_id)?;
        write_text(&mut xml, "title", &record.title)?;
        if let Some(year) = record.year {
            write_text(&mut xml, "year", &year.to_string())?;
        }
        write_list(&mut xml, "genres", "genre", &record.genres)?;
        write_text(&mut xml, "rated", &record.rated)?;
        if let Some(ref released) = record.released {
            write_text(&mut xml, "released", released)?;
        }
        if let Some(minutes) = record.runtime_minutes {
            write_text(&mut xml, "runtime_minutes", &minutes.to_string())?;
        }
        write_text(&mut xml, "director", &record.director)?;
        write_text(&mut xml, "writer", &record.writer)?;
        write_text(&mut xml, "actors", &record.actors)?;
        if let Some(ref plot) = record.plot {
            write_text(&mut xml, "plot", plot)?;
        }
        write_list(&mut xml, "languages", "language", &record.languages)?;
        write_list(&mut xml, "countries", "country", &record.countries)?;
        if let Some(ref poster) = record.poster {
            write_text(&mut xml, "poster", poster)?;
        }
        if let Some(rating) = record.imdb_rating {
            write_text(&mut xml, "imdb_rating", &rating.to_string())?;
        }
        write_text(&mut xml, "box_office", &record.box_office)?;
        write_text(&mut xml, "media_type", &record.media_type)?;
        write_text(&mut xml, "watched", &record.watched.to_string())?;
        if let Some(rating) = record.my_rating {
            write_text(&mut xml, "my_rating", &rating.to_string())?;
        }
        xml.write_event(Event::End(BytesEnd::new("record")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("records")))?;
    Ok(())
}
