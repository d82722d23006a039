use super::*;
use crate::error::CodecError;
use media_catalog_models::{Format, MediaRecord};
use std::io::Cursor;

fn matrix() -> MediaRecord {
    let mut record = MediaRecord::new("tt0133093", "The Matrix", Some(1999))
        .with_genres(["Action", "Sci-Fi"])
        .with_imdb_rating(8.7)
        .with_box_office("$172,076,928");
    record.rated = "R".to_string();
    record.runtime_minutes = Some(136);
    record.director = "Lana Wachowski, Lilly Wachowski".to_string();
    record.actors = "Keanu Reeves, Laurence Fishburne".to_string();
    record.languages = vec!["English".to_string()];
    record.countries = vec!["United States".to_string(), "Australia".to_string()];
    record.watched = true;
    record.my_rating = Some(9.5);
    record
}

fn titanic() -> MediaRecord {
    let mut record = MediaRecord::new("tt0120338", "Titanic & <Friends>", Some(1997))
        .with_genres(["Drama", "Romance"]);
    record.plot = Some("A seventeen-year-old aristocrat falls in love.".to_string());
    record
}

fn write_to_string(records: &[MediaRecord], format: Format) -> String {
    let mut buf = Vec::new();
    write_records(records.iter(), &mut buf, format).unwrap();
    String::from_utf8(buf).unwrap()
}

fn assert_same_content(read: &[MediaRecord], original: &[MediaRecord]) {
    assert_eq!(read.len(), original.len());
    for (a, b) in read.iter().zip(original) {
        assert_eq!(a.imdb_id, b.imdb_id);
        assert_eq!(a.title, b.title);
        assert_eq!(a.year, b.year);
        assert_eq!(a.genres, b.genres);
        assert_eq!(a.countries, b.countries);
        assert_eq!(a.box_office, b.box_office);
        assert_eq!(a.imdb_rating, b.imdb_rating);
        assert_eq!(a.watched, b.watched);
        assert_eq!(a.my_rating, b.my_rating);
        assert_eq!(a.plot, b.plot);
    }
}

#[test]
fn test_json_preserves_order_and_user_state() {
    let original = vec![titanic(), matrix()];
    let text = write_to_string(&original, Format::Json);
    let read = read_records_from(Cursor::new(text), Format::Json).unwrap();
    assert_same_content(&read, &original);
    assert_eq!(read[0].imdb_id, "tt0120338");
}

#[test]
fn test_xml_escapes_and_reads_lists() {
    let original = vec![matrix(), titanic()];
    let text = write_to_string(&original, Format::Xml);
    assert!(text.contains("<records>"));
    assert!(text.contains("&amp;"));

    let read = read_records_from(Cursor::new(text), Format::Xml).unwrap();
    assert_same_content(&read, &original);
    assert_eq!(read[0].runtime_minutes, Some(136));
}

#[test]
fn test_csv_joins_list_fields() {
    let original = vec![matrix(), titanic()];
    let text = write_to_string(&original, Format::Csv);
    assert!(text.starts_with("imdb_id,title,year"));
    assert!(text.contains("\"Action, Sci-Fi\""));

    let read = read_records_from(Cursor::new(text), Format::Csv).unwrap();
    assert_same_content(&read, &original);
}

#[test]
fn test_pretty_is_write_only() {
    let text = write_to_string(&[matrix()], Format::Pretty);
    assert!(text.starts_with("The Matrix (1999)"));
    assert!(text.contains("IMDb ID:     tt0133093"));
    assert!(text.contains("Watched:     yes"));

    let err = read_records_from(Cursor::new(text), Format::Pretty).unwrap_err();
    assert!(matches!(err, CodecError::Unsupported(_)));
}

#[test]
fn test_malformed_json_is_an_error() {
    let err = read_records_from(Cursor::new("[{\"imdb_id\": "), Format::Json).unwrap_err();
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn test_record_without_identity_is_rejected() {
    let json = r#"[{"imdb_id": "", "title": "Nameless"}]"#;
    let err = read_records_from(Cursor::new(json), Format::Json).unwrap_err();
    assert!(matches!(err, CodecError::Invalid(_)));

    let xml = "<records><record><title>Nameless</title></record></records>";
    let err = read_records_from(Cursor::new(xml), Format::Xml).unwrap_err();
    assert!(matches!(err, CodecError::Invalid(_)));
}

#[test]
fn test_file_helpers_pick_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("Favorites.xml");
    let original = vec![matrix()];

    write_records_to_file(original.iter(), &path).unwrap();
    let read = read_records(&path).unwrap();
    assert_same_content(&read, &original);

    let unknown = dir.path().join("list.yaml");
    assert!(matches!(read_records(&unknown), Err(CodecError::Unsupported(_))));
}
