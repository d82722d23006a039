//! Record file codecs
//!
//! Every collection file is a flat list of `MediaRecord`s. The format is picked
//! from the file extension (see `Format::from_extension`).

mod csv_file;
mod json_file;
mod text_file;
mod xml_file;

use crate::error::CodecError;
use media_catalog_models::{Format, MediaRecord};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Read a record file, detecting the format from its extension
pub fn read_records(path: &Path) -> Result<Vec<MediaRecord>, CodecError> {
    let format = Format::from_path(path)
        .ok_or_else(|| CodecError::unsupported(format!("unknown file extension: {}", path.display())))?;
    read_records_with_format(path, format)
}

pub fn read_records_with_format(path: &Path, format: Format) -> Result<Vec<MediaRecord>, CodecError> {
    let file = File::open(path)?;
    let records = read_records_from(BufReader::new(file), format)?;
    debug!("Read {} records from {} ({})", records.len(), path.display(), format);
    Ok(records)
}

pub fn read_records_from<R: Read>(reader: R, format: Format) -> Result<Vec<MediaRecord>, CodecError> {
    match format {
        Format::Json => json_file::read(reader),
        Format::Xml => xml_file::read(BufReader::new(reader)),
        Format::Csv => csv_file::read(reader),
        Format::Pretty => Err(CodecError::unsupported("the pretty text format cannot be read back")),
    }
}

pub fn write_records<'a, I, W>(records: I, writer: W, format: Format) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
    W: Write,
{
    match format {
        Format::Json => json_file::write(records, writer),
        Format::Xml => xml_file::write(records, writer),
        Format::Csv => csv_file::write(records, writer),
        Format::Pretty => text_file::write(records, writer),
    }
}

/// Replace `path` with the given records, format taken from the extension
pub fn write_records_to_file<'a, I>(records: I, path: &Path) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
{
    let format = Format::from_path(path)
        .ok_or_else(|| CodecError::unsupported(format!("unknown file extension: {}", path.display())))?;
    write_records_to_file_with_format(records, path, format)
}

pub fn write_records_to_file_with_format<'a, I>(records: I, path: &Path, format: Format) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_records(records, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests;
