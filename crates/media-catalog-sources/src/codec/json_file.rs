use crate::error::CodecError;
use media_catalog_models::MediaRecord;
use std::io::{Read, Write};

pub(super) fn read<R: Read>(reader: R) -> Result<Vec<MediaRecord>, CodecError> {
    let records: Vec<MediaRecord> = serde_json::from_reader(reader)?;
    if let Some(bad) = records.iter().position(|r| r.imdb_id.trim().is_empty()) {
        return Err(CodecError::invalid(format!("record #{} has an empty imdb_id", bad + 1)));
    }
    Ok(records)
}

pub(super) fn write<'a, I, W>(records: I, writer: W) -> Result<(), CodecError>
where
    I: IntoIterator<Item = &'a MediaRecord>,
    W: Write,
{
    let records: Vec<&MediaRecord> = records.into_iter().collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}
