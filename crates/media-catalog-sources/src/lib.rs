pub mod codec;
pub mod error;
pub mod omdb;
pub mod traits;

pub use codec::{
    read_records, read_records_from, read_records_with_format, write_records, write_records_to_file,
    write_records_to_file_with_format,
};
pub use error::{CodecError, FetchError};
pub use omdb::OmdbClient;
pub use traits::{MetadataFetcher, YearQualifier};
