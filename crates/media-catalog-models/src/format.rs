use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File formats supported for persistence, import and export
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Xml,
    Csv,
    /// Human-readable text listing (write-only)
    Pretty,
}

impl Format {
    /// Map a file extension to a format (case-insensitive). `txt` is the pretty listing.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            "csv" => Some(Format::Csv),
            "txt" | "pretty" => Some(Format::Pretty),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Csv => "csv",
            Format::Pretty => "txt",
        }
    }

    pub fn is_readable(&self) -> bool {
        !matches!(self, Format::Pretty)
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Json
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Csv => "csv",
            Format::Pretty => "pretty",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
        assert_eq!(Format::from_extension("xml"), Some(Format::Xml));
        assert_eq!(Format::from_extension("Csv"), Some(Format::Csv));
        assert_eq!(Format::from_extension("txt"), Some(Format::Pretty));
        assert_eq!(Format::from_extension("yaml"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path(&PathBuf::from("lists/Favorites.json")), Some(Format::Json));
        assert_eq!(Format::from_path(&PathBuf::from("notes.TXT")), Some(Format::Pretty));
        assert_eq!(Format::from_path(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn test_pretty_is_write_only() {
        assert!(!Format::Pretty.is_readable());
        assert!(Format::Csv.is_readable());
        assert_eq!(Format::Pretty.extension(), "txt");
    }
}
