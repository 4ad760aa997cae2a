use thiserror::Error;

/// Errors raised while sorting a label document.
///
/// Only [`SortError::Schema`] and the I/O family ([`SortError::Io`],
/// [`SortError::Pdf`], [`SortError::Spreadsheet`], [`SortError::Csv`]) abort
/// a run. Extraction problems are absorbed into empty identifiers and
/// unmatched targets are reported as data, never as errors.
#[derive(Error, Debug)]
pub enum SortError {
    #[error("Missing required column(s): {} (found: {})", .missing.join(", "), .found.join(", "))]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Page index {0} out of bounds (document has {1} pages)")]
    PageIndexOutOfBounds(usize, usize),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Extraction error: {0}")]
    Extraction(String),
}

impl SortError {
    /// Whether this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SortError::Extraction(_))
    }
}

impl From<calamine::Error> for SortError {
    fn from(err: calamine::Error) -> Self {
        SortError::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SortError>;
