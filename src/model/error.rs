use std::fmt;

#[derive(Debug)]
pub enum ProcessorError {
    InvalidArguments(String),
    IoError(std::io::Error),
    CsvError(csv::Error),
    HttpError(reqwest::Error),
    UrlError(url::ParseError),
    /// A row could not be transformed; the run stops here.
    RowRejected { line: u64 },
}

impl fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcessorError::InvalidArguments(msg) => write!(f, "Invalid arguments: {}", msg),
            ProcessorError::IoError(err) => write!(f, "I/O error: {}", err),
            ProcessorError::CsvError(err) => write!(f, "CSV error: {}", err),
            ProcessorError::HttpError(err) => write!(f, "HTTP error: {}", err),
            ProcessorError::UrlError(err) => write!(f, "URL error: {}", err),
            ProcessorError::RowRejected { line } => {
                write!(f, "Row rejected at line {}, aborting", line)
            }
        }
    }
}

impl std::error::Error for ProcessorError {}

impl From<std::io::Error> for ProcessorError {
    fn from(err: std::io::Error) -> Self {
        ProcessorError::IoError(err)
    }
}

impl From<csv::Error> for ProcessorError {
    fn from(err: csv::Error) -> Self {
        ProcessorError::CsvError(err)
    }
}

impl From<reqwest::Error> for ProcessorError {
    fn from(err: reqwest::Error) -> Self {
        ProcessorError::HttpError(err)
    }
}

impl From<url::ParseError> for ProcessorError {
    fn from(err: url::ParseError) -> Self {
        ProcessorError::UrlError(err)
    }
}
