use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for jsondb operations
///
/// Each kind describes one category of failure so callers can branch on
/// [JsonDbError::kind] instead of parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use jsondb::errors::{JsonDbError, ErrorKind, JsonDbResult};
///
/// fn example() -> JsonDbResult<()> {
///     Err(JsonDbError::new("Collection does not exist!", ErrorKind::CollectionNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Collection Errors
    /// The backing file of the collection does not exist
    CollectionNotFound,
    /// A collection with the same name already exists
    AlreadyExists,
    /// The collection name cannot be mapped to a file in the base directory
    InvalidCollectionName,
    /// The collection file exists but is not valid JSON of the expected shape
    CorruptData,

    // Query Errors
    /// The where-clause is malformed, or empty where a condition is required
    InvalidPredicate,
    /// No record matched a single-row mutation
    RecordNotFound,
    /// No record matched a multi-row mutation
    NoMatchingRows,
    /// No record in the collection carries the requested field
    KeyNotFound,

    // Operation Errors
    /// The operation is not valid for the given input
    InvalidOperation,

    // IO and Storage Errors
    /// Generic IO error
    IOError,
    /// The file was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::AlreadyExists => write!(f, "Already exists"),
            ErrorKind::InvalidCollectionName => write!(f, "Invalid collection name"),
            ErrorKind::CorruptData => write!(f, "Corrupt data"),
            ErrorKind::InvalidPredicate => write!(f, "Invalid predicate"),
            ErrorKind::RecordNotFound => write!(f, "Record not found"),
            ErrorKind::NoMatchingRows => write!(f, "No matching rows"),
            ErrorKind::KeyNotFound => write!(f, "Key not found"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom jsondb error type.
///
/// `JsonDbError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was raised.
///
/// # Examples
///
/// ```rust,ignore
/// use jsondb::errors::{JsonDbError, ErrorKind};
///
/// let err = JsonDbError::new("Record not found!", ErrorKind::RecordNotFound);
///
/// let cause = JsonDbError::new("disk full", ErrorKind::IOError);
/// let err = JsonDbError::new_with_cause("Something went wrong!", ErrorKind::IOError, cause);
/// ```
#[derive(Clone)]
pub struct JsonDbError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<JsonDbError>>,
    backtrace: Arc<Backtrace>,
}

impl JsonDbError {
    /// Creates a new `JsonDbError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        JsonDbError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new_unresolved()),
        }
    }

    /// Creates a new `JsonDbError` that wraps the error which caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: JsonDbError) -> Self {
        JsonDbError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new_unresolved()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&JsonDbError> {
        self.cause.as_deref()
    }

    /// Returns `true` when a mutation found nothing to act on, whether it
    /// targeted a single row or every matching row.
    pub fn is_record_not_found(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::RecordNotFound | ErrorKind::NoMatchingRows
        )
    }
}

impl Display for JsonDbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for JsonDbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = (*self.backtrace).clone();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for JsonDbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for jsondb operations.
pub type JsonDbResult<T> = Result<T, JsonDbError>;

impl From<std::io::Error> for JsonDbError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IOError,
        };
        JsonDbError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<serde_json::Error> for JsonDbError {
    fn from(err: serde_json::Error) -> Self {
        let error_kind = match err.classify() {
            serde_json::error::Category::Io => ErrorKind::IOError,
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Eof
            | serde_json::error::Category::Data => ErrorKind::CorruptData,
        };
        JsonDbError::new(&format!("JSON error: {}", err), error_kind)
    }
}

impl From<tempfile::PersistError> for JsonDbError {
    fn from(err: tempfile::PersistError) -> Self {
        err.error.into()
    }
}

impl From<String> for JsonDbError {
    fn from(msg: String) -> Self {
        JsonDbError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for JsonDbError {
    fn from(msg: &str) -> Self {
        JsonDbError::new(msg, ErrorKind::InternalError)
    }
}
