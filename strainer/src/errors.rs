use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::{atomic, Atomic};

/// Error kinds for filter compilation.
///
/// This enum represents all possible error types that can occur while compiling
/// a search filter. Each error kind describes a specific category of failure,
/// enabling precise error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use strainer::errors::{FilterError, ErrorKind, FilterResult};
///
/// fn example() -> FilterResult<()> {
///     Err(FilterError::new("Unknown operator $foo", ErrorKind::UnknownOperator))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Wrong JSON kind at a grammar position (e.g. a combinator given an
    /// object instead of an array, or $not given an array)
    MalformedFilter,
    /// An unrecognized operator key inside a selector object
    UnknownOperator,
    /// Wrong number of operator fields or arguments (e.g. two operators in
    /// one selector, or a $mod array that isn't two elements long)
    ArityMismatch,
    /// A literal failed to classify as the operator requires
    TypeMismatch,
    /// A literal's representation was requested under the wrong type tag
    UnsupportedAccessor,
    /// Filter nesting or node count exceeded the configured parse limits
    LimitExceeded,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MalformedFilter => write!(f, "Malformed filter"),
            ErrorKind::UnknownOperator => write!(f, "Unknown operator"),
            ErrorKind::ArityMismatch => write!(f, "Arity mismatch"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch"),
            ErrorKind::UnsupportedAccessor => write!(f, "Unsupported accessor"),
            ErrorKind::LimitExceeded => write!(f, "Limit exceeded"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom filter compilation error type.
///
/// `FilterError` encapsulates error information including the error message, kind,
/// and optional cause. It supports error chaining and backtraces for debugging.
///
/// Parsing is deterministic and pure, so every error is surfaced immediately to
/// the caller with a message naming the offending operator or field; no partial
/// AST is ever returned.
///
/// # Examples
///
/// ```rust,ignore
/// use strainer::errors::{FilterError, ErrorKind};
///
/// // Create a simple error
/// let err = FilterError::new("Unknown operator $foo", ErrorKind::UnknownOperator);
///
/// // Create an error with a cause
/// let cause = FilterError::new("Not a comparison value", ErrorKind::TypeMismatch);
/// let err = FilterError::new_with_cause("Cannot parse $lt", ErrorKind::TypeMismatch, cause);
/// ```
///
/// # Type alias
///
/// The `FilterResult<T>` type alias is equivalent to `Result<T, FilterError>` and is
/// used throughout the crate for operations that can fail.
#[derive(Clone)]
pub struct FilterError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<FilterError>>,
    backtrace: Atomic<Backtrace>,
}

impl FilterError {
    /// Creates a new `FilterError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `FilterError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        FilterError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `FilterError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `FilterError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: FilterError) -> Self {
        FilterError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&FilterError> {
        self.cause.as_deref()
    }
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for FilterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for filter compilation.
///
/// `FilterResult<T>` is shorthand for `Result<T, FilterError>`.
/// All fallible operations in this crate return this type.
pub type FilterResult<T> = Result<T, FilterError>;

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::new(
            &format!("Invalid JSON in search filter: {}", err),
            ErrorKind::MalformedFilter,
        )
    }
}
