/// Result alias that carries the custom [`DirectorsChairError`] type.
pub type Result<T> = std::result::Result<T, DirectorsChairError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum DirectorsChairError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON (de)serialization errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A textual control value that is not a member of the field's closed set.
    #[error("`{value}` is not a valid {field}")]
    InvalidControl { field: &'static str, value: String },
    /// A numeric control value outside of the field's declared bound.
    #[error("{field} must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u16,
        max: u16,
    },
    /// The picked file does not look like an image the picker accepts.
    #[error("unsupported reference image `{0}`")]
    UnsupportedImage(String),
    /// Lookup of a record that does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

impl DirectorsChairError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn invalid_control(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidControl {
            field,
            value: value.into(),
        }
    }
}

impl From<&str> for DirectorsChairError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DirectorsChairError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
