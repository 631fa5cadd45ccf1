use std::{collections::BTreeMap, fmt, io, sync::Arc};

use thiserror::Error;

/// What went wrong while decoding. Every kind aborts the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("bad-magic")]
    BadMagic,
    #[error("unsupported-version")]
    UnsupportedVersion,
    #[error("unexpected-tag")]
    UnexpectedTag,
    #[error("negative-length")]
    NegativeLength,
    #[error("invalid-encoding")]
    InvalidEncoding,
    #[error("invalid-line-type")]
    InvalidLineType,
    #[error("unknown-animation-tag")]
    UnknownAnimationTag,
    #[error("truncated-input")]
    TruncatedInput,
    #[error("invalid-record-size")]
    InvalidRecordSize,
    #[error("count-mismatch")]
    CountMismatch,
    #[error("invalid-enum-value")]
    InvalidEnumValue,
    #[error("io-error")]
    Io,
}

#[derive(Debug, Clone)]
pub struct FormatError {
    pub kind: FormatErrorKind,
    /// Absolute byte offset in the input, when known.
    pub offset: Option<usize>,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<Arc<dyn std::error::Error + Send + Sync>>,
}

pub type Result<T, E = FormatError> = std::result::Result<T, E>;

impl FormatError {
    pub fn new(kind: FormatErrorKind) -> Self {
        Self {
            kind,
            offset: None,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(Arc::new(cause));
        self
    }

    pub fn arg(&self, k: &str) -> Option<&str> {
        self.args.get(k).map(String::as_str)
    }
}

/// Renders a 4-byte tag for error arguments, escaping non-printable bytes.
pub(crate) fn tag_display(tag: &[u8]) -> String {
    tag.escape_ascii().to_string()
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(offset) = self.offset {
            write!(f, " at {offset:#x}")?;
        }
        if self.args.is_empty() {
            return Ok(());
        }
        write!(f, " (")?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        FormatError::new(FormatErrorKind::Io).push_std(err)
    }
}
