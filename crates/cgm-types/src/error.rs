use std::fmt;

use thiserror::Error;

/// Process exit codes surfaced by a merge run.
pub mod exit_code {
    /// Success, including a completed dry run.
    pub const SUCCESS: i32 = 0;
    /// Invalid input/output paths or arguments, missing descriptor, empty match set.
    pub const INPUT: i32 = 2;
    /// Structural problems in container content.
    pub const STRUCTURE: i32 = 3;
    /// The output container could not be created or opened.
    pub const OUTPUT: i32 = 4;
    /// Anything uncategorized.
    pub const UNEXPECTED: i32 = 10;
}

/// Classification of a merge failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad argument combination or missing required input.
    UserInput,
    /// An expected file, directory, dataset or match set is absent.
    NotFound,
    /// Something already occupies a path the run wants to create.
    Conflict,
    /// The input exists but is not a usable project.
    Invalid,
    /// Cardinality, shape, or content violations inside a container.
    InvalidStructure,
    /// A generated pointer name does not fit its name-table row.
    NameTooLong,
    /// The output container could not be created.
    CannotCreate,
    /// The output container could not be opened for writing.
    CannotOpen,
    /// Anything not classified above.
    Unexpected,
}

impl ErrorKind {
    /// Exit code used when the raising site does not pick one explicitly.
    pub fn default_exit_code(self) -> i32 {
        match self {
            Self::UserInput | Self::NotFound | Self::Conflict | Self::Invalid => exit_code::INPUT,
            Self::InvalidStructure | Self::NameTooLong => exit_code::STRUCTURE,
            Self::CannotCreate | Self::CannotOpen => exit_code::OUTPUT,
            Self::Unexpected => exit_code::UNEXPECTED,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserInput => "user input",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Invalid => "invalid",
            Self::InvalidStructure => "invalid structure",
            Self::NameTooLong => "name too long",
            Self::CannotCreate => "cannot create",
            Self::CannotOpen => "cannot open",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A merge failure tagged with its kind, exit code, and skip eligibility.
///
/// Only entry-level failures raised with [`MergeError::skippable`] may be
/// downgraded to a warning under the skip policy; everything else aborts the
/// run with [`MergeError::exit_code`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct MergeError {
    kind: ErrorKind,
    message: String,
    exit_code: i32,
    skip_allowed: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl MergeError {
    /// Create an error with the kind's default exit code. Not skippable.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            exit_code: kind.default_exit_code(),
            skip_allowed: false,
            source: None,
        }
    }

    pub fn user_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserInput, message)
    }

    /// A missing path or empty match set (exit 2).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// A dataset that is missing or empty inside a container (exit 3).
    pub fn missing_content(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message).with_exit_code(exit_code::STRUCTURE)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidStructure, message)
    }

    pub fn name_too_long(name: &str, width: usize) -> Self {
        Self::new(
            ErrorKind::NameTooLong,
            format!(
                "pointer name too long: {name} (limit {} bytes)",
                width.saturating_sub(1)
            ),
        )
    }

    pub fn cannot_create(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CannotCreate, message)
    }

    pub fn cannot_open(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CannotOpen, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Mark this error as eligible for the skip policy.
    pub fn skippable(mut self) -> Self {
        self.skip_allowed = true;
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Attach the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn skip_allowed(&self) -> bool {
        self.skip_allowed
    }
}

impl From<std::io::Error> for MergeError {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(format!("I/O error: {err}")).with_source(err)
    }
}

/// Result alias used by every merge stage.
pub type MergeResult<T> = Result<T, MergeError>;
