//! Error types for the engine.
//!
//! Hand-rolled `Display`/`Error` impls over small structs carrying a message
//! and a source position, rather than reaching for a derive-macro error
//! crate.
use std::fmt::{self, Display, Formatter};

/// A `(line, column)` pair into the originally-parsed source text.
///
/// Both are 1-based, matching the convention of most editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub line: usize,
    pub col: usize,
}

impl SourceSpan {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl Display for SourceSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Why a statement, condition, or value expression failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    Lexical(String),
    Syntax(String),
    UnresolvedName(String),
    UnresolvedFunction(String),
    UnresolvedEnum(String),
    UnresolvedField { structure: String, field: String },
    UppercaseLowercaseRule(String),
    IndexedEditor(String),
    MissingRequiredArgument { function: String, argument: String },
    DuplicateNamedArgument(String),
    PositionalAfterNamed,
}

impl Display for CompileErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical(msg) => write!(f, "lexical error: {msg}"),
            Self::Syntax(msg) => write!(f, "syntax error: {msg}"),
            Self::UnresolvedName(name) => write!(f, "unresolved name '{name}'"),
            Self::UnresolvedFunction(name) => write!(f, "unresolved function '{name}'"),
            Self::UnresolvedEnum(name) => write!(f, "unresolved enum symbol '{name}'"),
            Self::UnresolvedField { structure, field } => {
                write!(f, "type '{structure}' has no field '{field}'")
            }
            Self::UppercaseLowercaseRule(name) => write!(
                f,
                "'{name}' violates the editor/converter naming rule (editors start lowercase, converters start uppercase)"
            ),
            Self::IndexedEditor(name) => write!(f, "editor '{name}' may not be indexed"),
            Self::MissingRequiredArgument { function, argument } => write!(
                f,
                "missing required argument '{argument}' in call to '{function}'"
            ),
            Self::DuplicateNamedArgument(name) => write!(f, "duplicate named argument '{name}'"),
            Self::PositionalAfterNamed => {
                write!(f, "positional argument may not follow a named argument")
            }
        }
    }
}

/// A compile-time failure, carrying the position in source where it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub span: SourceSpan,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, span: SourceSpan) -> Self {
        Self { kind, span }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for CompileError {}

pub type CompileResult<T> = Result<T, CompileError>;

/// A runtime failure. Unlike `CompileError`, these are usually carried
/// *inside* the expression tree as error-values rather than returned
/// directly, but the type itself is plain data either way.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    Conversion { from: String, to: String },
    MissingCapability { type_name: String, capability: &'static str },
    ArityMismatch { function: String, expected: usize, found: usize },
    DivisionByZero,
    HostRejected(String),
    IndexOutOfRange { index: i64, len: usize },
    KeyNotFound(String),
    FieldNotFound { type_name: String, field: String },
    Cancelled,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversion { from, to } => write!(f, "cannot convert {from} to {to}"),
            Self::MissingCapability { type_name, capability } => {
                write!(f, "{type_name} does not support {capability}")
            }
            Self::ArityMismatch { function, expected, found } => write!(
                f,
                "{function} expects {expected} argument(s), found {found}"
            ),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::HostRejected(msg) => write!(f, "host rejected write: {msg}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::KeyNotFound(key) => write!(f, "key '{key}' not found"),
            Self::FieldNotFound { type_name, field } => {
                write!(f, "{type_name} has no field '{field}'")
            }
            Self::Cancelled => write!(f, "evaluation cancelled"),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Failure to write through a [`crate::value::Variable`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetError(pub String);

impl Display for SetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SetError {}

impl From<RuntimeError> for SetError {
    fn from(err: RuntimeError) -> Self {
        SetError(err.to_string())
    }
}
