//! Errors caused by faulty plan data.

use thiserror::Error;

/// Every fault in the user supplied table ends up here. None of them are
/// recoverable; the caller reports the message and stops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("unknown type \"{0}\"")]
    UnknownKind(String),

    #[error("value \"{0}\" of \"DimOffset\" must be a non-negative number")]
    InvalidDimOffset(String),

    #[error("malformed term \"{0}\"")]
    MalformedTerm(String),

    #[error("empty point expression")]
    EmptyExpression,

    #[error("cannot find any part with identifier \"{identifier}\" in layer \"{layer}\"")]
    PartNotFound { identifier: String, layer: String },

    #[error("there is more than one part with identifier \"{identifier}\" in layer \"{layer}\"")]
    DuplicatePart { identifier: String, layer: String },

    #[error("error parsing \"{0}\": referencing index must be greater than 0")]
    NonPositiveIndex(String),

    #[error("error parsing \"{term}\": part has only {count} point(s)")]
    IndexOutOfRange { term: String, count: usize },

    #[error("\"{0}\" references itself")]
    SelfReference(String),

    #[error("label needs at least one text column")]
    MissingLabelText,

    #[error("{0} entry needs a value")]
    MissingValue(String),

    #[error("{kind} needs {expected} point(s), got {got}")]
    PointCount {
        kind: String,
        expected: String,
        got: usize,
    },

    #[error("setting \"ScaleDivisor\" is mandatory")]
    MissingScaleDivisor,

    #[error("setting \"ScaleDivisor\" must be a positive integer, got \"{0}\"")]
    InvalidScaleDivisor(String),

    #[error("setting \"CompassRotation\" must be a number, got \"{0}\"")]
    InvalidCompassRotation(String),

    #[error("page size \"{0}\" is not supported")]
    UnsupportedPageSize(String),

    #[error("{}row \"{identifier}\" in layer \"{layer}\": {error}", line_prefix(.line))]
    Row {
        identifier: String,
        layer: String,
        line: Option<u64>,
        error: Box<InputError>,
    },
}

impl InputError {
    pub(crate) fn in_row(self, identifier: &str, layer: &str, line: Option<u64>) -> InputError {
        InputError::Row {
            identifier: identifier.to_string(),
            layer: layer.to_string(),
            line,
            error: Box::new(self),
        }
    }

    /// The innermost error, without row context.
    pub fn root(&self) -> &InputError {
        match self {
            InputError::Row { error, .. } => error.root(),
            other => other,
        }
    }
}

fn line_prefix(line: &Option<u64>) -> String {
    line.map(|n| format!("line {n}: ")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, InputError>;
