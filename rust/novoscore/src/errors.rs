use std::path::PathBuf;

/// Violations of the invariants the scoring core relies on.
///
/// None of these are recoverable: they mean the pipeline feeding the
/// scorer is misconfigured, so the run is aborted with the diagnostic.
#[derive(Debug)]
pub enum DataProcessingError {
    ZeroDenominator {
        quantity: &'static str,
        context: String,
    },
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    UnsortedPeaks {
        index: usize,
        context: String,
    },
    MalformedCandidate {
        candidate: String,
        reason: &'static str,
    },
    InvalidParameter {
        name: &'static str,
        value: String,
    },
    ExpectedSetField {
        field: &'static str,
        context: String,
    },
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ZeroDenominator {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::ExpectedNonEmptyData {
                context: owned_context,
            } => match owned_context {
                Some(x) => x.push_str(context),
                None => *owned_context = Some(context.to_string()),
            },
            DataProcessingError::UnsortedPeaks {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::ExpectedSetField {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::MalformedCandidate { .. } => {}
            DataProcessingError::InvalidParameter { .. } => {}
        }
        self
    }
}

impl std::fmt::Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDenominator { quantity, context } => {
                write!(f, "Zero {} while scoring {}", quantity, context)
            }
            Self::ExpectedNonEmptyData { context } => match context {
                Some(c) => write!(f, "Expected non-empty data: {}", c),
                None => write!(f, "Expected non-empty data"),
            },
            Self::UnsortedPeaks { index, context } => {
                write!(f, "Peak list not ascending at index {} ({})", index, context)
            }
            Self::MalformedCandidate { candidate, reason } => {
                write!(f, "Malformed candidate {}: {}", candidate, reason)
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "Invalid value for parameter {}: {}", name, value)
            }
            Self::ExpectedSetField { field, context } => {
                write!(f, "Field {} was never set {}", field, context)
            }
        }
    }
}

#[derive(Debug)]
pub enum InputError {
    ParsingError {
        source: serde_json::Error,
        context: &'static str,
    },
    FileReadingError {
        source: std::io::Error,
        context: &'static str,
        path: PathBuf,
    },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParsingError { source, context } => write!(f, "{}: {}", context, source),
            Self::FileReadingError {
                source,
                context,
                path,
            } => write!(f, "{} ({}): {}", context, path.display(), source),
        }
    }
}

#[derive(Debug)]
pub enum NovoScoreError {
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    ParseError {
        msg: String,
    },
    DataProcessingError(DataProcessingError),
    InputError(InputError),
}

impl std::fmt::Display for NovoScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataProcessingError(e) => write!(f, "{}", e),
            Self::InputError(e) => write!(f, "{}", e),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for NovoScoreError {}

pub type Result<T> = std::result::Result<T, NovoScoreError>;

impl From<serde_json::Error> for NovoScoreError {
    fn from(val: serde_json::Error) -> Self {
        NovoScoreError::ParseError {
            msg: val.to_string(),
        }
    }
}

impl From<DataProcessingError> for NovoScoreError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessingError(x)
    }
}

impl From<InputError> for NovoScoreError {
    fn from(x: InputError) -> Self {
        Self::InputError(x)
    }
}
