//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, SilError>;

/// Any failure surfaced to a driver
#[derive(Debug, Error)]
pub enum SilError {
    #[error("Syntax error: line {line}, col {col}\n{message}")]
    Syntax {
        message: String,
        span: Span,
        line: usize,
        col: usize,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {message}")]
    Io { message: String },
}

impl SilError {
    pub fn syntax(message: impl Into<String>, span: Span, source: &str) -> Self {
        let (line, col) = span.line_col(source);
        Self::Syntax {
            message: message.into(),
            span,
            line,
            col,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. } => Some(*span),
            Self::Runtime(_) | Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Syntax { message, .. } => message,
            Self::Runtime(err) => &err.message,
            Self::Io { message } => message,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

impl From<std::io::Error> for SilError {
    fn from(e: std::io::Error) -> Self {
        SilError::io_error(e.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &SilError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        SilError::Syntax { .. } => "Syntax",
        SilError::Runtime(_) => "Runtime",
        SilError::Io { .. } => "IO",
    };

    let printed = if let Some(span) = error.span() {
        let end = span.end.max(span.start + 1).min(source.len());
        let start = span.start.min(end);
        Report::build(ReportKind::Error, (filename, start..end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source)))
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
            .eprint((filename, Source::from(source)))
    };

    if printed.is_err() {
        eprintln!("{error}");
    }
}
