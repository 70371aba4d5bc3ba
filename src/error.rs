use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A character the lexer could not turn into a token.
    InvalidCharacter,
    /// A token the grammar did not expect at this point.
    Syntax,
}

/// A syntax diagnostic recorded by the parser.
///
/// Diagnostics never stop the parse; the parser keeps going and the caller
/// decides what to do with the collected list.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, line: usize, column: usize, message: String) -> Self {
        Self {
            kind,
            span,
            line,
            column,
            message,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic to stderr against the source it came from.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<source>");

        let (color, kind_str) = match self.kind {
            DiagnosticKind::InvalidCharacter => (Color::Red, "Lexical Error"),
            DiagnosticKind::Syntax => (Color::Yellow, "Parse Error"),
        };

        // Spans at end of input point one past the last byte.
        let start = self.span.start.min(source.len());
        let end = self.span.end.min(source.len()).max(start);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!(
                "{} at line {} col {}: {}",
                kind_str.fg(color),
                self.line,
                self.column,
                self.message
            ))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder = report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            // The diagnostic itself is lost; keep at least the plain form.
            tracing::warn!(%error, "failed to render diagnostic");
            eprintln!("{}", self);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Failures of the source-to-execution pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{count} syntax error(s); nothing was executed")]
    Syntax { count: usize },
}
