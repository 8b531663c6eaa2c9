#[cfg(test)]
mod test;

pub mod collector;

pub use collector::{
    ConcurrentDiagnostics, DiagnosticCollector, Diagnostics, LocalDiagnosticReporter,
};
use std::{fmt::Write as FmtWrite, sync::Arc};

/// A zero-based line and character offset.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Clone, Copy, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Clone, Copy, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const EMPTY: Range = Range {
        start: Position {
            line: 0,
            character: 0,
        },
        end: Position {
            line: 0,
            character: 0,
        },
    };

    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    /// A range on a single line.
    pub fn on_line(line: u32, start: u32, end: u32) -> Self {
        Range {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Location {
    pub uri: Arc<str>,
    pub range: Range,
}

impl Location {
    pub fn new(uri: Arc<str>, range: Range) -> Self {
        Location { uri, range }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Clone, Copy)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    pub fn to_str(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
            Severity::Hint => "hint",
        }
    }
}

/// A secondary location attached to a diagnostic, e.g. an original definition.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct RelatedInformation {
    pub location: Location,
    pub message: String,
}

impl RelatedInformation {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        RelatedInformation {
            location,
            message: message.into(),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub message: String,
    pub related: Vec<RelatedInformation>,
}

impl Diagnostic {
    pub fn new(
        location: Location,
        severity: Severity,
        message: impl Into<String>,
        related: Vec<RelatedInformation>,
    ) -> Self {
        Diagnostic {
            location,
            severity,
            message: message.into(),
            related,
        }
    }

    pub fn report_heading(
        path: &str,
        position: Option<(usize, usize)>,
        severity: Severity,
        message: &str,
    ) -> String {
        let mut str = String::from(path);
        str.push(':');
        if let Some((line, column)) = position {
            let _ = write!(str, "{}:{}:", line, column);
        }
        str.push(' ');
        str.push_str(severity.to_str());
        str.push_str(": ");
        str.push_str(message);
        str
    }

    /**
    Render a message against the source line it points into.

    `line` and `column` are one-based.
    */
    pub fn report_located_message(
        line: usize,
        column: usize,
        path: &str,
        line_str: &str,
        severity: Severity,
        message: &str,
    ) -> String {
        let caret: String = {
            let mut caret: String = " ".repeat(column.saturating_sub(1));
            caret.push('^');
            caret
        };
        let heading = Self::report_heading(path, Some((line, column)), severity, message);
        let padding: String = " ".repeat(line.to_string().len());

        [
            heading,
            format!("{} |", padding),
            format!("{} | {}", line, line_str),
            format!("{} | {}", padding, caret),
        ]
        .join("\n")
    }

    /**
    Render this diagnostic, and its related information as notes, against the
    text of the source it was reported in.

    Related information that points into other sources is rendered as a heading
    only.
    */
    pub fn render(&self, source: &str) -> String {
        let render_at = |location: &Location, severity: Severity, message: &str| -> String {
            let line = location.range.start.line as usize;
            let column = location.range.start.character as usize + 1;
            if location.uri == self.location.uri {
                if let Some(line_str) = source.lines().nth(line) {
                    return Self::report_located_message(
                        line + 1,
                        column,
                        &location.uri,
                        line_str,
                        severity,
                        message,
                    );
                }
            }
            Self::report_heading(&location.uri, Some((line + 1, column)), severity, message)
        };

        let mut result = render_at(&self.location, self.severity, &self.message);
        for related in &self.related {
            result.push('\n');
            result.push_str(&render_at(
                &related.location,
                Severity::Information,
                &related.message,
            ));
        }
        result
    }
}
