//! The canonical report model shared by both normalization pipelines.
//!
//! Both the JVM and CPython extractors reduce a raw capture to a
//! [`CanonicalReport`], and [`CanonicalReport::render`] produces the one
//! textual shape the external assertion compares:
//!
//! ```text
//! ### EXCEPTION ###
//! <Type>: <message>
//!     <file>:<line>
//! ```

use crate::floats;
use std::fmt;
use thiserror::Error;

/// Header line that opens a canonical exception block.
pub const EXCEPTION_HEADER: &str = "### EXCEPTION ###";

/// Errors from the strict extraction layer.
///
/// The lenient `normalize` entry points never surface these; a malformed
/// report degrades to float-normalized pass-through so a harness problem
/// shows up as a failed comparison rather than a crash.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// A fatal-error line was found but could not be parsed.
    #[error("unparseable fatal error line")]
    MalformedMarker,

    /// A traceback header was found but no final `Type: message` line.
    #[error("traceback ends without an exception line")]
    MissingException,

    /// A traceback header was found but no call-site lines.
    #[error("traceback contains no call sites")]
    MissingCallSite,
}

/// A source-level call site retained in the canonical report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file name as it appeared in the trace, e.g. `test.py`.
    pub file: String,
    /// 1-indexed line number.
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A canonical, runtime-independent reading of one captured output.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalReport {
    /// Output containing no exception report.
    Clean(String),

    /// Output that ended in an unhandled exception.
    Exception {
        /// Program output preceding the report, byte-for-byte.
        output: String,
        /// Exception type name without any namespace prefix.
        exception: String,
        /// Exception message; wrapper exceptions may carry none.
        message: Option<String>,
        /// Retained source call sites, causing site first.
        locations: Vec<SourceLocation>,
    },
}

impl CanonicalReport {
    /// Render the canonical text for comparison.
    ///
    /// Float normalization is applied to program output and to the exception
    /// message (a message may embed a float rendering), never to type names
    /// or locations.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            CanonicalReport::Clean(output) => floats::normalize(output),
            CanonicalReport::Exception {
                output,
                exception,
                message,
                locations,
            } => {
                let mut out = floats::normalize(output);
                out.push_str(EXCEPTION_HEADER);
                out.push('\n');
                out.push_str(exception);
                if let Some(message) = message {
                    out.push_str(": ");
                    out.push_str(&floats::normalize(message));
                }
                out.push('\n');
                for location in locations {
                    out.push_str("    ");
                    out.push_str(&location.to_string());
                    out.push('\n');
                }
                out
            }
        }
    }

    /// Whether this report contains an exception block.
    #[must_use]
    pub fn is_exception(&self) -> bool {
        matches!(self, CanonicalReport::Exception { .. })
    }
}
