//! Normalization of output containing a CPython traceback.
//!
//! The reference interpreter's traceback is already source-only, so no frame
//! filtering is needed: the canonical block keeps the deepest `File` line
//! (the immediate call site of the error) and the final `Type: message`
//! line, taken verbatim.
//!
//! # Example
//!
//! ```
//! use cleanse::{cpython, dedent};
//!
//! let captured = dedent(r#"
//!     Traceback (most recent call last):
//!       File "test.py", line 3, in <module>
//!         print(x & y)
//!     TypeError: unsupported operand type(s) for &: 'float' and 'bool'
//! "#);
//! assert_eq!(
//!     cpython::normalize(&captured),
//!     "### EXCEPTION ###\nTypeError: unsupported operand type(s) for &: 'float' and 'bool'\n    test.py:3\n"
//! );
//! ```

use crate::floats;
use crate::report::{CanonicalReport, SourceLocation, TraceError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Header line opening a CPython traceback.
pub const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// Call-site line: `File "<name>", line <N>, in <context>`.
static FILE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s+File "([^"]+)", line (\d+), in \S"#).unwrap());

/// Final line of a traceback: `Type[: message]` at column zero.
static EXCEPTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.]*)(?:: (.*))?$").unwrap());

/// Scanner states for walking a traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Forwarding ordinary program output, watching for the header.
    ScanningOutput,
    /// Inside the traceback: call-site lines and source echoes.
    InFrames,
    /// Saw the final exception line; the report is complete.
    Done,
}

/// Normalize a raw CPython capture to canonical text.
///
/// Output with no traceback, or with one too malformed to parse, passes
/// through unchanged apart from float canonicalization.
pub fn normalize(text: &str) -> String {
    match extract(text) {
        Ok(report) => report.render(),
        Err(_) => floats::normalize(&text.replace("\r\n", "\n")),
    }
}

/// Reduce a raw CPython capture to a [`CanonicalReport`].
///
/// Only the deepest `File` line is retained; earlier entries are outer
/// callers of the same stack. Errors if a header is present but the block
/// lacks call sites or a final exception line.
pub fn extract(text: &str) -> Result<CanonicalReport, TraceError> {
    let text = text.replace("\r\n", "\n");

    let mut state = State::ScanningOutput;
    let mut output_end = text.len();
    let mut call_site: Option<SourceLocation> = None;
    let mut exception: Option<(String, Option<String>)> = None;

    let mut offset = 0;
    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.strip_suffix('\n').unwrap_or(raw_line);
        match state {
            State::ScanningOutput => {
                if line == TRACEBACK_HEADER {
                    output_end = offset;
                    state = State::InFrames;
                }
            }
            State::InFrames => {
                if let Some(caps) = FILE_LINE.captures(line) {
                    // Deepest call site wins.
                    let line_no = caps[2].parse().map_err(|_| TraceError::MissingCallSite)?;
                    call_site = Some(SourceLocation::new(caps[1].to_string(), line_no));
                } else if line.starts_with(char::is_whitespace) {
                    // Source echo under the preceding File line.
                } else if let Some(caps) = EXCEPTION_LINE.captures(line) {
                    exception = Some((caps[1].to_string(), caps.get(2).map(|m| m.as_str().to_string())));
                    state = State::Done;
                } else {
                    return Err(TraceError::MissingException);
                }
            }
            State::Done => {}
        }
        offset += raw_line.len();
    }

    match exception {
        None if state == State::ScanningOutput => Ok(CanonicalReport::Clean(text)),
        None => Err(TraceError::MissingException),
        Some((exception, message)) => {
            let call_site = call_site.ok_or(TraceError::MissingCallSite)?;
            Ok(CanonicalReport::Exception {
                output: text[..output_end].to_string(),
                exception,
                message,
                locations: vec![call_site],
            })
        }
    }
}
