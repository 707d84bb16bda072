//! Normalization of output containing a JVM fatal-error report.
//!
//! An unhandled error in the transpiled program surfaces as a verbose stack
//! dump: a fatal marker line, optionally one or more `Caused by:` lines
//! wrapping the real exception, and dozens of frames of which only a handful
//! reference user source. This pipeline keeps the innermost cause's type and
//! message, discards framework frames, and emits the canonical block.
//!
//! # Example
//!
//! ```
//! use cleanse::{dedent, jvm};
//!
//! let captured = dedent(r#"
//!     Exception in thread "main" java.lang.ExceptionInInitializerError
//!     Caused by: org.python.exceptions.IndexError: list index out of range
//!         at org.python.types.List.__getitem__(List.java:100)
//!         at python.test.<clinit>(test.py:2)
//! "#);
//! assert_eq!(
//!     jvm::normalize(&captured),
//!     "### EXCEPTION ###\nIndexError: list index out of range\n    test.py:2\n"
//! );
//! ```

use crate::floats;
use crate::frame::{Frame, FrameFilter};
use crate::report::{CanonicalReport, TraceError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Fatal marker: `Exception in thread "main" qualified.Type[: message]`.
static FATAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^Exception in thread "[^"]*" ([\w$.]+)(?:: (.*))?$"#).unwrap());

/// Cause marker: `Caused by: qualified.Type[: message]`.
static CAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Caused by: ([\w$.]+)(?:: (.*))?$").unwrap());

/// Scanner states for walking a fatal-error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Forwarding ordinary program output, watching for the fatal marker.
    ScanningOutput,
    /// Just saw the fatal marker or a `Caused by:` line.
    InCauseHeader,
    /// Collecting frame lines.
    InFrames,
    /// Block ended; remaining lines do not belong to the report.
    Done,
}

/// Normalize a raw JVM capture to canonical text.
///
/// Output with no fatal-error report, or with one too malformed to parse,
/// passes through unchanged apart from float canonicalization.
pub fn normalize(text: &str) -> String {
    match extract(text, &FrameFilter::default()) {
        Ok(report) => report.render(),
        Err(_) => floats::normalize(&text.replace("\r\n", "\n")),
    }
}

/// Reduce a raw JVM capture to a [`CanonicalReport`], classifying frames
/// with `filter`.
///
/// CRLF line endings are normalized first; the JVM under Windows emits them
/// and the comparison fixtures are LF. Errors only on a marker line that
/// resists parsing; absence of any marker is the `Clean` case, not an error.
pub fn extract(text: &str, filter: &FrameFilter) -> Result<CanonicalReport, TraceError> {
    let text = text.replace("\r\n", "\n");

    let mut state = State::ScanningOutput;
    let mut output_end = text.len();
    let mut exception: Option<(String, Option<String>)> = None;
    let mut frames: Vec<Frame> = Vec::new();

    let mut offset = 0;
    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.strip_suffix('\n').unwrap_or(raw_line);
        match state {
            State::ScanningOutput => {
                if let Some(caps) = FATAL.captures(line) {
                    output_end = offset;
                    exception = Some(type_and_message(&caps));
                    state = State::InCauseHeader;
                } else if line.starts_with("Exception in thread") {
                    return Err(TraceError::MalformedMarker);
                }
            }
            State::InCauseHeader | State::InFrames => {
                if let Some(caps) = CAUSE.captures(line) {
                    // Deeper causes overwrite: the innermost one wins.
                    exception = Some(type_and_message(&caps));
                    state = State::InCauseHeader;
                } else if let Some(frame) = Frame::parse(line) {
                    frames.push(frame);
                    state = State::InFrames;
                } else {
                    state = State::Done;
                }
            }
            State::Done => {}
        }
        offset += raw_line.len();
    }

    match exception {
        None => Ok(CanonicalReport::Clean(text)),
        Some((exception, message)) => {
            let locations = frames
                .iter()
                .filter(|frame| filter.is_source(frame))
                .filter_map(Frame::location)
                .collect();
            Ok(CanonicalReport::Exception {
                output: text[..output_end].to_string(),
                exception,
                message,
                locations,
            })
        }
    }
}

/// Pull the exception type (namespace prefix stripped) and optional message
/// out of a matched marker line.
fn type_and_message(caps: &regex::Captures<'_>) -> (String, Option<String>) {
    let exception = strip_namespace(&caps[1]);
    let message = caps.get(2).map(|m| m.as_str().to_string());
    (exception, message)
}

/// `org.python.exceptions.IndexError` -> `IndexError`.
fn strip_namespace(qualified: &str) -> String {
    qualified.rsplit('.').next().unwrap_or(qualified).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedent;
    use crate::report::SourceLocation;

    fn assert_normalized(actual: &str, expected: &str) {
        assert_eq!(normalize(&dedent(actual)), dedent(expected));
    }

    #[test]
    fn no_exception() {
        assert_normalized(
            r#"
            Hello, world.
            "#,
            r#"
            Hello, world.
            "#,
        );
    }

    #[test]
    fn exception_in_initializer() {
        assert_normalized(
            r#"
            Exception in thread "main" java.lang.ExceptionInInitializerError
            Caused by: org.python.exceptions.IndexError: list index out of range
                at org.python.types.List.__getitem__(List.java:100)
                at org.python.types.List.__getitem__(List.java:85)
                at python.test.<clinit>(test.py:2)
            "#,
            r#"
            ### EXCEPTION ###
            IndexError: list index out of range
                test.py:2
            "#,
        );
    }

    #[test]
    fn exception_in_initializer_after_output() {
        assert_normalized(
            r#"
            Hello, world.
            Exception in thread "main" java.lang.ExceptionInInitializerError
            Caused by: org.python.exceptions.IndexError: list index out of range
                at org.python.types.List.__getitem__(List.java:100)
                at org.python.types.List.__getitem__(List.java:85)
                at python.test.<clinit>(test.py:2)
            "#,
            r#"
            Hello, world.
            ### EXCEPTION ###
            IndexError: list index out of range
                test.py:2
            "#,
        );
    }

    #[test]
    fn exception_in_method() {
        assert_normalized(
            r#"
            Exception in thread "main" org.python.exceptions.IndexError: list index out of range
                at org.python.types.List.__getitem__(List.java:100)
                at org.python.types.List.__getitem__(List.java:85)
                at python.test.main(test.py:3)
            "#,
            r#"
            ### EXCEPTION ###
            IndexError: list index out of range
                test.py:3
            "#,
        );
    }

    #[test]
    fn exception_in_method_after_output() {
        assert_normalized(
            r#"
            Hello, world.
            Exception in thread "main" org.python.exceptions.IndexError: list index out of range
                at org.python.types.List.__getitem__(List.java:100)
                at python.test.main(test.py:3)
            "#,
            r#"
            Hello, world.
            ### EXCEPTION ###
            IndexError: list index out of range
                test.py:3
            "#,
        );
    }

    #[test]
    fn constructor_chain_keeps_call_site_then_initializer_site() {
        assert_normalized(
            r#"
            Exception in thread "main" java.lang.ExceptionInInitializerError
            Caused by: org.python.exceptions.UnboundLocalError: local variable 'x' referenced before assignment
              at python.example.Foo.__init__(example.py:44)
              at sun.reflect.NativeMethodAccessorImpl.invoke0(Native Method)
              at sun.reflect.NativeMethodAccessorImpl.invoke(NativeMethodAccessorImpl.java:57)
              at sun.reflect.DelegatingMethodAccessorImpl.invoke(DelegatingMethodAccessorImpl.java:43)
              at java.lang.reflect.Method.invoke(Method.java:606)
              at org.python.types.Method.invoke(Method.java:66)
              at python.example.Foo.<init>(example.py)
              at sun.reflect.NativeConstructorAccessorImpl.newInstance0(Native Method)
              at sun.reflect.NativeConstructorAccessorImpl.newInstance(NativeConstructorAccessorImpl.java:57)
              at sun.reflect.DelegatingConstructorAccessorImpl.newInstance(DelegatingConstructorAccessorImpl.java:45)
              at java.lang.reflect.Constructor.newInstance(Constructor.java:526)
              at org.python.types.Constructor.invoke(Constructor.java:25)
              at python.example.<clinit>(example.py:51)
            "#,
            r#"
            ### EXCEPTION ###
            UnboundLocalError: local variable 'x' referenced before assignment
                example.py:44
                example.py:51
            "#,
        );
    }

    #[test]
    fn float_rewrite() {
        assert_eq!(normalize("7.950899459780156E-6"), "7.950899459780156e-6");
    }

    #[test]
    fn innermost_cause_wins() {
        let captured = dedent(
            r#"
            Exception in thread "main" java.lang.ExceptionInInitializerError
            Caused by: org.python.exceptions.RuntimeError: outer
                at org.python.types.Object.setup(Object.java:12)
            Caused by: org.python.exceptions.IndexError: list index out of range
                at python.test.<clinit>(test.py:2)
            "#,
        );
        assert_eq!(
            normalize(&captured),
            "### EXCEPTION ###\nIndexError: list index out of range\n    test.py:2\n"
        );
    }

    #[test]
    fn exception_with_no_source_frames() {
        let captured = dedent(
            r#"
            Exception in thread "main" org.python.exceptions.MemoryError: out of memory
                at org.python.types.List.append(List.java:210)
            "#,
        );
        assert_eq!(normalize(&captured), "### EXCEPTION ###\nMemoryError: out of memory\n");
    }

    #[test]
    fn marker_with_no_frames_at_end_of_input() {
        let captured = "Exception in thread \"main\" org.python.exceptions.SystemError: boom\n";
        assert_eq!(normalize(captured), "### EXCEPTION ###\nSystemError: boom\n");
    }

    #[test]
    fn malformed_marker_passes_through() {
        let captured = "Exception in thread -- garbled\n";
        assert_eq!(normalize(captured), captured);
    }

    #[test]
    fn embedded_block_stops_at_resumed_output() {
        let captured = dedent(
            r#"
            Exception in thread "main" org.python.exceptions.IndexError: list index out of range
                at python.test.main(test.py:3)
            Done.
            "#,
        );
        assert_eq!(
            normalize(&captured),
            "### EXCEPTION ###\nIndexError: list index out of range\n    test.py:3\n"
        );
    }

    #[test]
    fn crlf_capture_matches_lf_fixture() {
        let captured = "Hello, world.\r\nException in thread \"main\" org.python.exceptions.IndexError: list index out of range\r\n    at python.test.main(test.py:3)\r\n";
        assert_eq!(
            normalize(captured),
            "Hello, world.\n### EXCEPTION ###\nIndexError: list index out of range\n    test.py:3\n"
        );
    }

    #[test]
    fn message_floats_are_normalized() {
        let captured = dedent(
            r#"
            Exception in thread "main" org.python.exceptions.ValueError: bad value 1.25E-03
                at python.test.main(test.py:9)
            "#,
        );
        assert_eq!(
            normalize(&captured),
            "### EXCEPTION ###\nValueError: bad value 1.25e-3\n    test.py:9\n"
        );
    }

    #[test]
    fn extract_reports_typed_locations() {
        let captured = dedent(
            r#"
            Exception in thread "main" org.python.exceptions.IndexError: list index out of range
                at python.test.main(test.py:3)
            "#,
        );
        let report = extract(&captured, &FrameFilter::default()).unwrap();
        match report {
            CanonicalReport::Exception { locations, .. } => {
                assert_eq!(locations, vec![SourceLocation::new("test.py", 3)]);
            }
            other => panic!("expected exception report, got {:?}", other),
        }
    }
}
