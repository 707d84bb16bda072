//! Stack frame parsing and classification for JVM fatal-error reports.
//!
//! A JVM stack dump interleaves the frames that matter (call sites in the
//! transpiled user program) with runtime plumbing: type-library internals,
//! reflection shims, native-method stubs. [`Frame`] parses one `at ...` line;
//! [`FrameFilter`] decides which frames map back to user source.

use crate::report::SourceLocation;
use once_cell::sync::Lazy;
use regex::Regex;

/// One `at qualified.path.method(Site)` line, where `Site` is
/// `File.ext:line`, `File.ext`, or `Native Method`.
static FRAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+at\s+([\w$.<>]+)\(([^)]*)\)\s*$").unwrap());

/// A single call-site record parsed from a native stack trace.
///
/// Produced transiently during chain extraction; nothing persists a frame
/// beyond one normalization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Qualified class path, e.g. `org.python.types.List`.
    pub path: String,
    /// Method name, e.g. `__getitem__` or `<clinit>`.
    pub method: String,
    /// File named in the frame; `None` for `Native Method` frames.
    pub file: Option<String>,
    /// Line number; native and synthesized frames carry none.
    pub line: Option<u32>,
}

impl Frame {
    /// Parse a single stack trace line. Returns `None` for anything that is
    /// not a frame line.
    pub fn parse(line: &str) -> Option<Frame> {
        let caps = FRAME.captures(line)?;
        let (path, method) = split_qualified(&caps[1]);
        let (file, line) = parse_site(&caps[2]);
        Some(Frame {
            path,
            method,
            file,
            line,
        })
    }

    /// The source location this frame names, if it carries one.
    pub fn location(&self) -> Option<SourceLocation> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(SourceLocation::new(file.clone(), line)),
            _ => None,
        }
    }
}

/// Split `a.b.C.method` into (`a.b.C`, `method`).
fn split_qualified(qualified: &str) -> (String, String) {
    match qualified.rsplit_once('.') {
        Some((path, method)) => (path.to_string(), method.to_string()),
        None => (String::new(), qualified.to_string()),
    }
}

/// Split the parenthesized call site into file and line.
fn parse_site(site: &str) -> (Option<String>, Option<u32>) {
    if site == "Native Method" {
        return (None, None);
    }
    match site.rsplit_once(':') {
        Some((file, line)) => match line.parse() {
            Ok(line) => (Some(file.to_string()), Some(line)),
            Err(_) => (Some(site.to_string()), None),
        },
        None => (Some(site.to_string()), None),
    }
}

/// Qualified-path prefixes of runtime, JDK, and reflection plumbing.
const FRAMEWORK_PREFIXES: &[&str] = &["org.python.", "java.", "javax.", "jdk.", "sun."];

/// Classifies frames as user source vs. framework plumbing.
///
/// The default filter keeps frames that name a `.py` file with a line number
/// and whose class path does not fall under a known runtime namespace. New
/// plumbing namespaces can be denied without touching extraction logic:
///
/// ```
/// use cleanse::frame::{Frame, FrameFilter};
///
/// let filter = FrameFilter::default().deny("com.example.shim.");
/// let frame = Frame::parse("    at com.example.shim.Invoke.run(run.py:9)").unwrap();
/// assert!(!filter.is_source(&frame));
/// ```
#[derive(Debug, Clone)]
pub struct FrameFilter {
    source_ext: String,
    deny_prefixes: Vec<String>,
}

impl Default for FrameFilter {
    fn default() -> Self {
        FrameFilter::new(".py")
    }
}

impl FrameFilter {
    /// A filter keeping frames whose file carries `source_ext`, seeded with
    /// the standard framework namespaces.
    pub fn new(source_ext: impl Into<String>) -> Self {
        FrameFilter {
            source_ext: source_ext.into(),
            deny_prefixes: FRAMEWORK_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Add a qualified-path prefix whose frames are discarded.
    #[must_use]
    pub fn deny(mut self, prefix: impl Into<String>) -> Self {
        self.deny_prefixes.push(prefix.into());
        self
    }

    /// Whether this frame maps to the user program's source.
    pub fn is_source(&self, frame: &Frame) -> bool {
        if frame.line.is_none() {
            return false;
        }
        let file = match &frame.file {
            Some(file) => file,
            None => return false,
        };
        file.ends_with(&self.source_ext)
            && !self.deny_prefixes.iter().any(|prefix| frame.path.starts_with(prefix.as_str()))
    }
}
