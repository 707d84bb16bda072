//! Canonical output normalization for cross-runtime test comparison.
//!
//! cleanse is the comparison oracle of a transpiler test harness: the same
//! program runs once under the CPython reference interpreter and once as
//! transpiled JVM code, and both captured outputs are reduced to a canonical,
//! implementation-independent text that can be compared byte-for-byte. The
//! two runtimes report unhandled exceptions in completely different shapes
//! (a verbose multi-frame stack dump vs. a concise traceback) and render
//! float exponents differently; both differences disappear here.
//!
//! # Modules
//!
//! - [`dedent`] -- Strips the shared indentation from fixture literals embedded
//!   in test source.
//! - [`floats`] -- Rewrites scientific-notation floats to one exponent form.
//! - [`jvm`] -- Normalizes output containing a JVM fatal-error report.
//! - [`cpython`] -- Normalizes output containing a CPython traceback.
//! - [`frame`] -- Stack frame parsing and the source/framework classifier.
//! - [`report`] -- The canonical report model shared by both pipelines.
//!
//! # Example
//!
//! The same failure, captured from both runtimes, normalizes to identical
//! canonical text:
//!
//! ```
//! use cleanse::{cpython, dedent, jvm};
//!
//! let jvm_capture = dedent(r#"
//!     Exception in thread "main" org.python.exceptions.IndexError: list index out of range
//!         at org.python.types.List.__getitem__(List.java:100)
//!         at python.test.main(test.py:3)
//! "#);
//! let cpython_capture = dedent(r#"
//!     Traceback (most recent call last):
//!       File "test.py", line 3, in <module>
//!         print(x[10])
//!     IndexError: list index out of range
//! "#);
//!
//! let canonical = jvm::normalize(&jvm_capture);
//! assert_eq!(canonical, cpython::normalize(&cpython_capture));
//! assert_eq!(
//!     canonical,
//!     "### EXCEPTION ###\nIndexError: list index out of range\n    test.py:3\n"
//! );
//! ```
//!
//! Output with no exception report passes through untouched apart from float
//! canonicalization:
//!
//! ```
//! assert_eq!(cleanse::jvm::normalize("x = 7.950899459780156E-6\n"),
//!            "x = 7.950899459780156e-6\n");
//! assert_eq!(cleanse::cpython::normalize("x = 7.950899459780156e-06\n"),
//!            "x = 7.950899459780156e-6\n");
//! ```

pub mod cpython;
pub mod dedent;
pub mod floats;
pub mod frame;
pub mod jvm;
pub mod report;

pub use dedent::dedent;
pub use report::{CanonicalReport, SourceLocation, TraceError, EXCEPTION_HEADER};
