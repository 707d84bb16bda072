//! Floating-point exponent canonicalization.
//!
//! The two runtimes agree on float mantissas but not on exponent rendering:
//! the JVM prints `7.950899459780156E-6` where CPython prints
//! `7.950899459780156e-06`. Both collapse to `7.950899459780156e-6` here --
//! lowercase marker, no `+` sign, no zero padding -- so exponent style never
//! shows up as a spurious diff.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A scientific-notation float: mantissa, exponent marker, optional sign,
/// zero padding, exponent digits.
static EXPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)[eE]([+-])?0*(\d+)").unwrap());

/// Rewrite every scientific-notation float in `text` to canonical exponent
/// form. All other text is left untouched; already-canonical text is a fixed
/// point.
pub fn normalize(text: &str) -> String {
    EXPONENT
        .replace_all(text, |caps: &Captures<'_>| {
            let sign = match caps.get(2) {
                Some(m) if m.as_str() == "-" => "-",
                _ => "",
            };
            format!("{}e{}{}", &caps[1], sign, &caps[3])
        })
        .into_owned()
}
