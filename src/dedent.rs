//! Indentation stripping for fixture text embedded in test source.
//!
//! Expected-output fixtures are written as indented literal blocks inside
//! test functions. `dedent` removes the indentation the surrounding source
//! introduced, so the fixture can be compared against captured program
//! output verbatim.
//!
//! # Example
//!
//! ```
//! use cleanse::dedent;
//!
//! let fixture = dedent(r#"
//!     for i in range(0, 10):
//!         print('hello, world')
//!     print('Done.')
//! "#);
//! assert_eq!(fixture, "for i in range(0, 10):\n    print('hello, world')\nprint('Done.')\n");
//! ```

/// Strip the common leading indentation from a literal text block.
///
/// Leading blank lines are dropped (a raw-string fixture opens with the
/// newline after the quote). The minimum leading-whitespace width over the
/// remaining non-blank lines is removed from every line; blank lines shorter
/// than that prefix become empty. The result always ends with a newline.
///
/// Already-dedented text is returned unchanged apart from trailing-newline
/// normalization, so the operation is idempotent. All-blank input yields a
/// single newline.
pub fn dedent(text: &str) -> String {
    let split: Vec<&str> = text.split('\n').collect();
    let mut lines: &[&str] = &split;

    while let Some((first, rest)) = lines.split_first() {
        if first.trim().is_empty() && !rest.is_empty() {
            lines = rest;
        } else {
            break;
        }
    }

    if lines.iter().all(|line| line.trim().is_empty()) {
        return "\n".to_string();
    }

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = lines
        .iter()
        .map(|line| strip_indent(line, indent))
        .collect::<Vec<_>>()
        .join("\n");
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Remove up to `width` bytes of leading whitespace, never splitting a char.
fn strip_indent(line: &str, width: usize) -> &str {
    let mut stripped = 0;
    for (offset, c) in line.char_indices() {
        if stripped >= width || !c.is_whitespace() {
            return &line[offset..];
        }
        stripped += c.len_utf8();
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_uniform_indent() {
        assert_eq!(
            dedent(
                "
            for i in range(0, 10):
                print('hello, world')
            print('Done.')
        "
            ),
            "for i in range(0, 10):\n    print('hello, world')\nprint('Done.')\n"
        );
    }

    #[test]
    fn no_leading_space_is_unchanged() {
        let text = "for i in range(0, 10):\n    print('hello, world')\nprint('Done.')\n";
        assert_eq!(dedent(text), text);
    }

    #[test]
    fn appends_missing_trailing_newline() {
        assert_eq!(dedent("print('Done.')"), "print('Done.')\n");
    }

    #[test]
    fn blank_input_yields_single_newline() {
        assert_eq!(dedent(""), "\n");
        assert_eq!(dedent("   \n  "), "\n");
    }

    #[test]
    fn drops_leading_blank_lines() {
        assert_eq!(dedent("\n\n    x\n"), "x\n");
    }

    #[test]
    fn interior_blank_lines_survive() {
        assert_eq!(dedent("    a\n\n    b\n"), "a\n\nb\n");
    }

    #[test]
    fn idempotent() {
        for input in &["", "\n    x\n", "  a\n    b\n", "flat\n", "   \n"] {
            let once = dedent(input);
            assert_eq!(dedent(&once), once, "input {:?}", input);
        }
    }
}
