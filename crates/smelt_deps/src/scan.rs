//! Extraction of local include directives from source text.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `#include "path"` with optional blanks before and after the `#`.
/// Angle-bracket includes never match.
static LOCAL_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*#[ \t]*include[ \t]*"([^"]*)""#)
        .expect("local include pattern is a valid regex")
});

/// Returns the quoted paths of every local include in `text`, in order.
pub fn local_includes(text: &str) -> Vec<&str> {
    LOCAL_INCLUDE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}
