//! Include/exclude pattern filtering for compression inputs.
//!
//! Patterns are tried as anchored regular expressions first; a pattern that
//! fails to compile falls back to plain substring containment. The fallback
//! is a deliberate leniency decision, not an error path.

use std::path::Path;

use regex::Regex;

/// Matches `text` against one pattern.
pub fn matches_pattern(text: &str, pattern: &str) -> bool {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => re.is_match(text),
        Err(_) => text.contains(pattern),
    }
}

/// Decides whether a path survives the include/exclude lists.
///
/// Exclusions win. When include patterns are present the path must match at
/// least one of them. Both the bare filename and the full path string are
/// offered to every pattern.
pub fn should_include(path: &str, include: &[String], exclude: &[String]) -> bool {
    let filename = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path);

    for pattern in exclude {
        if matches_pattern(filename, pattern) || matches_pattern(path, pattern) {
            return false;
        }
    }

    if !include.is_empty() {
        return include
            .iter()
            .any(|pattern| matches_pattern(filename, pattern) || matches_pattern(path, pattern));
    }

    true
}

/// Outcome of filtering a list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSummary {
    /// Items that survived the filters, in their original order
    pub included: Vec<String>,
    /// Number of items removed
    pub excluded: usize,
}

/// Applies the include/exclude lists to a sequence of item paths.
pub fn filter_items(items: &[String], include: &[String], exclude: &[String]) -> FilterSummary {
    let mut included = Vec::with_capacity(items.len());
    let mut excluded = 0;
    for item in items {
        if should_include(item, include, exclude) {
            included.push(item.clone());
        } else {
            excluded += 1;
        }
    }
    FilterSummary { included, excluded }
}
