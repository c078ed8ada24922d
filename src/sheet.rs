//! Spreadsheet sheet naming

use std::collections::HashSet;

pub const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
const PLACEHOLDER: &str = "Sheet";

/// Issues sheet names that are unique within one run.
///
/// Names never exceed 31 characters. A repeated title gets `_1`, `_2`, ...
/// with the base shortened so the suffix still fits. Spreadsheet apps treat
/// sheet names case-insensitively, so uniqueness is checked the same way.
#[derive(Debug, Default)]
pub struct SheetNamer {
    issued: Vec<String>,
    taken: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_unique(&mut self, title: &str) -> String {
        let safe = sanitize(title);
        let base = truncate(&safe, MAX_SHEET_NAME);

        let name = if self.is_free(&base) {
            base
        } else {
            let mut n = 1usize;
            loop {
                let suffix = format!("_{n}");
                let keep = MAX_SHEET_NAME.saturating_sub(suffix.chars().count());
                let candidate = format!("{}{}", truncate(&safe, keep), suffix);
                if self.is_free(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        };

        self.taken.insert(name.to_lowercase());
        self.issued.push(name.clone());
        name
    }

    /// Names in the order they were handed out
    pub fn issued(&self) -> &[String] {
        &self.issued
    }

    fn is_free(&self, name: &str) -> bool {
        !self.taken.contains(&name.to_lowercase())
    }
}

/// Replace characters spreadsheets reject with spaces and trim; sheet names
/// may not start or end with an apostrophe either.
fn sanitize(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { ' ' } else { c })
        .collect();
    let trimmed = replaced.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// First `max_chars` characters, without trailing whitespace or apostrophes
/// that the cut may have exposed.
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end_matches(|c: char| c == '\'' || c.is_whitespace())
        .to_string()
}
