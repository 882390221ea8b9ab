//! Detection and removal of leading sequence numbers in file names.
//!
//! A name counts as "numbered" when it starts with one of seven fixed
//! prefix conventions. The conventions are tried in declaration order and
//! the first one that matches decides both detection and stripping, so a
//! punctuated prefix such as `"3) "` always wins over the bare `"3 "` form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// The recognised numbering prefixes, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingPattern {
    /// `"1. name"`
    PeriodSpace,
    /// `"001_name"`
    Underscore,
    /// `"12- name"`
    HyphenSpace,
    /// `"4) name"`
    ParenSpace,
    /// `"2021 name"`
    Space,
    /// `"12-name"`
    Hyphen,
    /// `"4)name"`
    Paren,
}

impl NumberingPattern {
    /// Priority order used for matching.
    pub const ALL: [NumberingPattern; 7] = [
        NumberingPattern::PeriodSpace,
        NumberingPattern::Underscore,
        NumberingPattern::HyphenSpace,
        NumberingPattern::ParenSpace,
        NumberingPattern::Space,
        NumberingPattern::Hyphen,
        NumberingPattern::Paren,
    ];

    fn regex_source(self) -> &'static str {
        match self {
            NumberingPattern::PeriodSpace => r"(?s)^\d+\.\s+(?P<rest>.*)$",
            NumberingPattern::Underscore => r"(?s)^\d+_(?P<rest>.*)$",
            NumberingPattern::HyphenSpace => r"(?s)^\d+-\s+(?P<rest>.*)$",
            NumberingPattern::ParenSpace => r"(?s)^\d+\)\s+(?P<rest>.*)$",
            NumberingPattern::Space => r"(?s)^\d+\s+(?P<rest>.*)$",
            NumberingPattern::Hyphen => r"(?s)^\d+-(?P<rest>.*)$",
            NumberingPattern::Paren => r"(?s)^\d+\)(?P<rest>.*)$",
        }
    }

    /// Short human readable form, e.g. `"N. name"`.
    pub fn example(self) -> &'static str {
        match self {
            NumberingPattern::PeriodSpace => "N. name",
            NumberingPattern::Underscore => "N_name",
            NumberingPattern::HyphenSpace => "N- name",
            NumberingPattern::ParenSpace => "N) name",
            NumberingPattern::Space => "N name",
            NumberingPattern::Hyphen => "N-name",
            NumberingPattern::Paren => "N)name",
        }
    }
}

impl fmt::Display for NumberingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.example())
    }
}

static PATTERNS: LazyLock<Vec<(NumberingPattern, Regex)>> = LazyLock::new(|| {
    NumberingPattern::ALL
        .iter()
        .map(|&pattern| {
            let re = Regex::new(pattern.regex_source())
                .expect("numbering patterns are valid regular expressions");
            (pattern, re)
        })
        .collect()
});

/// Returns the first pattern matching the start of `name`, with the text
/// that follows the prefix.
fn first_match(name: &str) -> Option<(NumberingPattern, &str)> {
    PATTERNS.iter().find_map(|(pattern, re)| {
        re.captures(name)
            .and_then(|caps| caps.name("rest"))
            .map(|rest| (*pattern, rest.as_str()))
    })
}

/// Which numbering convention `name` uses, if any.
pub fn detect_pattern(name: &str) -> Option<NumberingPattern> {
    first_match(name).map(|(pattern, _)| pattern)
}

pub fn is_numbered(name: &str) -> bool {
    first_match(name).is_some()
}

/// Removes exactly one leading number prefix from `name`.
///
/// Names without a recognised prefix are returned unchanged. Only the
/// first prefix is removed: `"1. 2. a.txt"` becomes `"2. a.txt"`.
pub fn strip_numbering(name: &str) -> &str {
    first_match(name).map_or(name, |(_, rest)| rest)
}

/// One entry of the numbered-files report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedFile {
    pub original: String,
    pub stripped: String,
    pub pattern: NumberingPattern,
}

impl fmt::Display for NumberedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' -> '{}'", self.original, self.stripped)
    }
}

/// Classifies `name`, returning the report row when it is numbered.
pub fn classify(name: &str) -> Option<NumberedFile> {
    first_match(name).map(|(pattern, rest)| NumberedFile {
        original: name.to_string(),
        stripped: rest.to_string(),
        pattern,
    })
}
