//! Section splitting: a keyword heuristic, not a resume parser.
//!
//! For each of the five fixed labels the first case-insensitive occurrence
//! anywhere in the text is located, and a window of `SECTION_WINDOW_CHARS`
//! characters starting at the match is taken as that section's fragment.
//! Windows may overlap and may cut mid-word; callers must not rely on them
//! being disjoint.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Characters taken from the start of each keyword match.
pub const SECTION_WINDOW_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Skills,
    Experience,
    Education,
    Projects,
    Summary,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Skills,
        Section::Experience,
        Section::Education,
        Section::Projects,
        Section::Summary,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Skills => "skills",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
            Section::Summary => "summary",
        }
    }

    /// Contribution of this section to the overall score. The five weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Section::Skills => 0.30,
            Section::Experience => 0.40,
            Section::Education => 0.10,
            Section::Projects => 0.15,
            Section::Summary => 0.05,
        }
    }
}

/// Extracted fragment per section. Sections without a keyword match map to "".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionMap(BTreeMap<Section, String>);

impl SectionMap {
    pub fn get(&self, section: Section) -> &str {
        self.0.get(&section).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, section: Section, fragment: impl Into<String>) {
        self.0.insert(section, fragment.into());
    }

    /// All five sections in canonical order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> + '_ {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, fragment)| fragment.trim().is_empty())
    }
}

/// Splits raw resume text into the five scoring sections.
pub trait SectionSplitter: Send + Sync {
    fn split(&self, resume_text: &str) -> SectionMap;
}

/// Default splitter: first case-insensitive keyword hit plus a fixed window.
pub struct KeywordSectionSplitter {
    patterns: Vec<(Section, Regex)>,
    window_chars: usize,
}

impl KeywordSectionSplitter {
    pub fn new() -> Self {
        Self::with_window(SECTION_WINDOW_CHARS)
    }

    pub fn with_window(window_chars: usize) -> Self {
        let patterns = Section::ALL
            .into_iter()
            .map(|section| {
                let pattern = RegexBuilder::new(&regex::escape(section.label()))
                    .case_insensitive(true)
                    .build()
                    .expect("escaped section label is a valid pattern");
                (section, pattern)
            })
            .collect();

        Self {
            patterns,
            window_chars,
        }
    }
}

impl Default for KeywordSectionSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionSplitter for KeywordSectionSplitter {
    fn split(&self, resume_text: &str) -> SectionMap {
        let mut sections = SectionMap::default();
        for (section, pattern) in &self.patterns {
            let fragment = pattern
                .find(resume_text)
                .map(|m| char_window(resume_text, m.start(), self.window_chars))
                .unwrap_or("");
            sections.insert(*section, fragment);
        }
        sections
    }
}

/// Returns at most `max_chars` characters of `text` starting at byte offset `start`.
///
/// `start` must lie on a char boundary.
pub fn char_window(text: &str, start: usize, max_chars: usize) -> &str {
    let tail = &text[start..];
    let end = tail
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}
