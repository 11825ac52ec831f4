use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::config::ModerationConfig;

/// Built-in denylist, one term per line, covering inflected forms and slurs.
/// Matching is case-insensitive and whole-word only.
pub const DEFAULT_DENYLIST: &str = include_str!("denylist.txt");

/// Terms of [`DEFAULT_DENYLIST`], skipping blank lines.
pub fn default_terms() -> impl Iterator<Item = &'static str> {
    DEFAULT_DENYLIST
        .lines()
        .map(str::trim)
        .filter(|term| !term.is_empty())
}

/// Outcome of screening one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    Rejected { term: String },
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("denylist could not be compiled: {0}")]
    Compile(#[from] regex::Error),
}

/// Profanity screen over a fixed term list.
///
/// Every term is compiled into one alternation bounded by `\b`, so `"class"` passes a list
/// containing `"ass"` while `"ASS!"` does not. The compiled filter is immutable and can be
/// shared across tasks.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    pattern: Option<Regex>,
    terms: Vec<String>,
}

impl ContentFilter {
    pub fn new<I, S>(terms: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: BTreeSet<String> = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        let terms: Vec<String> = terms.into_iter().collect();

        let pattern = compile(&terms)?;
        Ok(Self { pattern, terms })
    }

    /// Built-in list adjusted by the configured extra and exempt terms.
    pub fn from_config(config: &ModerationConfig) -> Result<Self, FilterError> {
        let allowed: BTreeSet<String> = config
            .allowed_terms
            .iter()
            .map(|term| term.trim().to_lowercase())
            .collect();

        let terms = default_terms()
            .map(str::to_string)
            .chain(config.extra_terms.iter().cloned())
            .filter(|term| !allowed.contains(&term.trim().to_lowercase()));

        Self::new(terms)
    }

    pub fn classify(&self, text: &str) -> Classification {
        match self.pattern.as_ref().and_then(|pattern| pattern.find(text)) {
            Some(found) => Classification::Rejected {
                term: found.as_str().to_lowercase(),
            },
            None => Classification::Accepted,
        }
    }

    pub fn is_acceptable(&self, text: &str) -> bool {
        self.classify(text).is_accepted()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

fn compile(terms: &[String]) -> Result<Option<Regex>, FilterError> {
    if terms.is_empty() {
        return Ok(None);
    }

    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
        .case_insensitive(true)
        .build()?;
    Ok(Some(pattern))
}
