use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::synonyms::{normalize_term, SynonymTable};

/// Texts that stand in for missing ingredients. Matching against them would
/// only ever produce noise.
const PLACEHOLDER_FRAGMENTS: &[&str] = &["No ingredients found", "Failed to load"];
const PLACEHOLDER_EXACT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub found: bool,
    /// Caller terms exactly as supplied, in the caller's order.
    pub matches: Vec<String>,
}

impl MatchOutcome {
    fn from_matches(matches: Vec<String>) -> Self {
        Self {
            found: !matches.is_empty(),
            matches,
        }
    }
}

/// Lowercases and replaces separator punctuation with spaces so that
/// neighbouring terms never fuse across a word boundary.
pub fn normalize_ingredients(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|ch| match ch {
            ',' | ';' | ':' | '(' | ')' | '[' | ']' | '/' => ' ',
            other => other,
        })
        .collect()
}

pub fn is_placeholder_text(text: &str) -> bool {
    text == PLACEHOLDER_EXACT
        || PLACEHOLDER_FRAGMENTS
            .iter()
            .any(|fragment| text.contains(fragment))
}

/// Whole-word, case-insensitive pattern for one term form.
fn word_pattern(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).ok()
}

/// Caller allergen terms with the word patterns of every form compiled once,
/// so a whole scan can check many pages without rebuilding them.
#[derive(Debug, Clone)]
pub struct AllergenQuery {
    terms: Vec<QueryTerm>,
}

#[derive(Debug, Clone)]
struct QueryTerm {
    /// As supplied by the caller; this is what gets reported.
    original: String,
    patterns: Vec<Regex>,
}

impl AllergenQuery {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn check(&self, ingredients: &str) -> MatchOutcome {
        if ingredients.is_empty() || self.is_empty() || is_placeholder_text(ingredients) {
            return MatchOutcome::default();
        }

        let normalized = normalize_ingredients(ingredients);
        let matches = self
            .terms
            .iter()
            .filter(|term| term.patterns.iter().any(|p| p.is_match(&normalized)))
            .map(|term| term.original.clone())
            .collect();

        MatchOutcome::from_matches(matches)
    }

    /// True when `text` contains any form of any term.
    pub fn mentions_any(&self, text: &str) -> bool {
        self.terms
            .iter()
            .flat_map(|term| term.patterns.iter())
            .any(|pattern| pattern.is_match(text))
    }
}

/// Rule-based allergen matcher backed by a shared [`SynonymTable`].
#[derive(Debug, Clone, Copy)]
pub struct AllergenMatcher<'t> {
    table: &'t SynonymTable,
}

impl<'t> AllergenMatcher<'t> {
    pub fn new(table: &'t SynonymTable) -> Self {
        Self { table }
    }

    /// Expands and compiles the caller's terms. Blank terms are skipped.
    pub fn query<S: AsRef<str>>(&self, allergies: &[S]) -> AllergenQuery {
        let terms = allergies
            .iter()
            .map(AsRef::as_ref)
            .filter_map(|allergy| {
                let patterns: Vec<Regex> = self
                    .term_forms(allergy)
                    .iter()
                    .filter_map(|form| word_pattern(form))
                    .collect();
                (!patterns.is_empty()).then(|| QueryTerm {
                    original: allergy.to_owned(),
                    patterns,
                })
            })
            .collect();
        AllergenQuery { terms }
    }

    /// One-off check. Scans over many pages should build an [`AllergenQuery`] once.
    pub fn check<S: AsRef<str>>(&self, ingredients: &str, allergies: &[S]) -> MatchOutcome {
        self.query(allergies).check(ingredients)
    }

    /// The exact term first, then its synonyms. Terms without a table entry get
    /// a single singular/plural toggle instead. Blank terms have no forms.
    pub fn term_forms(&self, allergy: &str) -> Vec<String> {
        let term = normalize_term(allergy);
        if term.is_empty() {
            return Vec::new();
        }
        let mut forms = vec![term.clone()];
        forms.extend(self.variants(&term));
        forms
    }

    fn variants(&self, term: &str) -> Vec<String> {
        if let Some(related) = self.table.related_terms(term) {
            return related.into_iter().map(str::to_owned).collect();
        }
        match term.strip_suffix('s') {
            Some(singular) => vec![singular.to_owned()],
            None => vec![format!("{term}s")],
        }
    }
}
