/// Canonical allergen terms and the derivative or related terms that imply them.
///
/// Order matters: lookups return the first entry that mentions a term.
const BUILTIN_ENTRIES: &[(&str, &[&str])] = &[
    (
        "milk",
        &["dairy", "lactose", "whey", "casein", "butter", "cream", "cheese"],
    ),
    (
        "egg",
        &["eggs", "albumin", "ovalbumin", "lysozyme", "globulin"],
    ),
    ("peanut", &["peanuts", "arachis", "goober", "groundnut"]),
    (
        "tree nut",
        &[
            "almond",
            "hazelnut",
            "walnut",
            "cashew",
            "pistachio",
            "pecan",
            "macadamia",
        ],
    ),
    (
        "soy",
        &["soya", "soybean", "edamame", "tofu", "tempeh", "miso"],
    ),
    (
        "wheat",
        &["gluten", "flour", "bread", "cereal", "pasta", "bran", "starch"],
    ),
    (
        "fish",
        &["cod", "salmon", "tuna", "tilapia", "halibut", "anchovy", "mahi"],
    ),
    (
        "shellfish",
        &[
            "shrimp", "crab", "lobster", "prawn", "crayfish", "clam", "mussel", "oyster",
        ],
    ),
    ("sesame", &["tahini", "benne", "gingelly"]),
    ("mustard", &["mustard seed", "mustard powder", "dijon"]),
    ("celery", &["celeriac", "celery seed", "celery salt"]),
    ("lupin", &["lupine", "lupin flour", "lupin bean"]),
    (
        "sulfite",
        &["sulphite", "sulfur dioxide", "e220", "preservative"],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymEntry {
    canonical: String,
    variations: Vec<String>,
}

impl SynonymEntry {
    pub fn new<I, S>(canonical: impl AsRef<str>, variations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entry = Self {
            canonical: normalize_term(canonical.as_ref()),
            variations: Vec::new(),
        };
        entry.extend(variations);
        entry
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn variations(&self) -> &[String] {
        &self.variations
    }

    fn mentions(&self, term: &str) -> bool {
        self.canonical == term || self.variations.iter().any(|v| v == term)
    }

    fn extend<I, S>(&mut self, variations: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for variation in variations {
            let variation = normalize_term(variation.as_ref());
            if variation.is_empty() || variation == self.canonical {
                continue;
            }
            if !self.variations.contains(&variation) {
                self.variations.push(variation);
            }
        }
    }
}

/// Read-only mapping from canonical allergens to their related terms.
///
/// Built once at startup (optionally extended from configuration) and then
/// shared by reference; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
}

impl SynonymTable {
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_ENTRIES
                .iter()
                .map(|(canonical, variations)| SynonymEntry::new(canonical, variations.iter())),
        )
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = SynonymEntry>) -> Self {
        Self::empty().extended(entries)
    }

    /// Adds entries; an entry whose canonical term already exists merges its
    /// variations into the existing entry instead of shadowing it.
    pub fn extended(mut self, extra: impl IntoIterator<Item = SynonymEntry>) -> Self {
        for entry in extra {
            if entry.canonical.is_empty() {
                continue;
            }
            match self
                .entries
                .iter_mut()
                .find(|existing| existing.canonical == entry.canonical)
            {
                Some(existing) => existing.extend(entry.variations),
                None => self.entries.push(entry),
            }
        }
        self
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry that names `term` as either its canonical form or a variation.
    pub fn lookup(&self, term: &str) -> Option<&SynonymEntry> {
        let term = normalize_term(term);
        self.entries.iter().find(|entry| entry.mentions(&term))
    }

    /// Every other term of the entry mentioning `term`, canonical first.
    ///
    /// A variation maps back to its canonical term plus its siblings, so the
    /// lookup works in both directions. `None` when no entry mentions `term`.
    pub fn related_terms(&self, term: &str) -> Option<Vec<&str>> {
        let normalized = normalize_term(term);
        let entry = self.entries.iter().find(|entry| entry.mentions(&normalized))?;
        Some(
            std::iter::once(entry.canonical.as_str())
                .chain(entry.variations.iter().map(String::as_str))
                .filter(|candidate| *candidate != normalized)
                .collect(),
        )
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

pub(crate) fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_all_canonical_terms_in_order() {
        let table = SynonymTable::builtin();
        let canonical: Vec<&str> = table.entries().iter().map(|e| e.canonical()).collect();
        assert_eq!(
            canonical,
            vec![
                "milk", "egg", "peanut", "tree nut", "soy", "wheat", "fish", "shellfish",
                "sesame", "mustard", "celery", "lupin", "sulfite"
            ]
        );
    }

    #[test]
    fn variation_maps_back_to_canonical_without_itself() {
        let table = SynonymTable::builtin();
        let related = table.related_terms("whey").unwrap();
        assert_eq!(related[0], "milk");
        assert!(related.contains(&"casein"));
        assert!(!related.contains(&"whey"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let table = SynonymTable::builtin();
        assert_eq!(table.lookup("  Peanuts ").unwrap().canonical(), "peanut");
        assert!(table.lookup("kiwi").is_none());
        assert!(table.related_terms("kiwi").is_none());
    }

    #[test]
    fn extension_merges_into_existing_canonical() {
        let table = SynonymTable::builtin().extended([
            SynonymEntry::new("Milk", ["ghee", "whey"]),
            SynonymEntry::new("kiwi", ["actinidia"]),
        ]);
        let milk = table.lookup("milk").unwrap();
        assert_eq!(milk.variations().iter().filter(|v| *v == "whey").count(), 1);
        assert_eq!(milk.variations().last().map(String::as_str), Some("ghee"));
        assert_eq!(table.related_terms("actinidia").unwrap(), vec!["kiwi"]);
        assert_eq!(table.len(), 14);
    }
}
