use crate::matcher::AllergenQuery;

const LINK_LABEL: &str = "Opens in a new tab";

/// One comma-separated piece of an ingredient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientSegment {
    pub text: String,
    /// True when the segment contains any form of any requested allergen.
    pub flagged: bool,
}

/// Splits ingredient text into segments and flags the ones that mention an
/// allergen, its synonyms, or its plural toggle.
pub fn annotate_ingredients(ingredients: &str, query: &AllergenQuery) -> Vec<IngredientSegment> {
    let cleaned = ingredients.replace(LINK_LABEL, "");

    cleaned
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| IngredientSegment {
            text: segment.to_owned(),
            flagged: query.mentions_any(segment),
        })
        .collect()
}
