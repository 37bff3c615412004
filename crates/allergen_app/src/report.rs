use std::fmt::Write;

use allergen_core::{annotate_ingredients, AllergenQuery, IngredientSegment, ScanSummary};
use allergen_engine::ScanResponse;

/// Plain-text rendering of a scan response, one block per product.
///
/// Flagged ingredients are wrapped in brackets.
pub fn render(response: &ScanResponse, query: &AllergenQuery) -> String {
    let mut out = String::new();
    if !response.success {
        let error = response.error.as_deref().unwrap_or("unknown error");
        let _ = writeln!(out, "Scan failed: {error}");
        return out;
    }

    let results = response.results();
    for (index, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, result.title);
        let _ = writeln!(out, "   {}", result.url);
        match &result.error {
            Some(error) => {
                let _ = writeln!(out, "   Ingredients: {}", result.ingredients);
                let _ = writeln!(out, "   Error: {error}");
            }
            None => {
                let segments = annotate_ingredients(&result.ingredients, query);
                let _ = writeln!(out, "   Ingredients: {}", render_segments(&segments));
                if !query.is_empty() {
                    let matches = allergen_line(result.allergy_matches.as_deref());
                    let _ = writeln!(out, "   Allergens: {matches}");
                }
            }
        }
    }

    let _ = writeln!(out, "{}", ScanSummary::from_results(results));
    out
}

fn render_segments(segments: &[IngredientSegment]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.flagged {
                format!("[{}]", segment.text)
            } else {
                segment.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn allergen_line(matches: Option<&[String]>) -> String {
    match matches {
        Some(matches) if !matches.is_empty() => matches.join(", "),
        _ => "none".to_string(),
    }
}
