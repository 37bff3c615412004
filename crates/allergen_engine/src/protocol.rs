use allergen_core::ScrapeResult;
use serde::{Deserialize, Deserializer, Serialize};

/// Trigger sent by the transport, e.g. `{"action":"scrapeCart","allergies":["milk"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ScanRequest {
    #[serde(rename = "scrapeCart")]
    ScrapeCart {
        #[serde(default, deserialize_with = "null_as_empty")]
        allergies: Vec<String>,
    },
}

impl ScanRequest {
    pub fn scrape_cart(allergies: Vec<String>) -> Self {
        ScanRequest::ScrapeCart { allergies }
    }

    pub fn allergies(&self) -> &[String] {
        match self {
            ScanRequest::ScrapeCart { allergies } => allergies,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A missing or `null` allergy list means no allergies.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Either the full ordered result list or a single top-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ScrapeResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResponse {
    pub fn completed(results: Vec<ScrapeResult>) -> Self {
        Self {
            success: true,
            results: Some(results),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            error: Some(error.into()),
        }
    }

    pub fn results(&self) -> &[ScrapeResult] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
