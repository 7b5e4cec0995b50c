use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Filter, sort and paging parameters for catalog list queries.
/// Every field is optional; defaults reproduce the legacy web client.
#[derive(FromForm, Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    /// Attribute to sort by (`title`, `description`, `severity`, `createdAt`, `_id`).
    #[field(name = "sortBy")]
    pub sort_by: Option<String>,
    /// `"1"` sorts ascending; anything else, or no value, descending.
    #[field(name = "sortDir")]
    pub sort_dir: Option<String>,
    /// Zero-based page index.
    #[field(name = "pageIdx")]
    pub page_idx: Option<usize>,
    #[field(name = "pageSize")]
    pub page_size: Option<usize>,
    /// Case-insensitive substring matched against title or description.
    pub txt: Option<String>,
    /// Inclusive lower bound on severity.
    #[field(name = "minSeverity")]
    pub min_severity: Option<i64>,
    /// Comma-separated labels; a record needs at least one of them.
    pub labels: Option<String>,
}

impl RecordQuery {
    pub const DEFAULT_PAGE_SIZE: usize = 5;
    pub const MAX_PAGE_SIZE: usize = 100;
    pub const ASCENDING: &'static str = "1";

    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE).min(Self::MAX_PAGE_SIZE)
    }

    pub fn effective_page_idx(&self) -> usize {
        self.page_idx.unwrap_or(0)
    }

    pub fn offset(&self) -> usize {
        self.effective_page_idx().saturating_mul(self.effective_page_size())
    }

    pub fn is_ascending(&self) -> bool {
        self.sort_dir.as_deref() == Some(Self::ASCENDING)
    }

    pub fn text(&self) -> Option<String> {
        self.txt.as_deref().filter(|txt| !txt.is_empty()).map(str::to_lowercase)
    }

    pub fn label_list(&self) -> Option<Vec<&str>> {
        let labels: Vec<&str> = self
            .labels
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect();
        if labels.is_empty() { None } else { Some(labels) }
    }
}
