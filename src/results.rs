use serde::{Deserialize, Serialize};

/// One grid row. Every field is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub notice_type: String,
    pub title: String,
    pub category: String,
    pub publish_date: String,
    pub closing_date: String,
    pub department: String,
    pub extra_column: String,

    /// First link in the row, absolute
    pub notice_document_url: String,

    /// Second link in the row, absolute
    pub bidding_document_url: String,
}

impl Record {
    /// Build a record from cell texts in column order and resolved row links.
    /// Missing cells or links become empty strings.
    pub fn from_cells(cells: &[String], links: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
        let link = |i: usize| links.get(i).cloned().unwrap_or_default();

        Self {
            notice_type: cell(0),
            title: cell(1),
            category: cell(2),
            publish_date: cell(3),
            closing_date: cell(4),
            department: cell(5),
            extra_column: cell(6),
            notice_document_url: link(0),
            bidding_document_url: link(1),
        }
    }

    /// Key identifying the same logical tender across pages
    pub fn dedup_key(&self) -> String {
        format!("{}|{}|{}", self.title, self.closing_date, self.department)
    }
}

/// Why a traversal ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The pager found no control leading to another page
    NoNextPage,
    /// Several advances in a row produced no unseen records
    Stagnated,
    /// The page-advance cap was reached
    PageCap,
    /// A page rendered the grid with no rows at all
    EndOfData,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Harvest {
    pub records: Vec<Record>,

    /// Pages extracted, including the first one
    pub pages_visited: usize,

    /// Successful pager advances
    pub advances: usize,

    pub stop_reason: StopReason,

    /// Item count advertised by the page, when one could be found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hint: Option<u64>,
}
