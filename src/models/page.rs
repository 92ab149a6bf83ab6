use serde::{Deserialize, Serialize};

use super::CoinPerformance;

/// Navigation links for a page; `None` when the target does not exist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub first: Option<String>,
    pub last: Option<String>,
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One page of records plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<CoinPerformance>,
    /// Total item count across all pages
    pub total: usize,
    /// 1-based page index actually served
    pub page: u32,
    /// Page size actually served
    pub size: u32,
    /// Total page count
    pub pages: u32,
    pub links: PageLinks,
}
