use serde::{Deserialize, Serialize};

/// Bookkeeping from one computer move decision.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SearchMetrics {
    pub strategy: String,
    pub candidates: usize,
    pub nodes: u64,
    pub duration_ms: u64,
}
