use thiserror::Error;

use crate::storage::StoreError;

/// Labeled search failure / 搜索失败
///
/// Zero matches is never an error; only store faults end up here.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search failed: {0}")]
    Search(#[source] StoreError),

    #[error("Name search failed: {0}")]
    Suggest(#[source] StoreError),
}
