//! Search history: the log behind suggestions and popularity analytics.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MIN_QUERY_LEN: usize = 3;
pub const POPULAR_LIMIT: usize = 5;
pub const RECENT_LIMIT: usize = 3;

/// Trim and lower-case a search term, rejecting anything shorter than
/// [`MIN_QUERY_LEN`] characters.
pub fn normalize_query(raw: &str) -> Result<String> {
  let query = raw.trim().to_lowercase();
  if query.chars().count() < MIN_QUERY_LEN {
    return Err(Error::validation("query", "query too short"));
  }
  Ok(query)
}

/// Result of [`crate::market::MarketStore::record_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchRecord {
  Saved,
  /// Same as the caller's previous search; nothing was written.
  AlreadyRecorded,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestions {
  pub popular: Vec<String>,
  pub recent:  Vec<String>,
}
