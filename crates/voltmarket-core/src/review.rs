//! Store reviews and the rating aggregate they drive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A client's rating of a store. A user reviews a given store at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub id:         Uuid,
  pub user_id:    Uuid,
  pub user_email: String,
  pub store_id:   Uuid,
  pub rating:     u8,
  pub comment:    String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub user_id:  Uuid,
  pub store_id: Uuid,
  pub rating:   u8,
  pub comment:  String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
  pub rating:  Option<u8>,
  pub comment: Option<String>,
}

pub fn validate_rating(rating: u8) -> Result<()> {
  if (MIN_RATING..=MAX_RATING).contains(&rating) {
    Ok(())
  } else {
    Err(Error::validation(
      "rating",
      format!("Rating must be between {MIN_RATING} and {MAX_RATING}."),
    ))
  }
}

/// The cached aggregate stored on a [`Store`](crate::store::Store).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
  pub rating:       f64,
  pub review_count: u32,
}

/// Arithmetic mean of `ratings` (0 when empty) and their count.
pub fn aggregate(ratings: &[u8]) -> RatingSummary {
  if ratings.is_empty() {
    return RatingSummary { rating: 0.0, review_count: 0 };
  }
  let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
  let count = ratings.len() as u32;
  RatingSummary {
    rating:       f64::from(sum) / f64::from(count),
    review_count: count,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mean_of_ratings() {
    assert_eq!(aggregate(&[3, 5]), RatingSummary { rating: 4.0, review_count: 2 });
    assert_eq!(aggregate(&[3]), RatingSummary { rating: 3.0, review_count: 1 });
  }

  #[test]
  fn no_reviews_is_zero() {
    assert_eq!(aggregate(&[]), RatingSummary { rating: 0.0, review_count: 0 });
  }

  #[test]
  fn rating_bounds() {
    assert!(validate_rating(1).is_ok());
    assert!(validate_rating(5).is_ok());
    assert!(validate_rating(0).is_err());
    assert!(validate_rating(6).is_err());
  }
}
