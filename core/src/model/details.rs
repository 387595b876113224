#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::*;

//
// Book details: a book together with its feedback.
//

#[derive(Default, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookDetails {
  pub book: Book,
  pub average_rating: f64,
  pub ratings: Vec<Rating>,
  pub reviews: Vec<Review>,
}

impl BookDetails {
  pub fn new(book: Book, ratings: Vec<Rating>, reviews: Vec<Review>) -> Self {
    let average_rating = average_rating(ratings.iter().map(|r| r.value));
    Self { book, average_rating, ratings, reviews }
  }
}

/// Arithmetic mean of `values`, or `0.0` when there are none. Callers rely on the `0.0` for unrated books.
pub fn average_rating<I: IntoIterator<Item=i32>>(values: I) -> f64 {
  let (sum, count) = values.into_iter().fold((0i64, 0u64), |(sum, count), value| (sum + value as i64, count + 1));
  if count == 0 {
    0.0
  } else {
    sum as f64 / count as f64
  }
}
