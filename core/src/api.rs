#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the server for any failed request.
#[derive(Debug, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[error("{message}")]
pub struct ErrorMessage {
  pub message: String,
}

// Raw form input. Every field is a string as submitted; validation turns these into model values.

#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct BookForm {
  pub title: String,
  pub author: String,
  pub genre: String,
  pub cover_image: Option<String>,
  pub reading_status: Option<String>,
}

#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ReadingStatusForm {
  pub reading_status: String,
}

#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FeedbackForm {
  pub rating: String,
  pub review: String,
}

#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct SearchQuery {
  pub query: String,
}
