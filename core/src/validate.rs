use std::ops::RangeInclusive;

use thiserror::Error;

use crate::api::{BookForm, FeedbackForm, ReadingStatusForm};
use crate::model::{Feedback, NewBook, NewUser};

// Limits of the persisted columns.
pub const MAX_USER_NAME_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_AUTHOR_LENGTH: usize = 100;
pub const MAX_GENRE_LENGTH: usize = 50;
pub const MAX_COVER_IMAGE_LENGTH: usize = 100;
pub const MAX_READING_STATUS_LENGTH: usize = 20;

pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Field '{0}' is required")]
  MissingField(&'static str),
  #[error("Field '{field}' must be at most {max_length} characters long")]
  FieldTooLong { field: &'static str, max_length: usize },
  #[error("Rating '{0}' is not a whole number")]
  MalformedRating(String),
  #[error("Rating {0} is out of range; ratings go from 1 to 5")]
  RatingOutOfRange(i32),
}

fn required(field: &'static str, value: String, max_length: usize) -> Result<String, ValidationError> {
  match optional(field, Some(value), max_length)? {
    Some(value) => Ok(value),
    None => Err(ValidationError::MissingField(field)),
  }
}

/// Trims `value`, treating blank input as absent.
fn optional(field: &'static str, value: Option<String>, max_length: usize) -> Result<Option<String>, ValidationError> {
  let value = match value {
    Some(value) => value.trim().to_string(),
    None => return Ok(None),
  };
  if value.is_empty() {
    Ok(None)
  } else if value.chars().count() > max_length {
    Err(ValidationError::FieldTooLong { field, max_length })
  } else {
    Ok(Some(value))
  }
}

pub fn parse_rating<S: AsRef<str>>(rating: S) -> Result<i32, ValidationError> {
  use ValidationError::*;
  let rating = rating.as_ref().trim();
  if rating.is_empty() {
    return Err(MissingField("rating"));
  }
  let value: i32 = rating.parse().map_err(|_| MalformedRating(rating.to_string()))?;
  if RATING_RANGE.contains(&value) {
    Ok(value)
  } else {
    Err(RatingOutOfRange(value))
  }
}

pub fn parse_reading_status(reading_status: String) -> Result<String, ValidationError> {
  required("reading_status", reading_status, MAX_READING_STATUS_LENGTH)
}

impl BookForm {
  pub fn validate(self) -> Result<NewBook, ValidationError> {
    Ok(NewBook {
      title: required("title", self.title, MAX_TITLE_LENGTH)?,
      author: required("author", self.author, MAX_AUTHOR_LENGTH)?,
      genre: required("genre", self.genre, MAX_GENRE_LENGTH)?,
      cover_image: optional("cover_image", self.cover_image, MAX_COVER_IMAGE_LENGTH)?,
      reading_status: optional("reading_status", self.reading_status, MAX_READING_STATUS_LENGTH)?,
    })
  }
}

impl ReadingStatusForm {
  pub fn validate(self) -> Result<String, ValidationError> {
    parse_reading_status(self.reading_status)
  }
}

impl FeedbackForm {
  pub fn validate(self) -> Result<Feedback, ValidationError> {
    let rating = parse_rating(&self.rating)?;
    Ok(Feedback { rating, review: self.review.trim().to_string() })
  }
}

impl NewUser {
  /// Checks the user name and password are present. The password is kept as-is, it is only ever hashed.
  pub fn validate(self) -> Result<NewUser, ValidationError> {
    let name = required("name", self.name, MAX_USER_NAME_LENGTH)?;
    if self.password.is_empty() {
      return Err(ValidationError::MissingField("password"));
    }
    Ok(NewUser { name, password: self.password })
  }
}
