use std::fmt::{Display, Error, Formatter};

#[cfg(feature = "diesel")]
use crate::schema::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod details;

//
// Book data, and the relations of books to users and feedback.
//

// Book

#[derive(Default, Clone, PartialOrd, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "diesel", derive(Identifiable, Queryable), table_name = "book")]
pub struct Book {
  pub id: i32,
  pub title: String,
  pub author: String,
  pub genre: String,
  pub cover_image: Option<String>,
  pub reading_status: Option<String>,
}

/// Validated book fields, created from a [`BookForm`](crate::api::BookForm).
#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "diesel", derive(Insertable), table_name = "book")]
pub struct NewBook {
  pub title: String,
  pub author: String,
  pub genre: String,
  pub cover_image: Option<String>,
  pub reading_status: Option<String>,
}

/// Fields changed when editing a book. The reading status has its own update operation.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "diesel", derive(AsChangeset), table_name = "book", changeset_options(treat_none_as_null = "true"))]
pub struct BookChangeset {
  pub title: String,
  pub author: String,
  pub genre: String,
  pub cover_image: Option<String>,
}

impl From<&NewBook> for BookChangeset {
  fn from(new_book: &NewBook) -> Self {
    Self {
      title: new_book.title.clone(),
      author: new_book.author.clone(),
      genre: new_book.genre.clone(),
      cover_image: new_book.cover_image.clone(),
    }
  }
}

// Ownership: which users have which books in their list.

#[derive(Default, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "diesel", derive(Identifiable, Queryable, Associations), primary_key(user_id, book_id), table_name = "ownership", belongs_to(User), belongs_to(Book))]
pub struct Ownership {
  pub user_id: i32,
  pub book_id: i32,
}

#[derive(Default, Copy, Clone, Debug)]
#[cfg_attr(feature = "diesel", derive(Insertable), table_name = "ownership")]
pub struct NewOwnership {
  pub user_id: i32,
  pub book_id: i32,
}


//
// Feedback
//

// Rating

#[derive(Default, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "diesel", derive(Identifiable, Queryable, Associations), table_name = "rating", belongs_to(Book))]
pub struct Rating {
  pub id: i32,
  pub value: i32,
  pub book_id: i32,
}

#[derive(Default, Copy, Clone, Debug)]
#[cfg_attr(feature = "diesel", derive(Insertable), table_name = "rating")]
pub struct NewRating {
  pub value: i32,
  pub book_id: i32,
}

// Review

#[derive(Default, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "diesel", derive(Identifiable, Queryable, Associations), table_name = "review", belongs_to(Book))]
pub struct Review {
  pub id: i32,
  pub content: String,
  pub book_id: i32,
}

#[derive(Default, Clone, Debug)]
#[cfg_attr(feature = "diesel", derive(Insertable), table_name = "review")]
pub struct NewReview {
  pub content: String,
  pub book_id: i32,
}

/// Validated feedback, created from a [`FeedbackForm`](crate::api::FeedbackForm). Submitting it appends one rating and
/// one review to a book; the two are not linked to each other.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feedback {
  pub rating: i32,
  pub review: String,
}


//
// User
//

#[derive(Default, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "diesel", derive(Identifiable, Queryable), table_name = "user")]
pub struct User {
  pub id: i32,
  pub name: String,
}

#[derive(Default, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserLogin {
  pub name: String,
  pub password: String,
}

#[derive(Default, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewUser {
  pub name: String,
  pub password: String,
}


//
// Display implementations
//

impl Display for Book {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
    write!(f, "{:>6}: {} by {} ({})", self.id, self.title, self.author, self.genre)?;
    if let Some(reading_status) = &self.reading_status {
      write!(f, " [{}]", reading_status)?;
    }
    Ok(())
  }
}

impl Display for User {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
    write!(f, "{:>6}: {}", self.id, self.name)
  }
}
