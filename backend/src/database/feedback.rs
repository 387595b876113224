use diesel::prelude::*;
use tracing::{event, instrument, Level};

use bookshelf_core::model::{Book, Feedback, NewRating, NewReview, Rating, Review};
use bookshelf_core::model::details::{average_rating, BookDetails};
use bookshelf_core::schema;
use bookshelf_core::validate::{RATING_RANGE, ValidationError};

use super::{DatabaseConnection, DatabaseQueryError};
use super::book::CatalogError;

// Feedback (rating and review) queries

impl DatabaseConnection {
  pub fn list_ratings_by_book_id(&self, book_id: i32) -> Result<Vec<Rating>, DatabaseQueryError> {
    use schema::rating;
    Ok(rating::table
      .filter(rating::book_id.eq(book_id))
      .order(rating::id.asc())
      .load::<Rating>(&self.connection)?)
  }

  pub fn list_reviews_by_book_id(&self, book_id: i32) -> Result<Vec<Review>, DatabaseQueryError> {
    use schema::review;
    Ok(review::table
      .filter(review::book_id.eq(book_id))
      .order(review::id.asc())
      .load::<Review>(&self.connection)?)
  }

  /// Average of the current ratings of the book with `book_id`; `0.0` for a book without ratings, and
  /// [`CatalogError::NotFound`] when there is no such book.
  pub fn average_rating_by_book_id(&self, book_id: i32) -> Result<f64, CatalogError> {
    use schema::rating;
    if self.get_book_by_id(book_id)?.is_none() {
      return Err(CatalogError::NotFound);
    }
    let values = time!("average_rating_by_book_id.select", rating::table
      .filter(rating::book_id.eq(book_id))
      .select(rating::value)
      .load::<i32>(&self.connection)?);
    Ok(average_rating(values))
  }

  pub fn get_book_details(&self, book_id: i32) -> Result<BookDetails, CatalogError> {
    use schema::{book, rating, review};
    let book = book::table
      .find(book_id)
      .first::<Book>(&self.connection)
      .optional()?
      .ok_or(CatalogError::NotFound)?;
    let ratings = time!("get_book_details.select_ratings", Rating::belonging_to(&book)
      .order(rating::id.asc())
      .load::<Rating>(&self.connection)?);
    let reviews = time!("get_book_details.select_reviews", Review::belonging_to(&book)
      .order(review::id.asc())
      .load::<Review>(&self.connection)?);
    Ok(BookDetails::new(book, ratings, reviews))
  }

  /// Appends one rating and one review to the book with `book_id`, in one transaction.
  #[instrument(skip(self, feedback), fields(rating = feedback.rating))]
  pub fn submit_feedback(&self, book_id: i32, feedback: &Feedback) -> Result<(), CatalogError> {
    use schema::{rating, review};
    if !RATING_RANGE.contains(&feedback.rating) {
      return Err(ValidationError::RatingOutOfRange(feedback.rating).into());
    }
    self.connection.transaction::<_, CatalogError, _>(|| {
      if self.get_book_by_id(book_id)?.is_none() {
        return Err(CatalogError::NotFound);
      }
      time!("submit_feedback.insert_rating", diesel::insert_into(rating::table)
        .values(NewRating { value: feedback.rating, book_id })
        .execute(&self.connection)?);
      time!("submit_feedback.insert_review", diesel::insert_into(review::table)
        .values(NewReview { content: feedback.review.clone(), book_id })
        .execute(&self.connection)?);
      Ok(())
    })?;
    event!(Level::DEBUG, book_id, "Submitted feedback");
    Ok(())
  }
}
