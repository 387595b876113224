use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use thiserror::Error;
use tracing::{event, instrument, Level};

use bookshelf_core::model::{Book, BookChangeset, NewBook, NewOwnership};
use bookshelf_core::schema;
use bookshelf_core::validate::ValidationError;

use super::{DatabaseConnection, DatabaseQueryError, last_insert_rowid};

// Catalog errors

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Book or user was not found")]
  NotFound,
  #[error(transparent)]
  ValidationFail(#[from] ValidationError),
  #[error("Store is unavailable")]
  StoreUnavailable(#[source] DatabaseQueryError),
}

impl From<diesel::result::Error> for CatalogError {
  fn from(e: diesel::result::Error) -> Self {
    CatalogError::StoreUnavailable(e.into())
  }
}

impl From<DatabaseQueryError> for CatalogError {
  fn from(e: DatabaseQueryError) -> Self {
    CatalogError::StoreUnavailable(e)
  }
}

/// Which books a search looks at.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SearchScope {
  /// Books of all users.
  Global,
  /// Books owned by the user with this id.
  Owned(i32),
}

// `LIKE` ignores case in SQLite, `instr` does not.
sql_function!(fn instr(haystack: Text, needle: Text) -> Integer);

// Catalog queries

impl DatabaseConnection {
  pub fn get_book_by_id(&self, input_id: i32) -> Result<Option<Book>, DatabaseQueryError> {
    use schema::book::dsl::*;
    Ok(book.find(input_id).first::<Book>(&self.connection).optional()?)
  }

  pub fn is_book_owned_by(&self, user_id: i32, book_id: i32) -> Result<bool, DatabaseQueryError> {
    use schema::ownership;
    Ok(diesel::select(exists(ownership::table.find((user_id, book_id)))).get_result::<bool>(&self.connection)?)
  }

  /// Lists the books owned by the user with `user_id`, in insertion order. An empty list means the user owns no books;
  /// failing queries are reported as [`CatalogError::StoreUnavailable`].
  #[instrument(skip(self))]
  pub fn list_books_for_user(&self, user_id: i32) -> Result<Vec<Book>, CatalogError> {
    use schema::{book, ownership};
    let books = time!("list_books_for_user.select", book::table
      .inner_join(ownership::table)
      .filter(ownership::user_id.eq(user_id))
      .select(book::all_columns)
      .order(book::id.asc())
      .load::<Book>(&self.connection));
    match books {
      Ok(books) => Ok(books),
      Err(e) => {
        event!(Level::ERROR, user_id, error = %e, "Failed to list books");
        Err(e.into())
      }
    }
  }

  /// Creates a book owned by the user with `user_id`. The book and its ownership are written in one transaction, so a
  /// book is never left without an owner.
  #[instrument(skip(self, new_book), fields(title = %new_book.title))]
  pub fn create_book(&self, user_id: i32, new_book: &NewBook) -> Result<Book, CatalogError> {
    use schema::{book, ownership};
    let book = self.connection.transaction::<_, CatalogError, _>(|| {
      if self.get_user_by_id(user_id)?.is_none() {
        return Err(CatalogError::NotFound);
      }
      time!("create_book.insert", diesel::insert_into(book::table)
        .values(new_book)
        .execute(&self.connection)?);
      let book_id = diesel::select(last_insert_rowid).get_result::<i32>(&self.connection)?;
      time!("create_book.insert_ownership", diesel::insert_into(ownership::table)
        .values(NewOwnership { user_id, book_id })
        .execute(&self.connection)?);
      Ok(time!("create_book.select", book::table.find(book_id).first::<Book>(&self.connection)?))
    })?;
    event!(Level::INFO, book_id = book.id, user_id, "Created book");
    Ok(book)
  }

  /// Searches for books whose title, author, or genre contains `query`, case-sensitively. An empty query matches all
  /// books in `scope`.
  #[instrument(skip(self))]
  pub fn search_books(&self, query: &str, scope: SearchScope) -> Result<Vec<Book>, CatalogError> {
    use schema::{book, ownership};
    let mut select = book::table
      .order(book::id.asc())
      .into_boxed();
    if let SearchScope::Owned(user_id) = scope {
      select = select.filter(book::id.eq_any(ownership::table
        .filter(ownership::user_id.eq(user_id))
        .select(ownership::book_id)));
    }
    if !query.is_empty() {
      select = select.filter(instr(book::title, query).gt(0)
        .or(instr(book::author, query).gt(0))
        .or(instr(book::genre, query).gt(0)));
    }
    Ok(time!("search_books.select", select.load::<Book>(&self.connection)?))
  }

  /// Edits the fields of a book owned by the user with `user_id`. The reading status is only changed when
  /// `new_book` has one. Books the user does not own are reported as [`CatalogError::NotFound`].
  #[instrument(skip(self, new_book))]
  pub fn update_book(&self, user_id: i32, book_id: i32, new_book: &NewBook) -> Result<Book, CatalogError> {
    use schema::book;
    self.connection.transaction::<_, CatalogError, _>(|| {
      if !self.is_book_owned_by(user_id, book_id)? {
        return Err(CatalogError::NotFound);
      }
      let changeset = BookChangeset::from(new_book);
      time!("update_book.update", diesel::update(book::table.find(book_id))
        .set(&changeset)
        .execute(&self.connection)?);
      if let Some(reading_status) = &new_book.reading_status {
        time!("update_book.update_reading_status", diesel::update(book::table.find(book_id))
          .set(book::reading_status.eq(reading_status))
          .execute(&self.connection)?);
      }
      Ok(time!("update_book.select", book::table.find(book_id).first::<Book>(&self.connection)?))
    })
  }

  #[instrument(skip(self))]
  pub fn update_reading_status(&self, user_id: i32, book_id: i32, reading_status: &str) -> Result<Book, CatalogError> {
    use schema::book;
    self.connection.transaction::<_, CatalogError, _>(|| {
      if !self.is_book_owned_by(user_id, book_id)? {
        return Err(CatalogError::NotFound);
      }
      time!("update_reading_status.update", diesel::update(book::table.find(book_id))
        .set(book::reading_status.eq(reading_status))
        .execute(&self.connection)?);
      Ok(time!("update_reading_status.select", book::table.find(book_id).first::<Book>(&self.connection)?))
    })
  }

  /// Deletes a book owned by the user with `user_id`, together with its ratings, reviews, and ownerships.
  #[instrument(skip(self))]
  pub fn delete_book(&self, user_id: i32, book_id: i32) -> Result<(), CatalogError> {
    use schema::{book, ownership, rating, review};
    self.connection.transaction::<_, CatalogError, _>(|| {
      if !self.is_book_owned_by(user_id, book_id)? {
        return Err(CatalogError::NotFound);
      }
      time!("delete_book.delete_ratings", diesel::delete(rating::table.filter(rating::book_id.eq(book_id)))
        .execute(&self.connection)?);
      time!("delete_book.delete_reviews", diesel::delete(review::table.filter(review::book_id.eq(book_id)))
        .execute(&self.connection)?);
      time!("delete_book.delete_ownerships", diesel::delete(ownership::table.filter(ownership::book_id.eq(book_id)))
        .execute(&self.connection)?);
      time!("delete_book.delete", diesel::delete(book::table.find(book_id))
        .execute(&self.connection)?);
      Ok(())
    })?;
    event!(Level::INFO, book_id, user_id, "Deleted book");
    Ok(())
  }
}
