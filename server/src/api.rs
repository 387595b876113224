use std::str::FromStr;

use actix_web::{HttpResponse, ResponseError, web};
use actix_web::http::StatusCode;
use thiserror::Error;
use tracing::{event, Level};

use bookshelf_backend::database::{Database, DatabaseConnectError, DatabaseConnection, DatabaseQueryError};
use bookshelf_backend::database::book::{CatalogError, SearchScope};
use bookshelf_backend::database::user::{LoginError, SignupError};
use bookshelf_core::api::{BookForm, ErrorMessage, FeedbackForm, ReadingStatusForm, SearchQuery};
use bookshelf_core::format_error::FormatError;
use bookshelf_core::validate::ValidationError;

use crate::auth::LoggedInUser;

// Search scope configuration

/// Whether searching finds the books of all users, or only those of the searching user.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SearchScopeKind {
  Global,
  Owned,
}

impl SearchScopeKind {
  pub fn for_user(&self, user_id: i32) -> SearchScope {
    match self {
      SearchScopeKind::Global => SearchScope::Global,
      SearchScopeKind::Owned => SearchScope::Owned(user_id),
    }
  }
}

#[derive(Debug, Error)]
#[error("Unknown search scope '{0}'; expected 'global' or 'owned'")]
pub struct SearchScopeParseError(String);

impl FromStr for SearchScopeKind {
  type Err = SearchScopeParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "global" => Ok(SearchScopeKind::Global),
      "owned" => Ok(SearchScopeKind::Owned),
      _ => Err(SearchScopeParseError(s.to_string())),
    }
  }
}

// Books

pub async fn list_books(
  database: web::Data<Database>,
  logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let user_id = logged_in_user.user.id;
  let books = run(database, move |connection| Ok(connection.list_books_for_user(user_id)?)).await?;
  Ok(HttpResponse::Ok().json(books))
}

pub async fn create_book(
  book_form: web::Json<BookForm>,
  database: web::Data<Database>,
  logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let new_book = book_form.into_inner().validate()?;
  let user_id = logged_in_user.user.id;
  let book = run(database, move |connection| Ok(connection.create_book(user_id, &new_book)?)).await?;
  Ok(HttpResponse::Ok().json(book))
}

pub async fn show_book_by_id(
  id: web::Path<i32>,
  database: web::Data<Database>,
  _logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let book_id = id.into_inner();
  let details = run(database, move |connection| Ok(connection.get_book_details(book_id)?)).await?;
  Ok(HttpResponse::Ok().json(details))
}

pub async fn update_book_by_id(
  id: web::Path<i32>,
  book_form: web::Json<BookForm>,
  database: web::Data<Database>,
  logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let new_book = book_form.into_inner().validate()?;
  let (user_id, book_id) = (logged_in_user.user.id, id.into_inner());
  let book = run(database, move |connection| Ok(connection.update_book(user_id, book_id, &new_book)?)).await?;
  Ok(HttpResponse::Ok().json(book))
}

pub async fn update_reading_status_by_id(
  id: web::Path<i32>,
  reading_status_form: web::Json<ReadingStatusForm>,
  database: web::Data<Database>,
  logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let reading_status = reading_status_form.into_inner().validate()?;
  let (user_id, book_id) = (logged_in_user.user.id, id.into_inner());
  let book = run(database, move |connection| Ok(connection.update_reading_status(user_id, book_id, &reading_status)?)).await?;
  Ok(HttpResponse::Ok().json(book))
}

pub async fn delete_book_by_id(
  id: web::Path<i32>,
  database: web::Data<Database>,
  logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let (user_id, book_id) = (logged_in_user.user.id, id.into_inner());
  run(database, move |connection| Ok(connection.delete_book(user_id, book_id)?)).await?;
  Ok(HttpResponse::Ok().finish())
}

// Feedback

pub async fn submit_feedback(
  id: web::Path<i32>,
  feedback_form: web::Json<FeedbackForm>,
  database: web::Data<Database>,
  _logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let feedback = feedback_form.into_inner().validate()?;
  let book_id = id.into_inner();
  let details = run(database, move |connection| {
    connection.submit_feedback(book_id, &feedback)?;
    Ok(connection.get_book_details(book_id)?)
  }).await?;
  Ok(HttpResponse::Ok().json(details))
}

// Search

pub async fn search_books(
  query: web::Query<SearchQuery>,
  search_scope: web::Data<SearchScopeKind>,
  database: web::Data<Database>,
  logged_in_user: LoggedInUser,
) -> Result<HttpResponse, ApiError> {
  let scope = search_scope.for_user(logged_in_user.user.id);
  let query = query.into_inner().query;
  let books = run(database, move |connection| Ok(connection.search_books(&query, scope)?)).await?;
  Ok(HttpResponse::Ok().json(books))
}

/// Runs `f` with a database connection on the blocking thread pool.
async fn run<T: Send + 'static>(
  database: web::Data<Database>,
  f: impl FnOnce(DatabaseConnection) -> Result<T, ApiError> + Send + 'static,
) -> Result<T, ApiError> {
  web::block(move || -> Result<T, ApiError> { f(database.connect()?) }).await.map_err(|_| ApiError::BlockingThreadPoolGoneFail)?
}

// API error

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Failed to connect to the database")]
  DatabaseConnectFail(#[from] DatabaseConnectError),
  #[error("Failed to execute a database query")]
  DatabaseQueryFail(#[from] DatabaseQueryError),
  #[error(transparent)]
  ValidationFail(#[from] ValidationError),
  #[error(transparent)]
  CatalogFail(#[from] CatalogError),
  #[error(transparent)]
  SignupFail(#[from] SignupError),
  #[error(transparent)]
  LoginFail(#[from] LoginError),
  #[error("Blocking thread pool is gone")]
  BlockingThreadPoolGoneFail,
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    use ApiError::*;
    match self {
      DatabaseConnectFail(_) | DatabaseQueryFail(_) => StatusCode::SERVICE_UNAVAILABLE,
      ValidationFail(_) => StatusCode::BAD_REQUEST,
      CatalogFail(CatalogError::NotFound) => StatusCode::NOT_FOUND,
      CatalogFail(CatalogError::ValidationFail(_)) => StatusCode::BAD_REQUEST,
      CatalogFail(CatalogError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
      SignupFail(SignupError::ValidationFail(_)) => StatusCode::BAD_REQUEST,
      SignupFail(SignupError::DuplicateUser(_)) => StatusCode::CONFLICT,
      SignupFail(SignupError::DatabaseQueryFail(_)) => StatusCode::SERVICE_UNAVAILABLE,
      LoginFail(LoginError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
      LoginFail(LoginError::DatabaseQueryFail(_)) => StatusCode::SERVICE_UNAVAILABLE,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status_code = self.status_code();
    if status_code.is_server_error() {
      let format_error = FormatError::new(self);
      event!(Level::ERROR, "{:?}", format_error);
    }
    HttpResponse::build(status_code).json(ErrorMessage {
      message: self.to_string()
    })
  }
}
