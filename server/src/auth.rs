use std::future::Future;
use std::pin::Pin;

use actix_identity::Identity;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use thiserror::Error;
use tracing::{event, Level};

use bookshelf_backend::database::{Database, DatabaseConnectError, DatabaseQueryError};
use bookshelf_core::api::ErrorMessage;
use bookshelf_core::format_error::FormatError;
use bookshelf_core::model::{NewUser, User, UserLogin};

use crate::api::ApiError;

// Logged-in user, resolved from the session token in the identity cookie once per request.

#[derive(Debug)]
pub struct LoggedInUser {
  pub user: User,
}

// Signup

pub async fn signup(new_user: web::Json<NewUser>, database: web::Data<Database>) -> Result<HttpResponse, ApiError> {
  let user = web::block(move || -> Result<User, ApiError> {
    Ok(database.connect()?.signup(new_user.into_inner())?)
  }).await.map_err(|_| ApiError::BlockingThreadPoolGoneFail)??;
  Ok(HttpResponse::Ok().json(&user))
}

// Login

pub async fn login(user_login: web::Json<UserLogin>, identity: Identity, database: web::Data<Database>) -> Result<HttpResponse, ApiError> {
  let (user, token) = web::block(move || -> Result<(User, String), ApiError> {
    Ok(database.connect()?.login(&user_login)?)
  }).await.map_err(|_| ApiError::BlockingThreadPoolGoneFail)??;
  identity.remember(token);
  Ok(HttpResponse::Ok().json(&user))
}

// Logout

pub async fn logout(identity: Identity, database: web::Data<Database>) -> Result<HttpResponse, ApiError> {
  if let Some(token) = identity.identity() {
    web::block(move || -> Result<bool, ApiError> {
      Ok(database.connect()?.logout(token)?)
    }).await.map_err(|_| ApiError::BlockingThreadPoolGoneFail)??;
  }
  identity.forget();
  Ok(HttpResponse::Ok().finish())
}

pub async fn show_my_user(logged_in_user: LoggedInUser) -> HttpResponse {
  HttpResponse::Ok().json(&logged_in_user.user)
}

// Logged-in user extractor

#[derive(Debug, Error)]
pub enum LoggedInUserExtractError {
  #[error("Failed to extract the identity from the request")]
  IdentityExtractFail,
  #[error("Database is not configured for this application")]
  DatabaseMissingFail,
  #[error("Failed to connect to the database")]
  DatabaseConnectFail(#[from] DatabaseConnectError),
  #[error("Failed to resolve the session")]
  SessionResolveFail(#[from] DatabaseQueryError),
  #[error("Blocking thread pool is gone")]
  BlockingThreadPoolGoneFail,
  #[error("Not logged in")]
  NotLoggedInFail,
}

impl ResponseError for LoggedInUserExtractError {
  fn status_code(&self) -> StatusCode {
    use LoggedInUserExtractError::*;
    match self {
      NotLoggedInFail => StatusCode::UNAUTHORIZED,
      DatabaseConnectFail(_) | SessionResolveFail(_) => StatusCode::SERVICE_UNAVAILABLE,
      _ => StatusCode::INTERNAL_SERVER_ERROR
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status_code = self.status_code();
    match self {
      Self::NotLoggedInFail => HttpResponse::build(status_code).finish(),
      _ => {
        let format_error = FormatError::new(self);
        event!(Level::ERROR, "{:?}", format_error);
        HttpResponse::build(status_code).json(ErrorMessage {
          message: self.to_string()
        })
      }
    }
  }
}

impl FromRequest for LoggedInUser {
  type Error = LoggedInUserExtractError;
  type Future = Pin<Box<dyn Future<Output=Result<LoggedInUser, LoggedInUserExtractError>>>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    use LoggedInUserExtractError::*;
    let identity = Identity::from_request(req, payload);
    let database = req.app_data::<web::Data<Database>>().cloned();
    Box::pin(async move {
      let token = identity.await.map_err(|_| IdentityExtractFail)?.identity().ok_or(NotLoggedInFail)?;
      let database = database.ok_or(DatabaseMissingFail)?;
      let user = web::block(move || -> Result<Option<User>, LoggedInUserExtractError> {
        Ok(database.connect()?.resolve_session(token)?)
      }).await.map_err(|_| BlockingThreadPoolGoneFail)??;
      match user {
        Some(user) => Ok(LoggedInUser { user }),
        None => Err(NotLoggedInFail),
      }
    })
  }
}
