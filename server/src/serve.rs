use std::net;

use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{App, HttpResponse, HttpServer, middleware, web};

use bookshelf_backend::database::Database;

use crate::api::*;
use crate::auth::*;

pub async fn serve<A: net::ToSocketAddrs>(
  database: Database,
  search_scope: SearchScopeKind,
  bind_address: A,
  cookie_identity_secret_key: Vec<u8>,
) -> std::io::Result<()> {
  let database_data = web::Data::new(database);
  let search_scope_data = web::Data::new(search_scope);
  HttpServer::new(move || {
    App::new()
      .wrap(middleware::Logger::default())
      .wrap(identity_service(&cookie_identity_secret_key))
      .app_data(database_data.clone())
      .app_data(search_scope_data.clone())
      .configure(configure)
  })
    .bind(bind_address)?
    .run()
    .await
}

/// Identity service storing the session token in a private cookie named `auth`. `secret_key` must be at least 32 bytes.
pub fn identity_service(secret_key: &[u8]) -> IdentityService<CookieIdentityPolicy> {
  IdentityService::new(
    CookieIdentityPolicy::new(secret_key)
      .name("auth")
      .secure(false)
  )
}

pub fn configure(config: &mut web::ServiceConfig) {
  config
    .route("/", web::get().to(index))
    // Auth
    .route("/signup", web::post().to(signup))
    .route("/login", web::post().to(login))
    .route("/logout", web::delete().to(logout))
    .route("/user/me", web::get().to(show_my_user))
    // Book
    .route("/book", web::get().to(list_books))
    .route("/book", web::post().to(create_book))
    .route("/book/{id}", web::get().to(show_book_by_id))
    .route("/book/{id}", web::put().to(update_book_by_id))
    .route("/book/{id}", web::delete().to(delete_book_by_id))
    .route("/book/{id}/reading_status", web::put().to(update_reading_status_by_id))
    // Feedback
    .route("/book/{id}/feedback", web::post().to(submit_feedback))
    // Search
    .route("/search", web::get().to(search_books));
}

async fn index() -> HttpResponse {
  HttpResponse::Ok().finish()
}
