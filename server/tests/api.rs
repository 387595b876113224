use actix_web::{App, test, web};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use bookshelf_backend::database::Database;
use bookshelf_backend::password::PasswordHasher;
use bookshelf_core::model::{Book, User};
use bookshelf_core::model::details::BookDetails;
use bookshelf_server::api::SearchScopeKind;
use bookshelf_server::serve::{configure, identity_service};

fn create_database(directory: &TempDir) -> Database {
  let path = directory.path().join("bookshelf.sqlite");
  Database::new(path.to_string_lossy(), PasswordHasher::new("test secret"), None).unwrap()
}

macro_rules! init_app {
  ($database:expr) => {
    test::init_service(App::new()
      .wrap(identity_service(&[0; 32]))
      .app_data(web::Data::new($database))
      .app_data(web::Data::new(SearchScopeKind::Global))
      .configure(configure)
    ).await
  };
}

macro_rules! signup_and_login {
  ($app:expr, $name:expr) => {{
    let credentials = json!({ "name": $name, "password": format!("{} password", $name) });
    let response = test::call_service(&$app, test::TestRequest::post().uri("/signup").set_json(&credentials).to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = test::call_service(&$app, test::TestRequest::post().uri("/login").set_json(&credentials).to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie: Cookie<'static> = response.response().cookies()
      .find(|c| c.name() == "auth")
      .expect("login response sets the auth cookie")
      .into_owned();
    cookie
  }};
}

#[actix_rt::test]
async fn logged_in_user_creates_and_lists_books() {
  let directory = tempfile::tempdir().unwrap();
  let app = init_app!(create_database(&directory));
  let cookie = signup_and_login!(app, "alice");

  let request = test::TestRequest::post().uri("/book")
    .cookie(cookie.clone())
    .set_json(&json!({ "title": "Dune", "author": "Frank Herbert", "genre": "Sci-Fi" }))
    .to_request();
  let created: Book = test::call_and_read_body_json(&app, request).await;
  assert_eq!(created.title, "Dune");
  assert_eq!(created.reading_status, None);

  let request = test::TestRequest::get().uri("/book").cookie(cookie.clone()).to_request();
  let books: Vec<Book> = test::call_and_read_body_json(&app, request).await;
  assert_eq!(books, vec![created]);

  let request = test::TestRequest::get().uri("/user/me").cookie(cookie).to_request();
  let user: User = test::call_and_read_body_json(&app, request).await;
  assert_eq!(user.name, "alice");
}

#[actix_rt::test]
async fn requests_without_session_are_unauthorized() {
  let directory = tempfile::tempdir().unwrap();
  let app = init_app!(create_database(&directory));

  for request in vec![
    test::TestRequest::get().uri("/book").to_request(),
    test::TestRequest::get().uri("/search?query=Dune").to_request(),
    test::TestRequest::get().uri("/book/1").to_request(),
    test::TestRequest::get().uri("/user/me").to_request(),
  ] {
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
  }
}

#[actix_rt::test]
async fn duplicate_signup_is_a_conflict() {
  let directory = tempfile::tempdir().unwrap();
  let app = init_app!(create_database(&directory));
  let credentials = json!({ "name": "alice", "password": "first" });
  let response = test::call_service(&app, test::TestRequest::post().uri("/signup").set_json(&credentials).to_request()).await;
  assert_eq!(response.status(), StatusCode::OK);

  let credentials = json!({ "name": "alice", "password": "second" });
  let response = test::call_service(&app, test::TestRequest::post().uri("/signup").set_json(&credentials).to_request()).await;
  assert_eq!(response.status(), StatusCode::CONFLICT);

  let credentials = json!({ "name": "alice", "password": "second" });
  let response = test::call_service(&app, test::TestRequest::post().uri("/login").set_json(&credentials).to_request()).await;
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn feedback_is_validated_and_aggregated() {
  let directory = tempfile::tempdir().unwrap();
  let app = init_app!(create_database(&directory));
  let cookie = signup_and_login!(app, "alice");
  let request = test::TestRequest::post().uri("/book")
    .cookie(cookie.clone())
    .set_json(&json!({ "title": "Dune", "author": "Frank Herbert", "genre": "Sci-Fi" }))
    .to_request();
  let book: Book = test::call_and_read_body_json(&app, request).await;
  let feedback_uri = format!("/book/{}/feedback", book.id);

  let request = test::TestRequest::post().uri(&feedback_uri)
    .cookie(cookie.clone())
    .set_json(&json!({ "rating": "five", "review": "Great" }))
    .to_request();
  let response = test::call_service(&app, request).await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  let request = test::TestRequest::post().uri(&feedback_uri)
    .cookie(cookie.clone())
    .set_json(&json!({ "rating": "5", "review": "Great" }))
    .to_request();
  let details: BookDetails = test::call_and_read_body_json(&app, request).await;
  assert_eq!(details.average_rating, 5.0);

  let request = test::TestRequest::post().uri(&feedback_uri)
    .cookie(cookie.clone())
    .set_json(&json!({ "rating": "3", "review": "Slow start" }))
    .to_request();
  let details: BookDetails = test::call_and_read_body_json(&app, request).await;
  assert_eq!(details.average_rating, 4.0);
  assert_eq!(details.reviews.len(), 2);

  let request = test::TestRequest::post().uri("/book/999/feedback")
    .cookie(cookie)
    .set_json(&json!({ "rating": "3", "review": "Missing" }))
    .to_request();
  let response = test::call_service(&app, request).await;
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn other_users_cannot_edit_books() {
  let directory = tempfile::tempdir().unwrap();
  let app = init_app!(create_database(&directory));
  let alice = signup_and_login!(app, "alice");
  let bob = signup_and_login!(app, "bob");
  let request = test::TestRequest::post().uri("/book")
    .cookie(alice.clone())
    .set_json(&json!({ "title": "Dune", "author": "Frank Herbert", "genre": "Sci-Fi" }))
    .to_request();
  let book: Book = test::call_and_read_body_json(&app, request).await;

  let request = test::TestRequest::delete().uri(&format!("/book/{}", book.id)).cookie(bob.clone()).to_request();
  let response = test::call_service(&app, request).await;
  assert_eq!(response.status(), StatusCode::NOT_FOUND);

  let request = test::TestRequest::get().uri("/search?query=Dune").cookie(bob).to_request();
  let books: Vec<Book> = test::call_and_read_body_json(&app, request).await;
  assert_eq!(books, vec![book.clone()]);

  let request = test::TestRequest::delete().uri(&format!("/book/{}", book.id)).cookie(alice.clone()).to_request();
  let response = test::call_service(&app, request).await;
  assert_eq!(response.status(), StatusCode::OK);
  let request = test::TestRequest::get().uri("/book").cookie(alice).to_request();
  let books: Vec<Book> = test::call_and_read_body_json(&app, request).await;
  assert!(books.is_empty());
}

#[actix_rt::test]
async fn logout_invalidates_session() {
  let directory = tempfile::tempdir().unwrap();
  let app = init_app!(create_database(&directory));
  let cookie = signup_and_login!(app, "alice");

  let request = test::TestRequest::delete().uri("/logout").cookie(cookie.clone()).to_request();
  let response = test::call_service(&app, request).await;
  assert_eq!(response.status(), StatusCode::OK);

  let request = test::TestRequest::get().uri("/book").cookie(cookie).to_request();
  let response = test::call_service(&app, request).await;
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
