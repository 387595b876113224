use pretty_assertions::assert_eq;

use bookshelf_backend::database::user::{LoginError, SignupError};
use bookshelf_core::model::{NewUser, UserLogin};
use bookshelf_core::validate::ValidationError;

use common::{signup, TestDatabase};

mod common;

fn login(name: &str, password: &str) -> UserLogin {
  UserLogin { name: name.to_string(), password: password.to_string() }
}

#[test]
fn signup_then_login() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  let alice = signup(&connection, "alice");
  assert_eq!(alice.name, "alice");

  let (user, token) = connection.login(&login("alice", "alice password")).unwrap();
  assert_eq!(user, alice);
  assert_eq!(connection.resolve_session(&token).unwrap(), Some(alice.clone()));
  assert_eq!(connection.count_sessions_of_user(alice.id).unwrap(), 1);
}

#[test]
fn login_accepts_name_as_given_at_signup() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  let alice = connection.signup(NewUser { name: " alice ".to_string(), password: "pw".to_string() }).unwrap();
  assert_eq!(alice.name, "alice");

  let (user, _) = connection.login(&login(" alice ", "pw")).unwrap();
  assert_eq!(user, alice);
  let (user, _) = connection.login(&login("alice", "pw")).unwrap();
  assert_eq!(user, alice);
  assert!(matches!(connection.login(&login(" alice ", "pw ")), Err(LoginError::InvalidCredentials)));
}

#[test]
fn duplicate_signup_is_rejected_without_changes() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  let alice = signup(&connection, "alice");

  let result = connection.signup(NewUser { name: "alice".to_string(), password: "other password".to_string() });
  assert!(matches!(result, Err(SignupError::DuplicateUser(name)) if name == "alice"));

  assert_eq!(connection.list_users().unwrap(), vec![alice]);
  assert!(connection.login(&login("alice", "alice password")).is_ok());
  assert!(matches!(connection.login(&login("alice", "other password")), Err(LoginError::InvalidCredentials)));
}

#[test]
fn signup_validates_input() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  let result = connection.signup(NewUser { name: "  ".to_string(), password: "secret".to_string() });
  assert!(matches!(result, Err(SignupError::ValidationFail(ValidationError::MissingField("name")))));
  assert!(connection.list_users().unwrap().is_empty());
}

#[test]
fn wrong_password_establishes_no_session() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  let alice = signup(&connection, "alice");

  let result = connection.login(&login("alice", "wrong password"));
  assert!(matches!(result, Err(LoginError::InvalidCredentials)));
  assert_eq!(connection.count_sessions_of_user(alice.id).unwrap(), 0);
}

#[test]
fn unknown_user_cannot_log_in() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  assert!(matches!(connection.login(&login("mallory", "password")), Err(LoginError::InvalidCredentials)));
}

#[test]
fn passwords_are_not_stored_verbatim() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  signup(&connection, "alice");

  use diesel::prelude::*;
  let raw = SqliteConnection::establish(&test_database.database_path()).unwrap();
  let hash: Vec<u8> = bookshelf_core::schema::user::table
    .select(bookshelf_core::schema::user::hash)
    .first(&raw)
    .unwrap();
  assert_ne!(hash, b"alice password".to_vec());
}

#[test]
fn logout_ends_session() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  signup(&connection, "alice");
  let (_, token) = connection.login(&login("alice", "alice password")).unwrap();

  assert!(connection.logout(&token).unwrap());
  assert_eq!(connection.resolve_session(&token).unwrap(), None);
  assert!(!connection.logout(&token).unwrap());
}

#[test]
fn sessions_are_per_login() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  let alice = signup(&connection, "alice");
  let (_, first) = connection.login(&login("alice", "alice password")).unwrap();
  let (_, second) = connection.login(&login("alice", "alice password")).unwrap();
  assert_ne!(first, second);

  connection.logout(&first).unwrap();
  assert_eq!(connection.resolve_session(&second).unwrap(), Some(alice));
}

#[test]
fn expired_sessions_do_not_resolve() {
  let test_database = TestDatabase::with_session_max_age(Some(chrono::Duration::seconds(-1)));
  let connection = test_database.connect();
  let alice = signup(&connection, "alice");
  let (_, token) = connection.login(&login("alice", "alice password")).unwrap();

  assert_eq!(connection.resolve_session(&token).unwrap(), None);
  assert_eq!(connection.count_sessions_of_user(alice.id).unwrap(), 0);
}

#[test]
fn unknown_token_does_not_resolve() {
  let test_database = TestDatabase::new();
  let connection = test_database.connect();
  assert_eq!(connection.resolve_session("not a token").unwrap(), None);
}
