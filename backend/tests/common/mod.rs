#![allow(dead_code)]

use tempfile::TempDir;

use bookshelf_backend::database::{Database, DatabaseConnection};
use bookshelf_backend::password::PasswordHasher;
use bookshelf_core::model::{NewBook, NewUser, User};

/// A database in a temporary directory, deleted when dropped.
pub struct TestDatabase {
  pub database: Database,
  pub directory: TempDir,
}

impl TestDatabase {
  pub fn new() -> Self {
    Self::with_session_max_age(None)
  }

  pub fn with_session_max_age(session_max_age: Option<chrono::Duration>) -> Self {
    let directory = tempfile::tempdir().unwrap();
    let database = Database::new(
      Self::path(&directory),
      PasswordHasher::new("test secret"),
      session_max_age,
    ).unwrap();
    Self { database, directory }
  }

  fn path(directory: &TempDir) -> String {
    directory.path().join("bookshelf.sqlite").to_string_lossy().into_owned()
  }

  pub fn database_path(&self) -> String {
    Self::path(&self.directory)
  }

  pub fn connect(&self) -> DatabaseConnection {
    self.database.connect().unwrap()
  }
}

pub fn signup(connection: &DatabaseConnection, name: &str) -> User {
  connection.signup(NewUser { name: name.to_string(), password: format!("{} password", name) }).unwrap()
}

pub fn new_book(title: &str, author: &str, genre: &str) -> NewBook {
  NewBook {
    title: title.to_string(),
    author: author.to_string(),
    genre: genre.to_string(),
    cover_image: None,
    reading_status: None,
  }
}
