use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use thiserror::Error;

use crate::password::PasswordHasher;

macro_rules! time {
  ($s:expr, $e:expr) => {{
    let start = std::time::Instant::now();
    let result = $e;
    metrics::timing!($s, start.elapsed());
    result
  }}
}

pub mod user;
pub mod session;
pub mod book;
pub mod feedback;

embed_migrations!("migrations");

no_arg_sql_function!(last_insert_rowid, diesel::sql_types::Integer, "Id of the row inserted last on this connection");


#[derive(Clone)]
pub struct Database {
  connection_pool: Pool<ConnectionManager<SqliteConnection>>,
  inner: Arc<Inner>,
}

struct Inner {
  password_hasher: PasswordHasher,
  session_max_age: Option<chrono::Duration>,
}


// Creation

#[derive(Debug, Error)]
pub enum DatabaseCreateError {
  #[error("Failed to create database connection pool")]
  ConnectionPoolCreateFail(#[from] r2d2::PoolError),
  #[error("Failed to run database migrations")]
  MigrationFail(#[from] diesel_migrations::RunMigrationsError),
}

/// Enables foreign keys (and with that, cascading deletes) and waits on locks instead of failing immediately, for every
/// connection the pool opens.
#[derive(Debug)]
struct ConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionCustomizer {
  fn on_acquire(&self, connection: &mut SqliteConnection) -> Result<(), r2d2::Error> {
    connection.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;").map_err(r2d2::Error::QueryError)
  }
}

impl Database {
  pub fn new<D: AsRef<str>>(
    database_url: D,
    password_hasher: PasswordHasher,
    session_max_age: Option<chrono::Duration>,
  ) -> Result<Database, DatabaseCreateError> {
    let connection_pool = Pool::builder()
      .max_size(16)
      .connection_timeout(Duration::from_secs(10))
      .connection_customizer(Box::new(ConnectionCustomizer))
      .build(ConnectionManager::<SqliteConnection>::new(database_url.as_ref()))?;
    let connection = connection_pool.get()?;
    embedded_migrations::run(&*connection)?;
    let inner = Arc::new(Inner { password_hasher, session_max_age });
    Ok(Database { connection_pool, inner })
  }
}


// Connecting to the database

pub struct DatabaseConnection {
  connection: PooledConnection<ConnectionManager<SqliteConnection>>,
  inner: Arc<Inner>,
}

#[derive(Debug, Error)]
pub enum DatabaseConnectError {
  #[error("Failed to get database connection from database connection pool")]
  ConnectionGetFail(#[from] r2d2::PoolError),
}

impl Database {
  pub fn connect(&self) -> Result<DatabaseConnection, DatabaseConnectError> {
    let connection = self.connection_pool.get()?;
    let inner = self.inner.clone();
    Ok(DatabaseConnection { connection, inner })
  }
}


// Generic database query error.

#[derive(Debug, Error)]
pub enum DatabaseQueryError {
  #[error("Failed to execute a database query")]
  DatabaseQueryFail(#[from] diesel::result::Error),
}


// Debug implementations

impl Debug for Database {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database")
  }
}

impl Debug for DatabaseConnection {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "DatabaseConnection")
  }
}
