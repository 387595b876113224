use chrono::NaiveDateTime;

use bookshelf_core::model::User;
use bookshelf_core::schema::*;

// Internal user (includes password hash and salt)

#[derive(Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, Identifiable, Queryable)]
#[table_name = "user"]
pub(crate) struct InternalUser {
  pub id: i32,
  pub name: String,
  pub hash: Vec<u8>,
  pub salt: Vec<u8>,
}

impl From<InternalUser> for User {
  fn from(user: InternalUser) -> Self {
    User {
      id: user.id,
      name: user.name,
    }
  }
}

#[derive(Debug, Insertable)]
#[table_name = "user"]
pub(crate) struct InternalNewUser {
  pub name: String,
  pub hash: Vec<u8>,
  pub salt: Vec<u8>,
}

// Session

#[derive(Clone, PartialEq, Eq, Debug, Identifiable, Queryable, Insertable)]
#[primary_key(token)]
#[table_name = "session"]
pub struct Session {
  pub token: String,
  pub user_id: i32,
  pub created_at: NaiveDateTime,
}
