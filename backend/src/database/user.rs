use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use tracing::{event, instrument, Level};

use bookshelf_core::model::{NewUser, User, UserLogin};
use bookshelf_core::schema;
use bookshelf_core::validate::ValidationError;

use crate::model::{InternalNewUser, InternalUser};
use crate::password::{HashedPassword, HashError};

use super::{DatabaseConnection, DatabaseQueryError};

// User database queries

#[derive(Debug, Error)]
pub enum SignupError {
  #[error(transparent)]
  ValidationFail(#[from] ValidationError),
  #[error("User '{0}' already exists")]
  DuplicateUser(String),
  #[error("Failed to execute a database query")]
  DatabaseQueryFail(#[from] DieselError),
  #[error("Failed to hash password")]
  PasswordHashFail(#[from] HashError),
}

#[derive(Debug, Error)]
pub enum LoginError {
  #[error("Invalid user name or password")]
  InvalidCredentials,
  #[error("Failed to execute a database query")]
  DatabaseQueryFail(#[from] DieselError),
  #[error("Failed to hash password")]
  PasswordHashFail(#[from] HashError),
}

impl DatabaseConnection {
  pub fn list_users(&self) -> Result<Vec<User>, DatabaseQueryError> {
    use schema::user::dsl::*;
    Ok(user.select((id, name)).order(id.asc()).load::<User>(&self.connection)?)
  }

  pub fn get_user_by_id(&self, input_id: i32) -> Result<Option<User>, DatabaseQueryError> {
    use schema::user::dsl::*;
    Ok(user.select((id, name)).find(input_id).first::<User>(&self.connection).optional()?)
  }

  /// Checks `user_login` against the stored password hash. Returns `None` for an unknown name or a wrong password. The
  /// name is trimmed the same way signup trims it.
  pub fn verify_user(&self, user_login: &UserLogin) -> Result<Option<User>, LoginError> {
    let user: Option<InternalUser> = {
      use schema::user::dsl::*;
      user
        .filter(name.eq(user_login.name.trim()))
        .first::<InternalUser>(&self.connection)
        .optional()?
    };
    if let Some(user) = user {
      if self.inner.password_hasher.verify(&user_login.password, &user.salt, &user.hash)? {
        Ok(Some(user.into()))
      } else {
        Ok(None)
      }
    } else {
      Ok(None)
    }
  }

  /// Creates a user with a salted hash of its password. Fails with [`SignupError::DuplicateUser`] without changing
  /// anything when the name is taken.
  #[instrument(skip(self, new_user), fields(name = %new_user.name))]
  pub fn signup(&self, new_user: NewUser) -> Result<User, SignupError> {
    use schema::user;
    use SignupError::*;
    let new_user = new_user.validate()?;
    let HashedPassword { hash, salt } = self.inner.password_hasher.hash_new_password(&new_user.password)?;
    let internal_new_user = InternalNewUser {
      name: new_user.name.clone(),
      hash,
      salt,
    };
    self.connection.transaction::<_, SignupError, _>(|| {
      let existing = time!("signup.select_existing", user::table
        .select(user::id)
        .filter(user::name.eq(&new_user.name))
        .first::<i32>(&self.connection)
        .optional()?);
      if existing.is_some() {
        return Err(DuplicateUser(new_user.name.clone()));
      }
      let inserted = time!("signup.insert", diesel::insert_into(user::table)
        .values(&internal_new_user)
        .execute(&self.connection));
      match inserted {
        // Lost a race against another signup with the same name.
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => return Err(DuplicateUser(new_user.name.clone())),
        result => result?,
      };
      let select_query = user::table
        .select((user::id, user::name))
        .filter(user::name.eq(&new_user.name));
      Ok(time!("signup.select", select_query.first::<User>(&self.connection)?))
    }).map(|user| {
      event!(Level::INFO, user_id = user.id, "Signed up user");
      user
    })
  }
}
