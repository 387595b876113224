use chrono::Utc;
use diesel::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{event, instrument, Level};

use bookshelf_core::model::{User, UserLogin};
use bookshelf_core::schema;

use crate::model::Session;

use super::{DatabaseConnection, DatabaseQueryError, user::LoginError};

const TOKEN_LENGTH: usize = 43;

fn generate_token() -> String {
  rand::thread_rng().sample_iter(&Alphanumeric).take(TOKEN_LENGTH).map(char::from).collect()
}

// Session database queries. A session maps a random token, handed to the client, to a logged-in user.

impl DatabaseConnection {
  /// Verifies `user_login` and starts a session for the user. No session is created when verification fails.
  #[instrument(skip(self, user_login), fields(name = %user_login.name))]
  pub fn login(&self, user_login: &UserLogin) -> Result<(User, String), LoginError> {
    let user = self.verify_user(user_login)?.ok_or(LoginError::InvalidCredentials)?;
    let session = Session {
      token: generate_token(),
      user_id: user.id,
      created_at: Utc::now().naive_utc(),
    };
    time!("login.insert_session", diesel::insert_into(schema::session::table)
      .values(&session)
      .execute(&self.connection)?);
    event!(Level::DEBUG, user_id = user.id, "Started session");
    Ok((user, session.token))
  }

  /// Ends the session with `token`. Returns whether there was such a session.
  pub fn logout<S: AsRef<str>>(&self, token: S) -> Result<bool, DatabaseQueryError> {
    use schema::session;
    let deleted = time!("logout.delete", diesel::delete(session::table.find(token.as_ref()))
      .execute(&self.connection)?);
    Ok(deleted == 1)
  }

  /// Gets the user logged in with `token`, or `None` if the session does not exist or has expired. Expired sessions are
  /// removed.
  pub fn resolve_session<S: AsRef<str>>(&self, token: S) -> Result<Option<User>, DatabaseQueryError> {
    use schema::session;
    let token = token.as_ref();
    let session = time!("resolve_session.select", session::table
      .find(token)
      .first::<Session>(&self.connection)
      .optional()?);
    let session = match session {
      Some(session) => session,
      None => return Ok(None),
    };
    if let Some(max_age) = self.inner.session_max_age {
      if Utc::now().naive_utc() - session.created_at > max_age {
        event!(Level::DEBUG, user_id = session.user_id, "Session expired");
        self.logout(token)?;
        return Ok(None);
      }
    }
    self.get_user_by_id(session.user_id)
  }

  pub fn count_sessions_of_user(&self, input_user_id: i32) -> Result<i64, DatabaseQueryError> {
    use schema::session::dsl::*;
    Ok(session.filter(user_id.eq(input_user_id)).count().get_result::<i64>(&self.connection)?)
  }
}
