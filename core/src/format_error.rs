use core::fmt;
use core::fmt::{Debug, Formatter};
use std::error::Error;

/// Formats an error together with its chain of sources, in the style of `anyhow`:
///
/// ```text
/// Failed to create book
///
/// Caused by:
///     0: Store is unavailable
///     1: no such table: ownership
/// ```
pub struct FormatError<'a, E: Error> {
  error: &'a E,
}

impl<'a, E: Error> FormatError<'a, E> {
  pub fn new(error: &'a E) -> Self {
    Self { error }
  }
}

impl<'a, E: Error> Debug for FormatError<'a, E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    if f.alternate() {
      return Debug::fmt(self.error, f);
    }

    write!(f, "{}", self.error)?;
    let causes: Vec<_> = std::iter::successors(self.error.source(), |&e| e.source()).collect();
    if causes.is_empty() {
      return Ok(());
    }
    write!(f, "\n\nCaused by:")?;
    let numbered = causes.len() > 1;
    for (n, cause) in causes.into_iter().enumerate() {
      writeln!(f)?;
      let message = cause.to_string();
      for (i, line) in message.split('\n').enumerate() {
        if i > 0 {
          writeln!(f)?;
        }
        match (numbered, i) {
          (true, 0) => write!(f, "{: >5}: {}", n, line)?,
          (true, _) => write!(f, "       {}", line)?,
          (false, _) => write!(f, "    {}", line)?,
        }
      }
    }
    Ok(())
  }
}
