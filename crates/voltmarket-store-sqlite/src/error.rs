//! Error type for `voltmarket-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] voltmarket_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its domain (e.g. an unknown role).
  #[error("invalid column value: {0}")]
  InvalidValue(String),
}

impl From<tokio_rusqlite::Error> for Error {
  /// Domain rejections raised inside a connection closure travel as
  /// `tokio_rusqlite::Error::Other`; unwrap them back into [`Error::Core`].
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(boxed) => {
        match boxed.downcast::<voltmarket_core::Error>() {
          Ok(core) => Error::Core(*core),
          Err(other) => match other.downcast::<Error>() {
            Ok(ours) => *ours,
            Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
          },
        }
      }
      other => Error::Database(other),
    }
  }
}

impl From<Error> for voltmarket_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => voltmarket_core::Error::Backend(Box::new(other)),
    }
  }
}

/// Abort a connection closure with a domain error.
pub(crate) fn reject(e: voltmarket_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Carry a decode failure out of a connection closure.
pub(crate) fn escape(e: Error) -> tokio_rusqlite::Error {
  match e {
    Error::Core(core) => reject(core),
    Error::Database(db) => db,
    other => tokio_rusqlite::Error::Other(Box::new(other)),
  }
}

/// Turn a UNIQUE violation into `on_unique`, passing other failures through.
/// Used as the backstop when a pre-insert uniqueness check loses a race.
pub(crate) fn on_unique_violation(
  err: rusqlite::Error,
  on_unique: impl FnOnce() -> voltmarket_core::Error,
) -> tokio_rusqlite::Error {
  match &err {
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      reject(on_unique())
    }
    _ => err.into(),
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
