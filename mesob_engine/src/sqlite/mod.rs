//! SQLite backend for the order engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

/// The embedded schema migrations. The server runs these on startup; tests run them against
/// their throwaway databases.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
