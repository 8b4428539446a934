//! SQLite backend for the PIX payment engine.
//!
//! Migrations live in `migrations/` and are embedded with [`sqlx::migrate!`]; see [`SqliteDatabase::migrate`].
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
