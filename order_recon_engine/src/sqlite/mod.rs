//! SQLite backend for the order record store.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteOrderStore;
