//! Persistence services: the SQLite collaborator and the repository that
//! runs the metadata lifecycle hooks around it.

pub mod record_store;
pub mod repository;
