// crates/shared-kernel/src/infrastructure/memory/mod.rs
//
// Pool et connexions en mémoire pour les tests : même contrat transactionnel
// que Postgres (écritures en attente jusqu'au commit), avec injection de pannes.

mod memory_connection;
mod memory_connection_provider;


pub use memory_connection::MemoryConnection;
pub use memory_connection_provider::{MemoryConnectionProvider, MemoryPoolStats};

/// Code renvoyé par une violation d'unicité (aligné sur le SQLSTATE Postgres 23505)
pub const UNIQUE_VIOLATION: &str = "23505";

/// Code des pannes simulées (aligné sur le SQLSTATE Postgres 08006)
pub const SIMULATED_FAILURE: &str = "08006";
