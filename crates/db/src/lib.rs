//! Persistence gateway (C10): the only crate that speaks SQL. Exposes a
//! narrow set of operations over the four relational tables (spec §6,
//! §4.10) and implements `labelforge_store::AssetRepository` so the
//! content-addressable store can be backed by Postgres without depending
//! on this crate directly.

pub mod codec;
pub mod gateway;
pub mod pool;
mod repository_impl;

pub use gateway::PgGateway;
pub use pool::connect;
