/// Esplora Mock Server Library
///
/// Fixture-backed stand-in for an Esplora-compatible Litecoin indexer, usable
/// as a standalone binary or in-process from integration tests.

pub mod fixtures;
pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use fixtures::{AddressFixture, FixtureStore, Fixtures, UtxoFixture};
pub use server::{create_router, run_server, spawn_ephemeral};
pub use types::*;
