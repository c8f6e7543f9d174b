//! Litecoin ledger primitives: network parameters, address codecs, the
//! indexer client, fee engine and transaction assembly.

pub mod address;
pub mod esplora;
pub mod fee;
pub mod network;
pub mod size;
pub mod spend;
pub mod transaction;
pub mod utxo;
