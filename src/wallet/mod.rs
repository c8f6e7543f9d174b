pub mod address_manager;
pub mod keys;
pub mod scanner;
pub mod sweep;

pub use address_manager::AddressManager;
pub use keys::{ExtendedKey, KeyManager, SigningKey};
pub use scanner::{AddressScanner, GapPolicy};
pub use sweep::Sweeper;
