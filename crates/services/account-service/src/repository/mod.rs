//! Repository layer for account persistence.

mod account_store;
pub mod entities;
mod memory;
mod sea_store;

#[cfg(any(test, feature = "test-utils"))]
pub use account_store::MockAccountStore;
pub use account_store::{AccountFilter, AccountStore, AccountUpdate};
pub use memory::MemoryAccountStore;
pub use sea_store::SeaAccountStore;
