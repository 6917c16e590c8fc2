//! Domain layer - Core account entities and password hashing.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod account;
pub mod constants;
pub mod error;
pub mod password;

pub use account::{Account, AccountView, NewAccount};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{Argon2Hasher, PasswordHasher, PasswordScheme, Sha256Hasher};
