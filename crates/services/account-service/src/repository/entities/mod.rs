//! SeaORM entity definitions.

pub mod account;
