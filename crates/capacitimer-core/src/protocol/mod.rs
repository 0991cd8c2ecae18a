//! Protocol module containing the JSON wire types and endpoint paths.

pub mod messages;

pub use messages::*;
