//! State structures for the binary market protocol

pub mod factory;
pub mod market;
pub mod position;

pub use factory::*;
pub use market::*;
pub use position::*;
