//! Common utilities and shared components

pub mod allocator;
pub mod constants;
pub mod error;
pub mod helper;

pub use allocator::*;
pub use constants::*;
pub use error::*;
pub use helper::*;
