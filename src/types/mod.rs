//! Type system module for PrismPack
//!
//! This module contains the value containers shared by segments and
//! query operators:
//! - NullBitmap: per-position null flags of a segment
//! - PositionList: caller-supplied logical positions for point access

pub mod null_bitmap;
pub mod position_list;

// Re-export main types for convenience
pub use null_bitmap::{NullBitmap, NullBitmapIterator};
pub use position_list::PositionList;

/// Unsigned 32-bit column value, after any upstream dictionary or zig-zag mapping
pub type RawValue = u32;
