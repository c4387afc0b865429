//! Storage module for PrismPack
//!
//! This module provides the compressed column layer:
//! - Compression (bit-packing and block codecs)
//! - Segments (nullable, immutable compressed column chunks)
//! - Segment iterables (sequential scans and position-list access)
//! - Access statistics for adaptive re-encoding

pub mod access_counter;
pub mod compression;
pub mod iterable;
pub mod segment;

pub use access_counter::*;
pub use compression::*;
pub use iterable::*;
pub use segment::*;
