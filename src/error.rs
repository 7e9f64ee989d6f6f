//! Error types for quadtile.

use thiserror::Error;

/// Errors produced by quadkey construction and lookup-tree contracts.
///
/// Domain cases that simply have no answer (an encode at an out-of-range
/// zoom, a containment query that matches nothing) are reported through
/// sentinels (`Quad::EMPTY`, `Ok(None)`), not through this enum.
#[derive(Debug, Error)]
pub enum QuadError {
    /// A raw quadkey string failed validation at the construction boundary.
    /// Quadkeys are at most 23 digits out of `0123` (empty means the whole
    /// map); derived quads are valid by construction and are never re-checked.
    #[error("invalid quadkey '{0}': expected at most 23 digits out of '0123'")]
    InvalidQuadKey(String),

    /// A caller violated a resolution contract of the lookup tree, e.g.
    /// adding a quad shallower than the tree's max zoom.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for quadtile operations.
pub type Result<T> = std::result::Result<T, QuadError>;
