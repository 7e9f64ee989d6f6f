//! Quadkey addressing of Mercator tiles.
//!
//! A quadkey names one tile of the Mercator grid as a base-4 digit string
//! whose length equals the zoom level: each digit interleaves one bit of the
//! tile's x index (contributing 1) and y index (contributing 2), most
//! significant bit first. "0" is the top-left quarter of the map, "3" the
//! bottom-right; every extra digit subdivides the cell into four.
//!
//! [`Quad`] stores the digits packed two bits each in a `u64` with the zoom
//! alongside, so containment checks and neighbor moves are O(1) bit
//! arithmetic instead of string work. The string form only appears at the
//! boundary ([`std::fmt::Display`], [`std::str::FromStr`], serde).

use crate::error::QuadError;
use crate::projection::{MAX_ZOOM, MIN_ZOOM};
use crate::tile::TileXy;
use geo::Point;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A quadkey: the hierarchical base-4 address of a Mercator tile.
///
/// Immutable `Copy` value. Two quads are equal iff their digit strings are
/// equal. The empty quad (zoom 0) denotes the whole map.
///
/// # Examples
///
/// ```rust
/// use quadtile::Quad;
///
/// let q = Quad::from_lat_lon(47.45, 8.56, 9);
/// assert_eq!(q.zoom(), 9);
///
/// let parsed: Quad = "021".parse().unwrap();
/// assert!(parsed.includes(parsed));
/// assert!("02x".parse::<Quad>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Quad {
    // digits packed 2 bits each, last digit in the two least significant
    // bits; invariant: bits < 4^zoom
    bits: u64,
    zoom: u8,
}

impl Quad {
    /// The whole map: zoom 0, no digits.
    pub const EMPTY: Quad = Quad { bits: 0, zoom: 0 };

    pub(crate) const fn from_raw(bits: u64, zoom: u8) -> Self {
        Quad { bits, zoom }
    }

    pub(crate) const fn bits(self) -> u64 {
        self.bits
    }

    /// Encode a tile index at a zoom level.
    ///
    /// Returns [`Quad::EMPTY`] (the "no quad" sentinel) when the zoom is
    /// outside `1..=23` or the tile index does not exist at that zoom.
    pub fn from_tile(tile: TileXy, zoom: u8) -> Self {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Quad::EMPTY;
        }
        let side = 1u32 << zoom;
        if tile.x >= side || tile.y >= side {
            return Quad::EMPTY;
        }

        let mut bits = 0u64;
        for i in (0..zoom).rev() {
            let mask = 1u32 << i;
            let mut digit = 0u64;
            if tile.x & mask != 0 {
                digit |= 1;
            }
            if tile.y & mask != 0 {
                digit |= 2;
            }
            bits = (bits << 2) | digit;
        }
        Quad { bits, zoom }
    }

    /// Encode the tile containing a geographic coordinate at a zoom level.
    /// Out-of-range zoom yields [`Quad::EMPTY`].
    pub fn from_lat_lon(lat: f64, lon: f64, zoom: u8) -> Self {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Quad::EMPTY;
        }
        Self::from_tile(TileXy::from_lat_lon(lat, lon, zoom), zoom)
    }

    /// Decode back to the tile index. The empty quad decodes to tile (0, 0).
    pub fn to_tile(self) -> TileXy {
        let mut x = 0u32;
        let mut y = 0u32;
        for i in 0..self.zoom {
            let digit = (self.bits >> (2 * i)) & 3;
            let mask = 1u32 << i;
            if digit & 1 != 0 {
                x |= mask;
            }
            if digit & 2 != 0 {
                y |= mask;
            }
        }
        TileXy { x, y }
    }

    /// Zoom level, equal to the number of digits.
    pub const fn zoom(self) -> u8 {
        self.zoom
    }

    pub const fn is_empty(self) -> bool {
        self.zoom == 0
    }

    /// Reduce to a coarser zoom by truncating digits. Keys cannot be refined:
    /// a quad at or below `zoom` is returned unchanged. `zoom == 0` yields
    /// [`Quad::EMPTY`].
    pub fn at_zoom(self, zoom: u8) -> Self {
        if self.zoom <= zoom {
            return self;
        }
        if zoom == 0 {
            return Quad::EMPTY;
        }
        Quad {
            bits: self.bits >> (2 * (self.zoom - zoom) as u32),
            zoom,
        }
    }

    /// The enclosing cell one zoom level out; [`Quad::EMPTY`] at the top.
    pub fn parent(self) -> Self {
        if self.zoom < 2 {
            return Quad::EMPTY;
        }
        Quad {
            bits: self.bits >> 2,
            zoom: self.zoom - 1,
        }
    }

    /// Refine one level by appending a digit; the inverse of
    /// [`Quad::parent`]. [`Quad::EMPTY`] when the digit is out of `0..=3` or
    /// the quad is already at the deepest zoom.
    pub fn child(self, digit: u8) -> Self {
        if digit > 3 || self.zoom >= MAX_ZOOM {
            return Quad::EMPTY;
        }
        Quad {
            bits: (self.bits << 2) | digit as u64,
            zoom: self.zoom + 1,
        }
    }

    /// The final (deepest) digit, `None` for the empty quad.
    pub fn last_digit(self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some((self.bits & 3) as u8)
        }
    }

    /// True when `other` lies within this cell: other's digit string starts
    /// with this one's. Reflexive; the empty quad includes everything.
    pub fn includes(self, other: Quad) -> bool {
        if other.zoom < self.zoom {
            return false;
        }
        other.bits >> (2 * (other.zoom - self.zoom) as u32) == self.bits
    }

    /// True when this cell lies within `other`; the inverse of
    /// [`Quad::includes`].
    pub fn is_part_of(self, other: Quad) -> bool {
        other.includes(self)
    }

    /// Geographic coordinate of the cell center (lon = x, lat = y).
    pub fn center(self) -> Point {
        self.to_tile().center_lat_lon(self.zoom)
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.zoom).rev() {
            let digit = (self.bits >> (2 * i)) & 3;
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quad(\"{self}\")")
    }
}

impl FromStr for Quad {
    type Err = QuadError;

    /// Parse a raw quadkey string. This is the validation boundary: every
    /// character must be one of `0123` and the length at most 23 digits; the
    /// empty string parses to [`Quad::EMPTY`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_ZOOM as usize {
            return Err(QuadError::InvalidQuadKey(s.to_string()));
        }
        let mut bits = 0u64;
        for c in s.chars() {
            let digit = match c {
                '0' => 0,
                '1' => 1,
                '2' => 2,
                '3' => 3,
                _ => return Err(QuadError::InvalidQuadKey(s.to_string())),
            };
            bits = (bits << 2) | digit;
        }
        Ok(Quad { bits, zoom: s.len() as u8 })
    }
}

impl Serialize for Quad {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quad {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
