//! Mercator quadkey addressing and adaptive quad lookup trees.
//!
//! Geographic positions are projected onto the square Mercator tile raster
//! and addressed by [`Quad`]: a base-4 key whose length is the zoom level and
//! where truncation is spatial containment. On top of the key algebra,
//! [`QuadLookup`] indexes payloads by quadkey in a tree that subdivides only
//! where data is dense, and [`CachedDeclination`] uses that tree to memoize
//! an expensive per-position computation per map cell.
//!
//! ```rust
//! use quadtile::{Quad, QuadLookup};
//!
//! // Zurich airport, addressed at zoom 9
//! let quad = Quad::from_lat_lon(47.458, 8.548, 9);
//! assert_eq!(quad.to_string(), "120221122");
//! assert!(quad.is_part_of("1202".parse()?));
//!
//! let mut index: QuadLookup<&str> = QuadLookup::new(3, 9, 8);
//! index.add(quad, "LSZH")?;
//! assert_eq!(index.item_containing(quad)?, Some(&"LSZH"));
//! # Ok::<(), quadtile::QuadError>(())
//! ```

pub mod error;
pub mod lookup;
pub mod magvar;
pub mod neighbors;
pub mod projection;
pub mod quad;
pub mod tile;

pub use error::{QuadError, Result};

pub use quad::Quad;

pub use lookup::QuadLookup;

pub use magvar::{CachedDeclination, DEFAULT_CACHE_ZOOM, DEFAULT_HEIGHT_KM, MagneticModel};

pub use projection::{MAX_LATITUDE, MAX_ZOOM, MIN_LATITUDE, MIN_ZOOM, TILE_SIZE};

pub use tile::{MapPixel, TileQuadrant, TileXy};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Quad, QuadError, QuadLookup, Result};

    pub use crate::{MapPixel, TileQuadrant, TileXy};

    pub use crate::{CachedDeclination, MagneticModel};

    pub use crate::{MAX_ZOOM, MIN_ZOOM};

    pub use geo::Point;
}
