//! Tile grid over the Mercator raster.
//!
//! Each tile covers a 256x256 pixel square of the raster; tiles are addressed
//! by integer (x, y) per zoom level. Pixel-to-tile conversion uses floor
//! division (the enclosing tile), matching the Bing tile system semantics.

use crate::projection::{self, TILE_SIZE};
use geo::Point;
use serde::{Deserialize, Serialize};

/// A pixel position on the whole-map Mercator raster at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapPixel {
    pub x: i64,
    pub y: i64,
}

/// A tile index at some zoom level; both axes run `0..2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileXy {
    pub x: u32,
    pub y: u32,
}

/// The quadrant of a tile a pixel falls in, relative to the tile's center
/// pixel. Used to pick the asymmetric 4-neighborhood around a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileQuadrant {
    LeftTop,
    RightTop,
    RightBottom,
    LeftBottom,
}

impl MapPixel {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Project a geographic coordinate to a raster pixel.
    pub fn from_lat_lon(lat: f64, lon: f64, zoom: u8) -> Self {
        projection::to_pixel(lat, lon, zoom)
    }

    /// The tile enclosing this pixel (floor division, not rounding).
    pub fn tile(self) -> TileXy {
        TileXy {
            x: self.x.div_euclid(TILE_SIZE as i64).max(0) as u32,
            y: self.y.div_euclid(TILE_SIZE as i64).max(0) as u32,
        }
    }

    /// Which quadrant of its enclosing tile this pixel occupies. A pixel at
    /// or before the center counts as the "low" side on each axis.
    pub fn quadrant(self) -> TileQuadrant {
        let center = self.tile().center_pixel();
        if self.x <= center.x {
            if self.y <= center.y {
                TileQuadrant::LeftTop
            } else {
                TileQuadrant::LeftBottom
            }
        } else if self.y <= center.y {
            TileQuadrant::RightTop
        } else {
            TileQuadrant::RightBottom
        }
    }

    /// Geographic coordinate of this pixel (lon = x, lat = y).
    pub fn lat_lon(self, zoom: u8) -> Point {
        projection::to_lat_lon(self, zoom)
    }
}

impl TileXy {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The tile containing a geographic coordinate at a zoom level.
    pub fn from_lat_lon(lat: f64, lon: f64, zoom: u8) -> Self {
        MapPixel::from_lat_lon(lat, lon, zoom).tile()
    }

    /// Left/top corner pixel.
    pub fn lt_pixel(self) -> MapPixel {
        MapPixel {
            x: self.x as i64 * TILE_SIZE as i64,
            y: self.y as i64 * TILE_SIZE as i64,
        }
    }

    /// Right/top corner pixel.
    pub fn rt_pixel(self) -> MapPixel {
        let lt = self.lt_pixel();
        MapPixel { x: lt.x + TILE_SIZE as i64, y: lt.y }
    }

    /// Right/bottom corner pixel.
    pub fn rb_pixel(self) -> MapPixel {
        let lt = self.lt_pixel();
        MapPixel {
            x: lt.x + TILE_SIZE as i64,
            y: lt.y + TILE_SIZE as i64,
        }
    }

    /// Left/bottom corner pixel.
    pub fn lb_pixel(self) -> MapPixel {
        let lt = self.lt_pixel();
        MapPixel { x: lt.x, y: lt.y + TILE_SIZE as i64 }
    }

    /// Center pixel of the tile.
    pub fn center_pixel(self) -> MapPixel {
        let lt = self.lt_pixel();
        MapPixel {
            x: lt.x + TILE_SIZE as i64 / 2,
            y: lt.y + TILE_SIZE as i64 / 2,
        }
    }

    /// Geographic coordinate of the left/top corner.
    pub fn lt_lat_lon(self, zoom: u8) -> Point {
        self.lt_pixel().lat_lon(zoom)
    }

    /// Geographic coordinate of the tile center.
    pub fn center_lat_lon(self, zoom: u8) -> Point {
        self.center_pixel().lat_lon(zoom)
    }
}

/// Which quadrant of its tile a geographic coordinate occupies at a zoom
/// level.
pub fn quadrant_from_lat_lon(lat: f64, lon: f64, zoom: u8) -> TileQuadrant {
    MapPixel::from_lat_lon(lat, lon, zoom).quadrant()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_tile_floor() {
        assert_eq!(MapPixel::new(0, 0).tile(), TileXy::new(0, 0));
        assert_eq!(MapPixel::new(255, 255).tile(), TileXy::new(0, 0));
        assert_eq!(MapPixel::new(256, 255).tile(), TileXy::new(1, 0));
        assert_eq!(MapPixel::new(511, 512).tile(), TileXy::new(1, 2));
    }

    #[test]
    fn test_tile_corners() {
        let t = TileXy::new(2, 3);
        assert_eq!(t.lt_pixel(), MapPixel::new(512, 768));
        assert_eq!(t.rt_pixel(), MapPixel::new(768, 768));
        assert_eq!(t.rb_pixel(), MapPixel::new(768, 1024));
        assert_eq!(t.lb_pixel(), MapPixel::new(512, 1024));
        assert_eq!(t.center_pixel(), MapPixel::new(640, 896));
    }

    #[test]
    fn test_quadrant_boundaries() {
        // tile (0,0) has center pixel (128,128); <= center is the low side
        assert_eq!(MapPixel::new(0, 0).quadrant(), TileQuadrant::LeftTop);
        assert_eq!(MapPixel::new(128, 128).quadrant(), TileQuadrant::LeftTop);
        assert_eq!(MapPixel::new(129, 128).quadrant(), TileQuadrant::RightTop);
        assert_eq!(MapPixel::new(128, 129).quadrant(), TileQuadrant::LeftBottom);
        assert_eq!(MapPixel::new(129, 129).quadrant(), TileQuadrant::RightBottom);
        assert_eq!(MapPixel::new(255, 255).quadrant(), TileQuadrant::RightBottom);
    }

    #[test]
    fn test_from_lat_lon() {
        // origin is the exact raster center at zoom 1: pixel (256,256), tile (1,1)
        assert_eq!(TileXy::from_lat_lon(0.0, 0.0, 1), TileXy::new(1, 1));
        // NW quadrant of the map
        assert_eq!(TileXy::from_lat_lon(50.0, -100.0, 1), TileXy::new(0, 0));
    }

    #[test]
    fn test_center_lat_lon_round_trip() {
        let t = TileXy::from_lat_lon(47.0, 8.0, 10);
        let c = t.center_lat_lon(10);
        assert_eq!(TileXy::from_lat_lon(c.y(), c.x(), 10), t);
    }
}
