//! Mercator raster projection.
//!
//! Maps geographic coordinates onto the square Mercator pixel raster used by
//! map-tile systems: `256 * 2^zoom` pixels per side, x growing east from the
//! date line, y growing south from the north clipping latitude. All functions
//! here are pure and total over the valid domain; out-of-range zoom levels are
//! the caller's responsibility and are checked one layer up (see
//! [`crate::Quad`]).

use crate::tile::MapPixel;
use geo::Point;
use std::f64::consts::PI;

/// Lowest zoom level that addresses individual tiles. Zoom 0 is reserved for
/// the whole map (the empty quadkey).
pub const MIN_ZOOM: u8 = 1;

/// Highest supported zoom level. 23 quadkey digits use 46 bits; map pixels at
/// this zoom reach `2^31` and need 64-bit arithmetic.
pub const MAX_ZOOM: u8 = 23;

/// Side length of a map tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Southern Mercator clipping latitude (the projection is asymptotic at the
/// poles).
pub const MIN_LATITUDE: f64 = -85.05112878;

/// Northern Mercator clipping latitude.
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Western longitude bound.
pub const MIN_LONGITUDE: f64 = -180.0;

/// Eastern longitude bound.
pub const MAX_LONGITUDE: f64 = 180.0;

/// WGS84 semi-major axis in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Side length of the whole map in pixels at a zoom level.
#[inline]
pub fn raster_size(zoom: u8) -> i64 {
    (TILE_SIZE as i64) << zoom
}

/// Number of tiles per side at a zoom level.
#[inline]
pub fn tiles_per_side(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Largest valid tile index (per axis) at a zoom level.
#[inline]
pub fn max_tile_index(zoom: u8) -> u32 {
    tiles_per_side(zoom) - 1
}

/// Constrain latitude degrees to -90..+90 with a triangle wave, so that e.g.
/// 91 maps to 89 (crossing a pole flips back down the other side).
pub fn wrap_lat(degrees: f64) -> f64 {
    if degrees.is_nan() {
        return degrees;
    }
    // avoid rounding from the wave arithmetic when already in range
    if (-90.0..=90.0).contains(&degrees) {
        return degrees;
    }
    // triangle wave, amplitude 90, period 360
    (((degrees - 90.0).rem_euclid(360.0)) - 180.0).abs() - 90.0
}

/// Constrain longitude degrees to -180..+180 with a sawtooth, so that e.g.
/// 181 maps to -179.
pub fn wrap_lon(degrees: f64) -> f64 {
    if degrees.is_nan() {
        return degrees;
    }
    if (-180.0..=180.0).contains(&degrees) {
        return degrees;
    }
    (degrees - 180.0).rem_euclid(360.0) - 180.0
}

/// Constrain bearing degrees to 0..360.
pub fn wrap360(degrees: f64) -> f64 {
    if degrees.is_nan() {
        return degrees;
    }
    if (0.0..360.0).contains(&degrees) {
        return degrees;
    }
    degrees.rem_euclid(360.0)
}

/// Project a geographic coordinate onto the Mercator raster at a zoom level.
///
/// Latitude is wrapped to +-90 and longitude to +-180 first, then both are
/// clamped to the Mercator-valid band before projecting. The result is
/// rounded to the nearest pixel and clamped to `[0, raster_size - 1]`.
///
/// # Examples
///
/// ```rust
/// use quadtile::projection;
///
/// let p = projection::to_pixel(0.0, 0.0, 1);
/// assert_eq!((p.x, p.y), (256, 256));
/// ```
pub fn to_pixel(lat: f64, lon: f64, zoom: u8) -> MapPixel {
    let lat = wrap_lat(lat).clamp(MIN_LATITUDE, MAX_LATITUDE);
    let lon = wrap_lon(lon).clamp(MIN_LONGITUDE, MAX_LONGITUDE);

    // fraction of the full 360 degree sweep
    let x = (lon + 180.0) / 360.0;
    let sin_lat = lat.to_radians().sin();
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

    let size = raster_size(zoom) as f64;
    MapPixel {
        x: (x * size + 0.5).clamp(0.0, size - 1.0) as i64,
        y: (y * size + 0.5).clamp(0.0, size - 1.0) as i64,
    }
}

/// Recover the geographic coordinate of a map pixel at a zoom level.
///
/// Returns a [`geo::Point`] with `x` = longitude and `y` = latitude. Pixels
/// outside the raster are clamped onto it.
pub fn to_lat_lon(pixel: MapPixel, zoom: u8) -> Point {
    let size = raster_size(zoom) as f64;

    let x = (pixel.x as f64).clamp(0.0, size - 1.0) / size - 0.5;
    let y = 0.5 - (pixel.y as f64).clamp(0.0, size - 1.0) / size;

    let lat = 90.0 - 360.0 * (-y * 2.0 * PI).exp().atan() / PI;
    let lon = 360.0 * x;
    Point::new(lon, lat)
}

/// Ground resolution of one pixel in meters at a latitude.
pub fn meters_per_pixel(zoom: u8, lat: f64) -> f64 {
    lat.to_radians().cos() * 2.0 * PI * EARTH_RADIUS_M / raster_size(zoom) as f64
}

/// Ground resolution of one tile side in meters at a latitude.
pub fn meters_per_tile(zoom: u8, lat: f64) -> f64 {
    meters_per_pixel(zoom, lat) * TILE_SIZE as f64
}
