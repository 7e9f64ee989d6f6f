//! Magnetic declination lookup with a quad-keyed cache.
//!
//! The crate does not evaluate a geomagnetic model itself; callers provide
//! one through [`MagneticModel`]. What this module adds is the memoization
//! layer: model evaluations are expensive, and declination varies slowly
//! enough that one value per zoom-8 cell (roughly 100 km on a side at
//! mid-latitudes) is accurate to well under a tenth of a degree. A
//! [`QuadLookup`] behind a [`parking_lot::Mutex`] holds the computed cells,
//! so repeated queries in the same area cost a hash descent instead of a
//! spherical-harmonics evaluation.

use crate::lookup::QuadLookup;
use crate::projection::wrap360;
use crate::quad::Quad;
use parking_lot::Mutex;

/// Zoom level of the cache cells. Zoom 8 trades precision for an
/// order-of-magnitude speedup over direct evaluation.
pub const DEFAULT_CACHE_ZOOM: u8 = 8;

/// Height above the ellipsoid the declination is evaluated at, in km.
/// Chosen for en-route aviation use.
pub const DEFAULT_HEIGHT_KM: f64 = 3.0;

/// An external geomagnetic model (e.g. a WMM evaluator).
///
/// `epoch_year` is the decimal year the field is evaluated for. The returned
/// declination is in radians, positive east.
pub trait MagneticModel {
    fn declination_rad(&self, lat: f64, lon: f64, height_km: f64, epoch_year: f64) -> f64;
}

impl<F> MagneticModel for F
where
    F: Fn(f64, f64, f64, f64) -> f64,
{
    fn declination_rad(&self, lat: f64, lon: f64, height_km: f64, epoch_year: f64) -> f64 {
        self(lat, lon, height_km, epoch_year)
    }
}

/// Memoizing declination source.
///
/// Every position inside one cache cell shares the value computed at the
/// cell's center. The cache only grows; a long-running process visiting the
/// whole planet holds at most `4^zoom` entries (65 536 at the default zoom),
/// about half a megabyte.
///
/// The whole lookup is guarded by a single [`Mutex`] held across the model
/// evaluation, so concurrent first queries for the same cell serialize and
/// the model runs once per cell.
///
/// # Examples
///
/// ```rust
/// use quadtile::CachedDeclination;
///
/// // a toy model: declination proportional to longitude
/// let cached = CachedDeclination::new(
///     |_lat: f64, lon: f64, _h: f64, _y: f64| lon.to_radians() * 0.1,
///     2026.5,
/// );
/// let d = cached.declination_deg(47.0, 8.0);
/// assert!((d - 0.8).abs() < 0.05);
/// ```
pub struct CachedDeclination<M> {
    model: M,
    epoch_year: f64,
    cache_zoom: u8,
    cache: Mutex<QuadLookup<f64>>,
}

impl<M: MagneticModel> CachedDeclination<M> {
    /// Wrap a model, caching at [`DEFAULT_CACHE_ZOOM`].
    pub fn new(model: M, epoch_year: f64) -> Self {
        Self::with_cache_zoom(model, epoch_year, DEFAULT_CACHE_ZOOM)
    }

    /// Wrap a model with an explicit cache cell zoom (clamped like any
    /// [`QuadLookup`] configuration).
    pub fn with_cache_zoom(model: M, epoch_year: f64, cache_zoom: u8) -> Self {
        let cache = QuadLookup::new(3, cache_zoom, 32);
        let cache_zoom = cache.max_zoom();
        Self {
            model,
            epoch_year,
            cache_zoom,
            cache: Mutex::new(cache),
        }
    }

    /// Magnetic declination at a position, in radians (positive east).
    ///
    /// Positions the raster cannot address (non-finite coordinates) bypass
    /// the cache and go straight to the model.
    pub fn declination_rad(&self, lat: f64, lon: f64) -> f64 {
        if !lat.is_finite() || !lon.is_finite() {
            return self
                .model
                .declination_rad(lat, lon, DEFAULT_HEIGHT_KM, self.epoch_year);
        }
        let quad = Quad::from_lat_lon(lat, lon, self.cache_zoom);

        // lock held across the model call: the first query for a cell does
        // the work, concurrent queries for it wait and reuse the result
        let mut cache = self.cache.lock();
        if let Ok(Some(&cached)) = cache.item_containing(quad) {
            return cached;
        }

        let center = quad.center();
        let value = self
            .model
            .declination_rad(center.y(), center.x(), DEFAULT_HEIGHT_KM, self.epoch_year);
        log::debug!("declination cell {quad}: {:.4} rad", value);
        // the key is exactly at the tree's max zoom, so add cannot fail
        let _ = cache.add(quad, value);
        value
    }

    /// Magnetic declination at a position, in degrees (positive east).
    pub fn declination_deg(&self, lat: f64, lon: f64) -> f64 {
        self.declination_rad(lat, lon).to_degrees()
    }

    /// Convert a true bearing to a magnetic bearing at a position, degrees.
    ///
    /// Non-finite positions leave the bearing unchanged.
    pub fn mag_from_true_bearing(&self, true_bearing: f64, lat: f64, lon: f64) -> f64 {
        if !lat.is_finite() || !lon.is_finite() {
            return true_bearing;
        }
        let var = self.declination_deg(lat, lon);
        // correction is: add if West else sub
        if lon < 0.0 {
            wrap360(true_bearing + var)
        } else {
            wrap360(true_bearing - var)
        }
    }

    /// Convert a magnetic bearing to a true bearing at a position, degrees.
    ///
    /// Non-finite positions leave the bearing unchanged.
    pub fn true_from_mag_bearing(&self, mag_bearing: f64, lat: f64, lon: f64) -> f64 {
        if !lat.is_finite() || !lon.is_finite() {
            return mag_bearing;
        }
        let var = self.declination_deg(lat, lon);
        // correction is: add if East else sub
        if lon > 0.0 {
            wrap360(mag_bearing + var)
        } else {
            wrap360(mag_bearing - var)
        }
    }

    /// Number of cells evaluated so far.
    pub fn cached_cells(&self) -> usize {
        self.cache.lock().len()
    }
}
