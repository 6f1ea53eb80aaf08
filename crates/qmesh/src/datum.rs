//! Vertical datum conversion.

/// Geoid height sampler used to convert mean-sea-level elevations to heights
/// above the ellipsoid.
pub trait GeoidModel: Send + Sync {
    /// Geoid height above the ellipsoid at `(lat, lon)`, in meters, or
    /// `None` if the model has no value there.
    fn geoid_offset(&self, lat: f64, lon: f64) -> Option<f64>;
}

/// A geoid with the same offset everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantGeoid(pub f64);

impl GeoidModel for ConstantGeoid {
    fn geoid_offset(&self, _lat: f64, _lon: f64) -> Option<f64> {
        Some(self.0)
    }
}

impl<F> GeoidModel for F
where
    F: Fn(f64, f64) -> Option<f64> + Send + Sync,
{
    fn geoid_offset(&self, lat: f64, lon: f64) -> Option<f64> {
        self(lat, lon)
    }
}
