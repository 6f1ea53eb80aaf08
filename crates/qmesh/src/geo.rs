//! Coordinate conversion utilities.
//!
//! Conversions between ECEF (Earth-Centered, Earth-Fixed) coordinates and
//! geodetic coordinates on the WGS84 ellipsoid.

use glam::DVec3;

/// WGS84 semi-major axis in meters.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// A geodetic position: latitude and longitude in degrees, height above the
/// ellipsoid in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
}

fn semi_minor_axis() -> f64 {
    WGS84_SEMI_MAJOR_AXIS * (1.0 - WGS84_FLATTENING)
}

fn eccentricity_squared() -> f64 {
    WGS84_FLATTENING * (2.0 - WGS84_FLATTENING)
}

/// Convert ECEF coordinates to geodetic coordinates.
///
/// Uses You's closed-form method with one correction step, accurate to well
/// below a millimeter for points near the surface.
#[must_use]
pub fn ecef_to_geodetic(position: DVec3) -> Geodetic {
    let major = WGS84_SEMI_MAJOR_AXIS;
    let minor = semi_minor_axis();

    let lon = position.y.atan2(position.x);
    let q = position.x.hypot(position.y);

    // On the polar axis the reduced latitude is undefined.
    if q < 1e-9 {
        let lat = if position.z >= 0.0 { 90.0 } else { -90.0 };
        return Geodetic {
            lat,
            lon: lon.to_degrees(),
            height: position.z.abs() - minor,
        };
    }

    let r_squared = position.length_squared();
    let e_squared = major * major - minor * minor;
    let e = e_squared.sqrt();
    let var = r_squared - e_squared;
    let u = (0.5 * var + 0.5 * (var * var + 4.0 * e_squared * position.z * position.z).sqrt())
        .sqrt();

    let hu_e = (u * u + e_squared).sqrt();
    let mut beta = (hu_e / u * position.z / q).atan();
    let correction = ((minor * u - major * hu_e + e * e) * beta.sin())
        / (major * hu_e / beta.cos() - e * e * beta.cos());
    beta += correction;

    let lat = (major / minor * beta.tan()).atan();

    let dz = position.z - minor * beta.sin();
    let dq = q - major * beta.cos();
    let distance = dz.hypot(dq);
    let inside = (q * q) / (major * major) + (position.z * position.z) / (minor * minor) < 1.0;

    Geodetic {
        lat: lat.to_degrees(),
        lon: lon.to_degrees(),
        height: if inside { -distance } else { distance },
    }
}

/// Convert geodetic coordinates to ECEF coordinates.
#[must_use]
pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, height: f64) -> DVec3 {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let prime_vertical =
        WGS84_SEMI_MAJOR_AXIS / (1.0 - eccentricity_squared() * lat.sin().powi(2)).sqrt();

    DVec3::new(
        (prime_vertical + height) * lat.cos() * lon.cos(),
        (prime_vertical + height) * lat.cos() * lon.sin(),
        (prime_vertical * (1.0 - eccentricity_squared()) + height) * lat.sin(),
    )
}
