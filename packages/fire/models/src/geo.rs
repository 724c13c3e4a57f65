//! Spherical Earth constants shared by the radius search.

/// Mean Earth radius used for all distance calculations, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers spanned by one degree of latitude (or of longitude at the
/// equator) on a sphere of radius [`EARTH_RADIUS_KM`].
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_is_about_111_km() {
        assert!((KM_PER_DEGREE - 111.195).abs() < 1e-3, "got {KM_PER_DEGREE}");
    }
}
