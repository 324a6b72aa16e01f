//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert an angle in degrees into radians.
pub fn deg_to_rad<T>(deg: T) -> T
where
    T: Float
{
    deg * T::from(std::f64::consts::PI).unwrap() / T::from(180.0).unwrap()
}

/// Convert an angle in radians into degrees.
pub fn rad_to_deg<T>(rad: T) -> T
where
    T: Float
{
    rad * T::from(180.0).unwrap() / T::from(std::f64::consts::PI).unwrap()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deg_to_rad() {
        assert!((deg_to_rad(180.0f64) - std::f64::consts::PI).abs() < 1e-12);
        assert!((deg_to_rad(0.0f64)).abs() < 1e-12);
        assert!((rad_to_deg(std::f64::consts::PI) - 180.0f64).abs() < 1e-12);
    }

}
