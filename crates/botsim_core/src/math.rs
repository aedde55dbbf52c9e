//! Fixed-point math utilities for deterministic simulation.
//!
//! All gameplay math uses fixed-point arithmetic so that the simulation
//! produces identical results on every platform. Angles are radians,
//! positions are world units; the script boundary converts to game
//! units and degrees (see the script crate).

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// One game unit expressed in world units.
///
/// Script-facing distances are in game units; internal positions are in
/// world units. Every length crossing that boundary is scaled by this.
pub const G_UNIT: Fixed = Fixed::from_bits(17_179_869_184); // 4.0

/// pi in I32F32.
pub const PI: Fixed = Fixed::from_bits(13_493_037_705);

/// 2*pi in I32F32.
pub const TAU: Fixed = Fixed::from_bits(26_986_075_409);

/// pi/2 in I32F32.
pub const HALF_PI: Fixed = Fixed::from_bits(6_746_518_852);

/// Radians per degree (pi/180) in I32F32.
pub const DEG: Fixed = Fixed::from_bits(74_961_321);

/// Fixed-point 3D vector.
///
/// `y` is height; the horizontal plane is `(x, z)`. Spatial queries
/// project onto the horizontal plane and ignore `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Height.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
    /// Depth.
    #[serde(with = "fixed_serde")]
    pub z: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`, via the raw bit representation.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => v.to_bits().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

impl Vec3Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
        z: Fixed::ZERO,
    };

    /// Squared distance projected onto the horizontal plane.
    ///
    /// Height is ignored; this is the "projected distance" every spatial
    /// query uses. Squared values order identically to true distances.
    #[must_use]
    pub fn horizontal_distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }

    /// Distance projected onto the horizontal plane.
    #[must_use]
    pub fn horizontal_distance(self, other: Self) -> Fixed {
        sqrt(self.horizontal_distance_squared(other))
    }

    /// Full 3D distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        let dy = self.y - other.y;
        sqrt(
            self.horizontal_distance_squared(other)
                .saturating_add(dy.saturating_mul(dy)),
        )
    }

    /// Clockwise horizontal bearing from `self` toward `other`, in [0, 2*pi).
    ///
    /// Zero points along +x. Coincident points yield a bearing of zero
    /// rather than an error; callers that care must check for that case
    /// themselves.
    #[must_use]
    pub fn horizontal_bearing_to(self, other: Self) -> Fixed {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        normalize_angle(-atan2(dz, dx))
    }
}

impl std::ops::Add for Vec3Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::Sub for Vec3Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// Square root of a fixed-point number via bisection.
///
/// Returns zero for non-positive inputs.
#[must_use]
pub fn sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let one = Fixed::from_num(1);
    let mut low = Fixed::ZERO;
    let mut high = if value > one { value } else { one };

    for _ in 0..48 {
        let mid = (low + high) / Fixed::from_num(2);
        if mid.saturating_mul(mid) <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Arctangent for a ratio in [0, 1], minimax polynomial.
///
/// Maximum error is roughly 6e-4 rad, which is far below the angular
/// resolution any sector query cares about.
fn atan_unit(r: Fixed) -> Fixed {
    let c1 = Fixed::from_num(0.995_354);
    let c2 = Fixed::from_num(0.288_769);
    let c3 = Fixed::from_num(0.079_331);
    let r2 = r * r;
    r * (c1 - r2 * (c2 - r2 * c3))
}

/// Four-quadrant arctangent in fixed point.
///
/// Result is in (-pi, pi]. `atan2(0, 0)` is zero.
#[must_use]
pub fn atan2(y: Fixed, x: Fixed) -> Fixed {
    if x == Fixed::ZERO && y == Fixed::ZERO {
        return Fixed::ZERO;
    }

    let abs_y = y.abs();
    let abs_x = x.abs();

    // Reduce to a ratio in [0, 1] so the polynomial stays accurate.
    let mut angle = if abs_y <= abs_x {
        atan_unit(abs_y / abs_x)
    } else {
        HALF_PI - atan_unit(abs_x / abs_y)
    };

    if x < Fixed::ZERO {
        angle = PI - angle;
    }
    if y < Fixed::ZERO {
        angle = -angle;
    }
    angle
}

/// Normalize an angle into [0, 2*pi).
#[must_use]
pub fn normalize_angle(angle: Fixed) -> Fixed {
    let wrapped = angle - TAU * (angle / TAU).floor();
    if wrapped >= TAU {
        Fixed::ZERO
    } else {
        wrapped
    }
}

/// Smallest signed difference `a - b` between two angles, in (-pi, pi].
#[must_use]
pub fn angle_diff(a: Fixed, b: Fixed) -> Fixed {
    let d = normalize_angle(a - b);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Sine in fixed point, Bhaskara's approximation.
///
/// Maximum error is about 2e-3, plenty for steering and part animation.
#[must_use]
pub fn sin(angle: Fixed) -> Fixed {
    let wrapped = normalize_angle(angle);
    let reduced = if wrapped > PI { wrapped - TAU } else { wrapped };

    let (negate, x) = if reduced < Fixed::ZERO {
        (true, -reduced)
    } else {
        (false, reduced)
    };

    let span = x * (PI - x);
    let num = Fixed::from_num(16) * span;
    let den = Fixed::from_num(5) * PI * PI - Fixed::from_num(4) * span;
    let result = num / den;

    if negate {
        -result
    } else {
        result
    }
}

/// Cosine in fixed point.
#[must_use]
pub fn cos(angle: Fixed) -> Fixed {
    sin(angle + HALF_PI)
}

/// Horizontal unit vector for a clockwise heading.
///
/// Matches [`Vec3Fixed::horizontal_bearing_to`]: moving along the
/// returned vector keeps the bearing toward the destination equal to
/// the heading.
#[must_use]
pub fn heading_vector(heading: Fixed) -> Vec3Fixed {
    Vec3Fixed::new(cos(heading), Fixed::ZERO, -sin(heading))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Fixed, b: Fixed, eps: f64) -> bool {
        (a - b).abs() < Fixed::from_num(eps)
    }

    #[test]
    fn test_sqrt_exact_squares() {
        assert_eq!(sqrt(Fixed::from_num(0)), Fixed::ZERO);
        assert!(close(sqrt(Fixed::from_num(25)), Fixed::from_num(5), 1e-6));
        assert!(close(sqrt(Fixed::from_num(2)), Fixed::from_num(1.41421356), 1e-6));
    }

    #[test]
    fn test_sqrt_negative_is_zero() {
        assert_eq!(sqrt(Fixed::from_num(-4)), Fixed::ZERO);
    }

    #[test]
    fn test_atan2_axes() {
        assert!(close(atan2(Fixed::ZERO, Fixed::from_num(1)), Fixed::ZERO, 1e-3));
        assert!(close(atan2(Fixed::from_num(1), Fixed::ZERO), HALF_PI, 1e-3));
        assert!(close(atan2(Fixed::ZERO, Fixed::from_num(-1)), PI, 1e-3));
        assert!(close(atan2(Fixed::from_num(-1), Fixed::ZERO), -HALF_PI, 1e-3));
    }

    #[test]
    fn test_atan2_diagonals() {
        let quarter = PI / Fixed::from_num(4);
        assert!(close(atan2(Fixed::from_num(1), Fixed::from_num(1)), quarter, 1e-3));
        assert!(close(
            atan2(Fixed::from_num(-1), Fixed::from_num(-1)),
            -(PI - quarter),
            1e-3
        ));
    }

    #[test]
    fn test_atan2_origin() {
        assert_eq!(atan2(Fixed::ZERO, Fixed::ZERO), Fixed::ZERO);
    }

    #[test]
    fn test_normalize_angle_wraps() {
        assert!(close(normalize_angle(TAU + PI), PI, 1e-6));
        assert!(close(normalize_angle(-HALF_PI), TAU - HALF_PI, 1e-6));
        assert_eq!(normalize_angle(Fixed::ZERO), Fixed::ZERO);
    }

    #[test]
    fn test_angle_diff_signed() {
        let d = angle_diff(Fixed::from_num(0.1), TAU - Fixed::from_num(0.1));
        assert!(close(d, Fixed::from_num(0.2), 1e-6));
        let d = angle_diff(TAU - Fixed::from_num(0.1), Fixed::from_num(0.1));
        assert!(close(d, Fixed::from_num(-0.2), 1e-6));
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3Fixed::new(Fixed::ZERO, Fixed::from_num(100), Fixed::ZERO);
        let b = Vec3Fixed::new(Fixed::from_num(3), Fixed::ZERO, Fixed::from_num(4));
        assert!(close(a.horizontal_distance(b), Fixed::from_num(5), 1e-6));
        assert_eq!(a.horizontal_distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_bearing_is_clockwise() {
        let origin = Vec3Fixed::ZERO;
        let plus_x = Vec3Fixed::new(Fixed::from_num(10), Fixed::ZERO, Fixed::ZERO);
        let plus_z = Vec3Fixed::new(Fixed::ZERO, Fixed::ZERO, Fixed::from_num(10));

        assert!(close(origin.horizontal_bearing_to(plus_x), Fixed::ZERO, 1e-3));
        // +z is a quarter turn clockwise behind +x in this convention.
        assert!(close(
            origin.horizontal_bearing_to(plus_z),
            TAU - HALF_PI,
            1e-2
        ));
    }

    #[test]
    fn test_sin_cos_key_angles() {
        assert!(close(sin(Fixed::ZERO), Fixed::ZERO, 1e-3));
        assert!(close(sin(HALF_PI), Fixed::from_num(1), 1e-2));
        assert!(close(sin(PI), Fixed::ZERO, 1e-3));
        assert!(close(sin(-HALF_PI), Fixed::from_num(-1), 1e-2));
        assert!(close(cos(Fixed::ZERO), Fixed::from_num(1), 1e-2));
        assert!(close(cos(PI), Fixed::from_num(-1), 1e-2));
    }

    #[test]
    fn test_heading_vector_round_trips_bearing() {
        let heading = Fixed::from_num(1.25);
        let step = heading_vector(heading);
        let dest = Vec3Fixed::new(
            step.x * Fixed::from_num(10),
            Fixed::ZERO,
            step.z * Fixed::from_num(10),
        );
        let bearing = Vec3Fixed::ZERO.horizontal_bearing_to(dest);
        assert!(close(bearing, heading, 1e-2));
    }

    #[test]
    fn test_fixed_determinism() {
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a * Fixed::from_num(7), b * Fixed::from_num(7));
    }
}
