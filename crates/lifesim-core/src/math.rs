//! Planar vector arithmetic and the small random helpers used for spawning.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Immutable 2D vector used for positions and velocities.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    /// The origin, which is also the centre of the world disc.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector of `length` pointing along `radians` (counter-clockwise from +x).
    #[must_use]
    pub fn from_angle(length: f64, radians: f64) -> Self {
        Self::new(radians.cos() * length, radians.sin() * length)
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).norm()
    }

    /// Unit vector in the same direction; the zero vector is returned unchanged.
    #[must_use]
    pub fn normalize(self) -> Self {
        let norm = self.norm();
        if norm == 0.0 { self } else { self / norm }
    }

    /// Shrink the vector to `max` length if it is longer, keeping its direction.
    #[must_use]
    pub fn clamp_norm(self, max: f64) -> Self {
        if self.norm() > max {
            self.normalize() * max
        } else {
            self
        }
    }

    /// Bearing of `self` as seen from `other`, measured with `atan2(dx, dy)`.
    #[must_use]
    pub fn angle_between(self, other: Self) -> f64 {
        (self.x - other.x).atan2(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{X={:.2}, Y={:.2}}}", self.x, self.y)
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[must_use]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    PI * degrees / 180.0
}

#[must_use]
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

/// `value` shifted by a uniform integer offset in `[-jitter, jitter)`.
pub fn jittered<R: Rng + ?Sized>(rng: &mut R, value: i64, jitter: i64) -> i64 {
    let jitter = jitter.abs();
    if jitter == 0 {
        return value;
    }
    value + rng.random_range(-jitter..jitter)
}

/// Uniform offset in `[-spread, spread)`, or zero unless the spread is positive
/// and finite.
pub fn dispersed<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread > 0.0 && spread.is_finite() {
        // Scale a unit sample; the width of a huge range overflows.
        spread * rng.random_range(-1.0..1.0)
    } else {
        0.0
    }
}

/// Point on the circle of `radius` around the origin at a random whole-degree angle.
pub fn random_on_ring<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> Vector {
    let degrees = rng.random_range(0..360);
    Vector::from_angle(radius, degrees_to_radians(f64::from(degrees)))
}

/// Point drawn uniformly from the disc of `radius` around the origin.
pub fn random_in_disc<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> Vector {
    if radius <= 0.0 {
        return Vector::ZERO;
    }
    let angle = rng.random_range(0.0..TAU);
    let length = radius * rng.random::<f64>().sqrt();
    Vector::from_angle(length, angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn arithmetic_and_norms() {
        let a = Vector::new(3.0, 4.0);
        assert!(approx_eq(a.norm(), 5.0));
        assert_eq!(a + Vector::new(1.0, 1.0), Vector::new(4.0, 5.0));
        assert_eq!(a - a, Vector::ZERO);
        assert_eq!(-a * 2.0, Vector::new(-6.0, -8.0));
        assert!(approx_eq(a.distance(Vector::ZERO), 5.0));
        assert!(approx_eq(a.normalize().norm(), 1.0));
        assert_eq!(Vector::ZERO.normalize(), Vector::ZERO);
    }

    #[test]
    fn clamp_norm_only_shrinks() {
        let fast = Vector::new(30.0, 40.0).clamp_norm(3.0);
        assert!(approx_eq(fast.norm(), 3.0));
        assert!(approx_eq(fast.x, 1.8));
        let slow = Vector::new(1.0, 1.0);
        assert_eq!(slow.clamp_norm(3.0), slow);
    }

    #[test]
    fn angle_conversion_round_trips() {
        assert!(approx_eq(degrees_to_radians(180.0), PI));
        assert!(approx_eq(radians_to_degrees(PI / 2.0), 90.0));
        let v = Vector::from_angle(2.0, PI / 2.0);
        assert!(approx_eq(v.x, 0.0));
        assert!(approx_eq(v.y, 2.0));
    }

    #[test]
    fn random_helpers_stay_in_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let value = jittered(&mut rng, 15, 10);
            assert!((5..25).contains(&value));
            assert!(random_in_disc(&mut rng, 100.0).norm() <= 100.0);
            assert!(approx_eq(random_on_ring(&mut rng, 300.0).norm(), 300.0));
            assert!(dispersed(&mut rng, 50.0).abs() <= 50.0);
        }
        assert_eq!(jittered(&mut rng, 20, 0), 20);
        assert_eq!(dispersed(&mut rng, 0.0), 0.0);
        assert!(dispersed(&mut rng, f64::MAX).is_finite());
        assert_eq!(dispersed(&mut rng, f64::INFINITY), 0.0);
    }
}
