// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Calculate the (unnormalized) normal of a triangle given three vertices
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    (p1 - p0).cross(&(p2 - p0))
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Per-coordinate tolerance test used for welding
pub fn points_coincide(a: &Point3<f64>, b: &Point3<f64>, epsilon: f64) -> bool {
    approx_eq(a.x, b.x, epsilon) && approx_eq(a.y, b.y, epsilon) && approx_eq(a.z, b.z, epsilon)
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linear interpolation between two points
pub fn lerp_point(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    Point3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.000001, 1e-5));
        assert!(!approx_eq(1.0, 1.1, 0.001));
    }

    #[test]
    fn test_points_coincide() {
        let a = Point3::new(0.5, 0.5, 0.0);
        assert!(points_coincide(&a, &Point3::new(0.500004, 0.5, -0.000009), 1e-5));
        assert!(!points_coincide(&a, &Point3::new(0.5, 0.5, 0.00002), 1e-5));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);

        let p = lerp_point(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 4.0, -2.0), 0.25);
        assert_eq!(p, Point3::new(0.5, 1.0, -0.5));
    }

    #[test]
    fn test_triangle_normal() {
        let n = triangle_normal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    }
}
