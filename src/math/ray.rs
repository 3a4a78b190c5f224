// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, EPSILON, FLOAT_MAX};

#[derive(Debug, Clone, Copy)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(FLOAT_MAX)}
    }

    /// Ray leaving a surface point along `d`, offset to avoid self intersection.
    pub fn spawn(p: Vector3f, n: &Vector3f, d: Vector3f) -> Self {
        let offset = if n.dot(&d) >= 0.0 { *n * EPSILON } else { -*n * EPSILON };
        Self::new(p + offset, d, Some(0.0), None)
    }

    /// Segment from a surface point towards `target`, stopping just short of it.
    pub fn spawn_to(p: Vector3f, n: &Vector3f, target: Vector3f) -> Self {
        let to_target = target - p;
        let offset = if n.dot(&to_target) >= 0.0 { *n * EPSILON } else { -*n * EPSILON };
        let origin = p + offset;
        let d = target - origin;
        let dist = d.norm();
        Self::new(origin, d, Some(0.0), Some(dist * (1.0 - EPSILON)))
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if t < self.min_t || t > self.max_t {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::Vector3f;
    use super::{Ray3f};

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let mut ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((v1[1] - 0.0).abs() < 1e-5);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);

        let status1 = ray.update(100.0);
        let status2 = ray.update(105.0);
        assert_eq!(status1, true);
        assert_eq!(status2, false);
    }

    #[test]
    fn test_spawn_to_stops_before_target() {
        let p = Vector3f::new(0.0, 0.0, 0.0);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let target = Vector3f::new(0.0, 0.0, 4.0);
        let ray = Ray3f::spawn_to(p, &n, target);

        assert!(ray.origin().z > 0.0);
        assert!(ray.test_segment(3.9));
        assert!(!ray.test_segment(4.0));
    }
}
