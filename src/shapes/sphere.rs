// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius }
    }

    fn intersect_t(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(&ray.dir());
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t0 = -b - sqrt_d;
        let t1 = -b + sqrt_d;
        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }

    fn uv_of(n: &Vector3f) -> Vector2f {
        let mut phi = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta = n.z.max(-1.0).min(1.0).acos();
        Vector2f::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Shape for Sphere {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let t = self.intersect_t(ray)?;
        let p = ray.at(t);
        let n = (p - self.center).normalize();
        Some(SurfaceIntersection::new(p, n, Sphere::uv_of(&n), t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_t(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = sample_uniform_sphere(u);
        let p = self.center + n * self.radius;
        let intersection = SurfaceIntersection::new(p, n, Sphere::uv_of(&n), 0.0);
        SurfaceSampleRecord::new(intersection, 1.0 / self.surface_area())
    }

    fn surface_area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }
}
