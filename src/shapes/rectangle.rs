// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};
use crate::math::ray::Ray3f;

/// Parallelogram `corner + s * edge_u + t * edge_v`, `s, t` in `[0, 1]`.
/// The normal is `edge_u x edge_v`.
pub struct Rectangle {
    corner: Vector3f,
    edge_u: Vector3f,
    edge_v: Vector3f,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Rectangle {
    pub fn new(corner: Vector3f, edge_u: Vector3f, edge_v: Vector3f) -> Self {
        let cross = edge_u.cross(&edge_v);
        let area = cross.norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let normal = if area > 0.0 { cross / area } else { Vector3f::new(0.0, 0.0, 1.0) };

        Self { corner, edge_u, edge_v, normal, area, inv_area }
    }

    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        let denom = self.normal.dot(&ray.dir());
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = self.normal.dot(&(self.corner - ray.origin())) / denom;
        if !ray.test_segment(t) {
            return None;
        }

        // project with the dual basis so that skewed edges stay exact
        let local = ray.at(t) - self.corner;
        let uu = self.edge_u.dot(&self.edge_u);
        let vv = self.edge_v.dot(&self.edge_v);
        let uv = self.edge_u.dot(&self.edge_v);
        let lu = local.dot(&self.edge_u);
        let lv = local.dot(&self.edge_v);
        let det = uu * vv - uv * uv;
        if det.abs() < 1e-12 {
            return None;
        }
        let s = (lu * vv - lv * uv) / det;
        let r = (lv * uu - lu * uv) / det;
        if s < 0.0 || s > 1.0 || r < 0.0 || r > 1.0 {
            return None;
        }

        Some((t, Vector2f::new(s, r)))
    }
}

impl Shape for Rectangle {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (t, uv) = self.intersect_local(ray)?;
        Some(SurfaceIntersection::new(ray.at(t), self.normal, uv, t))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_local(ray).is_some()
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p = self.corner + self.edge_u * u.x + self.edge_v * u.y;
        let intersection = SurfaceIntersection::new(p, self.normal, *u, 0.0);
        SurfaceSampleRecord::new(intersection, self.inv_area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }

    fn bounding_box(&self) -> AABB {
        let mut bounds = AABB::new(self.corner, self.corner + self.edge_u + self.edge_v);
        bounds.expand_by_point(&(self.corner + self.edge_u));
        bounds.expand_by_point(&(self.corner + self.edge_v));
        bounds.padded(EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Rectangle {
        Rectangle::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_rectangle_hit_and_miss() {
        let rect = unit_square();
        let hit_ray = Ray3f::new(Vector3f::new(0.25, 0.75, 2.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = rect.ray_intersection(&hit_ray).expect("expected hit");
        assert!((hit.t() - 2.0).abs() < 1e-5);
        assert!((hit.uv().x - 0.25).abs() < 1e-5);
        assert!((hit.uv().y - 0.75).abs() < 1e-5);

        let miss_ray = Ray3f::new(Vector3f::new(1.5, 0.5, 2.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(rect.ray_intersection(&miss_ray).is_none());

        let short_ray = Ray3f::new(Vector3f::new(0.5, 0.5, 2.0), Vector3f::new(0.0, 0.0, -1.0), None, Some(1.0));
        assert!(!rect.ray_intersection_t(&short_ray));
    }

    #[test]
    fn test_rectangle_area_and_sampling() {
        let rect = Rectangle::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(2.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 3.0),
        );
        assert!((rect.surface_area() - 6.0).abs() < 1e-5);
        let sample = rect.sample(&Vector2f::new(0.5, 0.5));
        assert!((sample.pdf() - 1.0 / 6.0).abs() < 1e-6);
        assert!((sample.intersection().p() - Vector3f::new(1.0, 0.0, 1.5)).norm() < 1e-5);
        assert!((sample.intersection().geo_normal() - Vector3f::new(0.0, -1.0, 0.0)).norm() < 1e-5);

        let bounds = rect.bounding_box();
        assert!((bounds.center() - Vector3f::new(1.0, 0.0, 1.5)).norm() < 1e-5);
        assert!(bounds.p_min.y < 0.0 && bounds.p_max.y > 0.0);
    }
}
