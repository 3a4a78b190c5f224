// Copyright @yucwang 2026

use crate::core::sensor::{CameraType, Sensor, SensorConnection};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Pinhole camera. Film positions are given in pixels, `(0, 0)` is the top
/// left corner.
pub struct PerspectiveCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    width: usize,
    height: usize,
    /// Area of the image rectangle on the plane at distance one.
    image_plane_area: Float,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();
        let tan_half_fov_y = (0.5 * fov_y_radians).tan();
        let aspect = width.max(1) as Float / height.max(1) as Float;

        Self {
            origin,
            forward,
            right,
            up,
            tan_half_fov_y,
            aspect,
            width,
            height,
            image_plane_area: (2.0 * tan_half_fov_y * aspect) * (2.0 * tan_half_fov_y),
        }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn right(&self) -> Vector3f {
        self.right
    }
}

impl Sensor for PerspectiveCamera {
    fn camera_type(&self) -> CameraType {
        CameraType::Perspective
    }

    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample_ray(&self, film_pos: &Vector2f) -> Ray3f {
        let u = film_pos.x / self.width as Float;
        let v = film_pos.y / self.height as Float;
        let px = (2.0 * u - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * v) * self.tan_half_fov_y;

        let dir = (self.right * px + self.up * py + self.forward).normalize();
        Ray3f::new(self.origin, dir, Some(0.0), None)
    }

    fn sample_connection(&self, p: &Vector3f) -> Option<SensorConnection> {
        let to_p = p - self.origin;
        let distance = to_p.norm();
        if distance <= 0.0 {
            return None;
        }
        let d = to_p / distance;
        let cos_theta = d.dot(&self.forward);
        if cos_theta <= 0.0 {
            return None;
        }

        let px = d.dot(&self.right) / cos_theta / (self.aspect * self.tan_half_fov_y);
        let py = d.dot(&self.up) / cos_theta / self.tan_half_fov_y;
        let film_pos = Vector2f::new(
            0.5 * (px + 1.0) * self.width as Float,
            0.5 * (1.0 - py) * self.height as Float,
        );
        if film_pos.x < 0.0 || film_pos.x >= self.width as Float
            || film_pos.y < 0.0 || film_pos.y >= self.height as Float {
            return None;
        }

        let cos2 = cos_theta * cos_theta;
        Some(SensorConnection {
            film_pos,
            lens_point: self.origin,
            direction: -d,
            distance,
            importance: 1.0 / (self.image_plane_area * cos2 * cos2),
            pdf: distance * distance / cos_theta,
        })
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera {}x{}, tan_half_fov_y: {}", self.width, self.height, self.tan_half_fov_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, -1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_2,
            4,
            4,
        )
    }

    #[test]
    fn test_perspective_camera_center_ray() {
        let cam = test_camera();
        let ray = cam.sample_ray(&Vector2f::new(2.0, 2.0));
        let dir = ray.dir();

        assert!((dir.x - 0.0).abs() < 1e-6);
        assert!((dir.y - 0.0).abs() < 1e-6);
        assert!((dir.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_connection_inverts_sample_ray() {
        let cam = test_camera();
        let film_pos = Vector2f::new(0.7, 3.1);
        let ray = cam.sample_ray(&film_pos);
        let p = ray.at(3.0);

        let conn = cam.sample_connection(&p).expect("point is in view");
        assert!((conn.film_pos - film_pos).norm() < 1e-3);
        assert!((conn.distance - 3.0).abs() < 1e-4);
        assert!((conn.direction + ray.dir()).norm() < 1e-5);
    }

    #[test]
    fn test_connection_rejects_points_behind_or_outside() {
        let cam = test_camera();
        assert!(cam.sample_connection(&Vector3f::new(0.0, 0.0, 1.0)).is_none());
        assert!(cam.sample_connection(&Vector3f::new(5.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_importance_integrates_to_one_over_film() {
        // We is normalized so that its integral over the image plane at
        // distance one, weighted by cos^4 / cos^3 terms, sums to one
        let cam = test_camera();
        let n = 64;
        let mut sum = 0.0f64;
        for j in 0..n {
            for i in 0..n {
                let film_pos = Vector2f::new(
                    (i as Float + 0.5) / n as Float * 4.0,
                    (j as Float + 0.5) / n as Float * 4.0,
                );
                let dir = cam.sample_ray(&film_pos).dir();
                let conn = cam.sample_connection(&dir).unwrap();
                let cos_theta = -dir.z;
                // dA on the plane = cos^3 dw
                let d_area = cam.image_plane_area / (n * n) as Float;
                let d_omega = d_area * cos_theta * cos_theta * cos_theta;
                sum += (conn.importance * cos_theta * d_omega) as f64;
            }
        }
        assert!((sum - 1.0).abs() < 1e-3);
    }
}
