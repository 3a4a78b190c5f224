// Copyright @yucwang 2026

use crate::core::sensor::{CameraType, Sensor, SensorConnection};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::sensors::perspective::PerspectiveCamera;

/// Two pinhole eyes rendered side by side: the left half of the film belongs
/// to the left eye, the right half to the right eye.
pub struct StereoCamera {
    left: PerspectiveCamera,
    right: PerspectiveCamera,
    width: usize,
    height: usize,
}

impl StereoCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               eyes_distance: Float,
               width: usize,
               height: usize) -> Self {
        let center = PerspectiveCamera::new(origin, target, up, fov_y_radians, width, height);
        let offset = center.right() * (0.5 * eyes_distance);
        let eye_width = (width / 2).max(1);

        Self {
            left: PerspectiveCamera::new(origin - offset, target - offset, up, fov_y_radians, eye_width, height),
            right: PerspectiveCamera::new(origin + offset, target + offset, up, fov_y_radians, eye_width, height),
            width,
            height,
        }
    }
}

impl Sensor for StereoCamera {
    fn camera_type(&self) -> CameraType {
        CameraType::Stereo
    }

    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn sample_ray(&self, film_pos: &Vector2f) -> Ray3f {
        let half = (self.width / 2).max(1) as Float;
        if film_pos.x < half {
            self.left.sample_ray(film_pos)
        } else {
            self.right.sample_ray(&Vector2f::new(film_pos.x - half, film_pos.y))
        }
    }

    // a scene point maps to two film positions, one per eye
    fn sample_connection(&self, _p: &Vector3f) -> Option<SensorConnection> {
        None
    }

    fn describe(&self) -> String {
        format!("StereoCamera {}x{}", self.width, self.height)
    }
}
