// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraType {
    Perspective,
    Stereo,
}

/// Importance connection from a scene point to the lens.
#[derive(Debug, Clone, Copy)]
pub struct SensorConnection {
    /// Continuous film position in pixels.
    pub film_pos: Vector2f,
    pub lens_point: Vector3f,
    /// Unit direction from the scene point to the lens.
    pub direction: Vector3f,
    pub distance: Float,
    pub importance: Float,
    /// Solid angle density of `direction` as seen from the scene point.
    pub pdf: Float,
}

pub trait Sensor: Send + Sync {
    fn camera_type(&self) -> CameraType;
    fn resolution(&self) -> (usize, usize);
    /// Primary ray through a continuous film position given in pixels.
    fn sample_ray(&self, film_pos: &Vector2f) -> Ray3f;
    fn sample_connection(&self, p: &Vector3f) -> Option<SensorConnection>;
    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
