// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::BVH;
use crate::core::emitter::Emitter;
use crate::core::interaction::SurfaceIntersection;
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::emitters::area::AreaEmitter;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::{Arc, OnceLock};

pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<dyn BSDF>,
    pub emission: RGBSpectrum,
    pub light_group: usize,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>) -> Self {
        Self { shape, material, emission: RGBSpectrum::default(), light_group: 0, name: None }
    }

    pub fn with_emission(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>, emission: RGBSpectrum) -> Self {
        Self { shape, material, emission, light_group: 0, name: None }
    }

    pub fn with_light_group(mut self, light_group: usize) -> Self {
        self.light_group = light_group;
        self
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn is_emissive(&self) -> bool {
        !self.emission.is_black()
    }
}

pub struct Scene {
    objects: Vec<SceneObject>,
    emitters: Vec<Box<dyn Emitter>>,
    camera: Box<dyn Sensor>,
    accelerator: OnceLock<BVH>,
}

impl Scene {
    pub fn new(camera: Box<dyn Sensor>) -> Self {
        Self {
            objects: Vec::new(),
            emitters: Vec::new(),
            camera,
            accelerator: OnceLock::new(),
        }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        if object.is_emissive() {
            self.emitters.push(Box::new(AreaEmitter::from_shape(
                object.shape.clone(),
                object.emission,
                object.light_group,
            )));
        }
        self.objects.push(object);
        self.accelerator.take();
    }

    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) {
        self.emitters.push(emitter);
    }

    pub fn objects(&self) -> &Vec<SceneObject> {
        &self.objects
    }

    pub fn object(&self, idx: usize) -> Option<&SceneObject> {
        self.objects.get(idx)
    }

    pub fn emitters(&self) -> &Vec<Box<dyn Emitter>> {
        &self.emitters
    }

    pub fn camera(&self) -> &dyn Sensor {
        self.camera.as_ref()
    }

    /// Number of distinct light groups, one radiance channel each.
    pub fn light_group_count(&self) -> usize {
        self.emitters
            .iter()
            .map(|e| e.light_group() + 1)
            .max()
            .unwrap_or(1)
    }

    /// BVH over the object bounds, built on first use.
    pub fn accelerator(&self) -> &BVH {
        self.accelerator.get_or_init(|| {
            BVH::new(self.objects.iter().map(|object| object.shape.bounding_box()).collect())
        })
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (idx, hit) = self.accelerator().ray_intersection(ray, |idx, clipped| {
            let hit = self.objects[idx].shape.ray_intersection(clipped)?;
            let t = hit.t();
            Some((hit, t))
        })?;
        Some(hit.with_object_index(Some(idx)))
    }

    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.accelerator()
            .ray_intersection_t(ray, |idx, ray| self.objects[idx].shape.ray_intersection_t(ray))
    }

    /// Radiance emitted by the hit surface back along `-ray_dir`, with its light group.
    pub fn emitted_radiance(&self, hit: &SurfaceIntersection, ray_dir: &Vector3f) -> Option<(RGBSpectrum, usize)> {
        let object = self.objects.get(hit.object_index()?)?;
        if !object.is_emissive() {
            return None;
        }
        if hit.geo_normal().dot(&(-*ray_dir)) <= 0.0 {
            return None;
        }
        Some((object.emission, object.light_group))
    }

    /// Uniform light selection; returns the emitter and its selection probability.
    pub fn sample_emitter(&self, u: Float) -> Option<(&dyn Emitter, Float)> {
        if self.emitters.is_empty() {
            return None;
        }

        let emitter_count = self.emitters.len();
        let emitter_index = ((u * emitter_count as Float) as usize).min(emitter_count - 1);
        Some((self.emitters[emitter_index].as_ref(), 1.0 / emitter_count as Float))
    }
}
