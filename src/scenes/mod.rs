// Copyright @yucwang 2026

use crate::core::error::{RenderEngineError, Result};
use crate::core::properties::{Properties, Property};
use crate::core::scene::{Scene, SceneObject};
use crate::core::sensor::Sensor;
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::materials::mirror::MirrorBSDF;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveCamera;
use crate::sensors::stereo::StereoCamera;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;

use std::sync::Arc;

pub fn default_props() -> Properties {
    Properties::new()
        .with(Property::new("film.width", 512))
        .with(Property::new("film.height", 512))
        .with(Property::new("scene.camera.type", "perspective"))
        .with(Property::new("scene.camera.fov", 40.0f64))
        .with(Property::new("scene.camera.eyesdistance", 0.0626f64))
}

/// Camera of the built-in scene, looking down -z from `origin`.
pub fn camera_from_properties(cfg: &Properties, origin: Vector3f, target: Vector3f) -> Result<Box<dyn Sensor>> {
    let defaults = default_props();
    let width = cfg.get_or_default(&defaults, "film.width")?.as_uint()? as usize;
    let height = cfg.get_or_default(&defaults, "film.height")?.as_uint()? as usize;
    if width == 0 || height == 0 {
        return Err(RenderEngineError::InvalidProperty {
            name: String::from("film.width"),
            reason: format!("film size must not be empty, got {}x{}", width, height),
        });
    }
    let fov = cfg.get_or_default(&defaults, "scene.camera.fov")?.as_float()? * PI / 180.0;
    let up = Vector3f::new(0.0, 1.0, 0.0);

    let camera_type = cfg.get_or_default(&defaults, "scene.camera.type")?.as_string();
    match camera_type.to_lowercase().as_str() {
        "perspective" => Ok(Box::new(PerspectiveCamera::new(origin, target, up, fov, width, height))),
        "stereo" => {
            let eyes_distance = cfg.get_or_default(&defaults, "scene.camera.eyesdistance")?.as_float()?;
            Ok(Box::new(StereoCamera::new(origin, target, up, fov, eyes_distance, width, height)))
        }
        _ => Err(RenderEngineError::InvalidProperty {
            name: String::from("scene.camera.type"),
            reason: format!("unknown camera type: {}", camera_type),
        }),
    }
}

fn quad(corner: [Float; 3], edge_u: [Float; 3], edge_v: [Float; 3]) -> Arc<Rectangle> {
    Arc::new(Rectangle::new(
        Vector3f::new(corner[0], corner[1], corner[2]),
        Vector3f::new(edge_u[0], edge_u[1], edge_u[2]),
        Vector3f::new(edge_v[0], edge_v[1], edge_v[2]),
    ))
}

/// Closed box spanning [-1, 1]^3 with the front open, a square light under
/// the ceiling, a diffuse and a mirror sphere.
pub fn cornell_box(cfg: &Properties) -> Result<Scene> {
    let camera = camera_from_properties(cfg, Vector3f::new(0.0, 0.0, 3.8), Vector3f::zeros())?;
    let mut scene = Scene::new(camera);

    let white = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.73, 0.73, 0.73)));
    let red = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.65, 0.05, 0.05)));
    let green = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.12, 0.45, 0.15)));
    let mirror = Arc::new(MirrorBSDF::new(RGBSpectrum::splat(0.9)));

    let walls = vec![
        ("floor", quad([-1.0, -1.0, -1.0], [0.0, 0.0, 2.0], [2.0, 0.0, 0.0]), white.clone()),
        ("ceiling", quad([-1.0, 1.0, -1.0], [2.0, 0.0, 0.0], [0.0, 0.0, 2.0]), white.clone()),
        ("back", quad([-1.0, -1.0, -1.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]), white.clone()),
        ("left", quad([-1.0, -1.0, -1.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]), red),
        ("right", quad([1.0, -1.0, -1.0], [0.0, 0.0, 2.0], [0.0, 2.0, 0.0]), green),
    ];
    for (name, shape, material) in walls {
        scene.add_object(SceneObject::new(shape, material).with_name(name.to_string()));
    }

    scene.add_object(
        SceneObject::new(Arc::new(Sphere::new(Vector3f::new(-0.45, -0.6, -0.3), 0.4)), white.clone())
            .with_name(String::from("diffuse_sphere")),
    );
    scene.add_object(
        SceneObject::new(Arc::new(Sphere::new(Vector3f::new(0.45, -0.6, 0.25), 0.4)), mirror)
            .with_name(String::from("mirror_sphere")),
    );

    // faces down, just under the ceiling
    scene.add_object(
        SceneObject::with_emission(
            quad([-0.25, 0.99, -0.25], [0.5, 0.0, 0.0], [0.0, 0.0, 0.5]),
            white,
            RGBSpectrum::new(17.0, 12.0, 4.0),
        )
        .with_name(String::from("light")),
    );

    log::info!(
        "Built cornell box: {} objects, {} emitters, camera: {}.",
        scene.objects().len(),
        scene.emitters().len(),
        scene.camera().describe()
    );
    Ok(scene)
}
