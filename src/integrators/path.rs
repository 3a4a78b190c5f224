// Copyright @yucwang 2026

use super::roulette::russian_roulette;
use super::sample_result::{splat_sample_results, SampleResult};
use super::PathDepthParams;
use crate::core::integrator::Integrator;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::film::sample_splatter::FilmSampleSplatter;
use crate::film::variance_clamping::VarianceClamping;
use crate::film::Film;
use crate::math::constants::{Float, Vector2f};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use std::sync::Arc;

/// Unidirectional path tracer, BSDF sampling only. Emission found along the
/// path is kept per light group.
pub struct PathTracer {
    scene: Arc<Scene>,
    params: PathDepthParams,
    clamping: VarianceClamping,
}

impl PathTracer {
    pub fn new(scene: Arc<Scene>, params: PathDepthParams, clamping: VarianceClamping) -> Self {
        Self { scene, params, clamping }
    }

    pub fn params(&self) -> &PathDepthParams {
        &self.params
    }

    fn trace_path(&self, mut ray: Ray3f, sampler: &mut dyn Sampler, radiance: &mut [RGBSpectrum]) {
        let mut throughput = RGBSpectrum::splat(1.0);

        for depth in 0..=self.params.max_path_depth {
            let hit = match self.scene.ray_intersection(&ray) {
                Some(h) => h,
                None => break,
            };

            if let Some((le, group)) = self.scene.emitted_radiance(&hit, &ray.dir()) {
                if let Some(slot) = radiance.get_mut(group) {
                    *slot += throughput * le;
                }
            }
            if depth == self.params.max_path_depth {
                break;
            }

            let material = match hit.object_index().and_then(|idx| self.scene.object(idx)) {
                Some(object) => &object.material,
                None => break,
            };

            let n = hit.geo_normal();
            let frame = Frame::from_normal(&n);
            let wo = frame.to_local(&(-ray.dir()));
            let sample = match material.sample(&wo, &sampler.next_2d()) {
                Some(s) => s,
                None => break,
            };

            throughput *= sample.weight;
            if throughput.is_black() {
                break;
            }

            if depth + 1 >= self.params.rr_depth {
                let importance = sample.weight.max_component();
                match russian_roulette(importance, self.params.rr_importance_cap, sampler.next_float()) {
                    Some(prob) => throughput /= prob,
                    None => break,
                }
            }

            ray = Ray3f::spawn(hit.p(), &n, frame.from_local(&sample.wi));
        }
    }
}

impl Integrator for PathTracer {
    fn render_sample(&self, sampler: &mut dyn Sampler, film: &Film, splatter: &FilmSampleSplatter) {
        let film_pos = Vector2f::new(
            sampler.next_float() * film.width() as Float,
            sampler.next_float() * film.height() as Float,
        );
        let ray = self.scene.camera().sample_ray(&film_pos);
        let mut radiance = vec![RGBSpectrum::default(); film.radiance_group_count()];
        self.trace_path(ray, sampler, &mut radiance);

        let results: Vec<SampleResult> = radiance
            .into_iter()
            .enumerate()
            .map(|(group, value)| SampleResult::per_pixel(group, film_pos, value))
            .collect();
        film.add_sample_count(1);
        splat_sample_results(film, splatter, &self.clamping, &results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::RandomSampler;
    use crate::core::scene::SceneObject;
    use crate::film::FilmChannelType;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::Vector3f;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::rectangle::Rectangle;

    #[test]
    fn test_path_tracer_sees_emitter() {
        let camera = PerspectiveCamera::new(
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_2,
            4,
            4,
        );
        let mut scene = Scene::new(Box::new(camera));
        let white = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5)));
        // emitter filling the view, in light group 1
        scene.add_object(
            SceneObject::with_emission(
                Arc::new(Rectangle::new(
                    Vector3f::new(-10.0, -10.0, 0.0),
                    Vector3f::new(20.0, 0.0, 0.0),
                    Vector3f::new(0.0, 20.0, 0.0),
                )),
                white,
                RGBSpectrum::new(1.0, 2.0, 3.0),
            )
            .with_light_group(1),
        );
        let scene = Arc::new(scene);

        let film = Film::new(4, 4);
        film.add_channel(FilmChannelType::RadiancePerPixelNormalized).unwrap();
        film.set_radiance_group_count(scene.light_group_count()).unwrap();
        film.init().unwrap();

        let tracer = PathTracer::new(scene, PathDepthParams::default(), VarianceClamping::new(0.0));
        let splatter = FilmSampleSplatter::new(None);
        let mut sampler = RandomSampler::new(11);
        for _ in 0..2000 {
            tracer.render_sample(&mut sampler, &film, &splatter);
        }

        let image = film.output();
        assert!(image.mask.iter().all(|m| *m));
        for pixel in image.pixels.iter() {
            // the emitter seen directly, nothing to bounce back from
            assert!((pixel[0] - 1.0).abs() < 1e-4);
            assert!((pixel[2] - 3.0).abs() < 1e-4);
        }
        assert!(film.per_pixel_radiance(0, 1, 1).0.is_black());
    }
}
