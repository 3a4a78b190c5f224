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

/// Traces paths from the lights and connects every non specular vertex to the
/// camera. Lights seen directly, or through specular bounces, are picked up by
/// a short eye path instead since a pinhole can not be hit by a light path.
pub struct LightTracer {
    scene: Arc<Scene>,
    params: PathDepthParams,
    clamping: VarianceClamping,
}

impl LightTracer {
    pub fn new(scene: Arc<Scene>, params: PathDepthParams, clamping: VarianceClamping) -> Self {
        Self { scene, params, clamping }
    }

    pub fn params(&self) -> &PathDepthParams {
        &self.params
    }

    /// Per pixel results for every light group, zero when nothing emissive is hit.
    fn trace_eye_sample(&self, sampler: &mut dyn Sampler, film: &Film, results: &mut Vec<SampleResult>) {
        let group_count = film.radiance_group_count();
        let film_pos = Vector2f::new(
            sampler.next_float() * film.width() as Float,
            sampler.next_float() * film.height() as Float,
        );
        let mut radiance = vec![RGBSpectrum::default(); group_count];
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut ray = self.scene.camera().sample_ray(&film_pos);

        for depth in 0..=self.params.max_path_depth {
            let hit = match self.scene.ray_intersection(&ray) {
                Some(hit) => hit,
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

            let object = match hit.object_index().and_then(|idx| self.scene.object(idx)) {
                Some(object) => object,
                None => break,
            };
            if !object.material.is_delta() {
                break;
            }
            let frame = Frame::from_normal(&hit.geo_normal());
            let wo = frame.to_local(&(-ray.dir()));
            let sample = match object.material.sample(&wo, &sampler.next_2d()) {
                Some(sample) => sample,
                None => break,
            };
            throughput *= sample.weight;
            ray = Ray3f::spawn(hit.p(), &hit.geo_normal(), frame.from_local(&sample.wi));
        }

        for (group, value) in radiance.into_iter().enumerate() {
            results.push(SampleResult::per_pixel(group, film_pos, value));
        }
    }

    fn trace_light_path(&self, sampler: &mut dyn Sampler, results: &mut Vec<SampleResult>) {
        let (emitter, selection_pdf) = match self.scene.sample_emitter(sampler.next_float()) {
            Some(selected) => selected,
            None => return,
        };
        let u_position = sampler.next_2d();
        let u_direction = sampler.next_2d();
        let emission = match emitter.sample_emission(&u_position, &u_direction) {
            Some(emission) => emission,
            None => return,
        };
        let group = emitter.light_group();
        let mut throughput = emission.flux() / selection_pdf;
        let mut ray = emission.ray;
        let camera = self.scene.camera();

        let mut depth = 1;
        while depth <= self.params.max_path_depth {
            let hit = match self.scene.ray_intersection(&ray) {
                Some(hit) => hit,
                None => break,
            };
            let object = match hit.object_index().and_then(|idx| self.scene.object(idx)) {
                Some(object) => object,
                None => break,
            };
            let n = hit.geo_normal();
            let frame = Frame::from_normal(&n);
            let wo = frame.to_local(&(-ray.dir()));

            if !object.material.is_delta() {
                if let Some(connection) = camera.sample_connection(&hit.p()) {
                    let shadow_ray = Ray3f::spawn_to(hit.p(), &n, connection.lens_point);
                    if connection.pdf > 0.0 && !self.scene.ray_intersection_t(&shadow_ray) {
                        let wi = frame.to_local(&connection.direction);
                        let f = object.material.eval(&wo, &wi);
                        let radiance = throughput * f
                            * (wi.z.abs() * connection.importance / connection.pdf);
                        if !radiance.is_black() {
                            results.push(SampleResult::per_screen(group, connection.film_pos, radiance));
                        }
                    }
                }
            }

            if depth == self.params.max_path_depth {
                break;
            }
            let sample = match object.material.sample(&wo, &sampler.next_2d()) {
                Some(sample) => sample,
                None => break,
            };
            throughput *= sample.weight;
            if throughput.is_black() {
                break;
            }
            if depth >= self.params.rr_depth {
                let importance = sample.weight.max_component();
                match russian_roulette(importance, self.params.rr_importance_cap, sampler.next_float()) {
                    Some(prob) => throughput /= prob,
                    None => break,
                }
            }

            ray = Ray3f::spawn(hit.p(), &n, frame.from_local(&sample.wi));
            depth += 1;
        }
    }
}

impl Integrator for LightTracer {
    fn render_sample(&self, sampler: &mut dyn Sampler, film: &Film, splatter: &FilmSampleSplatter) {
        let mut results = Vec::new();
        self.trace_eye_sample(sampler, film, &mut results);
        self.trace_light_path(sampler, &mut results);
        film.add_sample_count(1);
        splat_sample_results(film, splatter, &self.clamping, &results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::RandomSampler;
    use crate::integrators::path::PathTracer;
    use crate::core::scene::SceneObject;
    use crate::film::FilmChannelType;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::Vector3f;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::rectangle::Rectangle;

    // camera at z = 4 looking at a white wall at z = 0, small light between them facing the wall
    fn wall_scene(width: usize, height: usize) -> Arc<Scene> {
        let camera = PerspectiveCamera::new(
            Vector3f::new(0.0, 0.0, 4.0),
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_2,
            width,
            height,
        );
        let mut scene = Scene::new(Box::new(camera));
        let white = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.8)));
        scene.add_object(SceneObject::new(
            Arc::new(Rectangle::new(
                Vector3f::new(-4.0, -4.0, 0.0),
                Vector3f::new(8.0, 0.0, 0.0),
                Vector3f::new(0.0, 8.0, 0.0),
            )),
            white.clone(),
        ));
        // edges ordered so the normal points to -z
        scene.add_object(SceneObject::with_emission(
            Arc::new(Rectangle::new(
                Vector3f::new(-0.1, -0.1, 1.0),
                Vector3f::new(0.0, 0.2, 0.0),
                Vector3f::new(0.2, 0.0, 0.0),
            )),
            white,
            RGBSpectrum::splat(10.0),
        ));
        Arc::new(scene)
    }

    fn light_film(width: usize, height: usize) -> Film {
        let film = Film::new(width, height);
        film.add_channel(FilmChannelType::RadiancePerPixelNormalized).unwrap();
        film.add_channel(FilmChannelType::RadiancePerScreenNormalized).unwrap();
        film.init().unwrap();
        film
    }

    #[test]
    fn test_light_tracing_lights_the_wall() {
        let scene = wall_scene(8, 8);
        let tracer = LightTracer::new(scene, PathDepthParams::default(), VarianceClamping::new(0.0));
        let film = light_film(8, 8);
        let splatter = FilmSampleSplatter::new(None);
        let mut sampler = RandomSampler::new(42);
        for _ in 0..20000 {
            tracer.render_sample(&mut sampler, &film, &splatter);
        }

        assert_eq!(film.total_sample_count(), 20000);
        let image = film.output();
        assert!(image.mask.iter().all(|m| *m));
        assert!(image.pixels.iter().all(|p| p.is_valid() && p[0] >= 0.0));
        // the light faces away from the camera, the wall carries all the energy
        let screen_sum: Float = (0..8).flat_map(|y| (0..8).map(move |x| (x, y)))
            .map(|(x, y)| film.per_screen_radiance(0, x, y).y())
            .sum();
        assert!(screen_sum > 0.0);
        // wall below the light is brighter than the corners
        assert!(film.per_screen_radiance(0, 5, 5).y() > film.per_screen_radiance(0, 0, 0).y());
    }

    #[test]
    fn test_depth_zero_traces_nothing() {
        let scene = wall_scene(4, 4);
        let params = PathDepthParams { max_path_depth: 0, ..PathDepthParams::default() };
        let tracer = LightTracer::new(scene, params, VarianceClamping::new(0.0));
        let film = light_film(4, 4);
        let splatter = FilmSampleSplatter::new(None);
        let mut sampler = RandomSampler::new(3);
        for _ in 0..100 {
            tracer.render_sample(&mut sampler, &film, &splatter);
        }
        assert!((0..4).all(|x| film.pixel_radiance(x, 1).is_black()));
        assert_eq!(film.discarded_sample_count(), 0);
    }

    fn luminance_sums(film: &Film) -> (Float, Float) {
        let (width, height) = (film.width(), film.height());
        let mut total = 0.0;
        let mut center = 0.0;
        for y in 0..height {
            for x in 0..width {
                let value = film.pixel_radiance(x, y).y();
                total += value;
                if (width / 2 - 1..=width / 2).contains(&x) && (height / 2 - 1..=height / 2).contains(&y) {
                    center += value;
                }
            }
        }
        (total, center)
    }

    fn render_light(params: PathDepthParams, samples: usize, seed: u64) -> (Float, Float) {
        let tracer = LightTracer::new(wall_scene(4, 4), params, VarianceClamping::new(0.0));
        let film = light_film(4, 4);
        let splatter = FilmSampleSplatter::new(None);
        let mut sampler = RandomSampler::new(seed);
        for _ in 0..samples {
            tracer.render_sample(&mut sampler, &film, &splatter);
        }
        assert_eq!(film.discarded_sample_count(), 0);
        luminance_sums(&film)
    }

    fn render_path(params: PathDepthParams, samples: usize, seed: u64) -> (Float, Float) {
        let tracer = PathTracer::new(wall_scene(4, 4), params, VarianceClamping::new(0.0));
        let film = Film::new(4, 4);
        film.add_channel(FilmChannelType::RadiancePerPixelNormalized).unwrap();
        film.init().unwrap();
        let splatter = FilmSampleSplatter::new(None);
        let mut sampler = RandomSampler::new(seed);
        for _ in 0..samples {
            tracer.render_sample(&mut sampler, &film, &splatter);
        }
        luminance_sums(&film)
    }

    fn assert_close(light: Float, path: Float, rel: Float) {
        assert!(path > 0.0);
        assert!((light - path).abs() <= rel * path, "light tracer {} against path tracer {}", light, path);
    }

    #[test]
    fn test_single_bounce_matches_path_tracer() {
        let no_rr = PathDepthParams { max_path_depth: 1, rr_depth: 100, ..PathDepthParams::default() };
        let (light_total, light_center) = render_light(no_rr, 200_000, 7);
        let (path_total, path_center) = render_path(no_rr, 400_000, 8);

        assert_close(light_total, path_total, 0.05);
        assert_close(light_center, path_center, 0.1);
    }

    #[test]
    fn test_russian_roulette_keeps_the_estimate() {
        let with_rr = PathDepthParams { max_path_depth: 3, rr_depth: 1, rr_importance_cap: 0.5 };
        let no_rr = PathDepthParams { rr_depth: 100, ..with_rr };
        let (light_total, _) = render_light(with_rr, 300_000, 21);
        let (path_total, _) = render_path(no_rr, 400_000, 22);

        assert_close(light_total, path_total, 0.06);
    }
}
