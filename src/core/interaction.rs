// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };

#[derive(Debug, Clone, Copy)]
pub struct SurfaceIntersection {
    p: Vector3f,
    geo_normal: Vector3f,
    uv: Vector2f,
    t: Float,
    object_index: Option<usize>,
}

pub struct SurfaceSampleRecord {
    intersection: SurfaceIntersection,
    pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_geo_normal: Vector3f,
               new_uv: Vector2f,
               new_t: Float) -> Self {
        Self { p: new_p, geo_normal: new_geo_normal, uv: new_uv, t: new_t, object_index: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn object_index(&self) -> Option<usize> {
        self.object_index
    }

    pub fn with_object_index(&self, object_index: Option<usize>) -> Self {
        Self { object_index, ..*self }
    }
}

impl SurfaceSampleRecord {
    pub fn new(new_intersection: SurfaceIntersection,
               new_pdf: Float) -> Self {
        Self { intersection: new_intersection, pdf: new_pdf }
    }

    pub fn intersection(&self) -> &SurfaceIntersection {
        &self.intersection
    }

    /// Area density of the sampled point.
    pub fn pdf(&self) -> Float {
        self.pdf
    }
}
