use crate::constants::{FIT_MARGIN_RANGE, FIT_MIN_RADIUS, FIT_TARGET_RADIUS};
use glam::Vec3;

/// Axis-aligned bounds; starts empty and grows with [`Aabb::extend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.extend(p);
        }
        aabb
    }

    #[inline]
    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Sphere through the box corners, centred on the box.
    pub fn bounding_sphere(&self) -> BoundingSphere {
        if self.is_empty() {
            return BoundingSphere {
                center: Vec3::ZERO,
                radius: 0.0,
            };
        }
        BoundingSphere {
            center: self.center(),
            radius: (self.max - self.min).length() * 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Normalization derived once per asset load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitParams {
    /// Bounding-sphere radius, floored at [`FIT_MIN_RADIUS`].
    pub radius: f32,
    /// Scale that maps the model's radius onto the target radius.
    pub scale: f32,
    /// Camera distance that frames the model for the given field of view.
    pub distance: f32,
}

impl FitParams {
    /// Fit against the default target radius.
    pub fn from_sphere(sphere: &BoundingSphere, fov_deg: f32, margin: f32) -> Self {
        Self::compute(sphere.radius, FIT_TARGET_RADIUS, fov_deg, margin)
    }

    pub fn compute(radius: f32, target_radius: f32, fov_deg: f32, margin: f32) -> Self {
        let radius = if radius.is_finite() {
            radius.max(FIT_MIN_RADIUS)
        } else {
            FIT_MIN_RADIUS
        };
        let half_fov = fov_deg.to_radians() * 0.5;
        let distance = radius / half_fov.tan() * clamp_fit_margin(margin);
        Self {
            radius,
            scale: target_radius / radius,
            distance,
        }
    }
}

#[inline]
pub fn clamp_fit_margin(margin: f32) -> f32 {
    margin.clamp(FIT_MARGIN_RANGE.0, FIT_MARGIN_RANGE.1)
}
