use crate::{Interval, Ray, Vec3};

/// Minimum width of a box along any axis.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-Aligned Bounding Box for the BVH.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two corner points.
    ///
    /// Flat boxes (a ground plane, an axis-aligned triangle) are padded so the
    /// slab test never sees a zero-width slab.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);

        let mut aabb = Self {
            x: Interval::new(lo.x, hi.x),
            y: Interval::new(lo.y, hi.y),
            z: Interval::new(lo.z, hi.z),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Tight box around a set of points. Empty input gives `Aabb::EMPTY`.
    pub fn from_point_cloud<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut lo = Vec3::splat(f32::INFINITY);
        let mut hi = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;

        for p in points {
            lo = lo.min(*p);
            hi = hi.max(*p);
            any = true;
        }

        if any {
            Self::from_points(lo, hi)
        } else {
            Self::EMPTY
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Grow this box in place to also cover `other`.
    pub fn grow(&mut self, other: &Aabb) {
        *self = Self::surrounding(self, other);
    }

    /// True when the box contains no points at all.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. Returns false for an empty box and for a box that lies
    /// entirely outside `ray_t`.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        if self.is_empty() {
            return false;
        }

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let origin = r.origin[axis];

            let mut t0 = (slab.min - origin) * adinv;
            let mut t1 = (slab.max - origin) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return false;
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size >= y_size && x_size >= z_size {
            0
        } else if y_size >= z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
