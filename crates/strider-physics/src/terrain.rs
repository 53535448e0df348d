//! Terrain heightfield.
//!
//! A square grid of height samples with bilinear interpolation between
//! samples, used as the terrain collision surface of [`KinematicWorld`]
//! (crate::kinematic::KinematicWorld) and as the terrain generator for tests
//! and demos. Coordinates outside the grid clamp to the edge sample.

use nalgebra::Vector3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const RAY_MARCH_STEPS: usize = 128;
const RAY_BISECT_ITERS: usize = 24;

/// Square, bilinearly interpolated height grid centered on the origin.
#[derive(Debug, Clone)]
pub struct Heightfield {
    side: usize,
    cell: f64,
    heights: Vec<f64>,
}

impl Heightfield {
    /// A flat field at the given height.
    #[must_use]
    pub fn flat(height: f64) -> Self {
        Self {
            side: 2,
            cell: 1e6,
            heights: vec![height; 4],
        }
    }

    /// Sample `f(x, y)` on a `side × side` grid with `cell` meters between
    /// samples, centered on the origin.
    ///
    /// # Panics
    ///
    /// Panics if `side < 2` or `cell` is not positive.
    #[must_use]
    pub fn from_fn(side: usize, cell: f64, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        assert!(side >= 2, "heightfield needs at least 2x2 samples");
        assert!(cell > 0.0, "cell size must be positive");
        let half = Self::half_extent_for(side, cell);
        let mut heights = Vec::with_capacity(side * side);
        for iy in 0..side {
            for ix in 0..side {
                #[allow(clippy::cast_precision_loss)]
                let x = ix as f64 * cell - half;
                #[allow(clippy::cast_precision_loss)]
                let y = iy as f64 * cell - half;
                heights.push(f(x, y));
            }
        }
        Self { side, cell, heights }
    }

    /// Deterministic rolling terrain: a handful of cosine waves with seeded
    /// random directions and phases.
    #[must_use]
    pub fn rolling(seed: u64, side: usize, cell: f64, amplitude: f64, wavelength: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let waves: Vec<(f64, f64, f64, f64)> = (0..5)
            .map(|i| {
                let dir: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
                let phase: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
                // Shorter waves carry less height.
                let lambda = wavelength / f64::from(1 + i);
                let amp = amplitude / f64::from(1 + i);
                (dir, phase, lambda, amp)
            })
            .collect();

        Self::from_fn(side, cell, |x, y| {
            waves
                .iter()
                .map(|&(dir, phase, lambda, amp)| {
                    let along = x * dir.cos() + y * dir.sin();
                    amp * (along * std::f64::consts::TAU / lambda + phase).cos()
                })
                .sum()
        })
    }

    fn half_extent_for(side: usize, cell: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let span = (side - 1) as f64 * cell;
        span / 2.0
    }

    /// Half the side length of the covered area in meters.
    #[must_use]
    pub fn half_extent(&self) -> f64 {
        Self::half_extent_for(self.side, self.cell)
    }

    fn sample(&self, ix: usize, iy: usize) -> f64 {
        self.heights[iy * self.side + ix]
    }

    /// Bilinearly interpolated height at `(x, y)`.
    #[must_use]
    pub fn height(&self, x: f64, y: f64) -> f64 {
        let half = self.half_extent();
        #[allow(clippy::cast_precision_loss)]
        let max_idx = (self.side - 1) as f64;
        let gx = ((x + half) / self.cell).clamp(0.0, max_idx);
        let gy = ((y + half) / self.cell).clamp(0.0, max_idx);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ix = (gx.floor() as usize).min(self.side - 2);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let iy = (gy.floor() as usize).min(self.side - 2);
        #[allow(clippy::cast_precision_loss)]
        let fx = gx - ix as f64;
        #[allow(clippy::cast_precision_loss)]
        let fy = gy - iy as f64;

        let h00 = self.sample(ix, iy);
        let h10 = self.sample(ix + 1, iy);
        let h01 = self.sample(ix, iy + 1);
        let h11 = self.sample(ix + 1, iy + 1);

        let bottom = h00 + (h10 - h00) * fx;
        let top = h01 + (h11 - h01) * fx;
        bottom + (top - bottom) * fy
    }

    /// First intersection of the segment `from → to` with the surface.
    ///
    /// Marches along the segment looking for a side change of
    /// `z(t) − height(t)`, then bisects. Vertical segments take an exact
    /// fast path.
    #[must_use]
    pub fn raycast(&self, from: Vector3<f64>, to: Vector3<f64>) -> Option<Vector3<f64>> {
        let horiz = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
        if horiz < 1e-12 {
            let h = self.height(from.x, from.y);
            let (lo, hi) = if from.z <= to.z {
                (from.z, to.z)
            } else {
                (to.z, from.z)
            };
            if (lo..=hi).contains(&h) {
                return Some(Vector3::new(from.x, from.y, h));
            }
            return None;
        }

        let at = |t: f64| from + (to - from) * t;
        let above = |p: Vector3<f64>| p.z - self.height(p.x, p.y);

        let mut prev_t = 0.0;
        let mut prev_side = above(from);
        if prev_side.abs() < 1e-12 {
            return Some(Vector3::new(from.x, from.y, self.height(from.x, from.y)));
        }

        #[allow(clippy::cast_precision_loss)]
        for i in 1..=RAY_MARCH_STEPS {
            let t = i as f64 / RAY_MARCH_STEPS as f64;
            let side = above(at(t));
            if side == 0.0 || side.signum() != prev_side.signum() {
                // Bracketed a crossing; bisect.
                let (mut lo, mut hi) = (prev_t, t);
                for _ in 0..RAY_BISECT_ITERS {
                    let mid = (lo + hi) / 2.0;
                    if above(at(mid)).signum() == prev_side.signum() {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                let p = at((lo + hi) / 2.0);
                return Some(Vector3::new(p.x, p.y, self.height(p.x, p.y)));
            }
            prev_t = t;
            prev_side = side;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flat_field_height() {
        let hf = Heightfield::flat(2.5);
        assert_relative_eq!(hf.height(0.0, 0.0), 2.5);
        assert_relative_eq!(hf.height(123.0, -456.0), 2.5);
    }

    #[test]
    fn from_fn_samples_at_grid_points() {
        let hf = Heightfield::from_fn(11, 1.0, |x, y| x + 2.0 * y);
        assert_relative_eq!(hf.height(0.0, 0.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(hf.height(3.0, 1.0), 5.0, epsilon = 1e-9);
        assert_relative_eq!(hf.height(-5.0, -5.0), -15.0, epsilon = 1e-9);
    }

    #[test]
    fn bilinear_between_samples() {
        // A plane interpolates exactly.
        let hf = Heightfield::from_fn(11, 1.0, |x, y| 0.5 * x - 0.25 * y);
        assert_relative_eq!(hf.height(0.5, 0.5), 0.125, epsilon = 1e-9);
        assert_relative_eq!(hf.height(1.25, -2.75), 1.3125, epsilon = 1e-9);
    }

    #[test]
    fn clamps_outside_extent() {
        let hf = Heightfield::from_fn(3, 1.0, |x, _| x);
        // Grid covers [-1, 1]; beyond that the edge value holds.
        assert_relative_eq!(hf.height(10.0, 0.0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(hf.height(-10.0, 0.0), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn vertical_ray_hits() {
        let hf = Heightfield::flat(1.0);
        let hit = hf
            .raycast(Vector3::new(2.0, 3.0, 100.0), Vector3::new(2.0, 3.0, -100.0))
            .unwrap();
        assert_relative_eq!(hit.z, 1.0);
        assert_relative_eq!(hit.x, 2.0);
    }

    #[test]
    fn vertical_ray_misses_below() {
        let hf = Heightfield::flat(1.0);
        // Entire segment below the surface.
        assert!(hf
            .raycast(Vector3::new(0.0, 0.0, 0.5), Vector3::new(0.0, 0.0, -3.0))
            .is_none());
    }

    #[test]
    fn slanted_ray_hits_ramp() {
        let slope = 0.5_f64;
        let hf = Heightfield::from_fn(101, 1.0, |_, y| y * slope);
        let hit = hf
            .raycast(Vector3::new(0.0, -10.0, 20.0), Vector3::new(0.0, 10.0, -20.0))
            .unwrap();
        assert_relative_eq!(hit.z, hit.y * slope, epsilon = 1e-4);
    }

    #[test]
    fn rolling_is_deterministic_and_bounded() {
        let a = Heightfield::rolling(42, 33, 1.0, 1.0, 20.0);
        let b = Heightfield::rolling(42, 33, 1.0, 1.0, 20.0);
        let c = Heightfield::rolling(7, 33, 1.0, 1.0, 20.0);
        let mut seen_diff = false;
        for (x, y) in [(0.0, 0.0), (3.5, -2.0), (-8.0, 8.0)] {
            assert_relative_eq!(a.height(x, y), b.height(x, y));
            // Sum of 5 waves with amplitudes 1, 1/2, ... 1/5.
            assert!(a.height(x, y).abs() < 2.3);
            if (a.height(x, y) - c.height(x, y)).abs() > 1e-9 {
                seen_diff = true;
            }
        }
        assert!(seen_diff, "different seeds should differ somewhere");
    }
}
