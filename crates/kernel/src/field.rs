use noise::{NoiseFn, Simplex};
use std::fmt;

/// A read-only 2D scalar field in `[-1, 1]`.
///
/// Implementations must be pure: equal inputs always give equal outputs.
pub trait HeightField {
    fn sample(&self, x: f64, y: f64) -> f64;
}

impl<F> HeightField for F
where
    F: Fn(f64, f64) -> f64,
{
    fn sample(&self, x: f64, y: f64) -> f64 {
        self(x, y)
    }
}

/// Seeded 2D simplex noise. The seed is fixed for the field's lifetime.
pub struct SimplexField {
    seed: u32,
    simplex: Simplex,
}

impl SimplexField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for SimplexField {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for SimplexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplexField")
            .field("seed", &self.seed)
            .finish()
    }
}

impl HeightField for SimplexField {
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.simplex.get([x, y]).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_points() -> impl Iterator<Item = (f64, f64)> {
        (0..40).flat_map(|i| (0..40).map(move |j| (i as f64 * 0.173 - 3.0, j as f64 * 0.291 - 5.0)))
    }

    #[test]
    fn sampling_is_deterministic() {
        let a = SimplexField::new(7);
        let b = SimplexField::new(7);
        for (x, y) in probe_points() {
            assert_eq!(a.sample(x, y), a.sample(x, y));
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn output_stays_in_unit_range() {
        let field = SimplexField::new(3);
        for (x, y) in probe_points() {
            let v = field.sample(x, y);
            assert!((-1.0..=1.0).contains(&v), "{v} out of range at ({x}, {y})");
        }
    }

    #[test]
    fn field_is_not_constant() {
        let field = SimplexField::new(1);
        let first = field.sample(0.37, 0.51);
        assert!(probe_points().any(|(x, y)| field.sample(x, y) != first));
    }

    #[test]
    fn seeds_change_the_field() {
        let a = SimplexField::new(1);
        let b = SimplexField::new(2);
        assert!(probe_points().any(|(x, y)| a.sample(x, y) != b.sample(x, y)));
        assert_eq!(a.seed(), 1);
    }

    #[test]
    fn field_is_coherent() {
        let field = SimplexField::new(11);
        for (x, y) in probe_points() {
            let d = (field.sample(x, y) - field.sample(x + 1e-4, y)).abs();
            assert!(d < 0.01, "jump of {d} at ({x}, {y})");
        }
    }

    #[test]
    fn closures_are_height_fields() {
        let plane = |x: f64, y: f64| (x + y) * 0.5;
        assert_eq!(plane.sample(1.0, 0.5), 0.75);
    }
}
