//! Initial designs: where to evaluate before the surrogate takes over.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use bopt_types::Bounds;

/// Strategy for placing the seed points of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InitialDesign {
    /// Evenly spaced points, both ends of the bounds included.
    Grid { count: usize },
    /// Uniform random points from a seeded generator.
    Random { count: usize, seed: u64 },
}

impl InitialDesign {
    /// Number of points this design produces.
    pub fn count(&self) -> usize {
        match self {
            Self::Grid { count } | Self::Random { count, .. } => *count,
        }
    }

    pub fn points(&self, bounds: Bounds) -> Vec<f64> {
        match self {
            Self::Grid { count } => grid_points(bounds, *count),
            Self::Random { count, seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                random_points(bounds, *count, &mut rng)
            }
        }
    }
}

/// `count` evenly spaced points over `bounds`; a single point sits at the
/// midpoint.
pub fn grid_points(bounds: Bounds, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![bounds.midpoint()],
        _ => (0..count)
            .map(|i| {
                let t = i as f64 / (count - 1) as f64;
                bounds.lo() + t * bounds.width()
            })
            .collect(),
    }
}

/// `count` independent uniform draws from `bounds`.
pub fn random_points<R: Rng>(bounds: Bounds, count: usize, rng: &mut R) -> Vec<f64> {
    (0..count)
        .map(|_| rng.random_range(bounds.lo()..=bounds.hi()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Bounds {
        Bounds::new(0.0, 1.0).unwrap()
    }

    #[test]
    fn grid_includes_both_ends() {
        let pts = grid_points(Bounds::new(-10.0, 10.0).unwrap(), 5);
        assert_eq!(pts, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
    }

    #[test]
    fn grid_degenerate_counts() {
        assert!(grid_points(unit(), 0).is_empty());
        assert_eq!(grid_points(unit(), 1), vec![0.5]);
    }

    #[test]
    fn random_design_respects_bounds() {
        let b = Bounds::new(-3.0, 7.0).unwrap();
        let pts = InitialDesign::Random { count: 200, seed: 11 }.points(b);
        assert_eq!(pts.len(), 200);
        assert!(pts.iter().all(|&x| b.contains(x)));
    }

    #[test]
    fn random_design_is_reproducible() {
        let design = InitialDesign::Random { count: 10, seed: 42 };
        assert_eq!(design.points(unit()), design.points(unit()));

        let other = InitialDesign::Random { count: 10, seed: 43 };
        assert_ne!(design.points(unit()), other.points(unit()));
    }

    #[test]
    fn design_count_and_serde() {
        let design = InitialDesign::Grid { count: 4 };
        assert_eq!(design.count(), 4);
        assert_eq!(design.points(unit()).len(), 4);

        let json = serde_json::to_string(&design).unwrap();
        let back: InitialDesign = serde_json::from_str(&json).unwrap();
        assert_eq!(design, back);
    }
}
