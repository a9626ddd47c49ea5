use log::info;
use rand::{Rng, RngCore};

use crate::grid::{Edge, Maze, WallSet};

/// Uniform sampling in `[0, 1)`, injected so that generation can be replayed from a seed
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

impl<R: RngCore> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Roll a six sided die (eight sided when `biased`) and report whether it came up 4 or lower.
/// A lucky roll leaves the passage open.
pub fn lucky<G: RandomSource + ?Sized>(rng: &mut G, biased: bool) -> bool {
    let sides = if biased { 8.0 } else { 6.0 };
    (rng.next_f64() * sides).floor() as u32 + 1 <= 4
}

/// Decide every edge of a `width` x `height` grid independently.
///
/// Horizontal segments are walled with probability 2/6 and vertical ones with probability 4/8,
/// which tends to produce long vertical corridors. Nothing guarantees that the result is
/// connected, so a maze without a path from top to bottom is a normal outcome.
pub fn generate<G: RandomSource + ?Sized>(width: usize, height: usize, rng: &mut G) -> WallSet {
    let mut walls = WallSet::new();
    for y in 0..=height {
        for x in 0..=width {
            if x < width && !lucky(rng, false) {
                walls.insert(Edge::between(x, y, x + 1, y));
            }
            if y < height && !lucky(rng, true) {
                walls.insert(Edge::between(x, y, x, y + 1));
            }
        }
    }
    walls
}

impl Maze {
    pub fn generate<G: RandomSource + ?Sized>(
        width: usize,
        height: usize,
        rng: &mut G,
    ) -> Result<Self, anyhow::Error> {
        if width == 0 || height == 0 {
            anyhow::bail!("maze dimensions must be positive, got {width}x{height}");
        }
        let walls = generate(width, height, rng);
        info!("generated {width}x{height} maze with {} walls", walls.len());
        Ok(Maze::with_walls(width, height, walls))
    }
}
