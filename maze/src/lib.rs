pub mod config;
pub mod control;
pub mod find;
pub mod generate;
pub mod grid;
pub mod util;

pub use config::MazeConfig;
pub use control::{Controller, ManualScheduler, Outcome, Phase, Renderer, Scheduler};
pub use find::{PathFinder, PathFinderState, PathResult, Snapshot, Visit};
pub use generate::{generate, RandomSource};
pub use grid::{Direction, Edge, Maze, Point, WallModel, WallSet};
