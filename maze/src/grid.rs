use std::{collections::HashSet, fmt::Display};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::util;

/// A lattice coordinate. Cell `(x, y)` is the square whose top-left corner is the point `(x, y)`,
/// so valid points range over `[0, width] x [0, height]` while cells range over
/// `[0, width) x [0, height)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// True if the two points differ by exactly one unit along exactly one axis
    pub fn is_adjacent(&self, other: &Point) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    /// The edge separating this cell from its neighbor in the given direction
    pub fn edge(&self, direction: Direction) -> Edge {
        let Point { x, y } = *self;
        match direction {
            Direction::Up => Edge::between(x, y, x + 1, y),
            Direction::Right => Edge::between(x + 1, y, x + 1, y + 1),
            Direction::Down => Edge::between(x, y + 1, x + 1, y + 1),
            Direction::Left => Edge::between(x, y, x, y + 1),
        }
    }

    /// The neighboring cell in the given direction, if it lies inside a `width` x `height` grid
    pub fn neighbor(&self, direction: Direction, width: usize, height: usize) -> Option<Point> {
        let Point { x, y } = *self;
        match direction {
            Direction::Up if y > 0 => Some(Point::new(x, y - 1)),
            Direction::Right if x + 1 < width => Some(Point::new(x + 1, y)),
            Direction::Down if y + 1 < height => Some(Point::new(x, y + 1)),
            Direction::Left if x > 0 => Some(Point::new(x - 1, y)),
            _ => None,
        }
    }

    /// The direction to move in to get from this cell to an adjacent one
    pub fn direction_to(&self, other: &Point) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| self.neighbor(d, usize::MAX, usize::MAX) == Some(*other))
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// The order in which the solver looks at neighbors
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            }
        )
    }
}

/// An unordered pair of axis-adjacent lattice points, i.e. a place where a wall may stand.
/// The endpoints are stored sorted so `a-b` and `b-a` are the same key.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    a: Point,
    b: Point,
}

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        debug_assert!(a.is_adjacent(&b), "edge {a}-{b} is not a unit segment");
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn try_new(a: Point, b: Point) -> Option<Self> {
        a.is_adjacent(&b).then(|| Self::new(a, b))
    }

    pub fn between(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn endpoints(&self) -> (Point, Point) {
        (self.a, self.b)
    }

    pub fn is_horizontal(&self) -> bool {
        self.a.y == self.b.y
    }

    /// The edge shared by two adjacent cells
    pub fn shared(cell: Point, other: Point) -> Option<Self> {
        cell.direction_to(&other).map(|d| cell.edge(d))
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// The set of blocked edges of one maze
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSet(HashSet<Edge>);

impl WallSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every edge of a `width` x `height` grid, outer boundary included
    pub fn all(width: usize, height: usize) -> Self {
        let mut walls = Self::new();
        for y in 0..=height {
            for x in 0..=width {
                if x < width {
                    walls.insert(Edge::between(x, y, x + 1, y));
                }
                if y < height {
                    walls.insert(Edge::between(x, y, x, y + 1));
                }
            }
        }
        walls
    }

    pub fn insert(&mut self, edge: Edge) -> bool {
        self.0.insert(edge)
    }

    pub fn remove(&mut self, edge: &Edge) -> bool {
        self.0.remove(edge)
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.0.contains(edge)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.0.iter()
    }
}

impl FromIterator<Edge> for WallSet {
    fn from_iter<T: IntoIterator<Item = Edge>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read-only view of a walled grid, as consumed by the solver
pub trait WallModel {
    /// Number of cell columns
    fn width(&self) -> usize;

    /// Number of cell rows
    fn height(&self) -> usize;

    /// Check if a wall blocks the given edge
    fn has_wall(&self, edge: Edge) -> bool;
}

/// A WallModel implementation owning the walls of a rectangular grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    width: usize,
    height: usize,
    walls: WallSet,
}

impl Maze {
    pub fn new(width: usize, height: usize, walls: WallSet) -> Result<Self, anyhow::Error> {
        if width == 0 || height == 0 {
            bail!("maze dimensions must be positive, got {width}x{height}");
        }
        let bounded = |p: Point| p.x <= width && p.y <= height;
        if let Some(edge) = walls.iter().find(|e| {
            let (a, b) = e.endpoints();
            !a.is_adjacent(&b) || !bounded(a) || !bounded(b)
        }) {
            bail!("wall {edge} lies outside of a {width}x{height} maze");
        }
        Ok(Self::with_walls(width, height, walls))
    }

    /// A maze without any walls at all
    pub fn open(width: usize, height: usize) -> Result<Self, anyhow::Error> {
        Self::new(width, height, WallSet::new())
    }

    pub(crate) fn with_walls(width: usize, height: usize, walls: WallSet) -> Self {
        Self {
            width,
            height,
            walls,
        }
    }

    pub fn walls(&self) -> &WallSet {
        &self.walls
    }

    /// Check for a wall between the points `(x1, y1)` and `(x2, y2)`
    pub fn has_wall_between(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> bool {
        self.has_wall(Edge::between(x1, y1, x2, y2))
    }

    pub fn is_cell(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }
}

impl WallModel for Maze {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn has_wall(&self, edge: Edge) -> bool {
        self.walls.contains(&edge)
    }
}

impl Display for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&util::draw(self, |_| "  ".to_string()))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_edge_is_unordered() {
        let forward = Edge::between(1, 2, 2, 2);
        let backward = Edge::between(2, 2, 1, 2);
        assert_eq!(forward, backward);

        let mut walls = WallSet::new();
        walls.insert(forward);
        assert!(!walls.insert(backward));
        assert_eq!(walls.len(), 1);
    }

    #[test]
    fn test_try_new_rejects_non_adjacent() {
        let origin = Point::new(0, 0);
        assert!(Edge::try_new(origin, Point::new(1, 1)).is_none());
        assert!(Edge::try_new(origin, Point::new(2, 0)).is_none());
        assert!(Edge::try_new(origin, origin).is_none());
        assert!(Edge::try_new(origin, Point::new(0, 1)).is_some());
    }

    #[test]
    fn test_cell_sides() {
        let cell = Point::new(2, 3);
        assert_eq!(cell.edge(Direction::Up), Edge::between(2, 3, 3, 3));
        assert_eq!(cell.edge(Direction::Right), Edge::between(3, 3, 3, 4));
        assert_eq!(cell.edge(Direction::Down), Edge::between(2, 4, 3, 4));
        assert_eq!(cell.edge(Direction::Left), Edge::between(2, 3, 2, 4));
        assert!(cell.edge(Direction::Up).is_horizontal());
        assert!(!cell.edge(Direction::Left).is_horizontal());
    }

    #[test]
    fn test_shared_edge_is_symmetric() {
        let a = Point::new(1, 1);
        let b = Point::new(2, 1);
        assert_eq!(Edge::shared(a, b), Some(a.edge(Direction::Right)));
        assert_eq!(Edge::shared(b, a), Some(b.edge(Direction::Left)));
        assert_eq!(Edge::shared(a, b), Edge::shared(b, a));
        assert_eq!(Edge::shared(a, Point::new(2, 2)), None);
    }

    #[test]
    fn test_neighbors_stay_in_bounds() {
        let corner = Point::new(0, 0);
        assert_eq!(corner.neighbor(Direction::Up, 4, 4), None);
        assert_eq!(corner.neighbor(Direction::Left, 4, 4), None);
        assert_eq!(
            corner.neighbor(Direction::Right, 4, 4),
            Some(Point::new(1, 0))
        );

        let far = Point::new(3, 3);
        assert_eq!(far.neighbor(Direction::Right, 4, 4), None);
        assert_eq!(far.neighbor(Direction::Down, 4, 4), None);
    }

    #[test]
    fn test_has_wall() {
        let walls: WallSet = [Edge::between(0, 0, 1, 0)].into_iter().collect();
        let maze = Maze::new(2, 2, walls).unwrap();

        assert!(maze.has_wall_between(0, 0, 1, 0));
        assert!(maze.has_wall_between(1, 0, 0, 0));
        assert!(!maze.has_wall_between(1, 0, 2, 0));
    }

    #[test]
    fn test_all_walls_count() {
        // 4 rows of 3 horizontal segments and 3 rows of 4 vertical ones
        assert_eq!(WallSet::all(3, 3).len(), 24);
    }

    #[test]
    fn test_new_validates() {
        assert!(Maze::open(0, 4).is_err());
        assert!(Maze::open(4, 0).is_err());

        let outside: WallSet = [Edge::between(4, 5, 5, 5)].into_iter().collect();
        assert!(Maze::new(4, 4, outside).is_err());

        let boundary: WallSet = [Edge::between(3, 4, 4, 4)].into_iter().collect();
        assert!(Maze::new(4, 4, boundary).is_ok());
    }

    #[test]
    fn test_display() {
        let maze = Maze::new(2, 1, WallSet::all(2, 1)).unwrap();
        assert_eq!(format!("{}", maze), "+--+--+\n|  |  |\n+--+--+\n");

        let open = Maze::open(2, 1).unwrap();
        assert_eq!(format!("{}", open), "+  +  +\n       \n+  +  +\n");
    }
}
