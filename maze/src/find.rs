use std::collections::VecDeque;

use log::{info, trace};

use crate::grid::{Direction, Edge, Point, WallModel};

/// Index of a node in the search arena
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchNode {
    pub point: Point,
    /// Number of cells on the way from the entrance row, this one included
    pub step: usize,
    /// `None` for the nodes seeded from the entrance row
    pub parent: Option<NodeId>,
    /// The edge crossed to get into this cell
    pub parent_edge: Edge,
}

/// A per cell storage backed by a single vec
#[derive(Clone, Debug)]
pub struct CellStorage<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Default + Copy> CellStorage<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Default::default(); width * height],
        }
    }

    pub fn is_valid(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn get(&self, point: Point) -> T {
        self.cells[point.y * self.width + point.x]
    }

    pub fn get_mut(&mut self, point: Point) -> &mut T {
        &mut self.cells[point.y * self.width + point.x]
    }
}

/// The node that first reached each cell
pub type VisitedMap = CellStorage<Option<NodeId>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub point: Point,
    pub step: usize,
}

/// Everything discovered up to the start of a BFS layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub wave_step: usize,
    /// In discovery order
    pub visited: Vec<Visit>,
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult {
    /// From the goal cell back to the entrance cell
    pub path: Vec<Point>,
    pub entrance: Edge,
    pub exit: Edge,
    /// Step of the goal node, equal to the number of cells on the path
    pub steps: usize,
}

impl PathResult {
    pub fn goal(&self) -> Point {
        self.path[0]
    }

    pub fn origin(&self) -> Point {
        self.path[self.path.len() - 1]
    }

    /// Consecutive pairs of cells, walking back from the goal
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.path.windows(2).map(|w| (w[0], w[1]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState {
    Computing,
    NoPathFound,
    PathFound(PathResult),
}

impl PathFinderState {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// What a single call to `advance` did
enum Advance {
    /// The front of the queue starts a new layer
    Wave(usize),
    Expanded,
    Done,
}

/// Resumable breadth-first search from the open cells of the top row to any open cell of the
/// bottom row. The search can be driven one node at a time with [`PathFinder::step`], one layer
/// at a time with [`PathFinder::next_wave`], or to completion with [`PathFinder::finish`].
#[derive(Debug)]
pub struct PathFinder<M: WallModel> {
    nodes: Vec<SearchNode>,
    visited: VisitedMap,
    frontier: VecDeque<NodeId>,
    last_wave: usize,
    state: PathFinderState,
    _map: std::marker::PhantomData<M>,
}

impl<M: WallModel> PathFinder<M> {
    pub fn new(map: &M) -> Self {
        let mut finder = Self {
            nodes: Vec::new(),
            visited: VisitedMap::new(map.width(), map.height()),
            frontier: VecDeque::new(),
            last_wave: 0,
            state: PathFinderState::Computing,
            _map: std::marker::PhantomData,
        };

        // pretend there is a row of entrances right above the first row
        for x in 0..map.width() {
            let point = Point::new(x, 0);
            let entrance = point.edge(Direction::Up);
            if !map.has_wall(entrance) {
                finder.discover(point, 1, None, entrance);
            }
        }

        finder
    }

    /// Run the search to the end
    pub fn finish(mut self, map: &M) -> (PathFinderState, VisitedMap) {
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => return (s, self.visited),
            }
        }
    }

    /// Expand a single node
    pub fn step(&mut self, map: &M) -> PathFinderState {
        loop {
            match self.advance(map) {
                Advance::Wave(_) => {}
                Advance::Expanded | Advance::Done => return self.state.clone(),
            }
        }
    }

    /// Expand nodes until the next layer begins and return what has been discovered so far.
    /// Returns `None` once the search has found a path or run out of nodes, see [`Self::state`].
    pub fn next_wave(&mut self, map: &M) -> Option<Snapshot> {
        loop {
            match self.advance(map) {
                Advance::Wave(step) => {
                    trace!("wave {step} with {} visited cells", self.nodes.len());
                    return Some(self.snapshot(step));
                }
                Advance::Expanded => {}
                Advance::Done => return None,
            }
        }
    }

    /// Iterate over the remaining layers
    pub fn waves<'a>(&'a mut self, map: &'a M) -> Waves<'a, M> {
        Waves { finder: self, map }
    }

    fn advance(&mut self, map: &M) -> Advance {
        if self.state.is_done() {
            return Advance::Done;
        }

        let Some(&id) = self.frontier.front() else {
            info!("no path after visiting {} cells", self.nodes.len());
            self.state = PathFinderState::NoPathFound;
            return Advance::Done;
        };

        let node = self.nodes[id.0];
        if node.step > self.last_wave {
            self.last_wave = node.step;
            return Advance::Wave(node.step);
        }
        self.frontier.pop_front();

        // reached the last row and the bottom is open
        if node.point.y == map.height() - 1 {
            let exit = node.point.edge(Direction::Down);
            if !map.has_wall(exit) {
                let result = self.backtrack(id, exit);
                info!(
                    "found path of {} steps from {} to {}",
                    result.steps,
                    result.origin(),
                    result.goal()
                );
                self.state = PathFinderState::PathFound(result);
                return Advance::Done;
            }
        }

        for direction in Direction::ALL {
            let edge = node.point.edge(direction);
            if map.has_wall(edge) || edge == node.parent_edge {
                continue;
            }
            if let Some(point) = node.point.neighbor(direction, map.width(), map.height()) {
                self.discover(point, node.step + 1, Some(id), edge);
            }
        }

        Advance::Expanded
    }

    /// Add a node for the cell unless some other node got there first
    fn discover(&mut self, point: Point, step: usize, parent: Option<NodeId>, edge: Edge) {
        debug_assert!(self.visited.is_valid(point), "{point} is outside of the grid");
        if self.visited.get(point).is_some() {
            return;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode {
            point,
            step,
            parent,
            parent_edge: edge,
        });
        *self.visited.get_mut(point) = Some(id);
        self.frontier.push_back(id);
    }

    fn backtrack(&self, goal: NodeId, exit: Edge) -> PathResult {
        let mut path = Vec::with_capacity(self.nodes[goal.0].step);
        let mut current = self.nodes[goal.0];
        path.push(current.point);
        while let Some(parent) = current.parent {
            current = self.nodes[parent.0];
            path.push(current.point);
        }
        debug_assert_eq!(path.len(), self.nodes[goal.0].step);

        PathResult {
            path,
            entrance: current.parent_edge,
            exit,
            steps: self.nodes[goal.0].step,
        }
    }

    /// All cells discovered so far, tagged with the given layer
    pub fn snapshot(&self, wave_step: usize) -> Snapshot {
        Snapshot {
            wave_step,
            visited: self
                .nodes
                .iter()
                .map(|n| Visit {
                    point: n.point,
                    step: n.step,
                })
                .collect(),
        }
    }

    pub fn state(&self) -> &PathFinderState {
        &self.state
    }

    pub fn get_visited(&self) -> &VisitedMap {
        &self.visited
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    /// The arena, in discovery order
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
}

/// Lazy sequence of snapshots, one per BFS layer
pub struct Waves<'a, M: WallModel> {
    finder: &'a mut PathFinder<M>,
    map: &'a M,
}

impl<'a, M: WallModel> Iterator for Waves<'a, M> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Self::Item> {
        self.finder.next_wave(self.map)
    }
}
