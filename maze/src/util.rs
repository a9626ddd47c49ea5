use crate::{
    find::{PathResult, Snapshot},
    grid::{Direction, Point, WallModel},
};

/// Draw the walls of a maze as ASCII art, filling each cell with the two characters returned by
/// `cell`
pub fn draw<M: WallModel>(maze: &M, mut cell: impl FnMut(Point) -> String) -> String {
    let (width, height) = (maze.width(), maze.height());
    let mut out = String::with_capacity((2 * height + 1) * (3 * width + 2));

    for y in 0..=height {
        for x in 0..=width {
            out.push('+');
            if x < width {
                let top = Point::new(x, y).edge(Direction::Up);
                out.push_str(if maze.has_wall(top) { "--" } else { "  " });
            }
        }
        out.push('\n');

        if y == height {
            break;
        }

        for x in 0..=width {
            let left = Point::new(x, y).edge(Direction::Left);
            out.push(if maze.has_wall(left) { '|' } else { ' ' });
            if x < width {
                out.push_str(&cell(Point::new(x, y)));
            }
        }
        out.push('\n');
    }

    out
}

/// Draw a maze with the cells of a snapshot labeled by their step and the cells of a path marked
pub fn render<M: WallModel>(
    maze: &M,
    snapshot: Option<&Snapshot>,
    path: Option<&PathResult>,
) -> String {
    let mut steps = vec![None; maze.width() * maze.height()];
    if let Some(snapshot) = snapshot {
        for visit in &snapshot.visited {
            steps[visit.point.y * maze.width() + visit.point.x] = Some(visit.step);
        }
    }
    let on_path = |p: Point| path.is_some_and(|r| r.path.contains(&p));

    draw(maze, |p| {
        if on_path(p) {
            "##".to_string()
        } else {
            match steps[p.y * maze.width() + p.x] {
                Some(step) => format!("{:02}", step % 100),
                None => "  ".to_string(),
            }
        }
    })
}
