use crate::config::RoutingConfig;
use crate::graph::SkillTreeNode;
use crate::ir::Point;

/// Below this squared length a segment is treated as a point.
const DEGENERATE_SEGMENT_EPS: f32 = 1e-6;
/// Coordinates closer than this are considered equal when compressing a path.
const POINT_EPS: f32 = 1e-4;

/// Circular footprint of a node, used only for collision tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleNode {
    pub slug: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl ObstacleNode {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStrategy {
    Direct,
    HorizontalFirst,
    VerticalFirst,
    WideArc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub points: Vec<Point>,
    pub strategy: RouteStrategy,
    /// Every strategy collided; `points` is the direct route regardless.
    pub blocked: bool,
}

/// Projects every node except the edge's own endpoints into an obstacle.
/// Visibility never enters here, so filtering cannot move a connector.
pub fn build_obstacles(
    nodes: &[SkillTreeNode],
    from_slug: &str,
    to_slug: &str,
    radius: f32,
) -> Vec<ObstacleNode> {
    nodes
        .iter()
        .filter(|node| node.slug() != from_slug && node.slug() != to_slug)
        .map(|node| ObstacleNode {
            slug: node.slug().to_string(),
            x: node.position.x,
            y: node.position.y,
            radius,
        })
        .collect()
}

pub fn route_path(
    from: Point,
    to: Point,
    obstacles: &[ObstacleNode],
    node_radius: f32,
    config: &RoutingConfig,
) -> Vec<Point> {
    route_path_with_strategy(from, to, obstacles, node_radius, config).points
}

/// Routes a connector from the bottom of `from` to the top of `to`, trying the
/// direct L-route first and then each fallback in order. The first polyline
/// clear of every obstacle wins; if none is clear the direct route is returned.
pub fn route_path_with_strategy(
    from: Point,
    to: Point,
    obstacles: &[ObstacleNode],
    node_radius: f32,
    config: &RoutingConfig,
) -> Route {
    let start = Point::new(from.x, from.y + node_radius);
    let end = Point::new(to.x, to.y - node_radius);
    let downward = to.y >= from.y;

    // Obstacles sitting exactly on an endpoint are the endpoints themselves.
    let relevant: Vec<&ObstacleNode> = obstacles
        .iter()
        .filter(|obstacle| obstacle.center() != from && obstacle.center() != to)
        .collect();

    let direct = compress_path(&l_route(
        start,
        end,
        downward,
        config.direct_down_ratio,
        config.direct_up_ratio,
    ));
    if !path_blocked(&direct, &relevant, config.clearance) {
        return Route {
            points: direct,
            strategy: RouteStrategy::Direct,
            blocked: false,
        };
    }

    let fallbacks = [
        (
            RouteStrategy::HorizontalFirst,
            vec![start, Point::new(end.x, start.y), end],
        ),
        (
            RouteStrategy::VerticalFirst,
            vec![start, Point::new(start.x, end.y), end],
        ),
        (
            RouteStrategy::WideArc,
            l_route(start, end, downward, config.wide_down_ratio, config.wide_up_ratio),
        ),
    ];
    for (strategy, points) in fallbacks {
        let points = compress_path(&points);
        if !path_blocked(&points, &relevant, config.clearance) {
            return Route {
                points,
                strategy,
                blocked: false,
            };
        }
    }

    tracing::debug!(
        from_x = from.x,
        from_y = from.y,
        to_x = to.x,
        to_y = to.y,
        obstacles = relevant.len(),
        "every routing strategy blocked, keeping direct route"
    );
    Route {
        points: direct,
        strategy: RouteStrategy::Direct,
        blocked: true,
    }
}

/// Orthogonal three-segment route. Downward routes bend on a horizontal run
/// placed `down_ratio` of the way down; upward routes bend on a vertical run
/// placed `up_ratio` of the way across.
fn l_route(start: Point, end: Point, downward: bool, down_ratio: f32, up_ratio: f32) -> Vec<Point> {
    if downward {
        let mid_y = start.y + (end.y - start.y) * down_ratio;
        vec![
            start,
            Point::new(start.x, mid_y),
            Point::new(end.x, mid_y),
            end,
        ]
    } else {
        let mid_x = start.x + (end.x - start.x) * up_ratio;
        vec![
            start,
            Point::new(mid_x, start.y),
            Point::new(mid_x, end.y),
            end,
        ]
    }
}

fn same_point(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= POINT_EPS && (a.y - b.y).abs() <= POINT_EPS
}

/// Drops repeated and collinear interior points. Start and end always survive.
pub(crate) fn compress_path(points: &[Point]) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let last = points[points.len() - 1];
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    out.push(points[0]);
    for idx in 1..points.len() - 1 {
        let prev = out[out.len() - 1];
        let curr = points[idx];
        if same_point(prev, curr) {
            continue;
        }
        let next = points[idx + 1];
        let vertical = (curr.x - prev.x).abs() <= POINT_EPS && (next.x - curr.x).abs() <= POINT_EPS;
        let horizontal = (curr.y - prev.y).abs() <= POINT_EPS && (next.y - curr.y).abs() <= POINT_EPS;
        if vertical || horizontal {
            continue;
        }
        out.push(curr);
    }
    let tail = out.len() - 1;
    if tail > 0 && same_point(out[tail], last) {
        out[tail] = last;
    } else {
        out.push(last);
    }
    out
}

fn path_blocked(points: &[Point], obstacles: &[&ObstacleNode], clearance: f32) -> bool {
    points.windows(2).any(|segment| {
        obstacles.iter().any(|obstacle| {
            segment_intersects_circle(
                segment[0],
                segment[1],
                obstacle.center(),
                obstacle.radius + clearance,
            )
        })
    })
}

/// Number of (segment, obstacle) pairs that collide, clearance included.
pub fn path_obstacle_intersections(
    points: &[Point],
    obstacles: &[ObstacleNode],
    clearance: f32,
) -> usize {
    let mut count = 0usize;
    for segment in points.windows(2) {
        for obstacle in obstacles {
            if segment_intersects_circle(
                segment[0],
                segment[1],
                obstacle.center(),
                obstacle.radius + clearance,
            ) {
                count += 1;
            }
        }
    }
    count
}

/// Segment/circle test on `a + t (b - a)`: the segment hits the circle when the
/// quadratic in `t` has a real root inside `[0, 1]`. Zero-length segments fall
/// back to a point-in-circle check.
pub fn segment_intersects_circle(a: Point, b: Point, center: Point, radius: f32) -> bool {
    let d = b - a;
    let f = a - center;
    let qa = d.x * d.x + d.y * d.y;
    if qa <= DEGENERATE_SEGMENT_EPS {
        return f.x * f.x + f.y * f.y <= radius * radius;
    }
    let qb = 2.0 * (f.x * d.x + f.y * d.y);
    let qc = f.x * f.x + f.y * f.y - radius * radius;
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return false;
    }
    let root = discriminant.sqrt();
    let t1 = (-qb - root) / (2.0 * qa);
    let t2 = (-qb + root) / (2.0 * qa);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

pub fn path_length(points: &[Point]) -> f32 {
    points
        .windows(2)
        .map(|segment| {
            let d = segment[1] - segment[0];
            (d.x * d.x + d.y * d.y).sqrt()
        })
        .sum()
}
