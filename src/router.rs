use std::collections::HashMap;
use std::fmt::Write as _;

use thiserror::Error;

use crate::geometry::Point;
use crate::model::{ConnectionStyle, Diagram, DiagramObject, SourceConnection};

/// Default radius of the rounded interior corners of a routed connection.
/// `route_connections_with` takes the effective radius from config.
pub const CORNER_RADIUS: f32 = 12.0;

#[derive(Debug, Error)]
pub enum RouteError {
    /// A full pass over the pending connections made no progress: some
    /// connection anchors form a cycle and can never resolve.
    #[error("cyclic connection anchor dependency: {0} connection(s) unresolved")]
    CyclicConnectionAnchors(usize),
}

/// A fully routed connection, ready to draw.
#[derive(Debug, Clone)]
pub struct RoutedConnection {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relationship_id: Option<String>,
    pub label: Option<String>,
    pub style: ConnectionStyle,
    pub coords: Vec<Point>,
    pub path_d: String,
    pub midpoint: Point,
}

/// Snap `start`/`end` toward each other, one axis at a time.
///
/// When the two extents are disjoint on an axis the points move to the
/// facing edges (radius subtracted/added). When they overlap, both
/// collapse to the midpoint of the overlapping range, which keeps aligned
/// shapes connected by a straight orthogonal segment instead of a shallow
/// diagonal. Radii are the anchor half-extents; bend points route through
/// here with a zero radius.
pub fn resolve_endpoint(
    start: Point,
    start_radius: Point,
    end: Point,
    end_radius: Point,
) -> (Point, Point) {
    let mut start = start;
    let mut end = end;

    if start.y - start_radius.y > end.y + end_radius.y {
        start.y -= start_radius.y;
        end.y += end_radius.y;
    } else if start.y + start_radius.y < end.y - end_radius.y {
        start.y += start_radius.y;
        end.y -= end_radius.y;
    } else {
        let min = (start.y - start_radius.y).max(end.y - end_radius.y);
        let max = (start.y + start_radius.y).min(end.y + end_radius.y);
        let mid = (min + max) / 2.0;
        start.y = mid;
        end.y = mid;
    }

    if start.x - start_radius.x > end.x + end_radius.x {
        start.x -= start_radius.x;
        end.x += end_radius.x;
    } else if start.x + start_radius.x < end.x - end_radius.x {
        start.x += start_radius.x;
        end.x -= end_radius.x;
    } else {
        let min = (start.x - start_radius.x).max(end.x - end_radius.x);
        let max = (start.x + start_radius.x).min(end.x + end_radius.x);
        let mid = (min + max) / 2.0;
        start.x = mid;
        end.x = mid;
    }

    (start, end)
}

/// Walk from the start anchor through each bend point to the end anchor
/// and return the ordered polyline. Bend points are offsets from the start
/// anchor's centre; anchor radii apply only at the true endpoints.
pub fn connection_coords(
    start: Point,
    start_radius: Point,
    end: Point,
    end_radius: Point,
    bend_points: &[Point],
) -> Vec<Point> {
    let bends: Vec<Point> = bend_points.iter().map(|bp| start.add(*bp)).collect();

    let mut coords = Vec::with_capacity(bends.len() + 2);
    let mut current = start;
    let mut current_radius = start_radius;
    for bend in bends {
        let (resolved, moved_bend) = resolve_endpoint(current, current_radius, bend, Point::ZERO);
        coords.push(resolved);
        current = moved_bend;
        current_radius = Point::ZERO;
    }
    let (resolved_start, resolved_end) =
        resolve_endpoint(current, current_radius, end, end_radius);
    coords.push(resolved_start);
    if resolved_start.x != resolved_end.x || resolved_start.y != resolved_end.y {
        coords.push(resolved_end);
    }
    coords
}

/// Render a polyline as an SVG path with rounded interior corners.
///
/// A corner is only rounded when both adjacent segments are at least
/// `2 * corner_radius` long; shorter segments get a sharp corner so the
/// curve cannot overshoot the segment.
pub fn coords_to_path_d(coords: &[Point], corner_radius: f32) -> String {
    let mut d = String::new();
    if coords.is_empty() {
        return d;
    }
    let _ = write!(d, "M {:.2} {:.2} ", coords[0].x, coords[0].y);
    for i in 1..coords.len().saturating_sub(1) {
        let prev = coords[i - 1];
        let curr = coords[i];
        let next = coords[i + 1];

        let incoming = prev.distance_to(curr);
        let outgoing = curr.distance_to(next);
        if incoming < corner_radius * 2.0 || outgoing < corner_radius * 2.0 {
            let _ = write!(d, "L {:.2} {:.2} ", curr.x, curr.y);
            continue;
        }
        let before = prev.add(curr.sub(prev).scale((incoming - corner_radius) / incoming));
        let after = curr.add(next.sub(curr).scale(corner_radius / outgoing));
        let _ = write!(
            d,
            "L {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2} ",
            before.x, before.y, curr.x, curr.y, after.x, after.y
        );
    }
    if coords.len() > 1 {
        let last = coords[coords.len() - 1];
        let _ = write!(d, "L {:.2} {:.2} ", last.x, last.y);
    }
    d.trim_end().to_string()
}

/// Midpoint published for connections that anchor on this connection:
/// the literal middle coordinate for odd-length polylines, the mean of
/// the two central coordinates otherwise.
pub fn polyline_midpoint(coords: &[Point]) -> Option<Point> {
    if coords.is_empty() {
        return None;
    }
    if coords.len() % 2 == 1 {
        Some(coords[(coords.len() - 1) / 2])
    } else {
        let a = coords[coords.len() / 2 - 1];
        let b = coords[coords.len() / 2];
        Some(a.add(b).scale(0.5))
    }
}

enum Anchor {
    /// Position plus half-extent radius (zero for point anchors).
    Resolved(Point, Point),
    /// Anchor is a connection whose midpoint is not yet known.
    Deferred,
    /// Anchor names nothing in this diagram.
    Missing,
}

fn anchor_of(diagram: &Diagram, id: &str, midpoints: &HashMap<String, Point>) -> Anchor {
    match diagram.object_by_id(id) {
        Some(DiagramObject::Child(child)) => {
            let Some(bounds) = diagram.absolute_bounds(&child.id) else {
                return Anchor::Missing;
            };
            Anchor::Resolved(bounds.center(), bounds.half_size())
        }
        Some(DiagramObject::Connection(_)) => match midpoints.get(id) {
            Some(midpoint) => Anchor::Resolved(*midpoint, Point::ZERO),
            None => Anchor::Deferred,
        },
        None => Anchor::Missing,
    }
}

/// Route every connection of `diagram`.
///
/// Connections with element anchors resolve in the first pass; connections
/// anchored to other connections' midpoints are requeued until their
/// dependency has published a midpoint. Connections with a missing anchor
/// are skipped for this pass. A pass that shrinks nothing means the anchor
/// graph is cyclic, which is fatal for this render.
pub fn route_connections(diagram: &Diagram) -> Result<Vec<RoutedConnection>, RouteError> {
    route_connections_with(diagram, CORNER_RADIUS)
}

/// [`route_connections`] with an explicit corner radius, usually the one
/// from `RenderConfig`.
pub fn route_connections_with(
    diagram: &Diagram,
    corner_radius: f32,
) -> Result<Vec<RoutedConnection>, RouteError> {
    let mut pending: Vec<&SourceConnection> = diagram
        .descendants()
        .into_iter()
        .flat_map(|child| child.source_connections.iter())
        .collect();
    let mut midpoints: HashMap<String, Point> = HashMap::new();
    let mut routed = Vec::new();

    while !pending.is_empty() {
        let mut deferred = Vec::new();
        for connection in &pending {
            let start = anchor_of(diagram, &connection.source, &midpoints);
            let end = anchor_of(diagram, &connection.target, &midpoints);
            match (start, end) {
                (Anchor::Missing, _) | (_, Anchor::Missing) => {
                    // Target no longer exists: drop it from this pass.
                }
                (Anchor::Deferred, _) | (_, Anchor::Deferred) => deferred.push(*connection),
                (Anchor::Resolved(start, start_radius), Anchor::Resolved(end, end_radius)) => {
                    let coords = connection_coords(
                        start,
                        start_radius,
                        end,
                        end_radius,
                        &connection.bend_points,
                    );
                    if let Some(midpoint) = polyline_midpoint(&coords) {
                        midpoints.insert(connection.id.clone(), midpoint);
                    }
                    if coords.len() > 1 {
                        routed.push(RoutedConnection {
                            id: connection.id.clone(),
                            source: connection.source.clone(),
                            target: connection.target.clone(),
                            relationship_id: connection.relationship_id.clone(),
                            label: connection.label.clone(),
                            style: connection.style.clone(),
                            path_d: coords_to_path_d(&coords, corner_radius),
                            midpoint: polyline_midpoint(&coords).unwrap_or(start),
                            coords,
                        });
                    }
                }
            }
        }
        if deferred.len() == pending.len() {
            return Err(RouteError::CyclicConnectionAnchors(deferred.len()));
        }
        pending = deferred;
    }

    Ok(routed)
}
