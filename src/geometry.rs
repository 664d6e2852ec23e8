use serde::{Deserialize, Serialize};

/// 2D point / vector in diagram units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle, x/y being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-extents, used as the anchor "radius" during connection routing.
    pub fn half_size(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn translated(&self, offset: Point) -> Bounds {
        Bounds::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    pub fn with_origin(&self, origin: Point) -> Bounds {
        Bounds::new(origin.x, origin.y, self.width, self.height)
    }

    /// Containment with a tolerance band so hairline shapes stay clickable.
    pub fn contains(&self, point: Point, tolerance: f32) -> bool {
        let half_w = (self.width / 2.0).max(tolerance);
        let half_h = (self.height / 2.0).max(tolerance);
        let center = self.center();
        (point.x - center.x).abs() <= half_w && (point.y - center.y).abs() <= half_h
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// The eight resize handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    /// Where this handle sits on `bounds`.
    pub fn position(self, bounds: &Bounds) -> Point {
        let (fx, fy) = match self {
            Handle::TopLeft => (0.0, 0.0),
            Handle::Top => (0.5, 0.0),
            Handle::TopRight => (1.0, 0.0),
            Handle::Right => (1.0, 0.5),
            Handle::BottomRight => (1.0, 1.0),
            Handle::Bottom => (0.5, 1.0),
            Handle::BottomLeft => (0.0, 1.0),
            Handle::Left => (0.0, 0.5),
        };
        Point::new(bounds.x + bounds.width * fx, bounds.y + bounds.height * fy)
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Left | Handle::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::Right | Handle::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Top | Handle::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::Bottom | Handle::BottomRight)
    }

    /// Drag this handle by `delta`, keeping the opposite edge fixed and
    /// never shrinking below `min_size` on either axis.
    pub fn resize(self, bounds: &Bounds, delta: Point, min_size: f32) -> Bounds {
        let mut result = *bounds;
        if self.moves_left() {
            let new_x = (bounds.x + delta.x).min(bounds.x + bounds.width - min_size);
            result.width = bounds.x + bounds.width - new_x;
            result.x = new_x;
        } else if self.moves_right() {
            result.width = (bounds.width + delta.x).max(min_size);
        }
        if self.moves_top() {
            let new_y = (bounds.y + delta.y).min(bounds.y + bounds.height - min_size);
            result.height = bounds.y + bounds.height - new_y;
            result.y = new_y;
        } else if self.moves_bottom() {
            result.height = (bounds.height + delta.y).max(min_size);
        }
        result
    }
}
