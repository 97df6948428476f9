//! Geometry for crop computation.
//!
//! All functions here are pure and testable without any pixel data.
//!
//! Coordinates are signed: a [`Rect`] may sit anywhere on the integer plane,
//! because a cropped image keeps the coordinates it had inside its parent.
//!
//! ## Types
//!
//! - [`Point`] / [`Rect`]: half-open integer rectangle (`min` inclusive, `max` exclusive).
//! - [`Size`]: crop target. Negative input is clamped to zero on construction.
//! - [`Vertical`] / [`Horizontal`] / [`Alignment`]: where a smaller crop sits
//!   inside the current bounds. Unknown tokens fall back to `center`.

use std::fmt;

/// A pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open rectangle: contains `(x, y)` with `min.x <= x < max.x` and
/// `min.y <= y < max.y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Build a rectangle from its corners, swapping them if given out of order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// Number of pixels covered, zero for empty rectangles.
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x < self.max.x && self.min.y <= p.y && p.y < self.max.y
    }

    /// Whether `self` lies entirely inside `outer`. An empty rectangle is
    /// inside everything.
    pub fn is_within(&self, outer: &Rect) -> bool {
        if self.is_empty() {
            return true;
        }
        outer.min.x <= self.min.x
            && self.max.x <= outer.max.x
            && outer.min.y <= self.min.y
            && self.max.y <= outer.max.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

/// Target size of a crop.
///
/// Width and height are never negative: [`Size::new`], [`Size::set_width`]
/// and [`Size::set_height`] clamp negative input to 0. A zero extent makes
/// the size empty, which callers treat as "no crop".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        let mut size = Self::default();
        size.set_width(width);
        size.set_height(height);
        size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_width(&mut self, width: i32) {
        self.width = width.max(0) as u32;
    }

    pub fn set_height(&mut self, height: i32) {
        self.height = height.max(0) as u32;
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Anchor on the x axis.
///
/// The name follows the request field it is read from (`vertical`), which
/// selects the left/right edge of the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vertical {
    Left,
    Right,
    #[default]
    Center,
}

impl Vertical {
    /// Strict token parse: `left`, `right` or `center`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    /// Lenient parse: anything that is not a valid token becomes `Center`.
    pub fn parse(token: &str) -> Self {
        Self::from_token(token).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

/// Anchor on the y axis, read from the `horizontal` request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Horizontal {
    Top,
    Bottom,
    #[default]
    Center,
}

impl Horizontal {
    /// Strict token parse: `top`, `bottom` or `center`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    /// Lenient parse: anything that is not a valid token becomes `Center`.
    pub fn parse(token: &str) -> Self {
        Self::from_token(token).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Center => "center",
        }
    }
}

/// Where a crop rectangle is placed inside the current bounds.
/// Defaults to center/center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Alignment {
    /// Build from request tokens. Invalid or empty tokens fall back to center.
    pub fn new(vertical: &str, horizontal: &str) -> Self {
        let mut alignment = Self::default();
        alignment.set_vertical(vertical);
        alignment.set_horizontal(horizontal);
        alignment
    }

    pub fn set_vertical(&mut self, token: &str) {
        self.vertical = Vertical::parse(token);
    }

    pub fn set_horizontal(&mut self, token: &str) {
        self.horizontal = Horizontal::parse(token);
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vertical.as_str(), self.horizontal.as_str())
    }
}

/// Place one axis of the crop. Returns `(min, max)` with `max - min == extent`.
fn place_axis(min: i32, max: i32, extent: i32, anchor: Anchor) -> (i32, i32) {
    match anchor {
        Anchor::Start => (min, min + extent),
        Anchor::End => (max - extent, max),
        Anchor::Center => {
            let indent = (max - min) - extent;
            // The odd unit goes to the min side.
            let offset = indent % 2;
            let half = indent / 2;
            (min + offset + half, max - half)
        }
    }
}

#[derive(Clone, Copy)]
enum Anchor {
    Start,
    End,
    Center,
}

impl From<Vertical> for Anchor {
    fn from(v: Vertical) -> Self {
        match v {
            Vertical::Left => Anchor::Start,
            Vertical::Right => Anchor::End,
            Vertical::Center => Anchor::Center,
        }
    }
}

impl From<Horizontal> for Anchor {
    fn from(h: Horizontal) -> Self {
        match h {
            Horizontal::Top => Anchor::Start,
            Horizontal::Bottom => Anchor::End,
            Horizontal::Center => Anchor::Center,
        }
    }
}

/// Compute the crop rectangle for `size` placed inside `bounds` by `alignment`.
///
/// If `size` is not strictly smaller than `bounds` on both axes, `bounds` is
/// returned unchanged: either both axes are cropped or neither is.
///
/// ```
/// # use image_editor::imaging::{Alignment, Rect, Size, rectangle_for};
/// let bounds = Rect::new(-7, -13, 3, 0);
/// let rect = rectangle_for(bounds, Size::new(5, 2), Alignment::default());
/// assert_eq!(rect, Rect::new(-4, -7, 1, -5));
/// ```
pub fn rectangle_for(bounds: Rect, size: Size, alignment: Alignment) -> Rect {
    if i64::from(size.width()) >= i64::from(bounds.width())
        || i64::from(size.height()) >= i64::from(bounds.height())
    {
        return bounds;
    }

    // Both extents are now strictly below an i32 extent.
    let (x0, x1) = place_axis(
        bounds.min.x,
        bounds.max.x,
        size.width() as i32,
        alignment.vertical.into(),
    );
    let (y0, y1) = place_axis(
        bounds.min.y,
        bounds.max.y,
        size.height() as i32,
        alignment.horizontal.into(),
    );

    Rect {
        min: Point::new(x0, y0),
        max: Point::new(x1, y1),
    }
}
