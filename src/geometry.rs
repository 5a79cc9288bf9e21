//! Two-dimensional points, circles and axis-aligned rectangles, with the
//! distance, containment and intersection predicates the sparse grid needs.
//!
//! All shapes are closed sets: a point on a circle's boundary is inside it,
//! and two rectangles sharing an edge intersect.

use core::ops::Add;
use core::ops::Mul;
use core::ops::Neg;
use core::ops::Sub;

use num_traits::Float;

/// A 2D vector, also used as a point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2<T> {
    /// Horizontal component.
    pub x: T,
    /// Vertical component.
    pub y: T,
}

impl<T> Vector2<T> {
    /// Creates a vector from its components.
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Float> Vector2<T> {
    /// A vector with both components set to `value`.
    pub fn splat(value: T) -> Self {
        Self::new(value, value)
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::splat(T::zero())
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean length.
    pub fn squared_length(self) -> T {
        self.dot(self)
    }

    /// Euclidean length.
    pub fn length(self) -> T {
        self.squared_length().sqrt()
    }

    /// Whether both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl<T: Float> Add for Vector2<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Float> Sub for Vector2<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Float> Mul<T> for Vector2<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl<T: Float> Neg for Vector2<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// A circle given by its center and radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle<T> {
    center: Vector2<T>,
    radius: T,
}

impl<T: Float> Circle<T> {
    /// Creates a circle.
    ///
    /// # Panics
    /// If `center` or `radius` is not finite, or `radius` is negative.
    pub fn new(center: Vector2<T>, radius: T) -> Self {
        assert!(
            center.is_finite() && radius.is_finite(),
            "circle center and radius must be finite"
        );
        assert!(radius >= T::zero(), "circle radius must be non-negative");
        Self { center, radius }
    }

    /// Returns the center of the circle.
    pub fn center(&self) -> Vector2<T> {
        self.center
    }

    /// Returns the radius of the circle.
    pub fn radius(&self) -> T {
        self.radius
    }

    /// Smallest circle enclosing `rect`.
    pub fn bounding(rect: &Rectangle<T>) -> Self {
        let center = rect.center();
        Self::new(center, (rect.max - center).length())
    }
}

/// An axis-aligned rectangle given by its minimum and maximum corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle<T> {
    min: Vector2<T>,
    max: Vector2<T>,
}

impl<T: Float> Rectangle<T> {
    /// Creates a rectangle from its corners.
    ///
    /// # Panics
    /// If either corner is not finite, or `min` exceeds `max` on either axis.
    pub fn new(min: Vector2<T>, max: Vector2<T>) -> Self {
        assert!(
            min.is_finite() && max.is_finite(),
            "rectangle corners must be finite"
        );
        assert!(
            min.x <= max.x && min.y <= max.y,
            "rectangle min corner must not exceed max corner"
        );
        Self { min, max }
    }

    /// Rectangle spanned by two arbitrary opposite corners.
    pub fn from_corners(a: Vector2<T>, b: Vector2<T>) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vector2<T> {
        self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vector2<T> {
        self.max
    }

    /// Returns the center point.
    pub fn center(&self) -> Vector2<T> {
        let half = T::one() / (T::one() + T::one());
        (self.min + self.max) * half
    }

    /// Width and height.
    pub fn size(&self) -> Vector2<T> {
        self.max - self.min
    }
}

/// Shapes with an axis-aligned bounding box.
pub trait Bounded {
    /// Coordinate type.
    type Scalar: Float;

    /// Smallest axis-aligned rectangle enclosing the shape.
    fn bounding_box(&self) -> Rectangle<Self::Scalar>;
}

impl<T: Float> Bounded for Vector2<T> {
    type Scalar = T;

    fn bounding_box(&self) -> Rectangle<T> {
        Rectangle::new(*self, *self)
    }
}

impl<T: Float> Bounded for Circle<T> {
    type Scalar = T;

    fn bounding_box(&self) -> Rectangle<T> {
        let extent = Vector2::splat(self.radius);
        Rectangle::new(self.center - extent, self.center + extent)
    }
}

impl<T: Float> Bounded for Rectangle<T> {
    type Scalar = T;

    fn bounding_box(&self) -> Rectangle<T> {
        *self
    }
}

/// Overlap test between two closed shapes.
pub trait Intersects<Rhs: ?Sized = Self> {
    /// Whether `self` and `other` share at least one point.
    fn intersects(&self, other: &Rhs) -> bool;
}

/// Squared distance between the closest points of two shapes; zero when they
/// overlap.
pub trait SquaredDistance<Rhs: ?Sized = Self> {
    /// Coordinate type of the result.
    type Output;

    /// Squared gap between `self` and `other`.
    fn squared_distance(&self, other: &Rhs) -> Self::Output;
}

/// Full containment test.
pub trait Contains<Rhs: ?Sized> {
    /// Whether every point of `inner` lies within `self`.
    fn contains(&self, inner: &Rhs) -> bool;
}

/// Distance along one axis from the interval `[min, max]` to `value`.
fn axis_gap<T: Float>(min: T, max: T, value: T) -> T {
    (min - value).max(value - max).max(T::zero())
}

/// Distance along one axis between the intervals `[a_min, a_max]` and
/// `[b_min, b_max]`.
fn interval_gap<T: Float>(a_min: T, a_max: T, b_min: T, b_max: T) -> T {
    (a_min - b_max).max(b_min - a_max).max(T::zero())
}

impl<T: Float> SquaredDistance for Vector2<T> {
    type Output = T;

    fn squared_distance(&self, other: &Self) -> T {
        (*self - *other).squared_length()
    }
}

impl<T: Float> SquaredDistance<Rectangle<T>> for Vector2<T> {
    type Output = T;

    fn squared_distance(&self, rect: &Rectangle<T>) -> T {
        let dx = axis_gap(rect.min.x, rect.max.x, self.x);
        let dy = axis_gap(rect.min.y, rect.max.y, self.y);
        dx * dx + dy * dy
    }
}

impl<T: Float> SquaredDistance<Vector2<T>> for Rectangle<T> {
    type Output = T;

    fn squared_distance(&self, point: &Vector2<T>) -> T {
        point.squared_distance(self)
    }
}

impl<T: Float> SquaredDistance<Circle<T>> for Vector2<T> {
    type Output = T;

    fn squared_distance(&self, circle: &Circle<T>) -> T {
        let gap = ((*self - circle.center).length() - circle.radius).max(T::zero());
        gap * gap
    }
}

impl<T: Float> SquaredDistance<Vector2<T>> for Circle<T> {
    type Output = T;

    fn squared_distance(&self, point: &Vector2<T>) -> T {
        point.squared_distance(self)
    }
}

impl<T: Float> SquaredDistance for Circle<T> {
    type Output = T;

    fn squared_distance(&self, other: &Self) -> T {
        let gap = ((self.center - other.center).length() - (self.radius + other.radius))
            .max(T::zero());
        gap * gap
    }
}

impl<T: Float> SquaredDistance<Rectangle<T>> for Circle<T> {
    type Output = T;

    fn squared_distance(&self, rect: &Rectangle<T>) -> T {
        let gap = (self.center.squared_distance(rect).sqrt() - self.radius).max(T::zero());
        gap * gap
    }
}

impl<T: Float> SquaredDistance<Circle<T>> for Rectangle<T> {
    type Output = T;

    fn squared_distance(&self, circle: &Circle<T>) -> T {
        circle.squared_distance(self)
    }
}

impl<T: Float> SquaredDistance for Rectangle<T> {
    type Output = T;

    fn squared_distance(&self, other: &Self) -> T {
        let dx = interval_gap(self.min.x, self.max.x, other.min.x, other.max.x);
        let dy = interval_gap(self.min.y, self.max.y, other.min.y, other.max.y);
        dx * dx + dy * dy
    }
}

impl<T: Float> Intersects for Circle<T> {
    fn intersects(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        self.center.squared_distance(&other.center) <= reach * reach
    }
}

impl<T: Float> Intersects<Rectangle<T>> for Circle<T> {
    fn intersects(&self, rect: &Rectangle<T>) -> bool {
        self.center.squared_distance(rect) <= self.radius * self.radius
    }
}

impl<T: Float> Intersects<Circle<T>> for Rectangle<T> {
    fn intersects(&self, circle: &Circle<T>) -> bool {
        circle.intersects(self)
    }
}

impl<T: Float> Intersects for Rectangle<T> {
    fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

impl<T: Float> Intersects<Circle<T>> for Vector2<T> {
    fn intersects(&self, circle: &Circle<T>) -> bool {
        circle.contains(self)
    }
}

impl<T: Float> Intersects<Rectangle<T>> for Vector2<T> {
    fn intersects(&self, rect: &Rectangle<T>) -> bool {
        rect.contains(self)
    }
}

impl<T: Float> Contains<Vector2<T>> for Circle<T> {
    fn contains(&self, point: &Vector2<T>) -> bool {
        self.center.squared_distance(point) <= self.radius * self.radius
    }
}

impl<T: Float> Contains<Circle<T>> for Circle<T> {
    fn contains(&self, inner: &Circle<T>) -> bool {
        let slack = self.radius - inner.radius;
        inner.radius <= self.radius && self.center.squared_distance(&inner.center) <= slack * slack
    }
}

impl<T: Float> Contains<Rectangle<T>> for Circle<T> {
    fn contains(&self, inner: &Rectangle<T>) -> bool {
        [
            inner.min,
            inner.max,
            Vector2::new(inner.min.x, inner.max.y),
            Vector2::new(inner.max.x, inner.min.y),
        ]
        .iter()
        .all(|corner| self.contains(corner))
    }
}

impl<T: Float> Contains<Vector2<T>> for Rectangle<T> {
    fn contains(&self, point: &Vector2<T>) -> bool {
        self.min.x <= point.x
            && point.x <= self.max.x
            && self.min.y <= point.y
            && point.y <= self.max.y
    }
}

impl<T: Float> Contains<Rectangle<T>> for Rectangle<T> {
    fn contains(&self, inner: &Rectangle<T>) -> bool {
        self.contains(&inner.min) && self.contains(&inner.max)
    }
}

impl<T: Float> Contains<Circle<T>> for Rectangle<T> {
    fn contains(&self, inner: &Circle<T>) -> bool {
        self.contains(&inner.bounding_box())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f64, y: f64, r: f64) -> Circle<f64> {
        Circle::new(Vector2::new(x, y), r)
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rectangle<f64> {
        Rectangle::new(Vector2::new(x0, y0), Vector2::new(x1, y1))
    }

    #[test]
    fn vector_arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);
        assert_eq!(a + b, Vector2::new(4.0, 1.0));
        assert_eq!(a - b, Vector2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vector2::new(2.0, 4.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
        assert_eq!(Vector2::splat(0.5), Vector2::new(0.5, 0.5));
        assert_eq!(Vector2::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn bounding_boxes() {
        assert_eq!(circle(1.0, 2.0, 0.5).bounding_box(), rect(0.5, 1.5, 1.5, 2.5));
        let r = rect(0.0, 0.0, 2.0, 4.0);
        assert_eq!(r.bounding_box(), r);
        assert_eq!(r.center(), Vector2::new(1.0, 2.0));
        assert_eq!(
            Vector2::new(1.0, 1.0).bounding_box(),
            rect(1.0, 1.0, 1.0, 1.0)
        );
        let enclosing = Circle::bounding(&rect(0.0, 0.0, 6.0, 8.0));
        assert_eq!(enclosing.radius(), 5.0);
        assert!(enclosing.contains(&rect(0.0, 0.0, 6.0, 8.0)));
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn negative_radius_panics() {
        circle(0.0, 0.0, -1.0);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn nan_center_panics() {
        circle(f64::NAN, 0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn infinite_radius_panics() {
        circle(0.0, 0.0, f64::INFINITY);
    }

    #[test]
    #[should_panic(expected = "corners must be finite")]
    fn infinite_rectangle_panics() {
        rect(f64::NEG_INFINITY, 0.0, 1.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "corners must be finite")]
    fn nan_point_has_no_bounding_box() {
        Vector2::new(0.0, f64::NAN).bounding_box();
    }

    #[test]
    fn from_corners_orders_components() {
        let r = Rectangle::from_corners(Vector2::new(2.0, -1.0), Vector2::new(-3.0, 4.0));
        assert_eq!(r, rect(-3.0, -1.0, 2.0, 4.0));
        assert_eq!(r.size(), Vector2::new(5.0, 5.0));
    }

    #[test]
    fn circle_intersections() {
        let a = circle(0.0, 0.0, 1.0);
        assert!(a.intersects(&circle(1.5, 0.0, 1.0)));
        assert!(a.intersects(&circle(2.0, 0.0, 1.0)));
        assert!(!a.intersects(&circle(2.5, 0.0, 1.0)));

        assert!(a.intersects(&rect(1.0, -1.0, 2.0, 1.0)));
        assert!(!a.intersects(&rect(0.8, 0.8, 2.0, 2.0)));
        assert!(rect(0.5, 0.5, 2.0, 2.0).intersects(&a));
    }

    #[test]
    fn rectangle_intersections() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&rect(0.5, 0.5, 2.0, 2.0)));
        assert!(a.intersects(&rect(1.0, 0.0, 2.0, 1.0)));
        assert!(!a.intersects(&rect(1.1, 0.0, 2.0, 1.0)));
        assert!(!a.intersects(&rect(0.0, 1.5, 1.0, 2.0)));
    }

    #[test]
    fn point_intersections() {
        let p = Vector2::new(1.0, 0.0);
        assert!(p.intersects(&circle(0.0, 0.0, 1.0)));
        assert!(!p.intersects(&circle(0.0, 0.0, 0.5)));
        assert!(p.intersects(&rect(1.0, -1.0, 2.0, 1.0)));
        assert!(!p.intersects(&rect(1.5, -1.0, 2.0, 1.0)));
    }

    #[test]
    fn squared_distances() {
        let origin = Vector2::new(0.0, 0.0);
        assert_eq!(origin.squared_distance(&Vector2::new(3.0, 4.0)), 25.0);
        assert_eq!(origin.squared_distance(&rect(3.0, 4.0, 5.0, 5.0)), 25.0);
        assert_eq!(origin.squared_distance(&rect(-1.0, -1.0, 1.0, 1.0)), 0.0);
        assert_eq!(origin.squared_distance(&circle(3.0, 4.0, 2.0)), 9.0);
        assert_eq!(circle(0.0, 0.0, 1.0).squared_distance(&circle(5.0, 0.0, 2.0)), 4.0);
        assert_eq!(circle(0.0, 0.0, 1.0).squared_distance(&circle(1.0, 0.0, 2.0)), 0.0);
        assert_eq!(circle(0.0, 0.0, 1.0).squared_distance(&rect(4.0, -1.0, 5.0, 1.0)), 9.0);
        assert_eq!(rect(0.0, 0.0, 1.0, 1.0).squared_distance(&rect(4.0, 5.0, 6.0, 6.0)), 25.0);
        assert_eq!(rect(4.0, 5.0, 6.0, 6.0).squared_distance(&origin), 41.0);
    }

    #[test]
    fn containment() {
        let big = circle(0.0, 0.0, 10.0);
        assert!(big.contains(&circle(1.0, 1.0, 2.0)));
        assert!(!big.contains(&circle(9.0, 0.0, 2.0)));
        assert!(big.contains(&circle(0.0, 0.0, 10.0)));
        assert!(big.contains(&Vector2::new(10.0, 0.0)));
        assert!(!big.contains(&rect(0.0, 0.0, 8.0, 8.0)));

        let r = rect(0.0, 0.0, 4.0, 4.0);
        assert!(r.contains(&rect(1.0, 1.0, 4.0, 2.0)));
        assert!(!r.contains(&rect(1.0, 1.0, 5.0, 2.0)));
        assert!(r.contains(&circle(2.0, 2.0, 2.0)));
        assert!(!r.contains(&circle(2.0, 2.0, 2.5)));
    }
}
