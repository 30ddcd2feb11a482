//! Freehand ink stroke.

use super::{point_to_polyline_dist, Color, ObjectId, ObjectTrait};
use kurbo::{BezPath, Point, Rect};
use uuid::Uuid;

/// A committed freehand stroke.
///
/// Fields are private: once a stroke has been committed to the scene it is
/// never mutated, only removed.
#[derive(Debug, Clone)]
pub struct Stroke {
    id: ObjectId,
    points: Vec<Point>,
    color: Color,
    width: f64,
}

impl Stroke {
    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, color: Color, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            color,
            width,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline through the points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.points.first() else {
            return path;
        };
        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }
        path
    }
}

impl ObjectTrait for Stroke {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        let b = self.bounds();
        Point::new(b.x0, b.y0)
    }

    /// Bounds of the points, padded by half the stroke width.
    fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        let pad = self.width / 2.0;
        Rect::new(min_x - pad, min_y - pad, max_x + pad, max_y + pad)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_polyline_dist(point, &self.points) <= tolerance + self.width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_include_width() {
        let stroke = Stroke::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
            ],
            Color::BLACK,
            4.0,
        );

        let bounds = stroke.bounds();
        assert!((bounds.x0 + 2.0).abs() < f64::EPSILON);
        assert!((bounds.y0 + 2.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 102.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 102.0).abs() < f64::EPSILON);
        assert_eq!(stroke.position(), Point::new(-2.0, -2.0));
    }

    #[test]
    fn test_hit_test() {
        let stroke = Stroke::from_points(
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            Color::BLACK,
            2.0,
        );

        assert!(stroke.hit_test(Point::new(50.0, 0.0), 5.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 5.0));
    }

    #[test]
    fn test_single_point_dot() {
        let stroke = Stroke::from_points(vec![Point::new(10.0, 10.0)], Color::BLACK, 6.0);
        assert_eq!(stroke.len(), 1);
        assert!(stroke.hit_test(Point::new(12.0, 10.0), 0.0));
        assert_eq!(stroke.to_path().elements().len(), 1);
    }

    #[test]
    fn test_empty_stroke() {
        let stroke = Stroke::from_points(Vec::new(), Color::BLACK, 5.0);
        assert!(stroke.is_empty());
        assert_eq!(stroke.bounds(), Rect::ZERO);
        assert!(!stroke.hit_test(Point::ZERO, 100.0));
    }
}
