//! Point sequence → continuous curve.
//!
//! Each consecutive pair of points contributes a quadratic segment whose
//! control point is the older sample and whose end is the pair's midpoint.
//! Chaining through midpoints keeps the tangent continuous at every joint
//! without estimating per-point tangents.  A final line segment reaches the
//! newest point.

use kurbo::{BezPath, PathEl, Point};

use super::trail::TrailPoint;

/// Renderable trail path.  Empty when there is nothing to draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailCurve {
    path: BezPath,
}

impl TrailCurve {
    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    pub fn elements(&self) -> &[PathEl] {
        self.path.elements()
    }

    /// First point of the curve.
    pub fn start(&self) -> Option<Point> {
        match self.path.elements().first() {
            Some(PathEl::MoveTo(p)) => Some(*p),
            _ => None,
        }
    }

    /// Last point the curve reaches.
    pub fn end(&self) -> Option<Point> {
        self.path.elements().last().and_then(|el| el.end_point())
    }

    /// SVG path description (`M… Q… L…`), empty for an empty curve.
    pub fn to_svg(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            self.path.to_svg()
        }
    }

    /// Approximate the curve with straight segments no farther than
    /// `tolerance` from the true curve.
    pub fn flatten(&self, tolerance: f64) -> Vec<(Point, Point)> {
        let mut segments = Vec::new();
        let mut cursor: Option<Point> = None;
        kurbo::flatten(self.path.elements().iter().copied(), tolerance, |el| {
            match el {
                PathEl::MoveTo(p) => cursor = Some(p),
                PathEl::LineTo(p) => {
                    if let Some(from) = cursor {
                        segments.push((from, p));
                    }
                    cursor = Some(p);
                }
                _ => {}
            }
        });
        segments
    }
}

/// Build the curve for `points`.  Pure and deterministic.
pub fn smooth(points: &[TrailPoint]) -> TrailCurve {
    if points.len() < 2 {
        return TrailCurve::default();
    }

    let mut path = BezPath::new();
    path.move_to(points[0].point());
    for pair in points.windows(2) {
        let prev = pair[0].point();
        let curr = pair[1].point();
        path.quad_to(prev, prev.midpoint(curr));
    }
    if let Some(last) = points.last() {
        path.line_to(last.point());
    }
    TrailCurve { path }
}

/// One layer of the trail stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStyle {
    pub width: f64,
    pub opacity: f64,
    pub blurred: bool,
}

/// Layers drawn back to front: diffuse glow, main trail, core line.
pub const BANDS: [BandStyle; 3] = [
    BandStyle {
        width: 20.0,
        opacity: 0.04,
        blurred: true,
    },
    BandStyle {
        width: 8.0,
        opacity: 0.08,
        blurred: true,
    },
    BandStyle {
        width: 2.0,
        opacity: 0.15,
        blurred: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<TrailPoint> {
        coords
            .iter()
            .map(|&(x, y)| TrailPoint::fresh(Point::new(x, y)))
            .collect()
    }

    #[test]
    fn fewer_than_two_points_is_empty() {
        assert!(smooth(&[]).is_empty());
        assert!(smooth(&pts(&[(4.0, 4.0)])).is_empty());
        assert_eq!(smooth(&[]).to_svg(), "");
        assert!(smooth(&[]).flatten(0.25).is_empty());
    }

    #[test]
    fn two_points_start_and_end_on_the_samples() {
        let curve = smooth(&pts(&[(0.0, 0.0), (10.0, 4.0)]));
        assert_eq!(curve.start(), Some(Point::new(0.0, 0.0)));
        assert_eq!(curve.end(), Some(Point::new(10.0, 4.0)));
        assert_eq!(
            curve.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::QuadTo(Point::new(0.0, 0.0), Point::new(5.0, 2.0)),
                PathEl::LineTo(Point::new(10.0, 4.0)),
            ]
        );
    }

    #[test]
    fn one_quad_per_pair_through_midpoints() {
        let curve = smooth(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
        let quads: Vec<(Point, Point)> = curve
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::QuadTo(c, e) => Some((*c, *e)),
                _ => None,
            })
            .collect();
        assert_eq!(
            quads,
            vec![
                (Point::new(0.0, 0.0), Point::new(5.0, 0.0)),
                (Point::new(10.0, 0.0), Point::new(10.0, 5.0)),
                (Point::new(10.0, 10.0), Point::new(5.0, 10.0)),
            ]
        );
        assert_eq!(curve.end(), Some(Point::new(0.0, 10.0)));
    }

    #[test]
    fn smoothing_is_deterministic() {
        let p = pts(&[(1.0, 2.0), (3.0, 5.0), (8.0, 1.0)]);
        assert_eq!(smooth(&p), smooth(&p));
        assert_eq!(smooth(&p).to_svg(), smooth(&p).to_svg());
    }

    #[test]
    fn svg_uses_move_quad_line() {
        let svg = smooth(&pts(&[(0.0, 0.0), (10.0, 4.0)])).to_svg();
        assert!(svg.starts_with('M'));
        assert!(svg.contains('Q'));
        assert!(svg.contains('L'));
    }

    #[test]
    fn flattened_segments_are_connected() {
        let curve = smooth(&pts(&[(0.0, 0.0), (20.0, 0.0), (20.0, 20.0)]));
        let segs = curve.flatten(0.1);
        assert!(!segs.is_empty());
        for w in segs.windows(2) {
            assert_eq!(w[0].1, w[1].0);
        }
        assert_eq!(segs.first().map(|s| s.0), Some(Point::new(0.0, 0.0)));
        assert_eq!(segs.last().map(|s| s.1), Some(Point::new(20.0, 20.0)));
    }

    #[test]
    fn bands_go_from_diffuse_to_core() {
        assert!(BANDS.windows(2).all(|w| w[0].width > w[1].width));
        assert!(BANDS.windows(2).all(|w| w[0].opacity < w[1].opacity));
    }
}
