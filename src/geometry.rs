//! Plane geometry for the stage, in virtual pixels with y growing downward.

/// below this centre-to-centre distance no connector is drawn
pub const MIN_CENTRE_DISTANCE: f64 = 5.0;

/// connectors are never shorter than this
pub const MIN_CONNECTOR_LENGTH: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// a box, positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// a box of the given size whose centre is `centre`
    pub fn centred_on(centre: Point, width: f64, height: f64) -> Rect {
        Rect::new(
            centre.x - width / 2.0,
            centre.y - height / 2.0,
            width,
            height,
        )
    }

    pub fn centre(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// half the larger side: how far a connector is pulled back from the centre
    pub fn clearance(&self) -> f64 {
        self.width.max(self.height) / 2.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// a directed segment, as drawn: where it starts, how long it is, which way
/// it points (degrees, clockwise from +x because y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub length: f64,
    pub angle_deg: f64,
}

impl Segment {
    pub fn end(&self) -> Point {
        let rad = self.angle_deg.to_radians();
        Point::new(
            self.start.x + self.length * rad.cos(),
            self.start.y + self.length * rad.sin(),
        )
    }
}

/// the edge-to-edge segment from box `from` to box `to`, both relative to the
/// same container. `None` when the centres (nearly) coincide.
pub fn segment_between(from: Rect, to: Rect) -> Option<Segment> {
    let mut a = from.centre();
    let mut b = to.centre();

    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let distance = dx.hypot(dy);
    if distance < MIN_CENTRE_DISTANCE {
        return None;
    }

    let nx = dx / distance;
    let ny = dy / distance;

    a.x += nx * from.clearance();
    a.y += ny * from.clearance();
    b.x -= nx * to.clearance();
    b.y -= ny * to.clearance();

    // NB. overlapping boxes make the ends cross, which flips the angle
    let length = a.distance(b).max(MIN_CONNECTOR_LENGTH);
    let angle_deg = (b.y - a.y).atan2(b.x - a.x).to_degrees();

    Some(Segment {
        start: a,
        length,
        angle_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_centre() {
        let r = Rect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(r.centre(), Point::new(60.0, 40.0));
        assert_eq!(r.clearance(), 50.0);
    }

    #[test]
    fn test_centred_on() {
        let r = Rect::centred_on(Point::new(50.0, 50.0), 16.0, 16.0);
        assert_eq!(r, Rect::new(42.0, 42.0, 16.0, 16.0));
    }

    #[test]
    fn test_contains() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.9, 9.9)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_horizontal_segment() {
        let a = Rect::new(0.0, 0.0, 20.0, 20.0);
        let b = Rect::new(200.0, 0.0, 20.0, 20.0);
        let s = segment_between(a, b).unwrap();
        // centres at x=10 and x=210, each pulled in by 10
        assert_eq!(s.start, Point::new(20.0, 10.0));
        assert!(close(s.length, 180.0));
        assert!(close(s.angle_deg, 0.0));
        assert!(close(s.end().x, 200.0));
    }

    #[test]
    fn test_downward_segment_angle() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 100.0, 10.0, 10.0);
        let s = segment_between(a, b).unwrap();
        assert!(close(s.angle_deg, 90.0));
    }

    #[test]
    fn test_leftward_segment_angle() {
        let a = Rect::new(300.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 0.0, 10.0, 10.0);
        let s = segment_between(a, b).unwrap();
        assert!(close(s.angle_deg.abs(), 180.0));
    }

    #[test]
    fn test_coincident_is_none() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(3.0, 3.0, 10.0, 10.0);
        assert_eq!(segment_between(a, b), None);
    }

    #[test]
    fn test_near_boxes_get_minimum_length() {
        // edges 10 apart
        let a = Rect::new(0.0, 0.0, 20.0, 20.0);
        let b = Rect::new(30.0, 0.0, 20.0, 20.0);
        let s = segment_between(a, b).unwrap();
        assert_eq!(s.length, MIN_CONNECTOR_LENGTH);
    }

    proptest! {
        #[test]
        fn prop_segment_is_never_short(
            ax in 0.0f64..1000.0, ay in 0.0f64..600.0,
            bx in 0.0f64..1000.0, by in 0.0f64..600.0,
            w in 1.0f64..200.0, h in 1.0f64..200.0,
        ) {
            let a = Rect::new(ax, ay, w, h);
            let b = Rect::new(bx, by, h, w);
            match segment_between(a, b) {
                None => prop_assert!(a.centre().distance(b.centre()) < MIN_CENTRE_DISTANCE),
                Some(s) => {
                    prop_assert!(s.length >= MIN_CONNECTOR_LENGTH);
                    prop_assert!(s.angle_deg >= -180.0 && s.angle_deg <= 180.0);
                }
            }
        }

        #[test]
        fn prop_far_boxes_meet_edge_to_edge(
            ax in 0.0f64..100.0, ay in 0.0f64..100.0,
            bx in 600.0f64..1000.0, by in 0.0f64..600.0,
            size in 1.0f64..50.0,
        ) {
            let a = Rect::new(ax, ay, size, size);
            let b = Rect::new(bx, by, size, size);
            let s = segment_between(a, b).unwrap();
            let expected = a.centre().distance(b.centre()) - size;
            prop_assert!((s.length - expected).abs() < 1e-6);
            prop_assert!((s.start.distance(a.centre()) - size / 2.0).abs() < 1e-6);
            prop_assert!((s.end().distance(b.centre()) - size / 2.0).abs() < 1e-6);
        }
    }
}
