/// A detected face's bounding box in frame pixel coordinates.
///
/// Regions built through [`Region::from_corners`] always lie inside the
/// frame they were detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a region from detector corner coordinates, clamped to the frame.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        frame_w: u32,
        frame_h: u32,
    ) -> Option<Region> {
        let left = x1.min(x2).floor().max(0.0) as i64;
        let top = y1.min(y2).floor().max(0.0) as i64;
        let right = (x1.max(x2).ceil() as i64).min(frame_w as i64);
        let bottom = (y1.max(y2).ceil() as i64).min(frame_h as i64);

        if right <= left || bottom <= top {
            return None;
        }
        Some(Region::new(
            left as i32,
            top as i32,
            (right - left) as i32,
            (bottom - top) as i32,
        ))
    }

    /// `(top, right, bottom, left)`, with `right`/`bottom` exclusive.
    pub fn to_trbl(&self) -> (i32, i32, i32, i32) {
        (
            self.y,
            self.x + self.width,
            self.y + self.height,
            self.x,
        )
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Intersection of this region with a `frame_w` x `frame_h` frame.
    pub fn clamped(&self, frame_w: u32, frame_h: u32) -> Region {
        let x1 = self.x.clamp(0, frame_w as i32);
        let y1 = self.y.clamp(0, frame_h as i32);
        let x2 = (self.x + self.width).clamp(0, frame_w as i32);
        let y2 = (self.y + self.height).clamp(0, frame_h as i32);
        Region::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_from_corners_inside_frame() {
        let r = Region::from_corners(10.2, 20.7, 50.1, 60.0, 100, 100).unwrap();
        assert_eq!(r, Region::new(10, 20, 41, 40));
    }

    #[test]
    fn test_from_corners_clamps_to_frame() {
        let r = Region::from_corners(-15.0, -5.0, 120.0, 80.0, 100, 50).unwrap();
        assert_eq!(r, Region::new(0, 0, 100, 50));
    }

    #[test]
    fn test_from_corners_swapped_corners() {
        let r = Region::from_corners(50.0, 60.0, 10.0, 20.0, 100, 100).unwrap();
        assert_eq!(r, Region::new(10, 20, 40, 40));
    }

    #[rstest]
    #[case::left_of_frame(-50.0, 0.0, -10.0, 10.0)]
    #[case::below_frame(0.0, 120.0, 10.0, 150.0)]
    #[case::degenerate(5.0, 5.0, 5.0, 5.0)]
    fn test_from_corners_outside_is_none(
        #[case] x1: f64,
        #[case] y1: f64,
        #[case] x2: f64,
        #[case] y2: f64,
    ) {
        assert!(Region::from_corners(x1, y1, x2, y2, 100, 100).is_none());
    }

    #[test]
    fn test_to_trbl() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.to_trbl(), (20, 40, 60, 10));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Region::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(10, 15));
        assert!(!r.contains(9, 12));
    }

    #[test]
    fn test_clamped_partial_overlap() {
        let r = Region::new(-10, 90, 30, 30);
        assert_eq!(r.clamped(100, 100), Region::new(0, 90, 20, 10));
    }

    #[test]
    fn test_clamped_fully_outside_is_empty() {
        let r = Region::new(200, 200, 30, 30);
        assert!(r.clamped(100, 100).is_empty());
    }
}
