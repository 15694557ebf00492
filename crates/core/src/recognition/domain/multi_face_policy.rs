use std::fmt;
use std::str::FromStr;

use crate::shared::region::Region;

/// How a reference image with more than one detected face contributes to
/// the gallery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MultiFacePolicy {
    /// Keep the face with the largest area. Ties go to the earlier detection.
    #[default]
    Largest,
    /// Keep the first face in detector order.
    First,
    /// Skip the image entirely.
    Reject,
    /// Keep every face, all under the image's label.
    All,
}

impl MultiFacePolicy {
    /// Regions of one reference image that should be embedded.
    ///
    /// An empty result means the image contributes nothing.
    pub fn select(&self, regions: &[Region]) -> Vec<Region> {
        match regions {
            [] => Vec::new(),
            [only] => vec![*only],
            _ => match self {
                MultiFacePolicy::Largest => {
                    let mut best = regions[0];
                    for r in &regions[1..] {
                        if r.area() > best.area() {
                            best = *r;
                        }
                    }
                    vec![best]
                }
                MultiFacePolicy::First => vec![regions[0]],
                MultiFacePolicy::Reject => Vec::new(),
                MultiFacePolicy::All => regions.to_vec(),
            },
        }
    }
}

impl FromStr for MultiFacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "largest" => Ok(MultiFacePolicy::Largest),
            "first" => Ok(MultiFacePolicy::First),
            "reject" => Ok(MultiFacePolicy::Reject),
            "all" => Ok(MultiFacePolicy::All),
            other => Err(format!(
                "Multi-face policy must be one of: largest, first, reject, all, got '{other}'"
            )),
        }
    }
}

impl fmt::Display for MultiFacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MultiFacePolicy::Largest => "largest",
            MultiFacePolicy::First => "first",
            MultiFacePolicy::Reject => "reject",
            MultiFacePolicy::All => "all",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn faces() -> Vec<Region> {
        vec![
            Region::new(0, 0, 10, 10),
            Region::new(50, 50, 30, 30),
            Region::new(100, 0, 20, 20),
        ]
    }

    #[rstest]
    #[case(MultiFacePolicy::Largest, vec![Region::new(50, 50, 30, 30)])]
    #[case(MultiFacePolicy::First, vec![Region::new(0, 0, 10, 10)])]
    #[case(MultiFacePolicy::Reject, vec![])]
    #[case(MultiFacePolicy::All, faces())]
    fn test_select_with_several_faces(
        #[case] policy: MultiFacePolicy,
        #[case] expected: Vec<Region>,
    ) {
        assert_eq!(policy.select(&faces()), expected);
    }

    #[rstest]
    #[case(MultiFacePolicy::Largest)]
    #[case(MultiFacePolicy::First)]
    #[case(MultiFacePolicy::Reject)]
    #[case(MultiFacePolicy::All)]
    fn test_single_face_always_kept(#[case] policy: MultiFacePolicy) {
        let one = vec![Region::new(1, 2, 3, 4)];
        assert_eq!(policy.select(&one), one);
    }

    #[test]
    fn test_no_faces_selects_nothing() {
        assert!(MultiFacePolicy::All.select(&[]).is_empty());
    }

    #[test]
    fn test_largest_tie_keeps_first() {
        let regions = vec![Region::new(0, 0, 10, 10), Region::new(20, 20, 10, 10)];
        assert_eq!(MultiFacePolicy::Largest.select(&regions), vec![regions[0]]);
    }

    #[rstest]
    #[case("largest", MultiFacePolicy::Largest)]
    #[case("FIRST", MultiFacePolicy::First)]
    #[case("reject", MultiFacePolicy::Reject)]
    #[case("All", MultiFacePolicy::All)]
    fn test_parse(#[case] input: &str, #[case] expected: MultiFacePolicy) {
        assert_eq!(input.parse::<MultiFacePolicy>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<MultiFacePolicy>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        assert!("biggest".parse::<MultiFacePolicy>().is_err());
    }

    #[test]
    fn test_default_is_largest() {
        assert_eq!(MultiFacePolicy::default(), MultiFacePolicy::Largest);
    }
}
