use pano_core::{Correspondence, PixelCoord, Point};

use crate::error::{AlignError, AlignResult};

/// Index-aligned point pairs: `src[k]` in image 2, `dst[k]` in image 1, both `(x, y)`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointPairs {
    src: Vec<Point>,
    dst: Vec<Point>,
}

impl PointPairs {
    pub fn new(src: Vec<Point>, dst: Vec<Point>) -> AlignResult<Self> {
        if src.len() != dst.len() {
            return Err(AlignError::PointCountMismatch {
                src: src.len(),
                dst: dst.len(),
            });
        }
        Ok(Self { src, dst })
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    pub fn src(&self) -> &[Point] {
        &self.src
    }

    pub fn dst(&self) -> &[Point] {
        &self.dst
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.src.iter().zip(self.dst.iter())
    }
}

/// Turn index matches into geometric point pairs.
///
/// `dst` comes from `keypoints1[first]`, `src` from `keypoints2[second]`;
/// the output has one pair per match, in match order.
pub fn to_point_pairs(
    keypoints1: &[PixelCoord],
    keypoints2: &[PixelCoord],
    matches: &[Correspondence],
) -> AlignResult<PointPairs> {
    let lookup = |kps: &[PixelCoord], index: usize, image: u8, match_index: usize| {
        kps.get(index)
            .map(|kp| kp.to_point())
            .ok_or(AlignError::MatchIndexOutOfRange {
                match_index,
                image,
                index,
                len: kps.len(),
            })
    };

    let mut src = Vec::with_capacity(matches.len());
    let mut dst = Vec::with_capacity(matches.len());
    for (k, m) in matches.iter().enumerate() {
        dst.push(lookup(keypoints1, m.first, 1, k)?);
        src.push(lookup(keypoints2, m.second, 2, k)?);
    }
    Ok(PointPairs { src, dst })
}
