//! Axis-aligned bounding boxes and the geometric predicates used to maintain the tree.

use tinyvec::TinyVec;

use crate::r#type::IndexableNum;

/// Per-axis coordinates. Up to four dimensions are stored inline.
pub(crate) type Coords<N> = TinyVec<[N; 4]>;

/// A minimum bounding rectangle stored as a lower corner plus a non-negative extent per axis.
///
/// A box with no content (the MBR of a node without children) is flagged as empty rather than
/// encoded with extreme coordinates. An empty box overlaps nothing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bbox<N: IndexableNum> {
    lower: Coords<N>,
    extent: Coords<N>,
    empty: bool,
}

impl<N: IndexableNum> Bbox<N> {
    /// Create a box from slices of equal length. Callers validate the dimensionality.
    pub(crate) fn new(lower: &[N], extent: &[N]) -> Self {
        debug_assert_eq!(lower.len(), extent.len());
        Self {
            lower: lower.iter().copied().collect(),
            extent: extent.iter().copied().collect(),
            empty: false,
        }
    }

    pub(crate) fn empty(num_dims: usize) -> Self {
        let zeros: Coords<N> = (0..num_dims).map(|_| N::zero()).collect();
        Self {
            lower: zeros.clone(),
            extent: zeros,
            empty: true,
        }
    }

    /// The exact bounding box of the given boxes. Empty boxes are skipped.
    pub(crate) fn union_of<'a>(num_dims: usize, boxes: impl IntoIterator<Item = &'a Self>) -> Self
    where
        N: 'a,
    {
        let mut mins: Coords<N> = (0..num_dims).map(|_| N::infinity()).collect();
        let mut maxs: Coords<N> = (0..num_dims).map(|_| N::neg_infinity()).collect();
        let mut any = false;

        for bbox in boxes {
            if bbox.empty {
                continue;
            }
            any = true;
            for axis in 0..num_dims {
                if bbox.min(axis) < mins[axis] {
                    mins[axis] = bbox.min(axis);
                }
                if bbox.max(axis) > maxs[axis] {
                    maxs[axis] = bbox.max(axis);
                }
            }
        }

        if !any {
            return Self::empty(num_dims);
        }

        // Convert max coords to extents
        for axis in 0..num_dims {
            maxs[axis] = maxs[axis] - mins[axis];
        }
        Self {
            lower: mins,
            extent: maxs,
            empty: false,
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.empty
    }

    #[inline]
    pub(crate) fn num_dims(&self) -> usize {
        self.lower.len()
    }

    #[inline]
    pub(crate) fn lower(&self) -> &[N] {
        &self.lower
    }

    #[inline]
    pub(crate) fn extent(&self) -> &[N] {
        &self.extent
    }

    #[inline]
    pub(crate) fn min(&self, axis: usize) -> N {
        self.lower[axis]
    }

    #[inline]
    pub(crate) fn max(&self, axis: usize) -> N {
        self.lower[axis] + self.extent[axis]
    }

    /// Returns `true` if the two boxes overlap under the tolerant predicate of [`overlaps`].
    pub(crate) fn overlaps(&self, other: &Self) -> bool {
        if self.empty || other.empty {
            return false;
        }
        overlaps(&self.lower, &self.extent, &other.lower, &other.extent)
    }

    /// Hyper-volume increase needed for this box to also cover `other`.
    pub(crate) fn required_expansion(&self, other: &Self) -> N {
        if self.empty {
            return area(&other.extent);
        }
        required_expansion(&self.lower, &self.extent, &other.lower, &other.extent)
    }

    pub(crate) fn area(&self) -> N {
        if self.empty {
            return N::zero();
        }
        area(&self.extent)
    }

    /// Returns `true` if `other` lies within this box (bounds inclusive).
    pub(crate) fn contains(&self, other: &Self) -> bool {
        if other.empty {
            return true;
        }
        if self.empty {
            return false;
        }
        (0..self.num_dims())
            .all(|axis| self.min(axis) <= other.min(axis) && other.max(axis) <= self.max(axis))
    }

    /// Cut this box in two at `line` on `axis`. The halves are identical on every other axis.
    pub(crate) fn split_at(&self, axis: usize, line: N) -> (Self, Self) {
        let upper = self.max(axis);

        let mut left = self.clone();
        left.extent[axis] = line - self.lower[axis];

        let mut right = self.clone();
        right.lower[axis] = line;
        right.extent[axis] = upper - line;

        (left, right)
    }
}

/// Per-axis overlap test between a query box and a candidate box.
///
/// On each axis the box with the smaller lower bound has its extent scaled by
/// [`IndexableNum::FUDGE_FACTOR`] before being compared against the other lower bound, so boxes
/// that touch (or numerically adjoin) count as overlapping. If any axis does not overlap, the boxes
/// do not overlap.
pub fn overlaps<N: IndexableNum>(
    q_lower: &[N],
    q_extent: &[N],
    lower: &[N],
    extent: &[N],
) -> bool {
    for axis in 0..q_lower.len() {
        let overlap_in_axis = if q_lower[axis] == lower[axis] {
            true
        } else if q_lower[axis] < lower[axis] {
            q_lower[axis] + N::FUDGE_FACTOR * q_extent[axis] >= lower[axis]
        } else {
            lower[axis] + N::FUDGE_FACTOR * extent[axis] >= q_lower[axis]
        };
        if !overlap_in_axis {
            return false;
        }
    }
    true
}

/// The increase in hyper-volume needed to grow `(lower, extent)` so that it contains the candidate.
///
/// Each axis is only ever extended in the direction that is needed. This is a comparison key for
/// choosing a subtree, not an absolute metric.
pub fn required_expansion<N: IndexableNum>(
    lower: &[N],
    extent: &[N],
    c_lower: &[N],
    c_extent: &[N],
) -> N {
    let mut expanded = N::one();
    for axis in 0..lower.len() {
        let min = lower[axis].min(c_lower[axis]);
        let max = (lower[axis] + extent[axis]).max(c_lower[axis] + c_extent[axis]);
        expanded = expanded * (max - min);
    }
    expanded - area(extent)
}

/// Product of all per-axis extents.
pub fn area<N: IndexableNum>(extent: &[N]) -> N {
    extent.iter().fold(N::one(), |acc, &e| acc * e)
}
