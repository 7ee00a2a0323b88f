use std::fmt::Debug;

use num_traits::{Float, NumCast};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Splitting an overflowing
/// node cuts rectangles in two and the overlap test scales extents by a tolerance factor, so only
/// floating point coordinates are supported.
pub trait IndexableNum: private::Sealed + Float + NumCast + Default + Debug + Send + Sync {
    /// Multiplier applied to an extent before comparing it against another rectangle's bound, so
    /// that rectangles which numerically adjoin are still reported as overlapping.
    const FUDGE_FACTOR: Self;
}

impl IndexableNum for f32 {
    const FUDGE_FACTOR: f32 = 1.001;
}

impl IndexableNum for f64 {
    const FUDGE_FACTOR: f64 = 1.001;
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
