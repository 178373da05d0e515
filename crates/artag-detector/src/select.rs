//! Resolve the raw detection list to at most two left/right ordered targets.

use crate::Tag;
use artag_aruco::MarkerDetection;

/// Map accepted detections (in detector scan order) to a `(first, second)` pair.
///
/// - no detections: both slots are the sentinel;
/// - one detection: it fills `first`, `second` is the sentinel;
/// - two or more: only the first- and last-scanned detections are kept
///   (markers are often mounted in duplicate on a post), then ordered by
///   ascending center x.
///
/// Equal x puts the lower id first; equal ids keep scan order.
pub fn select_tags(detections: &[MarkerDetection]) -> (Tag, Tag) {
    match detections {
        [] => (Tag::none(), Tag::none()),
        [only] => (Tag::from(only), Tag::none()),
        [first, .., last] => order_left_right(Tag::from(first), Tag::from(last)),
    }
}

fn order_left_right(a: Tag, b: Tag) -> (Tag, Tag) {
    let (ax, bx) = (a.loc().x, b.loc().x);
    if bx < ax || (bx == ax && b.id() < a.id()) {
        (b, a)
    } else {
        (a, b)
    }
}
