use artag_aruco::MarkerDetection;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A resolved target slot: a marker id and the image location of its center,
/// or the sentinel meaning "no target in this slot".
///
/// The id is `-1` exactly for the sentinel, whose location is `(0, 0)`.
/// Both fields are only ever set together.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TagRepr")]
pub struct Tag {
    id: i64,
    loc: Point2<f32>,
}

#[derive(Deserialize)]
struct TagRepr {
    id: i64,
    loc: Point2<f32>,
}

/// Rejected tag encoding.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid tag (id={id}, loc=({x}, {y}))")]
pub struct InvalidTag {
    id: i64,
    x: f32,
    y: f32,
}

impl TryFrom<TagRepr> for Tag {
    type Error = InvalidTag;

    fn try_from(repr: TagRepr) -> Result<Self, Self::Error> {
        let at_origin = repr.loc == Point2::origin();
        let sentinel = repr.id == Tag::SENTINEL_ID && at_origin;
        let target = repr.id >= 0 && !at_origin;
        if sentinel || target {
            Ok(Self {
                id: repr.id,
                loc: repr.loc,
            })
        } else {
            Err(InvalidTag {
                id: repr.id,
                x: repr.loc.x,
                y: repr.loc.y,
            })
        }
    }
}

impl Tag {
    const SENTINEL_ID: i64 = -1;

    /// The "no target" sentinel.
    pub fn none() -> Self {
        Self {
            id: Self::SENTINEL_ID,
            loc: Point2::origin(),
        }
    }

    /// A target at `loc`.
    ///
    /// `loc` must not be the origin, which is reserved for the sentinel. Marker
    /// centers never land there: every corner keeps a margin from the border.
    /// Use [`Tag::try_new`] for locations from untrusted sources.
    pub fn new(id: u32, loc: Point2<f32>) -> Self {
        debug_assert!(loc != Point2::origin(), "tag {id} placed at the origin");
        Self {
            id: i64::from(id),
            loc,
        }
    }

    /// Like [`Tag::new`], rejecting the origin.
    pub fn try_new(id: u32, loc: Point2<f32>) -> Result<Self, InvalidTag> {
        Self::try_from(TagRepr {
            id: i64::from(id),
            loc,
        })
    }

    /// Marker id, or `-1` for the sentinel.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Tag center in pixel coordinates; `(0, 0)` for the sentinel.
    #[inline]
    pub fn loc(&self) -> Point2<f32> {
        self.loc
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.id != Self::SENTINEL_ID
    }

    /// The id when this slot holds a target.
    pub fn marker_id(&self) -> Option<u32> {
        u32::try_from(self.id).ok()
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&MarkerDetection> for Tag {
    fn from(det: &MarkerDetection) -> Self {
        Tag::new(det.id, det.center())
    }
}
