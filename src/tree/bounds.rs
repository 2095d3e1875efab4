//! Bounds requests and queries

use conftree_model::{Point, Rect};
use serde::{Deserialize, Serialize};

use super::{ConfigTree, NodeId, NodeRef, TreeError};

/// Bit-set describing how a bounds request differs from the current one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundsChange(u8);

impl BoundsChange {
    pub const NONE: BoundsChange = BoundsChange(0);
    /// The top-left corner moved
    pub const POSITION: BoundsChange = BoundsChange(1);
    /// Width or height changed
    pub const SIZE: BoundsChange = BoundsChange(1 << 1);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: BoundsChange) -> bool {
        self.0 & other.0 == other.0
    }

    /// Names of the set bits, for human output
    pub fn describe(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(BoundsChange::POSITION) {
            names.push("position");
        }
        if self.contains(BoundsChange::SIZE) {
            names.push("size");
        }
        names
    }
}

impl std::ops::BitOr for BoundsChange {
    type Output = BoundsChange;

    fn bitor(self, rhs: BoundsChange) -> BoundsChange {
        BoundsChange(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for BoundsChange {
    fn bitor_assign(&mut self, rhs: BoundsChange) {
        self.0 |= rhs.0;
    }
}

/// Two bounds are equivalent when equal, or when one is absent and the
/// other is empty.
pub fn equivalent_bounds(bounds: Option<&Rect>, other: Option<&Rect>) -> bool {
    bounds == other
        || (other.is_none() && bounds.is_some_and(Rect::is_empty))
        || (bounds.is_none() && other.is_some_and(Rect::is_empty))
}

impl<'a> NodeRef<'a> {
    /// Effective bounds, inherited from the nearest ancestor that sets any
    pub fn bounds(&self) -> Rect {
        self.configuration().window.bounds
    }

    /// Top-left corner of [`bounds`](Self::bounds)
    pub fn position(&self) -> Point {
        self.bounds().origin()
    }

    /// Bounds this container asked for; may differ from the effective bounds
    /// after policy constraints
    pub fn requested_override_bounds(&self) -> Rect {
        self.requested_override().window.bounds
    }

    pub fn resolved_override_bounds(&self) -> Rect {
        self.resolved_override().window.bounds
    }

    pub fn has_override_bounds(&self) -> bool {
        !self.requested_override_bounds().is_empty()
    }

    /// No bounds requested at this level, so they are inherited
    pub fn match_parent_bounds(&self) -> bool {
        self.requested_override_bounds().is_empty()
    }

    pub fn equivalent_requested_override_bounds(&self, bounds: Option<&Rect>) -> bool {
        equivalent_bounds(Some(&self.requested_override_bounds()), bounds)
    }

    /// How `bounds` differs from the requested override bounds
    pub fn diff_requested_override_bounds(&self, bounds: Option<&Rect>) -> BoundsChange {
        if self.equivalent_requested_override_bounds(bounds) {
            return BoundsChange::NONE;
        }

        let existing = self.requested_override_bounds();
        let mut change = BoundsChange::NONE;

        match bounds {
            Some(bounds) => {
                if existing.left != bounds.left || existing.top != bounds.top {
                    change |= BoundsChange::POSITION;
                }
                if existing.width() != bounds.width() || existing.height() != bounds.height() {
                    change |= BoundsChange::SIZE;
                }
            }
            None => change = BoundsChange::POSITION | BoundsChange::SIZE,
        }

        change
    }
}

impl ConfigTree {
    /// Request bounds for `id`; `None` or an empty rect means "match parent".
    ///
    /// Nothing is recomputed when the request is equivalent to the current one.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Option<Rect>) -> Result<BoundsChange, TreeError> {
        let change = self.node(id)?.diff_requested_override_bounds(bounds.as_ref());
        if change.is_none() {
            return Ok(change);
        }

        self.update_requested_override(id, |requested| requested.window.set_bounds(bounds))?;
        Ok(change)
    }

    pub fn set_bounds_ltrb(
        &mut self,
        id: NodeId,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
    ) -> Result<BoundsChange, TreeError> {
        self.set_bounds(id, Some(Rect::new(left, top, right, bottom)))
    }
}
