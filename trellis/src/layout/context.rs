//! State carried through a layout pass.

use crate::typeset::Typesetter;

/// Layout context passed through the item tree.
pub struct LayoutContext<'a> {
    pub typesetter: Typesetter<'a>,

    /// Reusable per-container scratch for the shrink-factor iteration (avoids
    /// per-container alloc). Marks children clamped to their minimum.
    pub(crate) clamped: Vec<bool>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(typesetter: Typesetter<'a>) -> Self {
        Self {
            typesetter,
            clamped: Vec::with_capacity(32),
        }
    }
}
