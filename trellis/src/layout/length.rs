//! Layout vocabulary: axes, direction, justification, alignment and padding.

use crate::primitives::Size;

/// The axis along which a container arranges its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Length of `size` along this axis.
    #[inline]
    pub fn of(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    #[inline]
    pub fn set(self, size: &mut Size, length: f32) {
        match self {
            Axis::Horizontal => size.width = length,
            Axis::Vertical => size.height = length,
        }
    }

    /// Build a size from lengths along this axis and across it.
    #[inline]
    pub fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }
}

/// Text direction. Right-to-left containers fill horizontally from the right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Distribution of children along the main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Justification {
    /// Pack children at the start.
    #[default]
    Start,
    /// Pack children at the end.
    End,
    /// Center children.
    Center,
    /// Equal gaps before, between and after children.
    SpaceAround,
    /// Equal gaps between children only. With fewer than two children this
    /// behaves like `SpaceAround`.
    SpaceBetween,
}

/// Alignment on the cross axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Start,
    End,
    Center,
    /// Expand every child to the container's cross length.
    Stretch,
}

impl Alignment {
    /// Fraction of a child's cross length that lies before its anchor point.
    #[inline]
    pub fn centering(self) -> f32 {
        match self {
            Alignment::Start | Alignment::Stretch => 0.0,
            Alignment::Center => 0.5,
            Alignment::End => 1.0,
        }
    }
}

/// Padding around content. `start` and `end` are the horizontal edges in
/// reading order, so they swap sides in right-to-left containers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Padding {
    pub start: f32,
    pub top: f32,
    pub end: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn new(start: f32, top: f32, end: f32, bottom: f32) -> Self {
        Self {
            start,
            top,
            end,
            bottom,
        }
    }

    /// Uniform padding on all sides.
    pub fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Symmetric padding (horizontal, vertical).
    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f32 {
        self.start + self.end
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Total padding along `axis`.
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }

    /// Shrink `size` by the padding on every side, never below zero.
    pub fn deflate(&self, size: Size) -> Size {
        Size::new(
            (size.width - self.horizontal()).max(0.0),
            (size.height - self.vertical()).max(0.0),
        )
    }
}
