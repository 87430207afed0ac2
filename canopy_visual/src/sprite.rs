// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprite metrics used by background placement.

use alloc::string::String;
use kurbo::{Size, Vec2};

/// An image resource with one or more equally sized frames.
///
/// Sprites are shared between backgrounds through `Rc`; no pixel data lives here, only the
/// metrics placement math needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    name: String,
    size: Size,
    frame_count: u32,
    default_pivot: Vec2,
}

impl Sprite {
    /// Create a sprite with `frame_count` frames of `size`. A zero frame count is treated as one.
    pub fn new(name: impl Into<String>, size: Size, frame_count: u32) -> Self {
        Self {
            name: name.into(),
            size,
            frame_count: frame_count.max(1),
            default_pivot: Vec2::ZERO,
        }
    }

    /// Set the pivot used when the sprite is drawn unscaled.
    #[must_use]
    pub fn with_default_pivot(mut self, pivot: Vec2) -> Self {
        self.default_pivot = pivot;
        self
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Frame size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Frame width.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Frame height.
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Number of frames, at least one.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Default pivot.
    pub fn default_pivot(&self) -> Vec2 {
        self.default_pivot
    }
}
