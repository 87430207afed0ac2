// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw commands emitted by backgrounds and the render pass.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Affine, Point, Rect, Vec2};

use crate::background::{GradientMode, SpriteModification};
use crate::color::Color;
use crate::slice::{StretchData, TiledData};
use crate::sprite::Sprite;

/// An opaque material handle shared between backgrounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Material {
    /// Material name.
    pub name: String,
}

impl Material {
    /// Create a named material.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Pre-built geometry queued on a background for batch drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchDescriptor {
    /// Material to draw with.
    pub material: Option<Rc<Material>>,
    /// Vertices in the control's local space.
    pub vertices: Vec<Point>,
    /// Triangle indices into `vertices`.
    pub indices: Vec<u16>,
}

/// How a sprite frame is placed.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteDrawState {
    /// Position of the sprite pivot.
    pub position: Point,
    /// Scale applied around the pivot.
    pub scale: Vec2,
    /// Pivot in sprite units.
    pub pivot_point: Vec2,
    /// Rotation in radians.
    pub angle: f64,
    /// Frame index, already clamped to the sprite's frame range.
    pub frame: u32,
    /// Flip bits.
    pub flip: SpriteModification,
    /// Snap to whole pixels.
    pub per_pixel_accuracy: bool,
    /// Material override.
    pub material: Option<Rc<Material>>,
}

impl Default for SpriteDrawState {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            scale: Vec2::new(1.0, 1.0),
            pivot_point: Vec2::ZERO,
            angle: 0.0,
            frame: 0,
            flip: SpriteModification::empty(),
            per_pixel_accuracy: false,
            material: None,
        }
    }
}

/// The four sprites of a tiled multilayer background.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSprites {
    /// Mask layer.
    pub mask: Option<Rc<Sprite>>,
    /// Detail layer.
    pub detail: Option<Rc<Sprite>>,
    /// Gradient layer.
    pub gradient: Option<Rc<Sprite>>,
    /// Contour layer.
    pub contour: Option<Rc<Sprite>>,
}

/// One drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A single sprite frame.
    Sprite {
        /// Sprite to draw.
        sprite: Rc<Sprite>,
        /// Placement.
        state: SpriteDrawState,
        /// Resolved color.
        color: Color,
    },
    /// A solid axis-aligned rect.
    FillRect {
        /// Absolute rect.
        rect: Rect,
        /// Resolved color.
        color: Color,
    },
    /// A solid rotated quad.
    FillPolygon {
        /// Corners in absolute space.
        points: [Point; 4],
        /// Resolved color.
        color: Color,
    },
    /// A nine-slice sprite.
    Stretched {
        /// Sprite to draw.
        sprite: Rc<Sprite>,
        /// Frame, flip and pixel snapping.
        state: SpriteDrawState,
        /// Slice grid in control-local space.
        data: Rc<StretchData>,
        /// Control-local to absolute transform.
        transform: Affine,
        /// Resolved color.
        color: Color,
    },
    /// A tiled sprite.
    Tiled {
        /// Sprite to draw.
        sprite: Rc<Sprite>,
        /// Frame, flip and pixel snapping.
        state: SpriteDrawState,
        /// Tile cells in control-local space.
        data: Rc<TiledData>,
        /// Control-local to absolute transform.
        transform: Affine,
        /// Resolved color.
        color: Color,
    },
    /// Four sprites composed over shared tile cells.
    TiledMultilayer {
        /// Layer sprites.
        layers: LayerSprites,
        /// Gradient composition mode.
        gradient_mode: GradientMode,
        /// Frame, flip and pixel snapping.
        state: SpriteDrawState,
        /// Tile cells in control-local space.
        data: Rc<TiledData>,
        /// Control-local to absolute transform.
        transform: Affine,
        /// Resolved color.
        color: Color,
    },
    /// Pre-built geometry.
    Batch {
        /// The batch.
        batch: BatchDescriptor,
        /// Control-local to absolute transform.
        transform: Affine,
    },
    /// Intersect the clip with a rect until the matching [`PopClip`](Self::PopClip).
    PushClip(Rect),
    /// Restore the clip.
    PopClip,
}

/// Receiver of draw commands.
pub trait DrawSink {
    /// Accept one command.
    fn push(&mut self, command: DrawCommand);
}

impl DrawSink for Vec<DrawCommand> {
    fn push(&mut self, command: DrawCommand) {
        Self::push(self, command);
    }
}
