// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Visual: the visual composition model of Canopy controls.
//!
//! This crate holds everything a control needs to describe how it looks, without knowing
//! anything about the control tree itself:
//!
//! - [`GeometricData`]: the fully composed position/scale/rotation of a control, built by
//!   folding a control's local transform into its parent's composed data.
//! - [`Color`] and [`ColorInherit`]: how a background combines its own color with the
//!   resolved color of its parent.
//! - [`Background`]: sprite, frame, draw type, alignment, stretch caps and flip bits. Drawing
//!   a background produces [`DrawCommand`]s pushed into a [`DrawSink`]; turning them into
//!   pixels is up to the embedder.
//! - [`StretchData`] and [`TiledData`]: cached side data for nine-slice and tiled draw types.
//! - [`ControlState`], [`DrawState`] and [`StateTable`]: the state bits style and draw logic
//!   dispatch on, and a small table resolving per-state visuals through a fallback chain.
//!
//! ## Example
//!
//! ```rust
//! use canopy_visual::{Background, Color, ColorInherit, DrawType, GeometricData};
//! use kurbo::{Point, Size, Vec2};
//!
//! let mut background = Background::new();
//! background.set_draw_type(DrawType::Fill);
//! background.set_color(Color::new(1.0, 0.0, 0.0, 0.5));
//! background.set_color_inherit(ColorInherit::MultiplyAlphaOnly);
//!
//! // Colors are resolved top-down before drawing.
//! background.set_parent_color(Color::new(0.0, 1.0, 0.0, 0.8));
//! assert!((background.draw_color().a - 0.4).abs() < 1e-6);
//!
//! let data = GeometricData::new(
//!     Point::new(10.0, 10.0),
//!     Size::new(50.0, 20.0),
//!     Vec2::ZERO,
//!     Vec2::new(1.0, 1.0),
//!     0.0,
//! );
//! let mut commands: Vec<canopy_visual::DrawCommand> = Vec::new();
//! background.draw(&data, &mut commands);
//! assert_eq!(commands.len(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`. Enable exactly one of the `std` (default) or `libm`
//! features so that trigonometry is available to `kurbo`.

#![no_std]

extern crate alloc;

mod background;
mod color;
mod draw;
mod geometry;
mod slice;
mod sprite;
mod state;

pub use background::{
    Align, Background, ColorInherit, DrawType, GradientMode, PerPixelAccuracy,
    SpriteModification,
};
pub use color::Color;
pub use draw::{BatchDescriptor, DrawCommand, DrawSink, LayerSprites, Material, SpriteDrawState};
pub use geometry::{CONTROL_TOUCH_AREA, GeometricData};
pub use slice::{StretchData, TileCell, TiledData};
pub use sprite::Sprite;
pub use state::{ControlState, DrawState, StateTable};
