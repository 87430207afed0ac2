// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-control background: sprite placement, color inheritance and draw-type strategies.

use alloc::rc::Rc;
use alloc::vec::Vec;
use kurbo::{Point, Size, Vec2};

use crate::color::Color;
use crate::draw::{
    BatchDescriptor, DrawCommand, DrawSink, LayerSprites, Material, SpriteDrawState,
};
use crate::geometry::GeometricData;
use crate::slice::{StretchData, TiledData};
use crate::sprite::Sprite;

/// Sprite placement and scaling strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawType {
    /// Unscaled (beyond the control's own scale), positioned by [`Align`].
    #[default]
    Aligned,
    /// Scaled to exactly cover the control rect.
    ScaleToRect,
    /// Scaled uniformly to fit inside the control rect.
    ScaleProportional,
    /// Scaled uniformly to cover the control rect.
    ScaleProportionalOne,
    /// Solid color, no sprite needed.
    Fill,
    /// Three-slice, stretched horizontally.
    StretchHorizontal,
    /// Three-slice, stretched vertically.
    StretchVertical,
    /// Nine-slice.
    StretchBoth,
    /// Repeated tiles with fixed caps.
    Tiled,
    /// Mask, detail, gradient and contour layers over shared tiles.
    TiledMultilayer,
    /// Queued pre-built geometry.
    Batch,
}

/// How a background's own color combines with its parent's resolved color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorInherit {
    /// Per-channel product.
    MultiplyOnParent,
    /// Per-channel sum clamped to `1.0`.
    AddToParent,
    /// Take the parent's color.
    ReplaceToParent,
    /// Keep the own color.
    #[default]
    IgnoreParent,
    /// Own RGB, alpha multiplied with the parent's alpha.
    MultiplyAlphaOnly,
    /// Own RGB, parent's alpha.
    ReplaceAlphaOnly,
}

/// Whether sprite positions are snapped to whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PerPixelAccuracy {
    /// Never snap.
    #[default]
    Disabled,
    /// Snap while the control stands still between frames.
    Enabled,
    /// Always snap.
    Forced,
}

/// Blend mode of the gradient layer of a tiled multilayer background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GradientMode {
    /// Multiply.
    #[default]
    Multiply,
    /// Alpha blend.
    Blend,
    /// Additive.
    Add,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
}

bitflags::bitflags! {
    /// Sprite alignment inside the control rect. Without a horizontal or vertical flag the
    /// sprite is centered on that axis.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Align: u8 {
        /// Left edge.
        const LEFT     = 1 << 0;
        /// Horizontal center.
        const HCENTER  = 1 << 1;
        /// Right edge.
        const RIGHT    = 1 << 2;
        /// Top edge.
        const TOP      = 1 << 3;
        /// Vertical center.
        const VCENTER  = 1 << 4;
        /// Bottom edge.
        const BOTTOM   = 1 << 5;
        /// Justified (text only).
        const HJUSTIFY = 1 << 6;
    }
}

impl Default for Align {
    fn default() -> Self {
        Self::HCENTER | Self::VCENTER
    }
}

bitflags::bitflags! {
    /// Sprite flips.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SpriteModification: u8 {
        /// Mirror around the vertical axis.
        const FLIP_HORIZONTAL = 1 << 0;
        /// Mirror around the horizontal axis.
        const FLIP_VERTICAL   = 1 << 1;
    }
}

/// Visual background of a control.
///
/// A background is a component: it lives on its control and is drawn by the render pass with
/// the control's composed [`GeometricData`]. Its resolved [`draw_color`](Self::draw_color) is
/// only updated by [`set_parent_color`](Self::set_parent_color), which the render pass calls
/// top-down before drawing.
///
/// Changing the sprite or the draw type records a layout invalidation that the owner picks
/// up with [`take_layout_invalidation`](Self::take_layout_invalidation).
#[derive(Debug)]
pub struct Background {
    color: Color,
    sprite: Option<Rc<Sprite>>,
    frame: u32,
    align: Align,
    draw_type: DrawType,
    modification: SpriteModification,
    left_right_stretch_cap: f64,
    top_bottom_stretch_cap: f64,
    color_inherit: ColorInherit,
    per_pixel_accuracy: PerPixelAccuracy,
    last_draw_pos: Point,
    mask: Option<Rc<Sprite>>,
    detail: Option<Rc<Sprite>>,
    gradient: Option<Rc<Sprite>>,
    contour: Option<Rc<Sprite>>,
    gradient_mode: GradientMode,
    draw_color: Color,
    material: Option<Rc<Material>>,
    batches: Vec<BatchDescriptor>,
    stretch_data: Option<Rc<StretchData>>,
    tiled_data: Option<Rc<TiledData>>,
    multilayer_data: Option<Rc<TiledData>>,
    layout_invalidated: bool,
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Background {
    /// Copies everything except the cached slice data, which is rebuilt on the next draw.
    fn clone(&self) -> Self {
        Self {
            color: self.color,
            sprite: self.sprite.clone(),
            frame: self.frame,
            align: self.align,
            draw_type: self.draw_type,
            modification: self.modification,
            left_right_stretch_cap: self.left_right_stretch_cap,
            top_bottom_stretch_cap: self.top_bottom_stretch_cap,
            color_inherit: self.color_inherit,
            per_pixel_accuracy: self.per_pixel_accuracy,
            last_draw_pos: Point::ZERO,
            mask: self.mask.clone(),
            detail: self.detail.clone(),
            gradient: self.gradient.clone(),
            contour: self.contour.clone(),
            gradient_mode: self.gradient_mode,
            draw_color: self.draw_color,
            material: self.material.clone(),
            batches: self.batches.clone(),
            stretch_data: None,
            tiled_data: None,
            multilayer_data: None,
            layout_invalidated: false,
        }
    }
}

impl Background {
    /// A white, aligned, centered background without a sprite.
    pub fn new() -> Self {
        Self {
            color: Color::WHITE,
            sprite: None,
            frame: 0,
            align: Align::default(),
            draw_type: DrawType::Aligned,
            modification: SpriteModification::empty(),
            left_right_stretch_cap: 0.0,
            top_bottom_stretch_cap: 0.0,
            color_inherit: ColorInherit::IgnoreParent,
            per_pixel_accuracy: PerPixelAccuracy::Disabled,
            last_draw_pos: Point::ZERO,
            mask: None,
            detail: None,
            gradient: None,
            contour: None,
            gradient_mode: GradientMode::Multiply,
            draw_color: Color::WHITE,
            material: None,
            batches: Vec::new(),
            stretch_data: None,
            tiled_data: None,
            multilayer_data: None,
            layout_invalidated: false,
        }
    }

    /// Own color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the own color. The draw color follows on the next [`set_parent_color`](Self::set_parent_color).
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Color resolved against the parent chain.
    pub fn draw_color(&self) -> Color {
        self.draw_color
    }

    /// Override the resolved color.
    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    /// Color inheritance rule.
    pub fn color_inherit(&self) -> ColorInherit {
        self.color_inherit
    }

    /// Set the color inheritance rule.
    pub fn set_color_inherit(&mut self, inherit: ColorInherit) {
        self.color_inherit = inherit;
    }

    /// Resolve [`draw_color`](Self::draw_color) from the own color and the parent's resolved color.
    pub fn set_parent_color(&mut self, parent: Color) {
        self.draw_color = match self.color_inherit {
            ColorInherit::MultiplyOnParent => self.color.multiply(parent),
            ColorInherit::AddToParent => self.color.saturating_add(parent),
            ColorInherit::ReplaceToParent => parent,
            ColorInherit::IgnoreParent => self.color,
            ColorInherit::MultiplyAlphaOnly => self.color.with_alpha(self.color.a * parent.a),
            ColorInherit::ReplaceAlphaOnly => self.color.with_alpha(parent.a),
        };
    }

    /// The sprite, if any.
    pub fn sprite(&self) -> Option<&Rc<Sprite>> {
        self.sprite.as_ref()
    }

    /// Set the sprite.
    pub fn set_sprite(&mut self, sprite: Option<Rc<Sprite>>) {
        self.sprite = sprite;
        self.release_draw_data();
        self.layout_invalidated = true;
    }

    /// Set the sprite and frame together.
    pub fn set_sprite_frame(&mut self, sprite: Option<Rc<Sprite>>, frame: u32) {
        self.set_sprite(sprite);
        self.set_frame(frame);
    }

    /// Frame index. Out of range frames are clamped when drawing.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Set the frame index.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame;
    }

    /// Alignment.
    pub fn align(&self) -> Align {
        self.align
    }

    /// Set the alignment.
    pub fn set_align(&mut self, align: Align) {
        self.align = align;
    }

    /// Draw type.
    pub fn draw_type(&self) -> DrawType {
        self.draw_type
    }

    /// Set the draw type. Changing it drops cached slice data.
    pub fn set_draw_type(&mut self, draw_type: DrawType) {
        if self.draw_type != draw_type {
            self.release_draw_data();
            self.draw_type = draw_type;
            self.layout_invalidated = true;
        }
    }

    /// Flip bits.
    pub fn modification(&self) -> SpriteModification {
        self.modification
    }

    /// Set the flip bits.
    pub fn set_modification(&mut self, modification: SpriteModification) {
        self.modification = modification;
    }

    /// Horizontal stretch cap.
    pub fn left_right_stretch_cap(&self) -> f64 {
        self.left_right_stretch_cap
    }

    /// Set the horizontal stretch cap. Negative caps are clamped to zero.
    pub fn set_left_right_stretch_cap(&mut self, cap: f64) {
        let cap = cap.max(0.0);
        if self.left_right_stretch_cap != cap {
            self.left_right_stretch_cap = cap;
            self.release_draw_data();
            self.layout_invalidated = true;
        }
    }

    /// Vertical stretch cap.
    pub fn top_bottom_stretch_cap(&self) -> f64 {
        self.top_bottom_stretch_cap
    }

    /// Set the vertical stretch cap. Negative caps are clamped to zero.
    pub fn set_top_bottom_stretch_cap(&mut self, cap: f64) {
        let cap = cap.max(0.0);
        if self.top_bottom_stretch_cap != cap {
            self.top_bottom_stretch_cap = cap;
            self.release_draw_data();
            self.layout_invalidated = true;
        }
    }

    /// Pixel snapping rule.
    pub fn per_pixel_accuracy(&self) -> PerPixelAccuracy {
        self.per_pixel_accuracy
    }

    /// Set the pixel snapping rule.
    pub fn set_per_pixel_accuracy(&mut self, accuracy: PerPixelAccuracy) {
        self.per_pixel_accuracy = accuracy;
    }

    /// Layer sprites of the tiled multilayer draw type.
    pub fn layers(&self) -> LayerSprites {
        LayerSprites {
            mask: self.mask.clone(),
            detail: self.detail.clone(),
            gradient: self.gradient.clone(),
            contour: self.contour.clone(),
        }
    }

    /// Set the layer sprites of the tiled multilayer draw type.
    pub fn set_layers(&mut self, layers: LayerSprites) {
        self.mask = layers.mask;
        self.detail = layers.detail;
        self.gradient = layers.gradient;
        self.contour = layers.contour;
        self.multilayer_data = None;
    }

    /// Gradient blend mode.
    pub fn gradient_mode(&self) -> GradientMode {
        self.gradient_mode
    }

    /// Set the gradient blend mode.
    pub fn set_gradient_mode(&mut self, mode: GradientMode) {
        self.gradient_mode = mode;
    }

    /// Material.
    pub fn material(&self) -> Option<&Rc<Material>> {
        self.material.as_ref()
    }

    /// Set the material.
    pub fn set_material(&mut self, material: Option<Rc<Material>>) {
        self.material = material;
    }

    /// Queued batches.
    pub fn render_batches(&self) -> &[BatchDescriptor] {
        &self.batches
    }

    /// Replace the queued batches.
    pub fn set_render_batches(&mut self, batches: Vec<BatchDescriptor>) {
        self.batches = batches;
    }

    /// Queue more batches.
    pub fn append_render_batches(&mut self, batches: impl IntoIterator<Item = BatchDescriptor>) {
        self.batches.extend(batches);
    }

    /// Queue one batch.
    pub fn add_render_batch(&mut self, batch: BatchDescriptor) {
        self.batches.push(batch);
    }

    /// Drop queued batches.
    pub fn clear_batches(&mut self) {
        self.batches.clear();
    }

    /// Drop cached slice data.
    pub fn release_draw_data(&mut self) {
        self.stretch_data = None;
        self.tiled_data = None;
        self.multilayer_data = None;
    }

    /// Cached nine-slice data from the last stretched draw.
    pub fn stretch_data(&self) -> Option<&StretchData> {
        self.stretch_data.as_deref()
    }

    /// Cached tile data from the last tiled draw.
    pub fn tiled_data(&self) -> Option<&TiledData> {
        self.tiled_data.as_deref()
    }

    /// Return and clear the pending layout invalidation.
    pub fn take_layout_invalidation(&mut self) -> bool {
        core::mem::take(&mut self.layout_invalidated)
    }

    fn snap(&mut self, position: Point) -> bool {
        let snap = match self.per_pixel_accuracy {
            PerPixelAccuracy::Disabled => false,
            PerPixelAccuracy::Enabled => self.last_draw_pos == position,
            PerPixelAccuracy::Forced => true,
        };
        self.last_draw_pos = position;
        snap
    }

    /// Draw with the control's composed geometric data.
    ///
    /// Sprite-based draw types emit nothing without a sprite; [`DrawType::Fill`] needs none.
    pub fn draw(&mut self, control: &GeometricData, sink: &mut dyn DrawSink) {
        let mut gd = GeometricData::new(
            Point::ZERO,
            control.size(),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            0.0,
        );
        gd.add_geometric_data(control);
        let rect = gd.unrotated_rect();

        let mut state = SpriteDrawState {
            material: self.material.clone(),
            ..SpriteDrawState::default()
        };
        if let Some(sprite) = &self.sprite {
            state.frame = self.frame.min(sprite.frame_count() - 1);
            state.flip = self.modification;
        }
        let scale = gd.scale();

        match self.draw_type {
            DrawType::Aligned => {
                let Some(sprite) = self.sprite.clone() else {
                    return;
                };
                let x = if self.align.contains(Align::LEFT) {
                    rect.x0
                } else if self.align.contains(Align::RIGHT) {
                    rect.x0 + rect.width() - sprite.width() * scale.x
                } else {
                    rect.x0 + (rect.width() - sprite.width() * scale.x) * 0.5
                };
                let y = if self.align.contains(Align::TOP) {
                    rect.y0
                } else if self.align.contains(Align::BOTTOM) {
                    rect.y0 + rect.height() - sprite.height() * scale.y
                } else {
                    rect.y0
                        + (rect.height() - sprite.height() * scale.y
                            + sprite.default_pivot().y * scale.y)
                            * 0.5
                };
                state.position = gd.rotate_about_position(Point::new(x, y));
                state.angle = gd.angle();
                state.scale = scale;
                state.pivot_point = sprite.default_pivot();
                state.per_pixel_accuracy = self.snap(state.position);
                sink.push(DrawCommand::Sprite {
                    sprite,
                    state,
                    color: self.draw_color,
                });
            }
            DrawType::ScaleToRect => {
                let Some(sprite) = self.sprite.clone() else {
                    return;
                };
                let sprite_size = sprite.size();
                state.position = gd.position();
                state.scale = Vec2::new(
                    rect.width() / sprite_size.width,
                    rect.height() / sprite_size.height,
                );
                state.pivot_point = pivot_in_sprite(gd.pivot_point(), gd.size(), sprite_size);
                state.angle = gd.angle();
                state.per_pixel_accuracy = self.snap(state.position);
                sink.push(DrawCommand::Sprite {
                    sprite,
                    state,
                    color: self.draw_color,
                });
            }
            DrawType::ScaleProportional | DrawType::ScaleProportionalOne => {
                let Some(sprite) = self.sprite.clone() else {
                    return;
                };
                let cover = self.draw_type == DrawType::ScaleProportionalOne;
                let mut w = rect.width() / (sprite.width() * scale.x);
                let mut h = rect.height() / (sprite.height() * scale.y);
                let mut ph = sprite.default_pivot().y;
                // Fit the limiting axis, or the other one when covering.
                if (w < h) != cover {
                    h = sprite.height() * w * scale.x;
                    ph *= w;
                    w = rect.width();
                } else {
                    w = sprite.width() * h * scale.y;
                    ph *= h;
                    h = rect.height();
                }
                let x = if self.align.contains(Align::LEFT) {
                    rect.x0
                } else if self.align.contains(Align::RIGHT) {
                    rect.x0 + rect.width() - w
                } else {
                    rect.x0 + trunc((rect.width() - w) * 0.5)
                };
                let y = if self.align.contains(Align::TOP) {
                    rect.y0
                } else if self.align.contains(Align::BOTTOM) {
                    rect.y0 + rect.height() - h
                } else {
                    rect.y0 + trunc((rect.height() - h + ph) * 0.5)
                };
                state.scale = Vec2::new(w / sprite.width(), h / sprite.height());
                state.position = gd.rotate_about_position(Point::new(x, y));
                state.angle = gd.angle();
                state.per_pixel_accuracy = self.snap(state.position);
                sink.push(DrawCommand::Sprite {
                    sprite,
                    state,
                    color: self.draw_color,
                });
            }
            DrawType::Fill => {
                if gd.angle() != 0.0 {
                    sink.push(DrawCommand::FillPolygon {
                        points: gd.polygon(),
                        color: self.draw_color,
                    });
                } else {
                    sink.push(DrawCommand::FillRect {
                        rect,
                        color: self.draw_color,
                    });
                }
            }
            DrawType::StretchHorizontal | DrawType::StretchVertical | DrawType::StretchBoth => {
                let Some(sprite) = self.sprite.clone() else {
                    return;
                };
                state.per_pixel_accuracy = self.snap(gd.position());
                let caps = self.caps();
                let cached = self
                    .stretch_data
                    .as_ref()
                    .filter(|d| d.matches(sprite.size(), state.frame, gd.size(), caps, self.draw_type))
                    .cloned();
                let data = match cached {
                    Some(data) => data,
                    None => {
                        let data = Rc::new(StretchData::new(
                            sprite.size(),
                            state.frame,
                            gd.size(),
                            caps,
                            self.draw_type,
                        ));
                        self.stretch_data = Some(data.clone());
                        data
                    }
                };
                sink.push(DrawCommand::Stretched {
                    sprite,
                    state,
                    data,
                    transform: gd.transform(),
                    color: self.draw_color,
                });
            }
            DrawType::Tiled => {
                let Some(sprite) = self.sprite.clone() else {
                    return;
                };
                state.per_pixel_accuracy = self.snap(gd.position());
                let caps = self.caps();
                let data = tiled(&mut self.tiled_data, sprite.size(), state.frame, gd.size(), caps);
                sink.push(DrawCommand::Tiled {
                    sprite,
                    state,
                    data,
                    transform: gd.transform(),
                    color: self.draw_color,
                });
            }
            DrawType::TiledMultilayer => {
                // Layers share the mask's metrics.
                let Some(mask_size) = self.mask.as_ref().map(|m| m.size()) else {
                    return;
                };
                state.per_pixel_accuracy = self.snap(gd.position());
                let caps = self.caps();
                let data = tiled(&mut self.multilayer_data, mask_size, state.frame, gd.size(), caps);
                sink.push(DrawCommand::TiledMultilayer {
                    layers: self.layers(),
                    gradient_mode: self.gradient_mode,
                    state,
                    data,
                    transform: gd.transform(),
                    color: self.draw_color,
                });
            }
            DrawType::Batch => {
                let transform = gd.transform();
                for batch in self.batches.drain(..) {
                    sink.push(DrawCommand::Batch { batch, transform });
                }
            }
        }
    }

    fn caps(&self) -> Vec2 {
        Vec2::new(self.left_right_stretch_cap, self.top_bottom_stretch_cap)
    }
}

fn tiled(
    cache: &mut Option<Rc<TiledData>>,
    sprite_size: Size,
    frame: u32,
    size: Size,
    caps: Vec2,
) -> Rc<TiledData> {
    if let Some(data) = cache
        && data.matches(sprite_size, frame, size, caps, DrawType::Tiled)
    {
        return data.clone();
    }
    let data = Rc::new(TiledData::new(sprite_size, frame, size, caps, DrawType::Tiled));
    *cache = Some(data.clone());
    data
}

/// Map a control pivot into sprite units when the sprite is stretched over the control.
fn pivot_in_sprite(pivot: Vec2, size: Size, sprite_size: Size) -> Vec2 {
    let axis = |p: f64, s: f64, sprite: f64| if s == 0.0 { 0.0 } else { p / (s / sprite) };
    Vec2::new(
        axis(pivot.x, size.width, sprite_size.width),
        axis(pivot.y, size.height, sprite_size.height),
    )
}

fn trunc(v: f64) -> f64 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Centering offsets are whole screen units."
    )]
    let t = v as i64;
    t as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use approx::assert_relative_eq;

    fn data(position: Point, size: Size) -> GeometricData {
        GeometricData::new(position, size, Vec2::ZERO, Vec2::new(1.0, 1.0), 0.0)
    }

    fn sprite(w: f64, h: f64) -> Rc<Sprite> {
        Rc::new(Sprite::new("test", Size::new(w, h), 1))
    }

    #[test]
    fn multiply_alpha_only_keeps_own_rgb() {
        let mut bg = Background::new();
        bg.set_color(Color::new(1.0, 0.0, 0.0, 0.5));
        bg.set_color_inherit(ColorInherit::MultiplyAlphaOnly);
        bg.set_parent_color(Color::new(0.0, 1.0, 0.0, 0.8));
        let c = bg.draw_color();
        assert_eq!((c.r, c.g, c.b), (1.0, 0.0, 0.0));
        assert_relative_eq!(c.a, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn every_inherit_rule_resolves_from_own_and_parent() {
        let own = Color::new(0.5, 0.5, 0.5, 0.5);
        let parent = Color::new(0.75, 0.25, 1.0, 0.75);
        let cases = [
            (ColorInherit::MultiplyOnParent, Color::new(0.375, 0.125, 0.5, 0.375)),
            (ColorInherit::AddToParent, Color::new(1.0, 0.75, 1.0, 1.0)),
            (ColorInherit::ReplaceToParent, parent),
            (ColorInherit::IgnoreParent, own),
            (ColorInherit::MultiplyAlphaOnly, Color::new(0.5, 0.5, 0.5, 0.375)),
            (ColorInherit::ReplaceAlphaOnly, Color::new(0.5, 0.5, 0.5, 0.75)),
        ];
        for (rule, expected) in cases {
            let mut bg = Background::new();
            bg.set_color(own);
            bg.set_color_inherit(rule);
            bg.set_parent_color(parent);
            assert_eq!(bg.draw_color(), expected, "{rule:?}");
        }
    }

    #[test]
    fn aligned_without_sprite_draws_nothing() {
        let mut bg = Background::new();
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::ZERO, Size::new(10.0, 10.0)), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn fill_draws_rect_or_polygon() {
        let mut bg = Background::new();
        bg.set_draw_type(DrawType::Fill);
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::new(5.0, 5.0), Size::new(10.0, 20.0)), &mut out);
        assert_eq!(
            out,
            vec![DrawCommand::FillRect {
                rect: kurbo::Rect::new(5.0, 5.0, 15.0, 25.0),
                color: Color::WHITE,
            }]
        );

        let rotated = GeometricData::new(
            Point::new(5.0, 5.0),
            Size::new(10.0, 20.0),
            Vec2::ZERO,
            Vec2::new(1.0, 1.0),
            0.5,
        );
        out.clear();
        bg.draw(&rotated, &mut out);
        assert!(matches!(out[0], DrawCommand::FillPolygon { .. }));
    }

    #[test]
    fn aligned_centers_and_honours_edges() {
        let mut bg = Background::new();
        bg.set_sprite(Some(sprite(10.0, 10.0)));
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::new(100.0, 100.0), Size::new(50.0, 30.0)), &mut out);
        let DrawCommand::Sprite { state, .. } = &out[0] else {
            panic!("expected a sprite command");
        };
        assert_eq!(state.position, Point::new(120.0, 110.0));

        bg.set_align(Align::RIGHT | Align::TOP);
        out.clear();
        bg.draw(&data(Point::new(100.0, 100.0), Size::new(50.0, 30.0)), &mut out);
        let DrawCommand::Sprite { state, .. } = &out[0] else {
            panic!("expected a sprite command");
        };
        assert_eq!(state.position, Point::new(140.0, 100.0));
    }

    #[test]
    fn scale_to_rect_stretches_sprite() {
        let mut bg = Background::new();
        bg.set_sprite(Some(sprite(10.0, 20.0)));
        bg.set_draw_type(DrawType::ScaleToRect);
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::ZERO, Size::new(40.0, 40.0)), &mut out);
        let DrawCommand::Sprite { state, .. } = &out[0] else {
            panic!("expected a sprite command");
        };
        assert_eq!(state.scale, Vec2::new(4.0, 2.0));
    }

    #[test]
    fn proportional_fits_or_covers() {
        let mut bg = Background::new();
        bg.set_sprite(Some(sprite(10.0, 10.0)));
        bg.set_draw_type(DrawType::ScaleProportional);
        let target = data(Point::ZERO, Size::new(40.0, 20.0));
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&target, &mut out);
        let DrawCommand::Sprite { state, .. } = &out[0] else {
            panic!("expected a sprite command");
        };
        assert_eq!(state.scale, Vec2::new(2.0, 2.0), "fit the height");
        assert_eq!(state.position, Point::new(10.0, 0.0), "centered horizontally");

        bg.set_draw_type(DrawType::ScaleProportionalOne);
        out.clear();
        bg.draw(&target, &mut out);
        let DrawCommand::Sprite { state, .. } = &out[0] else {
            panic!("expected a sprite command");
        };
        assert_eq!(state.scale, Vec2::new(4.0, 4.0), "cover the width");
    }

    #[test]
    fn frame_is_clamped_to_sprite_frames() {
        let mut bg = Background::new();
        bg.set_sprite(Some(Rc::new(Sprite::new("anim", Size::new(4.0, 4.0), 3))));
        bg.set_frame(7);
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::ZERO, Size::new(4.0, 4.0)), &mut out);
        let DrawCommand::Sprite { state, .. } = &out[0] else {
            panic!("expected a sprite command");
        };
        assert_eq!(state.frame, 2);
    }

    #[test]
    fn per_pixel_accuracy_enabled_snaps_when_still() {
        let mut bg = Background::new();
        bg.set_sprite(Some(sprite(4.0, 4.0)));
        bg.set_per_pixel_accuracy(PerPixelAccuracy::Enabled);
        let still = data(Point::new(3.0, 3.0), Size::new(4.0, 4.0));
        let mut snaps = Vec::new();
        for _ in 0..2 {
            let mut out: Vec<DrawCommand> = Vec::new();
            bg.draw(&still, &mut out);
            let DrawCommand::Sprite { state, .. } = &out[0] else {
                panic!("expected a sprite command");
            };
            snaps.push(state.per_pixel_accuracy);
        }
        assert_eq!(snaps, vec![false, true]);
    }

    #[test]
    fn stretch_data_is_cached_until_inputs_change() {
        let mut bg = Background::new();
        bg.set_sprite(Some(sprite(20.0, 20.0)));
        bg.set_draw_type(DrawType::StretchBoth);
        bg.set_left_right_stretch_cap(5.0);
        let target = data(Point::ZERO, Size::new(100.0, 50.0));
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&target, &mut out);
        bg.draw(&target, &mut out);
        let (DrawCommand::Stretched { data: a, .. }, DrawCommand::Stretched { data: b, .. }) =
            (&out[0], &out[1])
        else {
            panic!("expected stretched commands");
        };
        assert!(Rc::ptr_eq(a, b), "second draw reuses the cache");

        bg.set_draw_type(DrawType::StretchHorizontal);
        assert!(bg.stretch_data().is_none(), "draw type change releases data");
        assert!(bg.take_layout_invalidation());
        assert!(!bg.take_layout_invalidation());
    }

    #[test]
    fn batch_draw_consumes_queue() {
        let mut bg = Background::new();
        bg.set_draw_type(DrawType::Batch);
        bg.add_render_batch(BatchDescriptor {
            material: None,
            vertices: vec![Point::ZERO],
            indices: vec![0],
        });
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::ZERO, Size::new(1.0, 1.0)), &mut out);
        assert_eq!(out.len(), 1);
        assert!(bg.render_batches().is_empty());
    }

    #[test]
    fn clone_drops_cached_data() {
        let mut bg = Background::new();
        bg.set_sprite(Some(sprite(10.0, 10.0)));
        bg.set_draw_type(DrawType::Tiled);
        let mut out: Vec<DrawCommand> = Vec::new();
        bg.draw(&data(Point::ZERO, Size::new(30.0, 10.0)), &mut out);
        assert!(bg.tiled_data().is_some());
        let copy = bg.clone();
        assert!(copy.tiled_data().is_none());
        assert!(Rc::ptr_eq(copy.sprite().unwrap(), bg.sprite().unwrap()));
    }
}
