#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scrolling, zooming camera shared by the world and build views.
//!
//! All screen-space conversions go through [`Camera::screen_to_grid`] and
//! [`Camera::tile_screen_rect`], so every consumer (placement, highlighting,
//! the debug overlay) agrees on which tile lies under a pixel.

use std::{ops::Range, time::Duration};

use glam::Vec2;
use gridforge_core::{GridPoint, GridSize, ScreenRect, TileCoord};
use serde::Deserialize;

const ZOOM_EPSILON: f32 = 1e-4;

/// How the camera steps between zoom factors.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoomModel {
    /// Fixed, ordered zoom levels; wheel deltas step between them.
    Discrete {
        /// Zoom factors in ascending order.
        levels: Vec<f32>,
        /// Wheel delta corresponding to one level.
        step: f32,
    },
    /// Any factor within `[min, max]`.
    Continuous {
        /// Smallest allowed zoom factor.
        min: f32,
        /// Largest allowed zoom factor.
        max: f32,
        /// Zoom change per unit of wheel delta.
        wheel_step: f32,
    },
}

impl Default for ZoomModel {
    fn default() -> Self {
        Self::Discrete {
            levels: vec![0.5, 1.0, 1.5, 2.0],
            step: 0.5,
        }
    }
}

impl ZoomModel {
    fn initial(&self) -> f32 {
        match self {
            Self::Discrete { levels, .. } => {
                if levels.iter().any(|level| (level - 1.0).abs() < ZOOM_EPSILON) {
                    1.0
                } else {
                    levels.first().copied().unwrap_or(1.0)
                }
            }
            Self::Continuous { min, max, .. } => 1.0_f32.clamp(min.min(*max), max.max(*min)),
        }
    }

    fn next(&self, current: f32, delta: f32) -> f32 {
        match self {
            Self::Discrete { levels, step } => {
                let Some(nearest) = nearest_level(levels, current) else {
                    return current;
                };
                if *step <= 0.0 || !delta.is_finite() {
                    return current;
                }
                let steps = (delta / step).round() as i64;
                let last = levels.len().saturating_sub(1) as i64;
                let index = (nearest as i64).saturating_add(steps).clamp(0, last);
                levels.get(index as usize).copied().unwrap_or(current)
            }
            Self::Continuous {
                min,
                max,
                wheel_step,
            } => {
                if !delta.is_finite() {
                    return current;
                }
                (current + delta * wheel_step).clamp(min.min(*max), max.max(*min))
            }
        }
    }
}

fn nearest_level(levels: &[f32], zoom: f32) -> Option<usize> {
    levels
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - zoom).abs().total_cmp(&(*b - zoom).abs()))
        .map(|(index, _)| index)
}

/// Tunables for scrolling and zooming.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Edge length of one tile at zoom 1.0, in pixels.
    pub tile_size: f32,
    /// Zoom stepping behaviour.
    pub zoom: ZoomModel,
    /// Scroll acceleration applied per unit of directional input, in px/s².
    pub acceleration: f32,
    /// Upper bound on scroll speed, in px/s.
    pub max_speed: f32,
    /// Velocity multiplier applied per tick on axes without input.
    pub friction: f32,
    /// Speed below which an axis snaps to rest, in px/s.
    pub rest_threshold: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            zoom: ZoomModel::default(),
            acceleration: 2000.0,
            max_speed: 600.0,
            friction: 0.85,
            rest_threshold: 5.0,
        }
    }
}

/// Screen area the camera renders into.
///
/// The offsets reserve space for HUD bars above and below the grid view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Full window width in pixels.
    pub width: f32,
    /// Full window height in pixels.
    pub height: f32,
    /// Pixels reserved at the top of the window.
    pub top_offset: f32,
    /// Pixels reserved at the bottom of the window.
    pub bottom_offset: f32,
}

impl Viewport {
    /// Creates a viewport without reserved bars.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            top_offset: 0.0,
            bottom_offset: 0.0,
        }
    }

    /// Returns the viewport with the provided reserved bars.
    #[must_use]
    pub const fn with_offsets(mut self, top_offset: f32, bottom_offset: f32) -> Self {
        self.top_offset = top_offset;
        self.bottom_offset = bottom_offset;
        self
    }

    /// Size of the area that shows the grid.
    #[must_use]
    pub fn visible_size(&self) -> Vec2 {
        Vec2::new(
            self.width,
            (self.height - self.top_offset - self.bottom_offset).max(0.0),
        )
    }
}

/// Range of tiles that intersect the viewport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleTiles {
    /// Visible columns.
    pub columns: Range<u32>,
    /// Visible rows.
    pub rows: Range<u32>,
}

impl VisibleTiles {
    /// Iterates visible tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.rows.clone().flat_map(move |row| {
            self.columns
                .clone()
                .map(move |column| TileCoord::new(column, row))
        })
    }

    /// Whether no tile is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Momentum-scrolling camera over a fixed-size grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    world: GridSize,
    viewport: Viewport,
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    zoom: f32,
}

impl Camera {
    /// Creates a camera at the top-left of the grid.
    #[must_use]
    pub fn new(config: CameraConfig, world: GridSize, viewport: Viewport) -> Self {
        let zoom = config.zoom.initial();
        let mut camera = Self {
            config,
            world,
            viewport,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            zoom,
        };
        camera.clamp();
        camera
    }

    /// Tunables the camera was created with.
    #[must_use]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// World-space pixel offset of the viewport's top-left corner.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current scroll velocity in px/s.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Current zoom factor.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Screen area the camera renders into.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Edge length of one tile on screen.
    #[must_use]
    pub fn tile_pixels(&self) -> f32 {
        self.config.tile_size * self.zoom
    }

    /// Converts a window pixel into the grid coordinate beneath it.
    ///
    /// The result may lie outside the grid; callers validate it.
    #[must_use]
    pub fn screen_to_grid(&self, pixel: Vec2) -> GridPoint {
        let tile = self.tile_pixels();
        let world = self.position + Vec2::new(pixel.x, pixel.y - self.viewport.top_offset);
        GridPoint::new(
            (world.x / tile).floor() as i32,
            (world.y / tile).floor() as i32,
        )
    }

    /// Window-space rectangle covered by the tile at `point`.
    #[must_use]
    pub fn tile_screen_rect(&self, point: GridPoint) -> ScreenRect {
        let tile = self.tile_pixels();
        ScreenRect::new(
            point.x() as f32 * tile - self.position.x,
            point.y() as f32 * tile - self.position.y + self.viewport.top_offset,
            tile,
            tile,
        )
    }

    /// Whether a window pixel lies inside the grid view rather than a HUD bar.
    #[must_use]
    pub fn in_view(&self, pixel: Vec2) -> bool {
        pixel.x >= 0.0
            && pixel.x < self.viewport.width
            && pixel.y >= self.viewport.top_offset
            && pixel.y < self.viewport.height - self.viewport.bottom_offset
    }

    /// Tiles that intersect the grid view, clipped to the grid bounds.
    #[must_use]
    pub fn visible_tiles(&self) -> VisibleTiles {
        let visible = self.viewport.visible_size();
        let tile = self.tile_pixels();
        if tile <= 0.0 {
            return VisibleTiles {
                columns: 0..0,
                rows: 0..0,
            };
        }
        let first = (self.position / tile).floor();
        let last = ((self.position + visible) / tile).ceil();
        let axis = |from: f32, to: f32, limit: u32| -> Range<u32> {
            let limit = limit as f32;
            (from.clamp(0.0, limit) as u32)..(to.clamp(0.0, limit) as u32)
        };
        VisibleTiles {
            columns: axis(first.x, last.x, self.world.columns),
            rows: axis(first.y, last.y, self.world.rows),
        }
    }

    /// Replaces the viewport, e.g. after a window resize or HUD change.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clamp();
    }

    /// Sets scroll acceleration from directional input in `[-1, 1]` per axis.
    pub fn accelerate(&mut self, direction: Vec2) {
        self.acceleration = direction.clamp(Vec2::NEG_ONE, Vec2::ONE) * self.config.acceleration;
    }

    /// Moves the camera by screen-space pixels, as used for drag panning.
    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.position += delta;
        }
        self.clamp();
    }

    /// Steps the zoom by `delta` wheel units, keeping the world point under
    /// `anchor` fixed on screen.
    ///
    /// Returns `false` when the zoom factor did not change.
    pub fn adjust_zoom(&mut self, delta: f32, anchor: Vec2) -> bool {
        let old = self.zoom;
        let new = self.config.zoom.next(old, delta);
        if (new - old).abs() < ZOOM_EPSILON || new <= 0.0 {
            return false;
        }

        let anchor_offset = Vec2::new(anchor.x, anchor.y - self.viewport.top_offset);
        let unscaled = (self.position + anchor_offset) / old;
        self.zoom = new;
        self.position = unscaled * new - anchor_offset;
        self.clamp();
        true
    }

    /// Integrates acceleration and velocity over `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let max_speed = self.config.max_speed;

        self.velocity += self.acceleration * seconds;
        self.velocity = self
            .velocity
            .clamp(Vec2::splat(-max_speed), Vec2::splat(max_speed));
        let speed = self.velocity.length();
        if speed > max_speed && speed > 0.0 {
            self.velocity *= max_speed / speed;
        }

        // Coasting axes decay and eventually settle; driven axes keep their speed.
        if self.acceleration.x == 0.0 {
            self.velocity.x = self.decay(self.velocity.x);
        }
        if self.acceleration.y == 0.0 {
            self.velocity.y = self.decay(self.velocity.y);
        }

        self.position += self.velocity * seconds;
        self.clamp();
    }

    fn decay(&self, speed: f32) -> f32 {
        let speed = speed * self.config.friction;
        if speed.abs() < self.config.rest_threshold {
            0.0
        } else {
            speed
        }
    }

    /// Restricts the position to at most one tile of margin past each edge.
    pub fn clamp(&mut self) {
        let tile = self.tile_pixels();
        let world = Vec2::new(self.world.columns as f32, self.world.rows as f32) * tile;
        let min = Vec2::splat(-tile);
        let max = (world - self.viewport.visible_size() + Vec2::splat(tile)).max(min);
        self.position = if self.position.is_finite() {
            self.position.clamp(min, max)
        } else {
            min
        };
    }
}
