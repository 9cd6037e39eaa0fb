#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Gridforge adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use gridforge_core::{Highlight, PlayMode, Rgb, ScreenRect, Terrain, TileClass};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

/// Window clear color.
pub const BACKGROUND: Rgb = Rgb::new(230, 240, 255);
/// Fill of an occupied tile.
pub const OCCUPIED_FILL: Rgb = Rgb::new(255, 255, 150);
/// Fill of a basic tile.
pub const BASIC_FILL: Rgb = Rgb::new(130, 200, 250);
/// Fill of a tile covered by a valid placement preview.
pub const BUILDABLE_FILL: Rgb = Rgb::new(180, 255, 180);
/// Fill of a tile covered by a rejected placement preview.
pub const INVALID_FILL: Rgb = Rgb::new(255, 150, 150);
/// Fill of any terrain without a dedicated color.
pub const UNKNOWN_FILL: Rgb = Rgb::new(100, 100, 100);
/// Amount added to every channel of the hovered tile.
pub const HOVER_BRIGHTEN: u8 = 40;
/// Text color of the HUD.
pub const HUD_TEXT: Rgb = Rgb::new(20, 20, 20);
/// Background of the HUD bars.
pub const HUD_BACKGROUND: Rgb = Rgb::new(200, 200, 200);

/// Base fill of a tile before any highlight is applied.
#[must_use]
pub fn terrain_fill(terrain: &Terrain) -> Rgb {
    match (terrain.class(), terrain.subtype()) {
        (TileClass::Basic, _) => BASIC_FILL,
        (TileClass::Resource, Some("iron")) => Rgb::new(130, 130, 130),
        (TileClass::Resource, Some("coal")) => Rgb::new(30, 30, 30),
        (TileClass::Resource, Some("limestone")) => Rgb::new(200, 200, 120),
        (TileClass::Resource, _) => UNKNOWN_FILL,
    }
}

/// Fill color of a tile given its terrain, occupancy and highlight.
///
/// Preview highlights replace the base fill, hover brightens it.
#[must_use]
pub fn tile_fill(terrain: &Terrain, occupied: bool, highlight: Highlight) -> Rgb {
    let base = if occupied {
        OCCUPIED_FILL
    } else {
        terrain_fill(terrain)
    };
    match highlight {
        Highlight::None => base,
        Highlight::Hover => base.brightened(HOVER_BRIGHTEN),
        Highlight::Buildable => BUILDABLE_FILL,
        Highlight::Invalid => INVALID_FILL,
    }
}

/// Occupant inset in screen pixels for a given zoom factor.
#[must_use]
pub fn occupant_inset(zoom: f32) -> f32 {
    4.0 * zoom
}

/// Geometry of the heads-up display surrounding the grid view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudLayout {
    top_height: f32,
    bottom_height: f32,
}

impl HudLayout {
    /// Vertical space taken by one debug line.
    pub const LINE_HEIGHT: f32 = 20.0;
    /// Padding above and below the debug lines.
    pub const PADDING: f32 = 5.0;
    /// Height of the palette panel.
    pub const PANEL_HEIGHT: f32 = 120.0;
    /// Size of a palette button.
    pub const BUTTON_SIZE: Vec2 = Vec2::new(100.0, 80.0);
    /// Horizontal gap between palette buttons.
    pub const BUTTON_GAP: f32 = 10.0;
    /// Distance from the panel top to the buttons.
    pub const BUTTON_TOP: f32 = 20.0;

    /// Layout reserving room for `debug_lines` lines of text.
    #[must_use]
    pub fn for_debug_lines(debug_lines: usize) -> Self {
        Self {
            top_height: debug_lines as f32 * Self::LINE_HEIGHT + 2.0 * Self::PADDING,
            bottom_height: Self::PANEL_HEIGHT,
        }
    }

    /// Height of the top debug bar.
    #[must_use]
    pub const fn top_height(&self) -> f32 {
        self.top_height
    }

    /// Height of the bottom palette panel.
    #[must_use]
    pub const fn bottom_height(&self) -> f32 {
        self.bottom_height
    }

    /// Baseline of debug line `index`.
    #[must_use]
    pub fn debug_line_origin(&self, index: usize) -> Vec2 {
        Vec2::new(
            2.0 * Self::PADDING,
            Self::PADDING + (index as f32 + 1.0) * Self::LINE_HEIGHT - 5.0,
        )
    }

    /// Rectangle of the top bar.
    #[must_use]
    pub fn top_bar(&self, screen: Vec2) -> ScreenRect {
        ScreenRect::new(0.0, 0.0, screen.x, self.top_height)
    }

    /// Rectangle of the palette panel.
    #[must_use]
    pub fn panel(&self, screen: Vec2) -> ScreenRect {
        ScreenRect::new(
            0.0,
            screen.y - self.bottom_height,
            screen.x,
            self.bottom_height,
        )
    }

    /// Rectangle of palette button `index`.
    #[must_use]
    pub fn palette_button(&self, screen: Vec2, index: usize) -> ScreenRect {
        let panel = self.panel(screen);
        ScreenRect::new(
            Self::BUTTON_GAP + index as f32 * (Self::BUTTON_SIZE.x + Self::BUTTON_GAP),
            panel.y + Self::BUTTON_TOP,
            Self::BUTTON_SIZE.x,
            Self::BUTTON_SIZE.y,
        )
    }

    /// Palette button under `pointer`, among `count` buttons.
    #[must_use]
    pub fn palette_hit(&self, screen: Vec2, count: usize, pointer: Vec2) -> Option<usize> {
        (0..count).find(|&index| {
            self.palette_button(screen, index)
                .contains(pointer.x, pointer.y)
        })
    }
}

/// Raw input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position in window pixels.
    pub pointer: Vec2,
    /// Window size in pixels.
    pub screen: Vec2,
    /// Left button went down this frame.
    pub primary_pressed: bool,
    /// Right button went down this frame.
    pub secondary_pressed: bool,
    /// Middle button is held.
    pub pan_held: bool,
    /// Wheel movement this frame, positive away from the user.
    pub wheel: f32,
    /// Held direction keys, each axis in `[-1, 1]`.
    pub scroll: Vec2,
    /// Mode toggle key pressed.
    pub mode_toggle: bool,
    /// Blueprint extraction key pressed.
    pub extract: bool,
    /// Rotation key pressed.
    pub rotate: bool,
    /// Horizontal flip key pressed.
    pub flip_horizontal: bool,
    /// Vertical flip key pressed.
    pub flip_vertical: bool,
    /// Selection cancel key pressed.
    pub cancel: bool,
}

/// Filled rectangle drawn on top of a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupantPresentation {
    /// Screen rectangle, already inset.
    pub rect: ScreenRect,
    /// Fill color.
    pub color: Color,
}

/// Visible tile prepared for drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Screen rectangle of the tile.
    pub rect: ScreenRect,
    /// Base fill.
    pub fill: Color,
    /// Instance drawn on the tile, if any.
    pub occupant: Option<OccupantPresentation>,
}

/// Translucent outline of the selected placeable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostPresentation {
    /// Screen rectangle of one footprint cell.
    pub rect: ScreenRect,
    /// Color of the component being placed.
    pub color: Color,
    /// Whether the cell accepts the placement.
    pub valid: bool,
}

/// Palette button prepared for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteEntryPresentation {
    /// Button text.
    pub label: String,
    /// Swatch color.
    pub color: Color,
    /// Button rectangle.
    pub rect: ScreenRect,
    /// Whether the entry is the current selection.
    pub selected: bool,
}

/// Everything the backend draws in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Active play mode.
    pub play_mode: PlayMode,
    /// Visible tiles.
    pub tiles: Vec<TilePresentation>,
    /// Placement ghost for the selection.
    pub ghosts: Vec<GhostPresentation>,
    /// Palette buttons.
    pub palette: Vec<PaletteEntryPresentation>,
    /// Text lines of the top bar.
    pub debug_lines: Vec<String>,
    /// HUD geometry.
    pub hud: HudLayout,
}

impl Scene {
    /// Creates an empty scene for `play_mode`.
    #[must_use]
    pub fn new(play_mode: PlayMode, hud: HudLayout) -> Self {
        Self {
            play_mode,
            tiles: Vec::new(),
            ghosts: Vec::new(),
            palette: Vec::new(),
            debug_lines: Vec::new(),
            hud,
        }
    }

    /// Drops the per-frame content while keeping allocations.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.ghosts.clear();
        self.palette.clear();
        self.debug_lines.clear();
    }
}

/// Window size requested from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    width: u32,
    height: u32,
}

impl WindowSize {
    /// Validates and creates a window size.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width == 0 || height == 0 {
            return Err(RenderingError::InvalidWindowSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Top-level description of the presentation surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Requested window size.
    pub window_size: WindowSize,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, window_size: WindowSize, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_size,
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Gridforge scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Both window dimensions must be positive.
    InvalidWindowSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWindowSize { width, height } => {
                write!(
                    f,
                    "window size must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
