#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Gridforge.
//!
//! The factory builder is silent, so macroquad is pulled in without its
//! default `audio` feature and no ALSA headers are needed to build it.

use anyhow::Result;
use glam::Vec2;
use gridforge_core::ScreenRect;
use gridforge_rendering::{
    Color, FrameInput, GhostPresentation, PaletteEntryPresentation, Presentation,
    RenderingBackend, Scene, TilePresentation, HUD_BACKGROUND, HUD_TEXT,
};
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, is_mouse_button_pressed, mouse_position,
    mouse_wheel, KeyCode, MouseButton,
};
use std::time::Duration;

const DEBUG_FONT_SIZE: f32 = 20.0;
const LABEL_FONT_SIZE: f32 = 16.0;
const GHOST_ALPHA: f32 = 0.5;
const SELECTION_OUTLINE: f32 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct KeyboardShortcuts {
    /// `Q` quits the frame loop.
    quit_requested: bool,
    /// `B` switches between world and build mode.
    mode_toggle: bool,
    /// `E` captures the build grid as a blueprint.
    extract: bool,
    /// `R` rotates the selected blueprint.
    rotate: bool,
    /// `H` mirrors the selected blueprint horizontally.
    flip_horizontal: bool,
    /// `V` mirrors the selected blueprint vertically.
    flip_vertical: bool,
    /// `Escape` clears the selection.
    cancel: bool,
    /// `WASD` or arrow keys held.
    scroll: Vec2,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let axis = |negative: [KeyCode; 2], positive: [KeyCode; 2]| {
            let held = |keys: [KeyCode; 2]| keys.into_iter().any(is_key_down);
            f32::from(u8::from(held(positive))) - f32::from(u8::from(held(negative)))
        };

        Self {
            quit_requested: is_key_pressed(KeyCode::Q),
            mode_toggle: is_key_pressed(KeyCode::B),
            extract: is_key_pressed(KeyCode::E),
            rotate: is_key_pressed(KeyCode::R),
            flip_horizontal: is_key_pressed(KeyCode::H),
            flip_vertical: is_key_pressed(KeyCode::V),
            cancel: is_key_pressed(KeyCode::Escape),
            scroll: Vec2::new(
                axis(
                    [KeyCode::A, KeyCode::Left],
                    [KeyCode::D, KeyCode::Right],
                ),
                axis([KeyCode::W, KeyCode::Up], [KeyCode::S, KeyCode::Down]),
            ),
        }
    }
}

/// Mouse state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MouseObservation {
    position: Vec2,
    left_pressed: bool,
    right_pressed: bool,
    middle_down: bool,
    wheel: f32,
}

impl MouseObservation {
    fn poll() -> Self {
        let (x, y) = mouse_position();
        let (_, wheel) = mouse_wheel();
        Self {
            position: Vec2::new(x, y),
            left_pressed: is_mouse_button_pressed(MouseButton::Left),
            right_pressed: is_mouse_button_pressed(MouseButton::Right),
            middle_down: is_mouse_button_down(MouseButton::Middle),
            wheel,
        }
    }
}

fn gather_frame_input(
    keyboard: KeyboardShortcuts,
    mouse: MouseObservation,
    screen: Vec2,
) -> FrameInput {
    FrameInput {
        pointer: mouse.position,
        screen,
        primary_pressed: mouse.left_pressed,
        secondary_pressed: mouse.right_pressed,
        pan_held: mouse.middle_down,
        wheel: wheel_steps(mouse.wheel),
        scroll: keyboard.scroll,
        mode_toggle: keyboard.mode_toggle,
        extract: keyboard.extract,
        rotate: keyboard.rotate,
        flip_horizontal: keyboard.flip_horizontal,
        flip_vertical: keyboard.flip_vertical,
        cancel: keyboard.cancel,
    }
}

/// Reduces raw wheel deltas, whose scale differs per platform, to one step per notch.
fn wheel_steps(raw: f32) -> f32 {
    if raw > 0.0 {
        1.0
    } else if raw < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Counts presented frames and reports the rate once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, dt: Duration) -> Option<f32> {
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(fps)
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            window_size,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.width()).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_size.height()).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(keyboard, MouseObservation::poll(), screen);

                update_scene(frame_dt, frame_input, &mut scene);

                draw_tiles(&scene.tiles);
                draw_ghosts(&scene.ghosts);
                draw_hud(&scene, screen);

                if let Some(fps) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        println!("FPS: {fps:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn fill_rect(rect: ScreenRect, color: Color) {
    macroquad::shapes::draw_rectangle(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        to_macroquad_color(color),
    );
}

fn outline_rect(rect: ScreenRect, thickness: f32, color: Color) {
    macroquad::shapes::draw_rectangle_lines(
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        thickness,
        to_macroquad_color(color),
    );
}

fn draw_label(text: &str, origin: Vec2, font_size: f32, color: Color) {
    let _ = macroquad::text::draw_text(
        text,
        origin.x,
        origin.y,
        font_size,
        to_macroquad_color(color),
    );
}

fn draw_tiles(tiles: &[TilePresentation]) {
    for tile in tiles {
        fill_rect(tile.rect, tile.fill);
        if let Some(occupant) = tile.occupant {
            fill_rect(occupant.rect, occupant.color);
        }
    }
}

fn draw_ghosts(ghosts: &[GhostPresentation]) {
    for ghost in ghosts {
        fill_rect(ghost.rect, ghost.color.with_alpha(GHOST_ALPHA));
    }
}

fn draw_hud(scene: &Scene, screen: Vec2) {
    let hud_background = Color::from(HUD_BACKGROUND);
    let text = Color::from(HUD_TEXT);

    fill_rect(scene.hud.top_bar(screen), hud_background);
    for (index, line) in scene.debug_lines.iter().enumerate() {
        draw_label(line, scene.hud.debug_line_origin(index), DEBUG_FONT_SIZE, text);
    }

    fill_rect(scene.hud.panel(screen), hud_background);
    draw_palette(&scene.palette, text);
}

fn draw_palette(entries: &[PaletteEntryPresentation], text: Color) {
    for entry in entries {
        fill_rect(entry.rect, entry.color);
        if entry.selected {
            outline_rect(entry.rect, SELECTION_OUTLINE, text);
        }
        draw_label(
            &entry.label,
            Vec2::new(entry.rect.x + 4.0, entry.rect.y + entry.rect.height + LABEL_FONT_SIZE),
            LABEL_FONT_SIZE,
            text,
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
