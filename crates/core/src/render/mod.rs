//! Frame composition.
//!
//! Renderers never touch the terminal. They write into a [`Canvas`] sized to
//! the geometry measured this tick, which clips every write, and the render
//! loop replays the resulting [`DrawCommand`]s on the backend.

mod modes;
mod panels;

pub use modes::{bars, radial, waveform, waveform_rows};

use crate::palette::Style;
use crate::state::Snapshot;
use crate::terminal::Viewport;

/// Number of consecutive frames each display mode stays on screen.
pub const FRAMES_PER_MODE: u64 = 100;

/// One positioned, styled string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCommand {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub style: Style,
}

/// Draw target for one frame. Writes outside the geometry are dropped.
#[derive(Debug, Clone)]
pub struct Canvas {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Plots a glyph inside the border; anything on or past the border is
    /// clipped.
    pub fn plot(&mut self, row: i32, col: i32, glyph: char, style: Style) {
        if self.viewport.interior_contains(row, col) {
            self.commands.push(DrawCommand {
                row: row as u16,
                col: col as u16,
                text: glyph.to_string(),
                style,
            });
        }
    }

    /// Writes text anywhere on screen, truncated at the right edge.
    pub fn text(&mut self, row: i32, col: i32, text: &str, style: Style) {
        if !self.viewport.contains(row, col) {
            return;
        }
        let room = (self.viewport.cols as i32 - col) as usize;
        let text: String = text.chars().take(room).collect();
        if text.is_empty() {
            return;
        }
        self.commands.push(DrawCommand {
            row: row as u16,
            col: col as u16,
            text,
            style,
        });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Glyph left at a cell once every command has been applied.
    pub fn glyph_at(&self, row: u16, col: u16) -> Option<char> {
        self.commands.iter().rev().find_map(|command| {
            let offset = col.checked_sub(command.col)? as usize;
            (command.row == row)
                .then(|| command.text.chars().nth(offset))
                .flatten()
        })
    }
}

/// The four display algorithms, rotated round-robin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Waveform,
    Bars,
    Radial,
    ParticleField,
}

impl DisplayMode {
    /// Mode shown at `frame`: `(frame / 100) mod 4`.
    pub fn for_frame(frame: u64) -> Self {
        match (frame / FRAMES_PER_MODE) % 4 {
            0 => DisplayMode::Waveform,
            1 => DisplayMode::Bars,
            2 => DisplayMode::Radial,
            _ => DisplayMode::ParticleField,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Waveform => "Waveform",
            DisplayMode::Bars => "Bars",
            DisplayMode::Radial => "Circle",
            DisplayMode::ParticleField => "Particles",
        }
    }
}

/// Composes a whole frame: the active mode, the particle overlay and the
/// chrome around them.
pub fn compose(snapshot: &Snapshot, viewport: Viewport) -> Canvas {
    let mut canvas = Canvas::new(viewport);
    let mode = DisplayMode::for_frame(snapshot.frame);

    match mode {
        DisplayMode::Waveform => waveform(&mut canvas, snapshot, viewport.rows as i32 / 3),
        DisplayMode::Bars => bars(&mut canvas, snapshot, panels::BAR_TOP_ROW),
        DisplayMode::Radial => radial(&mut canvas, snapshot),
        // Nothing beyond the overlay every mode gets.
        DisplayMode::ParticleField => {}
    }

    panels::particles(&mut canvas, snapshot);
    panels::title(&mut canvas);
    panels::message_log(&mut canvas, snapshot);
    panels::sound_status(&mut canvas, snapshot);
    panels::info_line(&mut canvas, snapshot, mode);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;
    use crate::particles::Particle;
    use crate::LogEntry;

    fn snapshot(frame: u64, log_len: usize) -> Snapshot {
        Snapshot {
            frame,
            log_len,
            log_capacity: 20,
            recent: (0..log_len.min(10))
                .map(|i| LogEntry::new("09:00:00", format!("/play2 ['{i}']")))
                .collect(),
            particles: Vec::new(),
            last_sound: String::new(),
            intensity: 0.0,
        }
    }

    #[test]
    fn mode_is_a_function_of_frame_only() {
        for frame in [0_u64, 1, 99, 100, 199, 200, 299, 300, 399, 400, 12_345, u64::MAX] {
            let expected = match (frame / 100) % 4 {
                0 => DisplayMode::Waveform,
                1 => DisplayMode::Bars,
                2 => DisplayMode::Radial,
                _ => DisplayMode::ParticleField,
            };
            assert_eq!(DisplayMode::for_frame(frame), expected, "frame {frame}");
        }
    }

    #[test]
    fn canvas_clips_plots_to_interior() {
        let mut canvas = Canvas::new(Viewport::new(10, 6));
        let style = Style::color(palette::WHITE);
        canvas.plot(0, 3, '█', style);
        canvas.plot(3, 9, '█', style);
        canvas.plot(-1, -1, '█', style);
        canvas.plot(2, 2, '●', style);

        assert_eq!(canvas.commands().len(), 1);
        assert_eq!(canvas.glyph_at(2, 2), Some('●'));
    }

    #[test]
    fn canvas_truncates_text_at_right_edge() {
        let mut canvas = Canvas::new(Viewport::new(8, 3));
        canvas.text(1, 5, "abcdef", Style::color(palette::CYAN));
        canvas.text(1, 8, "gone", Style::color(palette::CYAN));

        assert_eq!(canvas.commands().len(), 1);
        assert_eq!(canvas.commands()[0].text, "abc");
    }

    #[test]
    fn frame_has_chrome_in_every_mode() {
        let viewport = Viewport::new(80, 24);
        for frame in [5, 105, 205, 305] {
            let mut snap = snapshot(frame, 3);
            snap.last_sound = "bd".to_string();
            let canvas = compose(&snap, viewport);
            let texts: Vec<&str> = canvas.commands().iter().map(|c| c.text.as_str()).collect();

            assert!(texts.contains(&" OSC ASCII Visualizer for Tidal "));
            assert!(texts.contains(&"Recent OSC Messages:"));
            assert!(texts.iter().any(|t| t.starts_with(" Sound: bd ")));
            let mode = DisplayMode::for_frame(frame).label();
            let info = format!(" Frame: {frame} | Mode: {mode} | Messages: 3 ");
            assert!(texts.contains(&info.as_str()), "missing {info}");
        }
    }

    #[test]
    fn particle_overlay_is_drawn_in_every_mode() {
        let viewport = Viewport::new(40, 20);
        for frame in [0, 100, 200, 300] {
            let mut snap = snapshot(frame, 0);
            snap.particles.push(Particle {
                x: 7.6,
                y: 4.2,
                glyph: '◇',
                color: 4,
                velocity_y: 1.0,
                life: 1.0,
            });

            let canvas = compose(&snap, viewport);
            assert_eq!(canvas.glyph_at(4, 7), Some('◇'), "frame {frame}");
        }
    }

    #[test]
    fn every_command_stays_on_screen() {
        for (cols, rows) in [(1, 1), (3, 2), (9, 7), (80, 24), (200, 60)] {
            let viewport = Viewport::new(cols, rows);
            for frame in [0, 100, 200, 300] {
                let canvas = compose(&snapshot(frame, 20), viewport);
                for command in canvas.commands() {
                    assert!(command.row < rows && command.col < cols);
                    let end = command.col as usize + command.text.chars().count();
                    assert!(end <= cols as usize);
                }
            }
        }
    }
}
