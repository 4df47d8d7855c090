use crate::palette::{self, Style, GLYPHS_HIGH, GLYPHS_MID};
use crate::state::Snapshot;

const WAVE_TIME_STEP: f64 = 0.1;
const WAVE_SPACE_STEP: f64 = 0.2;
const WAVE_GAIN_PER_MESSAGE: f64 = 0.3;
const MAX_BARS: i32 = 10;
const DENSE_FRACTION: f32 = 0.7;
const RING_BASE_RADIUS: f64 = 5.0;
const RING_GROWTH_PER_MESSAGE: f64 = 0.5;
const RING_STEP_DEGREES: usize = 10;
/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 0.5;

/// `(col, row)` of the waveform sample for every column inside the border.
pub fn waveform_rows(
    frame: u64,
    log_len: usize,
    cols: u16,
    y_offset: i32,
) -> impl Iterator<Item = (i32, i32)> {
    let amplitude = log_len as f64 * WAVE_GAIN_PER_MESSAGE;
    let time = frame as f64 * WAVE_TIME_STEP;
    (1..cols as i32 - 1).map(move |x| {
        let phase = time + x as f64 * WAVE_SPACE_STEP;
        let y = (phase.sin() * amplitude).round() as i32 + y_offset;
        (x, y)
    })
}

/// Sine wave whose amplitude follows the number of logged messages.
pub fn waveform(canvas: &mut super::Canvas, snapshot: &Snapshot, y_offset: i32) {
    let glyph = GLYPHS_MID[(snapshot.frame % GLYPHS_MID.len() as u64) as usize];
    let style = Style::color(palette::YELLOW);
    let cols = canvas.viewport().cols;

    for (x, y) in waveform_rows(snapshot.frame, snapshot.log_len, cols, y_offset) {
        canvas.plot(y, x, glyph, style);
    }
}

/// Up to ten bars rising from the bottom, bar `i` standing for the messages
/// beyond the first `i`.
pub fn bars(canvas: &mut super::Canvas, snapshot: &Snapshot, y_start: i32) {
    let viewport = canvas.viewport();
    let (cols, rows) = (viewport.cols as i32, viewport.rows as i32);
    let num_bars = (cols / 4).min(MAX_BARS);
    if num_bars == 0 {
        return;
    }

    let bar_width = (cols - 2) / num_bars;
    let capacity = snapshot.log_capacity.max(1) as f32;
    let span = (rows - y_start - 2).max(0) as f32;

    for i in 0..num_bars {
        let activity = snapshot.log_len.saturating_sub(i as usize) as f32;
        let height = (activity / capacity * span) as i32;
        let x = 1 + i * bar_width;
        let style = Style::color((i % 6) as u8 + 1);

        for h in 0..height {
            let y = rows - 2 - h;
            if y <= y_start {
                break;
            }
            let glyph = if (h as f32) < height as f32 * DENSE_FRACTION {
                '█'
            } else {
                '▓'
            };
            for dx in 0..bar_width - 1 {
                canvas.plot(y, x + dx, glyph, style);
            }
        }
    }
}

/// Ring centred on screen, sampled every ten degrees.
pub fn radial(canvas: &mut super::Canvas, snapshot: &Snapshot) {
    if snapshot.log_len == 0 {
        return;
    }

    let viewport = canvas.viewport();
    let cx = (viewport.cols / 2) as f64;
    let cy = (viewport.rows / 2) as f64;
    let radius =
        (RING_BASE_RADIUS + snapshot.log_len as f64 * RING_GROWTH_PER_MESSAGE).trunc();

    for angle in (0..360).step_by(RING_STEP_DEGREES) {
        let rad = (angle as f64).to_radians();
        let x = (cx + radius * rad.cos()) as i32;
        let y = (cy + radius * rad.sin() * CELL_ASPECT) as i32;
        let glyph = GLYPHS_HIGH[angle % GLYPHS_HIGH.len()];
        let style = Style::color(((angle / 60) % 6) as u8 + 1);
        canvas.plot(y, x, glyph, style);
    }
}
