use super::{Canvas, DisplayMode};
use crate::palette::{self, Style};
use crate::state::Snapshot;

/// Bars never rise above this row, leaving room for the status lines.
pub(super) const BAR_TOP_ROW: i32 = 5;

const TITLE: &str = " OSC ASCII Visualizer for Tidal ";
const LOG_HEADER: &str = "Recent OSC Messages:";
const METER_CELLS: usize = 5;

pub(super) fn particles(canvas: &mut Canvas, snapshot: &Snapshot) {
    for particle in &snapshot.particles {
        canvas.plot(
            particle.y as i32,
            particle.x as i32,
            particle.glyph,
            Style::color(particle.display_color()),
        );
    }
}

pub(super) fn title(canvas: &mut Canvas) {
    let cols = canvas.viewport().cols as i32;
    let len = TITLE.chars().count() as i32;
    if len < cols {
        canvas.text(
            0,
            (cols - len) / 2,
            TITLE,
            Style::color(palette::MAGENTA).bold(),
        );
    }
}

/// Most recent messages, anchored to the bottom third of the screen.
pub(super) fn message_log(canvas: &mut Canvas, snapshot: &Snapshot) {
    let viewport = canvas.viewport();
    let (cols, rows) = (viewport.cols as i32, viewport.rows as i32);
    let panel_height = (snapshot.log_len as i32 + 2).min(rows / 3);
    let top = rows - panel_height;

    canvas.text(top, 1, LOG_HEADER, Style::color(palette::GREEN).bold());

    let width = (cols - 3).max(0) as usize;
    for (i, entry) in snapshot.recent.iter().enumerate() {
        let y = top + 1 + i as i32;
        if y >= rows - 1 {
            break;
        }
        let line: String = entry.display_line().chars().take(width).collect();
        canvas.text(y, 1, &line, Style::color(palette::CYAN));
    }
}

pub(super) fn sound_status(canvas: &mut Canvas, snapshot: &Snapshot) {
    if snapshot.last_sound.is_empty() {
        return;
    }

    let status = format!(" Sound: {} ", snapshot.last_sound);
    canvas.text(1, 2, &status, Style::color(palette::RED));

    let lit = ((snapshot.intensity * METER_CELLS as f32).round() as usize).min(METER_CELLS);
    let meter = format!("{}{}", "▮".repeat(lit), "▯".repeat(METER_CELLS - lit));
    let col = 2 + status.chars().count() as i32;
    canvas.text(1, col, &meter, Style::color(palette::WHITE));
}

pub(super) fn info_line(canvas: &mut Canvas, snapshot: &Snapshot, mode: DisplayMode) {
    let viewport = canvas.viewport();
    let info = format!(
        " Frame: {} | Mode: {} | Messages: {} ",
        snapshot.frame,
        mode.label(),
        snapshot.log_len
    );
    if (info.chars().count() as i32) < viewport.cols as i32 - 2 {
        canvas.text(
            viewport.rows as i32 - 1,
            2,
            &info,
            Style::color(palette::BLUE),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::Viewport;
    use crate::LogEntry;

    fn snapshot(log_len: usize) -> Snapshot {
        Snapshot {
            frame: 42,
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
    fn log_panel_grows_with_messages_up_to_a_third() {
        let mut canvas = Canvas::new(Viewport::new(80, 30));
        message_log(&mut canvas, &snapshot(3));
        let header = &canvas.commands()[0];
        assert_eq!((header.row, header.text.as_str()), (25, LOG_HEADER));
        assert_eq!(canvas.commands().len(), 4);
        assert_eq!(canvas.commands()[1].text, "09:00:00 /play2 ['0']");

        let mut canvas = Canvas::new(Viewport::new(80, 30));
        message_log(&mut canvas, &snapshot(20));
        assert_eq!(canvas.commands()[0].row, 20);
        // Header plus eight lines before hitting the bottom border.
        assert_eq!(canvas.commands().len(), 9);
    }

    #[test]
    fn log_lines_are_truncated_to_width() {
        let mut canvas = Canvas::new(Viewport::new(12, 30));
        message_log(&mut canvas, &snapshot(1));
        assert_eq!(canvas.commands()[1].text, "09:00:00 ");
    }

    #[test]
    fn sound_line_carries_intensity_meter() {
        let mut snap = snapshot(1);
        snap.last_sound = "bd".to_string();
        snap.intensity = 0.6;

        let mut canvas = Canvas::new(Viewport::new(80, 24));
        sound_status(&mut canvas, &snap);

        let texts: Vec<_> = canvas.commands().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec![" Sound: bd ", "▮▮▮▯▯"]);
        assert_eq!(canvas.commands()[1].col, 13);
    }

    #[test]
    fn no_sound_no_status() {
        let mut canvas = Canvas::new(Viewport::new(80, 24));
        sound_status(&mut canvas, &snapshot(1));
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn title_and_info_need_room() {
        let mut canvas = Canvas::new(Viewport::new(20, 10));
        title(&mut canvas);
        info_line(&mut canvas, &snapshot(0), DisplayMode::Bars);
        assert!(canvas.commands().is_empty());

        let mut canvas = Canvas::new(Viewport::new(80, 24));
        title(&mut canvas);
        info_line(&mut canvas, &snapshot(0), DisplayMode::Bars);
        assert_eq!(canvas.commands()[0].col, 24);
        assert_eq!(canvas.commands()[1].row, 23);
        assert_eq!(
            canvas.commands()[1].text,
            " Frame: 42 | Mode: Bars | Messages: 0 "
        );
    }
}
