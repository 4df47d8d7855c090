use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};

use crate::palette::{self, Style};
use crate::render::DrawCommand;
use crate::Result;

/// Terminal geometry in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Whether `(row, col)` addresses a cell on screen.
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && row < self.rows as i32 && col < self.cols as i32
    }

    /// Whether `(row, col)` lies inside the border, i.e. in
    /// `[1, rows-2] x [1, cols-2]`.
    pub fn interior_contains(&self, row: i32, col: i32) -> bool {
        row >= 1 && col >= 1 && row <= self.rows as i32 - 2 && col <= self.cols as i32 - 2
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

/// A single key press as seen by the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    Escape,
    /// Ctrl-C, which raw mode delivers as a key instead of a signal.
    Interrupt,
}

impl KeyPress {
    pub fn is_quit(self) -> bool {
        matches!(self, KeyPress::Char('q') | KeyPress::Escape | KeyPress::Interrupt)
    }
}

/// Capabilities the render loop needs from a terminal.
///
/// Writes outside the current geometry must be clipped by the
/// implementation, never reported as errors.
pub trait TerminalBackend {
    fn size(&mut self) -> Result<Viewport>;
    fn clear(&mut self) -> Result<()>;
    fn draw_border(&mut self) -> Result<()>;
    fn write(&mut self, command: &DrawCommand) -> Result<()>;
    /// Returns at most one pending key press without blocking.
    fn poll_key(&mut self) -> Result<Option<KeyPress>>;
    fn hide_cursor(&mut self) -> Result<()>;
    fn show_cursor(&mut self) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// [`TerminalBackend`] drawing to stdout through crossterm.
///
/// Entering puts the terminal into raw mode on the alternate screen; the
/// previous state is restored when the value is dropped, including on panic
/// unwind and error paths.
pub struct CrosstermTerminal {
    out: Stdout,
    viewport: Viewport,
}

impl CrosstermTerminal {
    pub fn enter() -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        let (cols, rows) = terminal::size()?;

        Ok(Self {
            out,
            viewport: Viewport::new(cols, rows),
        })
    }
}

impl TerminalBackend for CrosstermTerminal {
    fn size(&mut self) -> Result<Viewport> {
        let (cols, rows) = terminal::size()?;
        self.viewport = Viewport::new(cols, rows);
        Ok(self.viewport)
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.out, ResetColor, terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn draw_border(&mut self) -> Result<()> {
        let Viewport { cols, rows } = self.viewport;
        if cols < 2 || rows < 2 {
            return Ok(());
        }

        let horizontal = "─".repeat(cols as usize - 2);
        queue!(
            self.out,
            SetForegroundColor(Color::Grey),
            cursor::MoveTo(0, 0),
            Print(format!("┌{horizontal}┐")),
            cursor::MoveTo(0, rows - 1),
            Print(format!("└{horizontal}┘")),
        )?;
        for row in 1..rows - 1 {
            queue!(
                self.out,
                cursor::MoveTo(0, row),
                Print('│'),
                cursor::MoveTo(cols - 1, row),
                Print('│'),
            )?;
        }
        queue!(self.out, ResetColor)?;
        Ok(())
    }

    fn write(&mut self, command: &DrawCommand) -> Result<()> {
        // The terminal may have shrunk since the frame was composed.
        let Some(text) = clip_to_width(command, self.viewport) else {
            return Ok(());
        };

        queue!(
            self.out,
            cursor::MoveTo(command.col, command.row),
            SetForegroundColor(palette_color(command.style)),
        )?;
        if command.style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        queue!(self.out, Print(text), SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<KeyPress>> {
        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let press = match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    KeyPress::Interrupt
                }
                KeyCode::Char(c) => KeyPress::Char(c),
                KeyCode::Esc => KeyPress::Escape,
                _ => continue,
            };
            return Ok(Some(press));
        }
        Ok(None)
    }

    fn hide_cursor(&mut self) -> Result<()> {
        queue!(self.out, cursor::Hide)?;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        queue!(self.out, cursor::Show)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Portion of the command's text that fits on its row, or `None` when the
/// command starts off screen.
fn clip_to_width(command: &DrawCommand, viewport: Viewport) -> Option<String> {
    if !viewport.contains(command.row as i32, command.col as i32) {
        return None;
    }
    let room = (viewport.cols - command.col) as usize;
    Some(command.text.chars().take(room).collect())
}

fn palette_color(style: Style) -> Color {
    match style.color {
        palette::CYAN => Color::Cyan,
        palette::MAGENTA => Color::Magenta,
        palette::YELLOW => Color::Yellow,
        palette::GREEN => Color::Green,
        palette::RED => Color::Red,
        palette::BLUE => Color::Blue,
        _ => Color::White,
    }
}
