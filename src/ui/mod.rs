//! Terminal front end: key and mouse handling, the frame loop and layout.

pub mod canvas;

use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::render::DrawList;
use crate::session::Session;

const SKIP_SECONDS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives a [`Session`] from the terminal.
pub struct App {
    session: Session,
    playlist: Vec<PathBuf>,
    current: usize,
    frame_interval: f64,
    canvas: DrawList,
    /// Inner area of the progress gauge from the last draw, for click-to-seek.
    gauge_area: Rect,
}

impl App {
    pub fn new(session: Session, playlist: Vec<PathBuf>, frame_interval: f64) -> Self {
        Self {
            session,
            playlist,
            current: 0,
            frame_interval,
            canvas: DrawList::new(),
            gauge_area: Rect::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts decoding the first playlist entry, if there is one.
    pub fn load_first(&mut self) {
        if let Some(path) = self.playlist.first() {
            self.session.begin_load(path);
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Flow {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('n') => self.next_file(),
            _ if !self.session.controls_enabled() => {}
            KeyCode::Char(' ') => {
                self.session.toggle_play();
            }
            KeyCode::Char('r') => {
                self.session.rewind();
            }
            KeyCode::Left => {
                self.session.skip(-SKIP_SECONDS);
            }
            KeyCode::Right => {
                self.session.skip(SKIP_SECONDS);
            }
            KeyCode::Char(c @ '0'..='9') => {
                let tenth = c.to_digit(10).unwrap_or(0);
                self.session.seek_ratio(tenth as f64 / 10.0);
            }
            KeyCode::Char('m') => self.session.toggle_mode(),
            KeyCode::Char('l') => self.session.toggle_labels(),
            KeyCode::Char('c') => self.session.cycle_color_scheme(),
            KeyCode::Char('k') => self.session.toggle_chroma(),
            _ => {}
        }
        Flow::Continue
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(ratio) = click_ratio(self.gauge_area, mouse.column, mouse.row) {
            self.session.seek_ratio(ratio);
        }
    }

    fn next_file(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.playlist.len();
        let path = self.playlist[self.current].clone();
        self.session.begin_load(&path);
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut next_frame = self.session.now();
        loop {
            let now = self.session.now();
            let deadline = self
                .session
                .next_deadline()
                .map_or(next_frame, |d| d.min(next_frame));
            let wait = Duration::from_secs_f64((deadline - now).max(0.0));

            if event::poll(wait)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key.code) == Flow::Quit {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            let report = self.session.update();
            if report.finished {
                log::info!("Playback finished");
            }

            let now = self.session.now();
            if now >= next_frame {
                terminal.draw(|f| self.draw(f))?;
                next_frame += self.frame_interval;
                if next_frame <= now {
                    next_frame = now + self.frame_interval;
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        let (width, height) = canvas::virtual_size(chunks[0]);
        self.canvas.clear_ops();
        self.session.render_frame(&mut self.canvas, width, height);
        f.render_widget(canvas::spectrum_canvas(&self.canvas, chunks[0]), chunks[0]);

        let block = Block::default()
            .title(format!(" {} ", self.session.output_name()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        self.gauge_area = block.inner(chunks[1]);
        let ratio = self.session.progress_ratio().clamp(0.0, 1.0);
        let duration = self.session.clip_info().map_or(0.0, |info| info.duration);
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
            .ratio(ratio)
            .label(format!(
                "{} / {}",
                format_clock(ratio * duration),
                format_clock(duration)
            ));
        f.render_widget(gauge, chunks[1]);

        f.render_widget(Paragraph::new(self.status_line()), chunks[2]);
    }

    fn status_line(&self) -> Line<'static> {
        let hint = if self.session.controls_enabled() {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        };
        let play = if self.session.is_playing() { "pause" } else { "play" };
        Line::from(vec![
            Span::styled(
                self.session.status_message(),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[space] {play}  [r] rewind  [←/→] skip  [0-9] seek  "),
                hint,
            ),
            Span::styled(
                format!(
                    "[m] mode  [l] labels  [c] {}  [k] chroma  ",
                    self.session.display().color_scheme.label()
                ),
                hint,
            ),
            Span::styled("[n] next  [q] quit", Style::default().fg(Color::Gray)),
        ])
    }
}

/// Takes over the terminal and runs until the user quits.
pub fn run(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run_loop(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

/// Position of a click along `area` as a fraction, if it landed inside.
pub fn click_ratio(area: Rect, column: u16, row: u16) -> Option<f64> {
    if area.width == 0
        || column < area.x
        || column >= area.right()
        || row < area.y
        || row >= area.bottom()
    {
        return None;
    }
    Some((column - area.x) as f64 / area.width as f64)
}

/// `m:ss`, rounded down to whole seconds.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0) as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Clip, SimulatedOutput};
    use crate::playback::ManualTime;
    use crate::session::SessionSettings;
    use assert_approx_eq::assert_approx_eq;
    use std::sync::Arc;

    fn app() -> App {
        let time = Arc::new(ManualTime::new());
        let sim_time = time.clone();
        let session = Session::create(SessionSettings::default(), time, move |tap| {
            Box::new(SimulatedOutput::new(sim_time, tap))
        });
        App::new(session, Vec::new(), 1.0 / 60.0)
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn click_ratio_inside_gauge() {
        let area = Rect::new(10, 5, 100, 1);
        assert_eq!(click_ratio(area, 10, 5), Some(0.0));
        assert_eq!(click_ratio(area, 60, 5), Some(0.5));
        assert_eq!(click_ratio(area, 110, 5), None);
        assert_eq!(click_ratio(area, 50, 6), None);
    }

    #[test]
    fn transport_keys_need_a_clip() {
        let mut app = app();
        assert_eq!(app.handle_key(KeyCode::Char(' ')), Flow::Continue);
        assert!(!app.session().is_playing());
        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.session().display().mode, crate::render::DisplayMode::Detail);
        assert_eq!(app.handle_key(KeyCode::Esc), Flow::Quit);
    }

    #[test]
    fn digit_keys_seek_to_tenths() {
        let mut app = app();
        app.session
            .install_clip(Clip::from_samples(vec![0.0; 10_000], 1000), "a.wav");
        app.handle_key(KeyCode::Char('3'));
        assert_approx_eq!(app.session().elapsed(), 3.0);
        app.handle_key(KeyCode::Right);
        assert_approx_eq!(app.session().elapsed(), 8.0);
        app.handle_key(KeyCode::Right);
        assert_approx_eq!(app.session().elapsed(), 10.0);
        app.handle_key(KeyCode::Char(' '));
        assert!(app.session().is_playing());
    }
}
