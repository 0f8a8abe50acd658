//! Console front end: a terminal scrub deck over a synthetic media element.
//!
//! Renders a transport bar and hold buttons with ratatui, feeds key and
//! mouse events through the input bindings, and drives the shell once per
//! frame. Hold keys need release events; where the terminal supports the
//! kitty keyboard protocol those are real, otherwise pressing a hold key
//! again releases it.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::debug;

use vscrub::input::{map_key_event, map_pointer, PointerPhase, PointerTarget, ScrubCommand};
use vscrub::player::{LocalAdapter, PlayerAdapter, SyntheticMedia};
use vscrub::shell::{DispatchResult, Shell};
use vscrub::time::format_time;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const HOLD_BUTTONS: [(PointerTarget, &str); 4] = [
    (PointerTarget::RewindFast, "◀◀ fast"),
    (PointerTarget::Rewind, "◀ rew"),
    (PointerTarget::Forward, "fwd ▶"),
    (PointerTarget::ForwardFast, "fast ▶▶"),
];

/// UI mode for the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Normal,
    /// Typing a video link; playback keys are suppressed.
    LinkEntry,
}

/// Console application state.
pub struct ConsoleApp {
    shell: Shell,
    player: LocalAdapter<SyntheticMedia>,
    mode: Mode,
    entry: String,
    status: String,
    /// Hold button currently pressed with the mouse.
    pressed: Option<PointerTarget>,
    /// Whether the terminal reports key release events.
    release_events: bool,
    button_rects: [Rect; 4],
    running: bool,
}

impl ConsoleApp {
    pub fn new(shell: Shell, duration: f64) -> Self {
        Self {
            shell,
            player: LocalAdapter::new(SyntheticMedia::new(duration)),
            mode: Mode::Normal,
            entry: String::new(),
            status: String::new(),
            pressed: None,
            release_events: false,
            button_rects: [Rect::default(); 4],
            running: true,
        }
    }

    /// Run the console until quit. Terminal state is restored on the way
    /// out, including on error.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        debug!(release_events = self.release_events, "console starting");

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        let result = self.event_loop(&mut terminal);

        if self.release_events {
            let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while self.running {
            let now = Instant::now();
            self.player.element_mut().tick(now);
            self.shell.frame(&mut self.player, now);

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key, Instant::now()),
                    Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match self.mode {
            Mode::LinkEntry => self.handle_entry_key(key, now),
            Mode::Normal => {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('i') {
                    self.mode = Mode::LinkEntry;
                    self.entry.clear();
                    return;
                }
                if let Some(command) = map_key_event(&key, false) {
                    self.dispatch(command, now);
                }
            }
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent, now: Instant) {
        // Ctrl-C still quits while typing.
        if let Some(command) = map_key_event(&key, true) {
            self.dispatch(command, now);
            return;
        }
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                match self.shell.load_reference(&self.entry) {
                    Ok(id) => self.status = format!("loaded {}", id.watch_url()),
                    Err(err) => self.status = err.to_string(),
                }
                self.entry.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.entry.pop();
            }
            KeyCode::Char(c) => self.entry.push(c),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let at = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = self.button_at(at) {
                    self.pressed = Some(target);
                    self.dispatch(map_pointer(target, PointerPhase::Down), now);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(target) = self.pressed.take() {
                    self.dispatch(map_pointer(target, PointerPhase::Up), now);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                // Sliding off the pressed button releases the hold.
                if let Some(target) = self.pressed {
                    if self.button_at(at) != Some(target) {
                        self.pressed = None;
                        self.dispatch(map_pointer(target, PointerPhase::Leave), now);
                    }
                }
            }
            _ => {}
        }
    }

    fn button_at(&self, at: Position) -> Option<PointerTarget> {
        HOLD_BUTTONS
            .iter()
            .zip(self.button_rects)
            .find(|(_, rect)| rect.contains(at))
            .map(|((target, _), _)| *target)
    }

    fn dispatch(&mut self, command: ScrubCommand, now: Instant) {
        // Without release events, pressing the active hold key again ends
        // the hold instead of restarting it.
        let command = match command {
            ScrubCommand::StartHold(direction)
                if !self.release_events && self.shell.hold_direction() == Some(direction) =>
            {
                ScrubCommand::StopHold
            }
            other => other,
        };
        if self.shell.dispatch(&mut self.player, command, now) == DispatchResult::Quit {
            self.running = false;
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(frame.area());

        self.render_title(frame, rows[0]);
        self.render_transport(frame, rows[1]);
        self.render_buttons(frame, rows[2]);
        self.render_entry(frame, rows[3]);
        self.render_footer(frame, rows[4]);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let video = match self.shell.video() {
            Some(id) => id.watch_url(),
            None => "no video loaded (press i to paste a link)".to_owned(),
        };
        let mut line = vec![Span::styled(video, Style::default().fg(Color::Cyan))];
        if !self.shell.share_query().is_empty() {
            line.push(Span::raw("  ?"));
            line.push(Span::styled(
                self.shell.share_query().to_owned(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let title = Paragraph::new(Line::from(line))
            .block(Block::default().borders(Borders::ALL).title(" vscrub "));
        frame.render_widget(title, area);
    }

    fn render_transport(&self, frame: &mut Frame, area: Rect) {
        let current = self.player.current_time();
        let duration = self.player.duration();
        let ratio = if duration > 0.0 {
            (current / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let state = if self.shell.is_holding() {
            "scrub"
        } else if self.player.is_playing() {
            if self.shell.slow_mo() {
                "slow-mo"
            } else {
                "play"
            }
        } else {
            "pause"
        };
        let label = format!(
            "{} / {}  [{}]",
            format_time(current),
            format_time(duration),
            state
        );
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(ratio)
            .label(label);
        frame.render_widget(gauge, area);
    }

    fn render_buttons(&mut self, frame: &mut Frame, area: Rect) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);
        for (i, ((target, label), cell)) in HOLD_BUTTONS.iter().zip(cells.iter()).enumerate() {
            self.button_rects[i] = *cell;
            let active = self.pressed == Some(*target)
                || self.shell.hold_direction() == Some(target.direction());
            let style = if active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let button = Paragraph::new(*label)
                .style(style)
                .centered()
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(button, *cell);
        }
    }

    fn render_entry(&self, frame: &mut Frame, area: Rect) {
        let (title, text) = match self.mode {
            Mode::LinkEntry => (" link (Enter to load, Esc to cancel) ", {
                let mut t = self.entry.clone();
                t.push('▏');
                t
            }),
            Mode::Normal => (" status ", self.status.clone()),
        };
        let entry =
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(entry, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let settings = self.shell.settings();
        let help = Line::from(vec![Span::styled(
            format!(
                "space play/pause  k pause  j/l hold  shift+j/l fast  ,/. step  ←/→ jump  \
                 s slow-mo ({})  i link  q quit  scrub {}x/{}x",
                settings.slow_mo_speed, settings.scrub_speed_slow, settings.scrub_speed_fast
            ),
            Style::default().fg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(help), area);
    }
}
