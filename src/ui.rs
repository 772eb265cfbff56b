use std::error::Error;
use std::io;
use std::path::Path;
use std::time::Duration as StdDuration;

use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{info, warn};

use crate::domain::{format_minutes, Day, DAYS, TARGET_HOURS, WeekStore};
use crate::storage::save_store;

const HELP_LINE: &str = "(w=up, s=down, x=add, r=remove, a=prev week, d=next week, q=quit)";
const SAVED_MESSAGE: &str = "Progress saved. Exiting...";
const CURSOR_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);

/// The day being displayed and edited. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
	pub week: u32,
	pub day: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	Up,
	Down,
	Add,
	Remove,
	PrevWeek,
	NextWeek,
	Quit,
}

impl Command {
	pub fn from_key(key: KeyEvent) -> Option<Self> {
		if key.modifiers.contains(KeyModifiers::CONTROL) {
			return match key.code {
				KeyCode::Char('c') => Some(Command::Quit),
				_ => None,
			};
		}

		match key.code {
			KeyCode::Char(ch) => Self::from_char(ch),
			_ => None,
		}
	}

	pub fn from_char(ch: char) -> Option<Self> {
		match ch {
			'w' => Some(Command::Up),
			's' => Some(Command::Down),
			'x' => Some(Command::Add),
			'r' => Some(Command::Remove),
			'a' => Some(Command::PrevWeek),
			'd' => Some(Command::NextWeek),
			'q' => Some(Command::Quit),
			_ => None,
		}
	}

	pub fn persists(self) -> bool {
		matches!(self, Command::Add | Command::Remove | Command::Quit)
	}
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
	pub persist: bool,
	pub quit: bool,
	pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct App {
	pub store: WeekStore,
	pub cursor: Cursor,
}

impl App {
	pub fn new(mut store: WeekStore, cursor: Cursor) -> Self {
		store.ensure_week(cursor.week);
		Self { store, cursor }
	}

	pub fn apply(&mut self, command: Command) -> Outcome {
		let mut outcome = Outcome {
			persist: command.persists(),
			..Outcome::default()
		};

		match command {
			Command::Up => self.cursor.day = (self.cursor.day + DAYS.len() - 1) % DAYS.len(),
			Command::Down => self.cursor.day = (self.cursor.day + 1) % DAYS.len(),
			Command::Add => {
				self.current_day_mut().add_pomodoro();
			}
			Command::Remove => {
				if !self.current_day_mut().remove_pomodoro() {
					outcome.message = Some(format!(
						"No pomodoros to remove in {} (Week {})",
						DAYS[self.cursor.day], self.cursor.week
					));
				}
			}
			Command::PrevWeek => self.move_to_week(self.cursor.week.saturating_sub(1).max(1)),
			Command::NextWeek => self.move_to_week(self.cursor.week.saturating_add(1)),
			Command::Quit => outcome.quit = true,
		}

		outcome
	}

	fn current_day_mut(&mut self) -> &mut Day {
		self.store.week(self.cursor.week).day_mut(self.cursor.day)
	}

	fn move_to_week(&mut self, week: u32) {
		self.cursor.week = week;
		self.store.ensure_week(week);
	}
}

pub fn run_dashboard(app: &mut App, data_path: &Path, status: Option<String>) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, app, data_path, status);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	println!("{}", result?);
	Ok(())
}

/// Returns the farewell line to print once the terminal is restored.
fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	app: &mut App,
	data_path: &Path,
	mut status: Option<String>,
) -> Result<String, Box<dyn Error>> {
	loop {
		let view = build_view(app);
		terminal.draw(|frame| draw_week(frame, &view, status.as_deref()))?;

		let CEvent::Key(key) = event::read()? else {
			continue;
		};
		if key.kind != KeyEventKind::Press {
			continue;
		}

		if let Some(command) = Command::from_key(key) {
			let outcome = app.apply(command);
			let (next_status, farewell) = after_command(app, outcome, data_path);
			if let Some(farewell) = farewell {
				return Ok(farewell);
			}
			status = next_status;
		}

		discard_pending_input()?;
	}
}

/// Saves when the command asks for it. Returns the status line to show and,
/// when the session ends, the farewell line. A failed save keeps the session
/// running on the in-memory store.
fn after_command(app: &App, outcome: Outcome, data_path: &Path) -> (Option<String>, Option<String>) {
	let mut status = outcome.message;

	if outcome.persist {
		if let Err(err) = persist(data_path, &app.store) {
			warn!(error = %err, "failed to save week data");
			let message = format!("Error saving data: {err}");
			if outcome.quit {
				return (None, Some(message));
			}
			status = Some(message);
		}
	}

	if outcome.quit {
		info!(week = app.cursor.week, "quitting");
		return (None, Some(SAVED_MESSAGE.to_string()));
	}

	(status, None)
}

fn discard_pending_input() -> io::Result<()> {
	while event::poll(StdDuration::ZERO)? {
		event::read()?;
	}
	Ok(())
}

fn persist(path: &Path, store: &WeekStore) -> Result<(), String> {
	save_store(path, store).map_err(|err| err.to_string())
}

fn draw_week(frame: &mut Frame, view: &WeekView, status: Option<&str>) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(DAYS.len() as u16 + 5), Constraint::Length(4), Constraint::Min(0)])
		.split(frame.area());

	let mut lines = Vec::new();
	lines.push(Line::from(view.header()));
	for row in &view.rows {
		let line = Line::from(row.text());
		if row.selected {
			lines.push(line.style(Style::default().bg(CURSOR_BACKGROUND_COLOR).add_modifier(Modifier::BOLD)));
		} else {
			lines.push(line);
		}
	}
	lines.push(Line::from(""));
	lines.push(Line::from(view.trailing_line()));

	let week = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Pomodoro Tracker"));
	frame.render_widget(week, layout[0]);

	let footer = Paragraph::new(vec![Line::from(HELP_LINE), Line::from(status.unwrap_or(""))])
		.block(Block::default().borders(Borders::ALL).title("Keys"));
	frame.render_widget(footer, layout[1]);
}

/// Everything one frame shows. Building it touches the trailing weeks in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekView {
	pub week: u32,
	pub rows: Vec<DayRow>,
	pub week_minutes: u32,
	pub trailing_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
	pub name: &'static str,
	pub slots: Vec<bool>,
	pub minutes: u32,
	pub selected: bool,
}

impl DayRow {
	pub fn text(&self) -> String {
		let marker = if self.selected { "->" } else { "  " };
		let slots = self
			.slots
			.iter()
			.map(|filled| if *filled { "[X] " } else { "[ ] " })
			.collect::<String>();
		format!("{marker} {:<10} {slots}  {}", self.name, format_minutes(self.minutes))
	}
}

impl WeekView {
	pub fn header(&self) -> String {
		format!("==== (Week {}) ====", self.week)
	}

	pub fn trailing_line(&self) -> String {
		format!("Past 4 weeks: {} / {TARGET_HOURS}h", format_minutes(self.trailing_minutes))
	}

	pub fn lines(&self) -> Vec<String> {
		let mut lines = vec![self.header()];
		lines.extend(self.rows.iter().map(DayRow::text));
		lines.push(String::new());
		lines.push(self.trailing_line());
		lines
	}
}

pub fn build_view(app: &mut App) -> WeekView {
	view_for(&mut app.store, app.cursor)
}

fn view_for(store: &mut WeekStore, cursor: Cursor) -> WeekView {
	let trailing_minutes = store.trailing_minutes(cursor.week);
	let week = store.week(cursor.week);
	let rows = DAYS
		.iter()
		.copied()
		.enumerate()
		.map(|(index, name)| {
			let day = week.day(index);
			DayRow {
				name,
				slots: day.slots.to_vec(),
				minutes: day.minutes(),
				selected: index == cursor.day,
			}
		})
		.collect();

	WeekView {
		week: cursor.week,
		rows,
		week_minutes: week.minutes(),
		trailing_minutes,
	}
}

/// Lines for one week plus its total, computed on a copy so the caller's
/// store never gains the weeks the trailing total touches.
pub fn summary_lines(store: &WeekStore, cursor: Cursor) -> Vec<String> {
	let mut scratch = store.clone();
	let view = view_for(&mut scratch, cursor);
	let mut lines = view.lines();
	lines.push(format!("Week total: {}", format_minutes(view.week_minutes)));
	lines
}

pub fn print_summary(store: &WeekStore, cursor: Cursor) {
	for line in summary_lines(store, cursor) {
		println!("{line}");
	}
}

#[cfg(test)]
mod tests {
	use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

	use crate::domain::{POMODOROS_PER_DAY, WeekStore};

	use std::path::PathBuf;

	use super::{App, Command, Cursor, SAVED_MESSAGE, after_command, build_view, summary_lines};

	fn app_at(week: u32, day: usize) -> App {
		App::new(WeekStore::new(), Cursor { week, day })
	}

	#[test]
	fn maps_keys_to_commands() {
		assert_eq!(Command::from_char('w'), Some(Command::Up));
		assert_eq!(Command::from_char('q'), Some(Command::Quit));
		assert_eq!(Command::from_char('W'), None);
		assert_eq!(Command::from_char('\n'), None);
		assert_eq!(
			Command::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
			Some(Command::Quit)
		);
		assert_eq!(Command::from_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), None);
	}

	#[test]
	fn only_mutations_and_quit_persist() {
		assert!(Command::Add.persists());
		assert!(Command::Remove.persists());
		assert!(Command::Quit.persists());
		assert!(!Command::Up.persists());
		assert!(!Command::NextWeek.persists());
	}

	#[test]
	fn up_from_monday_wraps_to_sunday_and_back() {
		let mut app = app_at(1, 0);
		app.apply(Command::Up);
		assert_eq!(app.cursor.day, 6);
		app.apply(Command::Down);
		assert_eq!(app.cursor.day, 0);
	}

	#[test]
	fn previous_week_is_floored_at_one() {
		let mut app = app_at(2, 3);
		app.apply(Command::PrevWeek);
		app.apply(Command::PrevWeek);
		assert_eq!(app.cursor, Cursor { week: 1, day: 3 });
		assert!(app.store.contains(1));
	}

	#[test]
	fn next_week_creates_destination() {
		let mut app = app_at(1, 0);
		let outcome = app.apply(Command::NextWeek);
		assert_eq!(app.cursor.week, 2);
		assert!(app.store.contains(2));
		assert!(!outcome.persist);
	}

	#[test]
	fn add_caps_at_eight_per_day() {
		let mut app = app_at(1, 4);
		for _ in 0..POMODOROS_PER_DAY + 3 {
			let outcome = app.apply(Command::Add);
			assert!(outcome.persist);
			assert!(outcome.message.is_none());
		}
		assert_eq!(app.store.day_minutes(1, 4), 240);
	}

	#[test]
	fn remove_on_empty_day_reports_and_keeps_state() {
		let mut app = app_at(3, 1);
		let outcome = app.apply(Command::Remove);
		assert_eq!(
			outcome.message.as_deref(),
			Some("No pomodoros to remove in Tuesday (Week 3)")
		);
		assert_eq!(app.store.week_minutes(3), 0);
	}

	#[test]
	fn quit_requests_save_and_exit() {
		let mut app = app_at(1, 0);
		let outcome = app.apply(Command::Quit);
		assert!(outcome.quit);
		assert!(outcome.persist);
	}

	#[test]
	fn renders_week_lines() {
		let mut app = app_at(2, 1);
		app.apply(Command::Add);
		app.apply(Command::Add);
		app.apply(Command::Add);

		let lines = build_view(&mut app).lines();
		assert_eq!(lines[0], "==== (Week 2) ====");
		assert_eq!(
			lines[1],
			"   Monday     [ ] [ ] [ ] [ ] [ ] [ ] [ ] [ ]   0h 0m"
		);
		assert_eq!(
			lines[2],
			"-> Tuesday    [X] [X] [X] [ ] [ ] [ ] [ ] [ ]   1h 30m"
		);
		assert_eq!(lines[9], "Past 4 weeks: 1h 30m / 100h");
		assert!(app.store.contains(1));
	}

	#[test]
	fn failed_save_keeps_session_and_in_memory_change() {
		let mut app = app_at(1, 2);
		let directory = std::env::temp_dir();

		let outcome = app.apply(Command::Add);
		let (status, farewell) = after_command(&app, outcome, &directory);
		assert!(farewell.is_none());
		let status = status.expect("save failure should be reported");
		assert!(status.starts_with("Error saving data: "));
		assert_eq!(app.store.day_minutes(1, 2), 30);

		let outcome = app.apply(Command::Quit);
		let (status, farewell) = after_command(&app, outcome, &directory);
		assert!(status.is_none());
		let farewell = farewell.expect("quit should end the session");
		assert!(farewell.starts_with("Error saving data: "));
	}

	#[test]
	fn successful_save_on_quit_says_goodbye() {
		let mut app = app_at(2, 0);
		app.apply(Command::Add);
		let path = temp_file("pomodoro_ui_quit.json");

		let outcome = app.apply(Command::Quit);
		let (_, farewell) = after_command(&app, outcome, &path);
		assert_eq!(farewell.as_deref(), Some(SAVED_MESSAGE));
		let saved = crate::storage::load_store(&path).expect("saved file should load");
		assert_eq!(saved, app.store);
		let _ = std::fs::remove_file(path);
	}

	#[test]
	fn navigation_neither_saves_nor_ends_session() {
		let mut app = app_at(1, 0);
		let path = temp_file("pomodoro_ui_navigation.json");
		let _ = std::fs::remove_file(&path);

		let outcome = app.apply(Command::NextWeek);
		assert_eq!(after_command(&app, outcome, &path), (None, None));
		assert!(!path.exists());
	}

	#[test]
	fn summary_leaves_callers_store_untouched() {
		let mut store = WeekStore::new();
		store.week(5).day_mut(0).add_pomodoro();
		let before = store.clone();

		let lines = summary_lines(&store, Cursor { week: 5, day: 0 });
		assert_eq!(lines[0], "==== (Week 5) ====");
		assert_eq!(lines[9], "Past 4 weeks: 0h 30m / 100h");
		assert_eq!(lines[10], "Week total: 0h 30m");
		assert_eq!(store, before);
		assert_eq!(store.week_numbers().collect::<Vec<_>>(), vec![5]);
	}

	fn temp_file(name: &str) -> PathBuf {
		let mut path = std::env::temp_dir();
		path.push(format!("{}_{}", name, std::process::id()));
		path
	}
}
