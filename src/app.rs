//! # Viewer
//!
//! The state and logic of the interactive search viewer. The search runs in
//! short time slices between frames, so the grid visibly fills and unfills as
//! the search assigns and backtracks.

use std::{io, mem::replace, rc::Rc, time::Duration};

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind};
use crossword_solver::{
	assignment::Assignment,
	crossword::Crossword,
	search::Search
};
use ratatui::{
	buffer::Buffer,
	layout::{Alignment, Constraint, Direction, Layout, Rect},
	style::{Color, Style, Stylize},
	text::{Line, Span},
	widgets::{
		block::{Position, Title},
		Block, Borders, List, Paragraph, Widget
	},
	Frame
};

use crate::tui::Tui;

////////////////////////////////////////////////////////////////////////////////
//                                Application.                                //
////////////////////////////////////////////////////////////////////////////////

/// The viewer state.
#[must_use]
pub struct App
{
	/// What the viewer is doing.
	state: ExecutionState,

	/// How long to run the search between frames.
	quantum: Duration,

	/// The puzzle model, for laying out the grid.
	crossword: Rc<Crossword>
}

// Public interface.
impl App
{
	/// Create a new viewer.
	///
	/// # Arguments
	///
	/// * `quantum` - How long to run the search between frames.
	/// * `crossword` - The puzzle model.
	/// * `search` - The prepared search, or `None` if pruning already showed
	///   that there is no solution.
	#[inline]
	pub fn new(
		quantum: Duration,
		crossword: Rc<Crossword>,
		search: Option<Search>
	) -> Self
	{
		let state = match search
		{
			Some(search) => ExecutionState::Searching { search },
			None => ExecutionState::Unsatisfiable
		};
		Self { state, quantum, crossword }
	}

	/// Run the viewer until the user leaves it.
	///
	/// # Arguments
	///
	/// * `tui` - The terminal.
	///
	/// # Returns
	///
	/// The solution, if the search found one before the user left.
	///
	/// # Errors
	///
	/// Any error that occurs while drawing or reading events.
	pub fn run(mut self, tui: &mut Tui) -> io::Result<Option<Assignment>>
	{
		while self.is_running()
		{
			self.process_systems();
			tui.draw(|frame| self.render_frame(frame))?;
			self.process_event()?;
		}
		match self.state
		{
			ExecutionState::Exiting { solution } => Ok(solution),
			_ => Ok(None)
		}
	}

	/// Check if the viewer is running.
	#[inline]
	#[must_use]
	pub fn is_running(&self) -> bool
	{
		!matches!(self.state, ExecutionState::Exiting { .. })
	}
}

// Private implementation details.
impl App
{
	/// Advance the search by one quantum, if it is still running.
	fn process_systems(&mut self)
	{
		if !matches!(self.state, ExecutionState::Searching { .. })
		{
			return
		}
		// Move the search out of the state so that it can be consumed.
		let state = replace(&mut self.state, ExecutionState::Swapping);
		if let ExecutionState::Searching { search } = state
		{
			let search = search.run(self.quantum);
			self.state =
				if search.is_finished()
				{
					ExecutionState::Finished { search }
				}
				else
				{
					ExecutionState::Searching { search }
				};
		}
	}

	/// Process events. Block for only half a millisecond, so as not to stall
	/// the search.
	///
	/// # Errors
	///
	/// Any error that occurs while reading events.
	fn process_event(&mut self) -> io::Result<()>
	{
		if poll(Duration::from_micros(500))?
		{
			match read()?
			{
				Event::Key(event) if event.kind == KeyEventKind::Press =>
					self.process_key_event(event),
				_ => {}
			}
		}
		Ok(())
	}

	/// Process a key event:
	///
	/// * Escape, Q - Leave the viewer, abandoning any unfinished search.
	/// * Enter - Leave the viewer once the search has finished.
	///
	/// # Arguments
	///
	/// * `event` - The key event to process.
	fn process_key_event(&mut self, event: KeyEvent)
	{
		match event.code
		{
			KeyCode::Esc | KeyCode::Char('q') => self.exit(),
			KeyCode::Enter if !matches!(
				self.state,
				ExecutionState::Searching { .. }
			) => self.exit(),
			_ => {}
		}
	}

	/// Mark the viewer for exit, keeping the solution if there is one.
	fn exit(&mut self)
	{
		let solution = match replace(&mut self.state, ExecutionState::Swapping)
		{
			ExecutionState::Finished { search } => search.into_solution(),
			ExecutionState::Exiting { solution } => solution,
			_ => None
		};
		self.state = ExecutionState::Exiting { solution };
	}

	/// Render the viewer frame.
	fn render_frame(&self, frame: &mut Frame)
	{
		frame.render_widget(self, frame.area());
	}

	/// Render the grid and the list of placed words.
	///
	/// # Arguments
	///
	/// * `area` - The target area.
	/// * `buf` - The target buffer.
	/// * `assignment` - The words to show.
	/// * `status` - The status line, shown atop the grid.
	/// * `footer` - The line shown beneath the grid.
	fn render_board(
		&self,
		area: Rect,
		buf: &mut Buffer,
		assignment: &Assignment,
		status: Span<'static>,
		footer: String
	) {
		let outer = Layout::default()
			.direction(Direction::Horizontal)
			.margin(1)
			.constraints([Constraint::Fill(1), Constraint::Length(34)])
			.split(area);
		// Each cell is three columns wide, so the grid looks roughly square.
		let letters = self.crossword.letter_grid(assignment);
		let lines = letters.iter().enumerate()
			.map(|(row, cells)| {
				Line::from(
					cells.iter().enumerate()
						.map(|(column, letter)| {
							if self.crossword.is_open(row, column)
							{
								Span::styled(
									format!(" {} ", letter.unwrap_or('·')),
									Style::default().fg(Color::Black).bg(Color::White)
								)
							}
							else
							{
								Span::styled("   ", Style::default().bg(Color::DarkGray))
							}
						})
						.collect::<Vec<_>>()
				)
			})
			.collect::<Vec<_>>();
		Paragraph::new(lines)
			.alignment(Alignment::Center)
			.block(
				Block::default()
					.borders(Borders::ALL)
					.title(
						Title::default()
							.content("Crossword")
							.position(Position::Top)
							.alignment(Alignment::Center)
					)
					.title(
						Title::default()
							.content("⎋ – exit".yellow().bold())
							.position(Position::Top)
							.alignment(Alignment::Left)
					)
					.title(
						Title::default()
							.content(status)
							.position(Position::Top)
							.alignment(Alignment::Right)
					)
					.title(
						Title::default()
							.content(footer.cyan())
							.position(Position::Bottom)
							.alignment(Alignment::Center)
					)
			)
			.render(outer[0], buf);
		let words = assignment.iter()
			.map(|(slot, word)| {
				let slot = self.crossword.slot(slot);
				format!(
					"{:>6} ({}, {}): {}",
					slot.direction,
					slot.row,
					slot.column,
					word
				)
			})
			.collect::<Vec<_>>();
		let list = List::new(words)
			.block(
				Block::default()
					.title("Words")
					.title_alignment(Alignment::Center)
					.borders(Borders::ALL)
			)
			.style(Style::default().fg(Color::White));
		Widget::render(list, outer[1], buf);
	}
}

impl Widget for &App
{
	fn render(self, area: Rect, buf: &mut Buffer)
	{
		let empty = Assignment::new();
		match self.state
		{
			ExecutionState::Swapping => unreachable!(),
			ExecutionState::Searching { ref search } =>
			{
				let stats = search.statistics();
				self.render_board(
					area,
					buf,
					search.assignment(),
					"searching…".yellow().bold(),
					format!(
						"assignments: {}  backtracks: {}",
						stats.assignments,
						stats.backtracks
					)
				)
			},
			ExecutionState::Finished { ref search } =>
			{
				let stats = search.statistics();
				let status =
					if search.is_solved() { "solved".green().bold() }
					else { "no solution".red().bold() };
				self.render_board(
					area,
					buf,
					search.solution().unwrap_or(&empty),
					status,
					format!(
						"assignments: {}  backtracks: {}  ↵ – done",
						stats.assignments,
						stats.backtracks
					)
				)
			},
			ExecutionState::Unsatisfiable => self.render_board(
				area,
				buf,
				&empty,
				"no solution".red().bold(),
				"a slot ran out of candidates before search  ↵ – done"
					.to_string()
			),
			ExecutionState::Exiting { .. } => {}
		}
	}
}

/// The execution state of the viewer.
#[derive(Clone, Debug)]
enum ExecutionState
{
	/// The state is transitioning to the next state. This is a transient
	/// state that should not be rendered.
	Swapping,

	/// The search is running, one quantum per frame.
	Searching {
		/// The search continuation.
		search: Search
	},

	/// The search has finished, with or without a solution.
	Finished {
		/// The finished search.
		search: Search
	},

	/// Pruning proved that there is no solution, so there is nothing to
	/// search.
	Unsatisfiable,

	/// The viewer is exiting.
	Exiting {
		/// The solution, if one was found.
		solution: Option<Assignment>
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use super::*;
	use crossword_solver::{solver::Solver, vocabulary::Vocabulary};

	/// Build a viewer for one of the fixtures.
	fn fixture(structure: &str, words: &str) -> App
	{
		let crossword = Rc::new(
			Crossword::read_from_file(format!("data/{}.txt", structure))
				.unwrap()
		);
		let vocabulary =
			Vocabulary::read_from_file(format!("data/{}.txt", words)).unwrap();
		let search = Solver::new(Rc::clone(&crossword), &vocabulary)
			.unwrap()
			.prepare();
		App::new(Duration::ZERO, crossword, search)
	}

	/// Run the viewer's search until it finishes.
	fn finish(app: &mut App)
	{
		while matches!(app.state, ExecutionState::Searching { .. })
		{
			app.process_systems();
		}
	}

	/// Collect the symbols of a rendered buffer into one string.
	fn text(buf: &Buffer) -> String
	{
		buf.content.iter().map(|cell| cell.symbol()).collect()
	}

	/// Ensure that leaving mid-search abandons the search.
	#[test]
	fn test_handle_exit()
	{
		let mut app = fixture("structure1", "words1");
		assert!(app.is_running());
		app.process_key_event(KeyCode::Enter.into());
		assert!(app.is_running());
		app.process_key_event(KeyCode::Esc.into());
		assert!(!app.is_running());
		assert!(matches!(app.state, ExecutionState::Exiting { solution: None }));
	}

	/// Ensure that the search runs to completion one quantum at a time and
	/// that the solution survives leaving the viewer.
	#[test]
	fn test_search_to_completion()
	{
		let mut app = fixture("structure0", "words0");
		finish(&mut app);
		assert!(matches!(app.state, ExecutionState::Finished { .. }));
		let mut buf = Buffer::empty(Rect::new(0, 0, 80, 20));
		(&app).render(buf.area, &mut buf);
		let rendered = text(&buf);
		assert!(rendered.contains("solved"));
		assert!(rendered.contains("SEVEN"));
		app.process_key_event(KeyCode::Enter.into());
		match app.state
		{
			ExecutionState::Exiting { solution: Some(ref solution) } =>
			{
				assert_eq!(solution.get(0), Some("SIX"));
				assert_eq!(solution.get(3), Some("NINE"));
			},
			_ => panic!("expected a solution")
		}
	}

	/// Ensure that a puzzle pruned to nothing is reported without searching.
	#[test]
	fn test_unsatisfiable()
	{
		let crossword = Rc::new(Crossword::parse("___\n_#_\n___").unwrap());
		let vocabulary = ["cat", "dog"].into_iter().collect::<Vocabulary>();
		let search = Solver::new(Rc::clone(&crossword), &vocabulary)
			.unwrap()
			.prepare();
		assert!(search.is_none());
		let mut app = App::new(Duration::ZERO, crossword, search);
		app.process_systems();
		let mut buf = Buffer::empty(Rect::new(0, 0, 80, 20));
		(&app).render(buf.area, &mut buf);
		assert!(text(&buf).contains("no solution"));
		app.process_key_event(KeyCode::Char('q').into());
		assert!(matches!(app.state, ExecutionState::Exiting { solution: None }));
	}
}
