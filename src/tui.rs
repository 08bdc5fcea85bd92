//! # Terminal
//!
//! Entering and leaving the alternate screen for the search viewer. The
//! terminal must be restored however the viewer ends, including by panic, or
//! the user's shell is left in raw mode.

use std::{
	io::{self, stdout, Stdout},
	panic,
	sync::{Arc, Mutex},
	thread
};

use crossterm::{
	execute,
	terminal::{
		disable_raw_mode, enable_raw_mode,
		EnterAlternateScreen, LeaveAlternateScreen
	}
};
use ratatui::{backend::{Backend, CrosstermBackend}, Terminal};

/// The terminal type driven by the viewer.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Apply `f` to the terminal in raw mode on the alternate screen, restoring
/// the terminal afterwards. A panic on the calling thread restores the
/// terminal before the previous panic hook reports it.
///
/// # Arguments
///
/// * `f` - The function to apply to the terminal.
///
/// # Returns
///
/// The result of applying `f`.
///
/// # Errors
///
/// Any error from `f`, or from entering or leaving the alternate screen.
pub fn with_terminal<F, T>(f: F) -> io::Result<T>
	where F: FnOnce(&mut Tui) -> io::Result<T>
{
	// The previous hook is shared with the replacement so that it can both be
	// delegated to and reinstated afterwards.
	let previous = Arc::new(Mutex::new(Some(panic::take_hook())));
	let delegate = Arc::clone(&previous);
	let owner = thread::current().id();
	panic::set_hook(Box::new(move |info| {
		if thread::current().id() == owner
		{
			let _ = leave();
		}
		if let Ok(hook) = delegate.lock()
		{
			if let Some(hook) = hook.as_ref()
			{
				hook(info);
			}
		}
	}));
	// Entering may fail halfway, so restore regardless of how it went.
	let result = enter().and_then(|mut terminal| f(&mut terminal));
	if let Some(hook) = previous.lock().ok().and_then(|mut hook| hook.take())
	{
		panic::set_hook(hook);
	}
	leave()?;
	result
}

/// Switch to the alternate screen in raw mode.
fn enter() -> io::Result<Tui>
{
	let mut stdout = stdout();
	execute!(stdout, EnterAlternateScreen)?;
	enable_raw_mode()?;
	Terminal::new(CrosstermBackend::new(stdout))
}

/// Leave the alternate screen and raw mode, and show the cursor again.
fn leave() -> io::Result<()>
{
	let mut stdout = stdout();
	execute!(stdout, LeaveAlternateScreen)?;
	disable_raw_mode()?;
	CrosstermBackend::new(stdout).show_cursor()
}
