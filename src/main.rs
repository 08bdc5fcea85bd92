//! # Crossword Solver
//!
//! Fill a crossword grid from a vocabulary. The grid structure is a text file
//! in which `_` marks an open cell and any other character marks a blocked
//! cell. The vocabulary is a text file with one word per line, from which a
//! binary cache is generated on first use.
//!
//! Via command line options, the user picks the vocabulary and the structure,
//! then either solves the puzzle outright or watches the search fill the grid
//! in a text-based user interface (TUI).

mod app;
mod tui;

use std::{
	path::{Path, PathBuf},
	rc::Rc,
	time::Duration
};

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, trace};

use app::App;
use crossword_solver::{
	assignment::Assignment,
	crossword::Crossword,
	search::ValueOrder,
	solver::Solver,
	vocabulary::Vocabulary
};

////////////////////////////////////////////////////////////////////////////////
//                           Command line options.                            //
////////////////////////////////////////////////////////////////////////////////

/// CLI for filling crossword grids.
#[derive(Clone, Debug, Parser)]
#[command(version = "1.0")]
struct Opts
{
	/// The path to the directory containing the vocabulary files.
	#[arg(short = 'd', long, default_value = "data")]
	directory: String,

	/// The name of the vocabulary. This is the name shared by the text and
	/// binary files, sans the extension.
	#[arg(short = 'n', long, default_value = "words0")]
	vocabulary: String,

	#[command(subcommand)]
	command: Command
}

/// The subcommands of the CLI.
#[derive(Clone, Debug, Subcommand)]
enum Command
{
	/// Just generate the binary vocabulary and exit.
	Generate,

	/// Fill the grid and write it to standard output.
	Solve {
		/// The path to the structure file.
		structure: PathBuf,

		/// The order in which to try the candidates of each slot.
		#[arg(long, value_enum, default_value_t = Ordering::LeastConstraining)]
		ordering: Ordering,

		/// Also write the search statistics.
		#[arg(short = 's', long)]
		stats: bool,

		/// Also save the solution, in binary form, to this file.
		#[arg(short = 'o', long)]
		output: Option<PathBuf>
	},

	/// Watch the search fill the grid in the TUI. The solution, if one is
	/// reached, will be written to standard output.
	Watch {
		/// The path to the structure file.
		structure: PathBuf,

		/// How long (in ms) to run the search between frames.
		#[arg(short = 'q', long, default_value = "5")]
		quantum: u64
	}
}

/// The candidate orderings selectable from the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Ordering
{
	/// Try first the candidates that rule out the fewest neighbor candidates.
	LeastConstraining,

	/// Try the candidates alphabetically.
	Lexicographic
}

impl From<Ordering> for ValueOrder
{
	fn from(ordering: Ordering) -> Self
	{
		match ordering
		{
			Ordering::LeastConstraining => ValueOrder::LeastConstraining,
			Ordering::Lexicographic => ValueOrder::Lexicographic
		}
	}
}

////////////////////////////////////////////////////////////////////////////////
//                               Main program.                                //
////////////////////////////////////////////////////////////////////////////////

/// Parse the command line options and execute the appropriate subcommand.
fn main()
{
	env_logger::init();

	// Parse the command line options.
	let opts = Opts::parse();
	debug!("Command line options: {:?}", opts);

	// Open the vocabulary, creating the binary vocabulary if necessary.
	let vocabulary = Vocabulary::open(&opts.directory, &opts.vocabulary)
		.unwrap_or_else(|e|
			panic!("Failed to open vocabulary: {}/{}.dict or {0}/{1}.txt: {}",
				opts.directory,
				opts.vocabulary,
				e
			)
		);

	// Execute the appropriate subcommand.
	match opts.command
	{
		Command::Generate =>
		{
			trace!("Exiting after generating binary vocabulary");
		},
		Command::Solve { structure, ordering, stats, output } =>
		{
			let crossword = open_crossword(&structure);
			let search = Solver::new(Rc::clone(&crossword), &vocabulary)
				.unwrap_or_else(|e| panic!("Failed to create solver: {}", e))
				.with_value_order(ordering.into())
				.prepare()
				.map(|search| search.run_fully());
			if stats
			{
				match search
				{
					Some(ref search) =>
					{
						let stats = search.statistics();
						eprintln!(
							"assignments: {}, backtracks: {}",
							stats.assignments,
							stats.backtracks
						);
					},
					None => eprintln!("pruned before search")
				}
			}
			let solution = search.and_then(|search| search.into_solution());
			if let (Some(path), Some(solution)) = (output, &solution)
			{
				solution.serialize_to_file(&path).unwrap_or_else(|e|
					panic!("Failed to save solution: {}: {}", path.display(), e)
				);
				trace!("Saved solution: {}", path.display());
			}
			print_solution(&crossword, solution);
		},
		Command::Watch { structure, quantum } =>
		{
			let crossword = open_crossword(&structure);
			let search = Solver::new(Rc::clone(&crossword), &vocabulary)
				.unwrap_or_else(|e| panic!("Failed to create solver: {}", e))
				.prepare();
			trace!("Opening TUI");
			let app = App::new(
				Duration::from_millis(quantum),
				Rc::clone(&crossword),
				search
			);
			let solution = tui::with_terminal(|tui| app.run(tui))
				.unwrap_or_else(|e| panic!("Failed to drive TUI: {}", e));
			if let Some(solution) = solution
			{
				print_solution(&crossword, Some(solution));
			}
		}
	}
}

/// Read the structure file.
///
/// # Arguments
///
/// * `path` - The path to the structure file.
///
/// # Returns
///
/// The puzzle model.
fn open_crossword(path: &Path) -> Rc<Crossword>
{
	let crossword = Crossword::read_from_file(path)
		.unwrap_or_else(|e|
			panic!("Failed to read structure: {}: {}", path.display(), e)
		);
	debug!(
		"Read {}x{} structure with {} slots",
		crossword.width(),
		crossword.height(),
		crossword.slot_count()
	);
	Rc::new(crossword)
}

/// Print the solution to standard output.
///
/// # Arguments
///
/// * `crossword` - The puzzle model.
/// * `solution` - The solution to print, if any.
fn print_solution(crossword: &Crossword, solution: Option<Assignment>)
{
	match solution
	{
		Some(solution) => print!("{}", crossword.render(&solution)),
		None => println!("No solution.")
	}
}
