//! # Crossword
//!
//! Herein is the puzzle model: the geometry of a crossword grid, the slots
//! (variables) that must each receive a word, and the overlaps between them.
//! A [`Crossword`] is immutable once built. Slots are addressed by a dense
//! [`SlotId`], which is their index in ascending
//! (row, column, direction, length) order, so every iteration over slots is
//! deterministic.

use std::{
	collections::HashMap,
	error::Error,
	fmt::{self, Display, Formatter},
	fs,
	io::{self, ErrorKind},
	path::Path
};

use log::trace;

use crate::assignment::Assignment;

////////////////////////////////////////////////////////////////////////////////
//                                   Slots.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The index of a [`Slot`] within its [`Crossword`].
pub type SlotId = usize;

/// The direction in which a slot is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction
{
	/// Left to right.
	Across,

	/// Top to bottom.
	Down
}

impl Display for Direction
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		match self
		{
			Self::Across => write!(f, "across"),
			Self::Down => write!(f, "down")
		}
	}
}

/// A slot is a maximal run of open cells in one direction that must be filled
/// by a single word. Two slots are equal iff all four fields are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot
{
	/// The row of the first cell.
	pub row: usize,

	/// The column of the first cell.
	pub column: usize,

	/// The direction in which the slot is read.
	pub direction: Direction,

	/// The number of cells, and therefore the length of the word.
	pub length: usize
}

impl Slot
{
	/// Construct a new slot.
	#[inline]
	pub const fn new(
		row: usize,
		column: usize,
		direction: Direction,
		length: usize
	) -> Self
	{
		Self { row, column, direction, length }
	}

	/// Get the grid coordinates of the `k`-th cell of the slot.
	///
	/// # Arguments
	///
	/// * `k` - The index of the cell within the slot.
	///
	/// # Returns
	///
	/// The `(row, column)` of the cell.
	#[inline]
	#[must_use]
	pub fn cell(&self, k: usize) -> (usize, usize)
	{
		match self.direction
		{
			Direction::Across => (self.row, self.column + k),
			Direction::Down => (self.row + k, self.column)
		}
	}

	/// Get the grid coordinates of the last cell of the slot, without
	/// overflowing.
	///
	/// # Returns
	///
	/// The `(row, column)` of the last cell, or `None` if the slot is empty or
	/// its last cell lies beyond `usize::MAX`.
	#[inline]
	#[must_use]
	pub fn last_cell(&self) -> Option<(usize, usize)>
	{
		let k = self.length.checked_sub(1)?;
		match self.direction
		{
			Direction::Across => Some((self.row, self.column.checked_add(k)?)),
			Direction::Down => Some((self.row.checked_add(k)?, self.column))
		}
	}

	/// Get an iterator over the grid coordinates of the slot's cells, in
	/// reading order.
	#[inline]
	pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_
	{
		(0..self.length).map(move |k| self.cell(k))
	}
}

impl Display for Slot
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		write!(
			f,
			"{}-letter {} at ({}, {})",
			self.length,
			self.direction,
			self.row,
			self.column
		)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                 Crossword.                                 //
////////////////////////////////////////////////////////////////////////////////

/// The immutable puzzle model: grid geometry, slots, and the overlap map.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Crossword
{
	/// The number of columns.
	width: usize,

	/// The number of rows.
	height: usize,

	/// Which cells are open, in row-major order.
	open: Vec<Vec<bool>>,

	/// The slots, sorted ascending. A [`SlotId`] indexes this vector.
	slots: Vec<Slot>,

	/// For every ordered pair of distinct slots that share a cell, the
	/// position of that cell within each slot. Symmetric by construction.
	overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,

	/// The neighbors of each slot, sorted ascending.
	neighbors: Vec<Vec<SlotId>>
}

impl Crossword
{
	/// Parse a crossword structure. Each line is a row of the grid; `_`
	/// denotes an open cell and any other character a blocked cell. Short rows
	/// are padded with blocked cells. Every maximal run of at least two open
	/// cells, across or down, becomes a slot.
	///
	/// # Arguments
	///
	/// * `structure` - The textual structure.
	///
	/// # Returns
	///
	/// The crossword described by the structure.
	///
	/// # Errors
	///
	/// [`CrosswordError::EmptyStructure`] if the structure has no cells.
	pub fn parse(structure: &str) -> Result<Self, CrosswordError>
	{
		let rows = structure.lines().collect::<Vec<_>>();
		let height = rows.len();
		let width = rows.iter()
			.map(|row| row.trim_end_matches('\r').chars().count())
			.max()
			.unwrap_or(0);
		if width == 0
		{
			return Err(CrosswordError::EmptyStructure)
		}
		let open = rows.iter()
			.map(|row| {
				let mut cells = row.trim_end_matches('\r').chars()
					.map(|c| c == '_')
					.collect::<Vec<_>>();
				cells.resize(width, false);
				cells
			})
			.collect::<Vec<_>>();
		let slots = extract_slots(&open, width, height);
		trace!("parsed {}×{} structure: {} slots", width, height, slots.len());
		Self::build(width, height, open, slots)
	}

	/// Construct a crossword directly from its slots. The open cells are
	/// exactly those covered by some slot.
	///
	/// # Arguments
	///
	/// * `width` - The number of columns.
	/// * `height` - The number of rows.
	/// * `slots` - The slots, in any order.
	///
	/// # Returns
	///
	/// The crossword comprising the given slots.
	///
	/// # Errors
	///
	/// * [`CrosswordError::ZeroLength`] if a slot has no cells.
	/// * [`CrosswordError::OutOfBounds`] if a slot leaves the grid.
	/// * [`CrosswordError::DuplicateSlot`] if a slot is given twice.
	/// * [`CrosswordError::AmbiguousOverlap`] if two slots share more than one
	///   cell.
	pub fn from_slots(
		width: usize,
		height: usize,
		slots: Vec<Slot>
	) -> Result<Self, CrosswordError>
	{
		let mut open = vec![vec![false; width]; height];
		for slot in &slots
		{
			if slot.length == 0
			{
				return Err(CrosswordError::ZeroLength(*slot))
			}
			match slot.last_cell()
			{
				Some((row, column)) if row < height && column < width => {},
				_ => return Err(CrosswordError::OutOfBounds(*slot))
			}
			for (row, column) in slot.cells()
			{
				open[row][column] = true;
			}
		}
		Self::build(width, height, open, slots)
	}

	/// Read and parse a crossword structure from the given file.
	///
	/// # Arguments
	///
	/// * `path` - The structure file.
	///
	/// # Returns
	///
	/// The crossword described by the file.
	///
	/// # Errors
	///
	/// * If the file cannot be opened or read, an error is returned.
	/// * If the structure is malformed, an [`ErrorKind::InvalidData`] is
	///   returned.
	pub fn read_from_file<T: AsRef<Path>>(path: T) -> Result<Self, io::Error>
	{
		let structure = fs::read_to_string(path)?;
		Self::parse(&structure)
			.map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
	}

	/// Sort the slots, reject duplicates, and derive the overlap map and the
	/// neighbor relation.
	fn build(
		width: usize,
		height: usize,
		open: Vec<Vec<bool>>,
		mut slots: Vec<Slot>
	) -> Result<Self, CrosswordError>
	{
		slots.sort();
		if let Some(pair) = slots.windows(2).find(|pair| pair[0] == pair[1])
		{
			return Err(CrosswordError::DuplicateSlot(pair[0]))
		}
		// Index every cell by the slots that pass through it.
		let mut occupants = HashMap::<(usize, usize), Vec<(SlotId, usize)>>::new();
		for (id, slot) in slots.iter().enumerate()
		{
			for (k, cell) in slot.cells().enumerate()
			{
				occupants.entry(cell).or_default().push((id, k));
			}
		}
		let mut overlaps = HashMap::new();
		for entries in occupants.values()
		{
			for &(a, i) in entries
			{
				for &(b, j) in entries
				{
					if a != b && overlaps.insert((a, b), (i, j)).is_some()
					{
						return Err(CrosswordError::AmbiguousOverlap(
							slots[a.min(b)],
							slots[a.max(b)]
						))
					}
				}
			}
		}
		let mut neighbors = vec![Vec::new(); slots.len()];
		for &(a, b) in overlaps.keys()
		{
			neighbors[a].push(b);
		}
		neighbors.iter_mut().for_each(|n| n.sort_unstable());
		Ok(Self { width, height, open, slots, overlaps, neighbors })
	}

	/// The number of columns.
	#[inline]
	#[must_use]
	pub fn width(&self) -> usize { self.width }

	/// The number of rows.
	#[inline]
	#[must_use]
	pub fn height(&self) -> usize { self.height }

	/// Check whether the cell at the given coordinates is open. Cells outside
	/// the grid are not open.
	#[inline]
	#[must_use]
	pub fn is_open(&self, row: usize, column: usize) -> bool
	{
		self.open.get(row)
			.and_then(|cells| cells.get(column))
			.copied()
			.unwrap_or(false)
	}

	/// All slots, indexed by [`SlotId`].
	#[inline]
	#[must_use]
	pub fn slots(&self) -> &[Slot] { &self.slots }

	/// The slot with the given identifier.
	///
	/// # Panics
	///
	/// If `id` does not identify a slot of this crossword.
	#[inline]
	#[must_use]
	pub fn slot(&self, id: SlotId) -> &Slot { &self.slots[id] }

	/// The number of slots.
	#[inline]
	#[must_use]
	pub fn slot_count(&self) -> usize { self.slots.len() }

	/// The identifiers of all slots, ascending.
	#[inline]
	pub fn slot_ids(&self) -> impl Iterator<Item = SlotId>
	{
		0..self.slots.len()
	}

	/// The slots that share a cell with the given slot, ascending.
	#[inline]
	#[must_use]
	pub fn neighbors(&self, id: SlotId) -> &[SlotId]
	{
		self.neighbors.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// The overlap between two slots.
	///
	/// # Arguments
	///
	/// * `a` - The first slot.
	/// * `b` - The second slot.
	///
	/// # Returns
	///
	/// The position of the shared cell within `a` and within `b`,
	/// respectively, or `None` if the slots do not cross.
	#[inline]
	#[must_use]
	pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)>
	{
		self.overlaps.get(&(a, b)).copied()
	}

	/// Lay the words of an assignment onto the grid.
	///
	/// # Arguments
	///
	/// * `assignment` - The (possibly partial) assignment.
	///
	/// # Returns
	///
	/// The letter in each cell, row-major, or `None` where no assigned word
	/// covers the cell.
	#[must_use]
	pub fn letter_grid(&self, assignment: &Assignment) -> Vec<Vec<Option<char>>>
	{
		let mut letters = vec![vec![None; self.width]; self.height];
		for (id, word) in assignment.iter()
		{
			if let Some(slot) = self.slots.get(id)
			{
				for ((row, column), c) in slot.cells().zip(word.chars())
				{
					letters[row][column] = Some(c);
				}
			}
		}
		letters
	}

	/// Render an assignment as text: blocked cells are `█`, open cells show
	/// their letter or a space if unfilled. Every row ends with a newline.
	#[must_use]
	pub fn render(&self, assignment: &Assignment) -> String
	{
		let letters = self.letter_grid(assignment);
		let mut out = String::with_capacity((self.width + 1) * self.height);
		for (row, cells) in letters.iter().enumerate()
		{
			for (column, letter) in cells.iter().enumerate()
			{
				if self.is_open(row, column)
				{
					out.push(letter.unwrap_or(' '));
				}
				else
				{
					out.push('█');
				}
			}
			out.push('\n');
		}
		out
	}
}

/// Find every maximal run of at least two open cells, across and down.
fn extract_slots(open: &[Vec<bool>], width: usize, height: usize) -> Vec<Slot>
{
	let is_open = |row: usize, column: usize| open[row][column];
	let mut slots = Vec::new();
	for row in 0..height
	{
		for column in 0..width
		{
			if !is_open(row, column)
			{
				continue
			}
			if column == 0 || !is_open(row, column - 1)
			{
				let length = (column..width)
					.take_while(|&c| is_open(row, c))
					.count();
				if length > 1
				{
					slots.push(Slot::new(row, column, Direction::Across, length));
				}
			}
			if row == 0 || !is_open(row - 1, column)
			{
				let length = (row..height)
					.take_while(|&r| is_open(r, column))
					.count();
				if length > 1
				{
					slots.push(Slot::new(row, column, Direction::Down, length));
				}
			}
		}
	}
	slots
}

////////////////////////////////////////////////////////////////////////////////
//                                  Errors.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The complete enumeration of malformed puzzle descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrosswordError
{
	/// The structure contains no cells at all.
	EmptyStructure,

	/// The slot has no cells.
	ZeroLength(Slot),

	/// The slot extends beyond the edge of the grid.
	OutOfBounds(Slot),

	/// The slot occurs more than once.
	DuplicateSlot(Slot),

	/// The two slots share more than one cell, so they cannot be constrained
	/// by a single overlap.
	AmbiguousOverlap(Slot, Slot)
}

impl Display for CrosswordError
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		match self
		{
			Self::EmptyStructure => write!(f, "structure has no cells"),
			Self::ZeroLength(slot) => write!(f, "slot has no cells: {}", slot),
			Self::OutOfBounds(slot) =>
				write!(f, "slot extends beyond the grid: {}", slot),
			Self::DuplicateSlot(slot) =>
				write!(f, "slot occurs more than once: {}", slot),
			Self::AmbiguousOverlap(a, b) =>
				write!(f, "slots share more than one cell: {} and {}", a, b)
		}
	}
}

impl Error for CrosswordError {}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
