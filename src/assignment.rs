//! # Assignment
//!
//! An [`Assignment`] is the working state of the search: a partial mapping
//! from slots to words. Here also live the consistency checks that decide
//! whether an assignment (or a proposed extension of one) is admissible.

use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::{self, BufWriter, ErrorKind, Write},
	path::Path
};

use serde::{Deserialize, Serialize};

use crate::crossword::{Crossword, SlotId};

/// A partial mapping from slots to words, ordered by [`SlotId`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Assignment(BTreeMap<SlotId, String>);

impl Assignment
{
	/// Construct an empty assignment. Same as [`Default::default`].
	#[inline]
	pub fn new() -> Self { Self(BTreeMap::new()) }

	/// The number of assigned slots.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.0.len() }

	/// Check if no slot is assigned.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	/// Check if the given slot is assigned.
	#[inline]
	#[must_use]
	pub fn contains(&self, slot: SlotId) -> bool { self.0.contains_key(&slot) }

	/// Get the word assigned to the given slot, if any.
	#[inline]
	#[must_use]
	pub fn get(&self, slot: SlotId) -> Option<&str>
	{
		self.0.get(&slot).map(String::as_str)
	}

	/// Assign a word to a slot, replacing any previous word.
	///
	/// # Returns
	///
	/// The word previously assigned to the slot, if any.
	#[inline]
	pub fn insert<W: Into<String>>(&mut self, slot: SlotId, word: W)
		-> Option<String>
	{
		self.0.insert(slot, word.into())
	}

	/// Unassign a slot.
	///
	/// # Returns
	///
	/// The word that was assigned to the slot, if any.
	#[inline]
	pub fn remove(&mut self, slot: SlotId) -> Option<String>
	{
		self.0.remove(&slot)
	}

	/// Get an iterator over the assigned slots and their words, ordered by
	/// slot.
	#[inline]
	pub fn iter(&self) -> impl Iterator<Item = (SlotId, &str)> + '_
	{
		self.0.iter().map(|(&slot, word)| (slot, word.as_str()))
	}

	/// Serialize the assignment to the given file, in [`bincode`](bincode)
	/// format.
	///
	/// # Errors
	///
	/// * If the file cannot be created or written, an error is returned.
	/// * If serialization fails, an [`ErrorKind::InvalidData`] is returned.
	pub fn serialize_to_file<T: AsRef<Path>>(
		&self,
		path: T
	) -> Result<(), io::Error>
	{
		let mut writer = BufWriter::new(File::create(path)?);
		bincode::serialize_into(&mut writer, self)
			.map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
		writer.flush()
	}

	/// Deserialize an assignment from the given file, previously written by
	/// [`serialize_to_file`](Self::serialize_to_file).
	///
	/// # Errors
	///
	/// * If the file cannot be opened or read, an error is returned.
	/// * If the file contains invalid data, an [`ErrorKind::InvalidData`] is
	///   returned.
	pub fn deserialize_from_file<T: AsRef<Path>>(
		path: T
	) -> Result<Self, io::Error>
	{
		let content = fs::read(path)?;
		bincode::deserialize(&content)
			.map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
	}

	/// Check if every slot of the crossword is assigned a word.
	///
	/// # Arguments
	///
	/// * `crossword` - The puzzle model.
	///
	/// # Returns
	///
	/// `true` if the assignment is complete, `false` otherwise.
	#[must_use]
	pub fn is_complete(&self, crossword: &Crossword) -> bool
	{
		crossword.slot_ids().all(|slot| self.contains(slot))
	}

	/// Check the whole assignment for consistency:
	///
	/// * every word has the length of its slot,
	/// * no two slots share the same word, and
	/// * every pair of crossing slots agrees on the shared letter.
	///
	/// # Arguments
	///
	/// * `crossword` - The puzzle model.
	///
	/// # Returns
	///
	/// `true` if the assignment is consistent, `false` otherwise.
	#[must_use]
	pub fn is_consistent(&self, crossword: &Crossword) -> bool
	{
		for (a, first) in self.iter()
		{
			if a >= crossword.slot_count()
				|| first.chars().count() != crossword.slot(a).length
			{
				return false
			}
			for (b, second) in self.iter()
			{
				if a == b
				{
					continue
				}
				if first == second
				{
					return false
				}
				if let Some((i, j)) = crossword.overlap(a, b)
				{
					if letter(first, i) != letter(second, j)
					{
						return false
					}
				}
			}
		}
		true
	}

	/// Check whether extending this assignment with `slot → word` keeps it
	/// consistent. Only the constraints that involve the new pair are
	/// examined, so the answer equals [`is_consistent`](Self::is_consistent)
	/// on the extension whenever this assignment is already consistent.
	///
	/// # Arguments
	///
	/// * `crossword` - The puzzle model.
	/// * `slot` - The slot to assign, which must not already be assigned.
	/// * `word` - The proposed word.
	///
	/// # Returns
	///
	/// `true` if the extension is consistent, `false` otherwise.
	#[must_use]
	pub fn admits(&self, crossword: &Crossword, slot: SlotId, word: &str) -> bool
	{
		if slot >= crossword.slot_count()
			|| word.chars().count() != crossword.slot(slot).length
		{
			return false
		}
		if self.iter().any(|(other, assigned)| other != slot && assigned == word)
		{
			return false
		}
		crossword.neighbors(slot).iter().all(|&neighbor| {
			match (self.get(neighbor), crossword.overlap(slot, neighbor))
			{
				(Some(assigned), Some((i, j))) =>
					letter(word, i) == letter(assigned, j),
				_ => true
			}
		})
	}
}

impl FromIterator<(SlotId, String)> for Assignment
{
	fn from_iter<T: IntoIterator<Item = (SlotId, String)>>(iter: T) -> Self
	{
		Self(iter.into_iter().collect())
	}
}

/// Get the letter at the given position of a word. A position beyond the end
/// of the word yields `None`, which matches nothing but another `None`;
/// callers only compare positions that are in range for well-formed
/// assignments.
#[inline]
#[must_use]
pub(crate) fn letter(word: &str, position: usize) -> Option<char>
{
	word.chars().nth(position)
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
