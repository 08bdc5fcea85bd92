//! # Domains
//!
//! The domain store: the candidate words still available to each slot. Domains
//! only ever shrink. They are mutated exclusively by the consistency engine
//! before search and then frozen for the search engine to read.

use std::{collections::BTreeSet, ops::Index};

use crate::{crossword::SlotId, vocabulary::Vocabulary};

/// The candidate words of every slot, indexed by [`SlotId`]. Each domain is an
/// ordered set, so iteration order is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Domains(Vec<BTreeSet<String>>);

impl Domains
{
	/// Give each of `slot_count` slots the complete vocabulary.
	///
	/// # Arguments
	///
	/// * `slot_count` - The number of slots.
	/// * `vocabulary` - The initial candidates of every slot.
	pub fn new(slot_count: usize, vocabulary: &Vocabulary) -> Self
	{
		Self(vec![vocabulary.words().clone(); slot_count])
	}

	/// The number of slots.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.0.len() }

	/// Check if there are no slots at all.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	/// The candidates of the given slot.
	#[inline]
	#[must_use]
	pub fn get(&self, slot: SlotId) -> Option<&BTreeSet<String>>
	{
		self.0.get(slot)
	}

	/// The number of candidates of the given slot; zero for unknown slots.
	#[inline]
	#[must_use]
	pub fn size(&self, slot: SlotId) -> usize
	{
		self.0.get(slot).map_or(0, BTreeSet::len)
	}

	/// The number of candidates summed over every slot.
	#[inline]
	#[must_use]
	pub fn total_size(&self) -> usize
	{
		self.0.iter().map(BTreeSet::len).sum()
	}

	/// Check if any slot has run out of candidates.
	#[inline]
	#[must_use]
	pub fn any_empty(&self) -> bool
	{
		self.0.iter().any(BTreeSet::is_empty)
	}

	/// Keep only the candidates of `slot` that satisfy the predicate.
	///
	/// # Returns
	///
	/// The number of candidates removed.
	pub fn retain<F>(&mut self, slot: SlotId, keep: F) -> usize
		where F: FnMut(&String) -> bool
	{
		match self.0.get_mut(slot)
		{
			Some(domain) =>
			{
				let before = domain.len();
				domain.retain(keep);
				before - domain.len()
			},
			None => 0
		}
	}

	/// Get an iterator over the slots and their candidates.
	#[inline]
	pub fn iter(&self) -> impl Iterator<Item = (SlotId, &BTreeSet<String>)> + '_
	{
		self.0.iter().enumerate()
	}
}

impl Index<SlotId> for Domains
{
	type Output = BTreeSet<String>;

	#[inline]
	fn index(&self, slot: SlotId) -> &Self::Output
	{
		&self.0[slot]
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
