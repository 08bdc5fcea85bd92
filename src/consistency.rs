//! # Consistency
//!
//! Herein is the consistency engine, which prunes the [`Domains`] before search
//! begins:
//!
//! * Node consistency removes every candidate whose length differs from its
//!   slot's length.
//! * Arc consistency (AC-3) removes every candidate of a slot that has no
//!   compatible, distinct partner in a crossing slot's domain, propagating
//!   each removal to the slot's other neighbors until a fixed point is
//!   reached or some domain empties.
//!
//! Both only ever remove candidates, so AC-3 terminates: an arc is re-queued
//! only after an actual removal, and the total domain size is bounded below by
//! zero.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, trace};

use crate::{
	assignment::letter,
	crossword::{Crossword, SlotId},
	domains::Domains
};

/// A directed arc `(x, y)`: the candidates of `x` must each be supported by
/// some candidate of `y`.
pub type Arc = (SlotId, SlotId);

/// Remove from every slot's domain the words whose length differs from the
/// slot's length.
///
/// # Arguments
///
/// * `crossword` - The puzzle model.
/// * `domains` - The domains to prune.
pub fn enforce_node_consistency(crossword: &Crossword, domains: &mut Domains)
{
	for slot in crossword.slot_ids()
	{
		let length = crossword.slot(slot).length;
		let removed = domains.retain(slot, |word| word.chars().count() == length);
		trace!(
			"node consistency: {}: removed {}, kept {}",
			crossword.slot(slot),
			removed,
			domains.size(slot)
		);
	}
	debug!(
		"node consistency enforced: {} candidates remain",
		domains.total_size()
	);
}

/// Make `x` arc consistent with `y`: remove every candidate `w` of `x` for
/// which no candidate `w2` of `y` satisfies `w != w2` and `w[a] == w2[b]`,
/// where `(a, b)` is the overlap of `x` and `y`.
///
/// # Arguments
///
/// * `crossword` - The puzzle model.
/// * `domains` - The domains to prune.
/// * `x` - The slot whose domain is revised.
/// * `y` - The neighbor that must support `x`.
///
/// # Returns
///
/// `true` if the domain of `x` changed, `false` otherwise. Slots that do not
/// cross never change.
pub fn revise(
	crossword: &Crossword,
	domains: &mut Domains,
	x: SlotId,
	y: SlotId
) -> bool
{
	let (a, b) = match crossword.overlap(x, y)
	{
		Some(overlap) => overlap,
		None => return false
	};
	let doomed = match (domains.get(x), domains.get(y))
	{
		(Some(xs), Some(ys)) =>
		{
			let supply = letter_counts(ys.iter(), b);
			xs.iter()
				.filter(|word| {
					let c = match letter(word, a)
					{
						Some(c) => c,
						None => return true
					};
					let available = supply.get(&c).copied().unwrap_or(0);
					// A word never supports itself.
					let own = usize::from(
						letter(word, b) == Some(c) && ys.contains(*word)
					);
					available <= own
				})
				.cloned()
				.collect::<HashSet<_>>()
		},
		_ => return false
	};
	if doomed.is_empty()
	{
		return false
	}
	domains.retain(x, |word| !doomed.contains(word));
	trace!("revised {} against {}: removed {}", x, y, doomed.len());
	true
}

/// Enforce arc consistency with AC-3. Arcs are processed first in, first out.
/// Whenever revising `(x, y)` shrinks `x`, every arc `(z, x)` for a neighbor
/// `z` of `x` other than `y` is queued again.
///
/// # Arguments
///
/// * `crossword` - The puzzle model.
/// * `domains` - The domains to prune.
/// * `arcs` - The initial work list. If `None`, every arc between crossing
///   slots is queued, ordered by `x` and then by `y`.
///
/// # Returns
///
/// `true` if arc consistency holds and no domain is empty. `false` as soon as
/// some domain empties, in which case the puzzle is unsatisfiable and the
/// remaining work list is abandoned.
pub fn ac3(
	crossword: &Crossword,
	domains: &mut Domains,
	arcs: Option<Vec<Arc>>
) -> bool
{
	let mut queue = match arcs
	{
		Some(arcs) => VecDeque::from(arcs),
		None => all_arcs(crossword).collect::<VecDeque<_>>()
	};
	trace!("AC-3 starting with {} arcs", queue.len());
	let mut revisions = 0usize;
	while let Some((x, y)) = queue.pop_front()
	{
		revisions += 1;
		if revise(crossword, domains, x, y)
		{
			if domains.size(x) == 0
			{
				debug!(
					"AC-3 emptied the domain of {} after {} revisions",
					crossword.slot(x),
					revisions
				);
				return false
			}
			queue.extend(
				crossword.neighbors(x).iter()
					.filter(|&&z| z != y)
					.map(|&z| (z, x))
			);
		}
	}
	debug!(
		"AC-3 reached a fixed point after {} revisions: {} candidates remain",
		revisions,
		domains.total_size()
	);
	true
}

/// Every arc between crossing slots, ordered by `x` and then by `y`.
pub fn all_arcs(crossword: &Crossword) -> impl Iterator<Item = Arc> + '_
{
	crossword.slot_ids()
		.flat_map(move |x| crossword.neighbors(x).iter().map(move |&y| (x, y)))
}

/// Count the words by their letter at the given position. Words too short to
/// have such a letter are not counted.
pub(crate) fn letter_counts<'a, I>(words: I, position: usize)
	-> HashMap<char, usize>
	where I: Iterator<Item = &'a String>
{
	let mut counts = HashMap::new();
	for c in words.filter_map(|word| letter(word, position))
	{
		*counts.entry(c).or_insert(0) += 1;
	}
	counts
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
