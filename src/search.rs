//! # Search
//!
//! Herein is the backtracking search engine. The search reads its candidates
//! from domains that were already pruned by the consistency engine and never
//! prunes them further.
//!
//! The recursion of classic backtracking is replaced by an explicit stack of
//! [frames](Frame), so that the complete context of the search is a value. This
//! permits the search to be time-sliced: [`Search::run`] advances it for a
//! bounded duration and answers the continuation. A caller that wants to give
//! up simply drops the continuation, which amounts to reporting no solution.

use std::{
	cmp::Reverse,
	rc::Rc,
	time::{Duration, Instant}
};

use log::{debug, trace};

use crate::{
	assignment::{letter, Assignment},
	consistency::letter_counts,
	crossword::{Crossword, SlotId},
	domains::Domains
};

////////////////////////////////////////////////////////////////////////////////
//                                  Search.                                   //
////////////////////////////////////////////////////////////////////////////////

/// How to order the candidates of the selected slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueOrder
{
	/// Least-constraining value first: candidates are tried in ascending order
	/// of how many candidates they would rule out from the unassigned
	/// neighbors. Ties keep domain order.
	#[default]
	LeastConstraining,

	/// Domain order, i.e., alphabetical.
	Lexicographic
}

/// Counters describing the work performed by a [`Search`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics
{
	/// How many tentative assignments passed the consistency check.
	pub assignments: u64,

	/// How many times an assignment was undone because its subtree failed.
	pub backtracks: u64
}

/// The complete context of the backtracking search.
#[derive(Clone, Debug)]
#[must_use]
pub struct Search
{
	/// The puzzle model.
	crossword: Rc<Crossword>,

	/// The frozen, pruned domains.
	domains: Rc<Domains>,

	/// How to order candidates.
	order: ValueOrder,

	/// The current partial assignment.
	assignment: Assignment,

	/// One frame per slot under consideration, outermost first. Every frame
	/// but the last has its slot assigned; the last frame's slot is assigned
	/// iff the stack is as deep as the assignment is large.
	frames: Vec<Frame>,

	/// Whether and how the search finished.
	outcome: Outcome,

	/// Work counters.
	statistics: Statistics
}

impl Search
{
	/// Construct a search over the given crossword and pruned domains,
	/// starting from the empty assignment.
	///
	/// # Arguments
	///
	/// * `crossword` - The puzzle model.
	/// * `domains` - The pruned domains, which are no longer modified.
	/// * `order` - How to order candidates.
	pub fn new(
		crossword: Rc<Crossword>,
		domains: Rc<Domains>,
		order: ValueOrder
	) -> Self
	{
		Self
		{
			crossword,
			domains,
			order,
			assignment: Assignment::new(),
			frames: Vec::new(),
			outcome: Outcome::Running,
			statistics: Statistics::default()
		}
	}

	/// Check if the search has terminated, either with a solution or by
	/// exhausting the search space.
	#[inline]
	#[must_use]
	pub fn is_finished(&self) -> bool
	{
		self.outcome != Outcome::Running
	}

	/// Check if the search has found a complete, consistent assignment.
	#[inline]
	#[must_use]
	pub fn is_solved(&self) -> bool
	{
		self.outcome == Outcome::Solved
	}

	/// The current, possibly partial, assignment.
	#[inline]
	pub fn assignment(&self) -> &Assignment { &self.assignment }

	/// The solution, if the search has found one.
	#[inline]
	#[must_use]
	pub fn solution(&self) -> Option<&Assignment>
	{
		self.is_solved().then_some(&self.assignment)
	}

	/// Consume the search, answering the solution if it found one.
	#[inline]
	#[must_use]
	pub fn into_solution(self) -> Option<Assignment>
	{
		match self.outcome
		{
			Outcome::Solved => Some(self.assignment),
			_ => None
		}
	}

	/// The work performed so far.
	#[inline]
	#[must_use]
	pub fn statistics(&self) -> Statistics { self.statistics }

	/// The puzzle model being searched.
	#[inline]
	pub fn crossword(&self) -> &Crossword { &self.crossword }

	/// Run the search until it finishes or the specified quantum elapses.
	/// Always perform at least one step, even if the quantum is zero, so that
	/// the search always makes progress.
	///
	/// # Arguments
	///
	/// * `duration` - The maximum amount of time to run before answering the
	///   continuation.
	///
	/// # Returns
	///
	/// The continuation. The caller should call
	/// [`is_finished`](Self::is_finished) to determine if there is any
	/// additional work to perform.
	pub fn run(mut self, duration: Duration) -> Self
	{
		if self.is_finished()
		{
			trace!("search is already finished");
			return self
		}
		let start_time = Instant::now();
		loop
		{
			self.step();
			if self.is_finished()
			{
				return self
			}
			let elapsed = start_time.elapsed();
			if elapsed >= duration
			{
				trace!("quantum elapsed: {:?}", elapsed);
				return self
			}
		}
	}

	/// Run the search until it finishes.
	pub fn run_fully(mut self) -> Self
	{
		while !self.is_finished()
		{
			self = self.run(Duration::MAX);
		}
		self
	}

	/// Advance the search by one transition:
	///
	/// * If every frame's slot is assigned, either the assignment is complete
	///   (success) or a new frame is opened for the next slot.
	/// * Otherwise, the innermost frame tries its next candidate. If no
	///   candidate remains, the frame is popped and its parent's assignment is
	///   undone; popping the outermost frame exhausts the search.
	fn step(&mut self)
	{
		if self.frames.len() == self.assignment.len()
		{
			match self.select_unassigned_slot()
			{
				None =>
				{
					debug!(
						"found solution after {} assignments and {} backtracks",
						self.statistics.assignments,
						self.statistics.backtracks
					);
					self.outcome = Outcome::Solved;
				},
				Some(slot) =>
				{
					let candidates = self.order_domain_values(slot);
					trace!(
						"selected slot {} with {} candidates",
						slot,
						candidates.len()
					);
					self.frames.push(Frame { slot, candidates, next: 0 });
				}
			}
			return
		}
		if let Some(frame) = self.frames.last_mut()
		{
			while frame.next < frame.candidates.len()
			{
				let index = frame.next;
				frame.next += 1;
				let word = &frame.candidates[index];
				if self.assignment.admits(&self.crossword, frame.slot, word)
				{
					trace!("assign {} → {}", frame.slot, word);
					self.assignment.insert(frame.slot, word.as_str());
					self.statistics.assignments += 1;
					return
				}
			}
		}
		self.frames.pop();
		match self.frames.last()
		{
			Some(parent) =>
			{
				let undone = self.assignment.remove(parent.slot);
				trace!("backtrack {} ↚ {:?}", parent.slot, undone);
				self.statistics.backtracks += 1;
			},
			None =>
			{
				debug!(
					"exhausted search space after {} assignments",
					self.statistics.assignments
				);
				self.outcome = Outcome::Exhausted;
			}
		}
	}

	/// Select the next slot to assign. Prefer the slot with the fewest
	/// remaining candidates, then the slot with the most neighbors, then the
	/// lowest [`SlotId`].
	///
	/// # Returns
	///
	/// The selected slot, or `None` if every slot is assigned.
	#[must_use]
	pub fn select_unassigned_slot(&self) -> Option<SlotId>
	{
		self.crossword.slot_ids()
			.filter(|&slot| !self.assignment.contains(slot))
			.min_by_key(|&slot| (
				self.domains.size(slot),
				Reverse(self.crossword.neighbors(slot).len())
			))
	}

	/// Order the candidates of the given slot according to the configured
	/// [`ValueOrder`].
	///
	/// # Arguments
	///
	/// * `slot` - The slot about to be assigned.
	///
	/// # Returns
	///
	/// The candidates, in the order in which they should be tried.
	#[must_use]
	pub fn order_domain_values(&self, slot: SlotId) -> Vec<String>
	{
		let domain = match self.domains.get(slot)
		{
			Some(domain) => domain,
			None => return Vec::new()
		};
		if self.order == ValueOrder::Lexicographic
		{
			return domain.iter().cloned().collect()
		}
		// Summarize each unassigned neighbor once: its domain, the overlap, and
		// how many of its candidates carry each letter at the shared cell.
		let constraints = self.crossword.neighbors(slot).iter()
			.filter(|&&neighbor| !self.assignment.contains(neighbor))
			.filter_map(|&neighbor| {
				let (i, j) = self.crossword.overlap(slot, neighbor)?;
				let words = self.domains.get(neighbor)?;
				Some((words, i, j, letter_counts(words.iter(), j)))
			})
			.collect::<Vec<_>>();
		let mut ranked = domain.iter()
			.map(|word| {
				let ruled_out = constraints.iter()
					.map(|(words, i, j, counts)| {
						let c = letter(word, *i);
						let compatible = c
							.and_then(|c| counts.get(&c))
							.copied()
							.unwrap_or(0);
						// The neighbor could not take the very same word.
						let identical = usize::from(
							c.is_some()
								&& letter(word, *j) == c
								&& words.contains(word)
						);
						words.len() - compatible + identical
					})
					.sum::<usize>();
				(ruled_out, word)
			})
			.collect::<Vec<_>>();
		ranked.sort_by_key(|&(ruled_out, _)| ruled_out);
		ranked.into_iter().map(|(_, word)| word.clone()).collect()
	}
}

/// A level of the explicit search stack.
#[derive(Clone, Debug)]
struct Frame
{
	/// The slot being assigned at this level.
	slot: SlotId,

	/// The ordered candidates of the slot.
	candidates: Vec<String>,

	/// The index of the next candidate to try.
	next: usize
}

/// The state of a [`Search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome
{
	/// There is more work to do.
	Running,

	/// A complete, consistent assignment was found.
	Solved,

	/// Every candidate of the first slot failed.
	Exhausted
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::{rc::Rc, time::Duration};

	use crate::{
		consistency::enforce_node_consistency,
		crossword::{Crossword, Direction, Slot},
		domains::Domains,
		search::{Search, ValueOrder},
		vocabulary::Vocabulary
	};

	/// Build a search over node-consistent domains.
	fn start(
		crossword: Crossword,
		words: &[&str],
		order: ValueOrder
	) -> Search
	{
		let vocabulary = words.iter().collect::<Vocabulary>();
		let mut domains = Domains::new(crossword.slot_count(), &vocabulary);
		enforce_node_consistency(&crossword, &mut domains);
		Search::new(Rc::new(crossword), Rc::new(domains), order)
	}

	/// A 4-letter across slot whose first and last letters start two down
	/// slots of lengths 3 and 2.
	fn comb() -> Crossword
	{
		Crossword::from_slots(
			4,
			3,
			vec![
				Slot::new(0, 0, Direction::Across, 4),
				Slot::new(0, 0, Direction::Down, 3),
				Slot::new(0, 3, Direction::Down, 2)
			]
		).unwrap()
	}

	/// Ensure that the most constrained slot is selected first, with the
	/// degree and then the slot order breaking ties.
	#[test]
	fn test_select_unassigned_slot()
	{
		let words = ["abcd", "abce", "axe", "dog", "ex", "eh", "do"];
		let search = start(comb(), &words, ValueOrder::default());
		// Domain sizes are 2, 2, and 3; the across slot has two neighbors.
		assert_eq!(search.select_unassigned_slot(), Some(0));

		let words = ["abcd", "axe", "dog", "ex", "eh", "do"];
		let search = search_with_assigned(comb(), &words, &[(0, "ABCD")]);
		assert_eq!(search.select_unassigned_slot(), Some(1));

		let crossword = Crossword::from_slots(
			3,
			3,
			vec![
				Slot::new(0, 0, Direction::Across, 3),
				Slot::new(2, 0, Direction::Across, 3)
			]
		).unwrap();
		let search = start(crossword, &["cat", "dog"], ValueOrder::default());
		assert_eq!(search.select_unassigned_slot(), Some(0));
	}

	/// Build a search and force some assignments into it.
	fn search_with_assigned(
		crossword: Crossword,
		words: &[&str],
		assigned: &[(usize, &str)]
	) -> Search
	{
		let mut search = start(crossword, words, ValueOrder::default());
		for &(slot, word) in assigned
		{
			search.assignment.insert(slot, word);
		}
		search
	}

	/// Ensure that candidates are ordered by how few neighbor candidates they
	/// rule out, with identical words counting as ruled out.
	#[test]
	fn test_order_domain_values()
	{
		// Slot 1 (down, length 3) starts with the across word's first letter;
		// slot 2 (down, length 2) with its last.
		let words = ["abcd", "abce", "xbce", "axe", "ant", "dog", "ex", "eh", "do"];
		let search = start(comb(), &words, ValueOrder::LeastConstraining);
		// ABCD rules out DOG from slot 1 and EX, EH from slot 2: 3.
		// ABCE rules out DOG and DO: 2.
		// XBCE rules out AXE, ANT, DOG and DO: 4.
		assert_eq!(search.order_domain_values(0), ["ABCE", "ABCD", "XBCE"]);

		let lexicographic = search.clone();
		let lexicographic = Search { order: ValueOrder::Lexicographic, ..lexicographic };
		assert_eq!(
			lexicographic.order_domain_values(0),
			["ABCD", "ABCE", "XBCE"]
		);

		// Assigned neighbors do not count.
		let mut search = search;
		search.assignment.insert(1, "AXE");
		// ABCD rules out EX, EH: 2. ABCE rules out DO: 1. XBCE: DO: 1.
		assert_eq!(search.order_domain_values(0), ["ABCE", "XBCE", "ABCD"]);
	}

	/// Ensure that an identical word in a neighbor counts as ruled out. Both
	/// slots start at the same cell.
	#[test]
	fn test_order_domain_values_identical()
	{
		let crossword = Crossword::from_slots(
			2,
			2,
			vec![
				Slot::new(0, 0, Direction::Across, 2),
				Slot::new(0, 0, Direction::Down, 2)
			]
		).unwrap();
		let search = start(crossword, &["aa", "ab", "ba"], ValueOrder::default());
		// AA rules out BA and itself: 2. AB rules out BA and itself: 2. BA
		// rules out AA, AB and itself: 3.
		assert_eq!(search.order_domain_values(0), ["AA", "AB", "BA"]);
	}

	/// Ensure that the search finds the solution of the small fixture and
	/// counts its work.
	#[test]
	fn test_run_fully()
	{
		let crossword = Crossword::read_from_file("data/structure0.txt").unwrap();
		let vocabulary = Vocabulary::read_from_file("data/words0.txt").unwrap();
		let words = vocabulary.iter().collect::<Vec<_>>();
		let search = start(crossword, &words, ValueOrder::default()).run_fully();
		assert!(search.is_finished());
		assert!(search.is_solved());
		let solution = search.solution().unwrap();
		assert!(solution.is_complete(search.crossword()));
		assert!(solution.is_consistent(search.crossword()));
		assert_eq!(solution.get(0), Some("SIX"));
		assert_eq!(solution.get(1), Some("SEVEN"));
		assert_eq!(solution.get(2), Some("FIVE"));
		assert_eq!(solution.get(3), Some("NINE"));
		assert!(search.statistics().assignments >= 4);
	}

	/// Ensure that time slicing makes progress in every quantum and reaches
	/// the same answer as an uninterrupted run.
	#[test]
	fn test_run_sliced()
	{
		let crossword = Crossword::read_from_file("data/structure1.txt").unwrap();
		let vocabulary = Vocabulary::read_from_file("data/words1.txt").unwrap();
		let words = vocabulary.iter().collect::<Vec<_>>();
		let expected = start(crossword.clone(), &words, ValueOrder::default())
			.run_fully();
		let mut sliced = start(crossword, &words, ValueOrder::default());
		let mut quanta = 0;
		while !sliced.is_finished()
		{
			sliced = sliced.run(Duration::ZERO);
			quanta += 1;
		}
		assert!(quanta > 1);
		assert_eq!(sliced.solution(), expected.solution());
		assert_eq!(sliced.statistics(), expected.statistics());
		assert!(sliced.is_solved());
	}

	/// Ensure that exhaustion is reported as the absence of a solution.
	#[test]
	fn test_exhausted()
	{
		// Both slots need a 3-letter word and there is only one.
		let crossword = Crossword::from_slots(
			3,
			3,
			vec![
				Slot::new(0, 0, Direction::Across, 3),
				Slot::new(2, 0, Direction::Across, 3)
			]
		).unwrap();
		let search = start(crossword, &["cat"], ValueOrder::default())
			.run_fully();
		assert!(search.is_finished());
		assert!(!search.is_solved());
		assert_eq!(search.solution(), None);
		assert_eq!(search.statistics().backtracks, 1);
		assert_eq!(search.into_solution(), None);
	}

	/// Ensure that a crossword without slots is trivially solved.
	#[test]
	fn test_no_slots()
	{
		let crossword = Crossword::from_slots(1, 1, vec![]).unwrap();
		let search = start(crossword, &["a"], ValueOrder::default())
			.run(Duration::ZERO);
		assert!(search.is_solved());
		assert!(search.into_solution().unwrap().is_empty());
	}
}
