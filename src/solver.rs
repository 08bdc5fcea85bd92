//! # Solver
//!
//! Herein is the crossword solver, which ties the stages together:
//!
//! 1. Every slot starts out with the whole [`Vocabulary`].
//! 2. Node consistency prunes each domain by length.
//! 3. AC-3 prunes each domain by the overlaps, failing fast if any domain
//!    empties.
//! 4. The domains are frozen and handed to a backtracking [`Search`].
//!
//! Each stage is exposed on its own so that it can be inspected in isolation.

use std::{
	error::Error,
	fmt::{self, Display, Formatter},
	rc::Rc
};

use log::debug;

use crate::{
	assignment::Assignment,
	consistency::{self, Arc},
	crossword::{Crossword, SlotId},
	domains::Domains,
	search::{Search, ValueOrder},
	vocabulary::Vocabulary
};

////////////////////////////////////////////////////////////////////////////////
//                                  Solver.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The solver owns the domains exclusively while they are being pruned.
#[derive(Clone, Debug)]
#[must_use]
pub struct Solver
{
	/// The puzzle model.
	crossword: Rc<Crossword>,

	/// The candidates of every slot.
	domains: Domains,

	/// How the search orders candidates.
	order: ValueOrder
}

impl Solver
{
	/// Construct a new solver, giving every slot the complete vocabulary.
	///
	/// # Arguments
	///
	/// * `crossword` - The puzzle model.
	/// * `vocabulary` - The words available to every slot.
	///
	/// # Returns
	///
	/// A new solver whose domains are not yet pruned.
	///
	/// # Errors
	///
	/// [`SolverError::EmptyVocabulary`] if there are no words at all.
	pub fn new(
		crossword: Rc<Crossword>,
		vocabulary: &Vocabulary
	) -> Result<Self, SolverError>
	{
		if vocabulary.is_empty()
		{
			return Err(SolverError::EmptyVocabulary)
		}
		let domains = Domains::new(crossword.slot_count(), vocabulary);
		debug!(
			"solver created: {} slots, {} words",
			crossword.slot_count(),
			vocabulary.len()
		);
		Ok(Self { crossword, domains, order: ValueOrder::default() })
	}

	/// Choose how the search orders candidates.
	#[inline]
	pub fn with_value_order(mut self, order: ValueOrder) -> Self
	{
		self.order = order;
		self
	}

	/// The puzzle model.
	#[inline]
	pub fn crossword(&self) -> &Crossword { &self.crossword }

	/// The current domains, reflecting whichever stages have run so far.
	#[inline]
	pub fn domains(&self) -> &Domains { &self.domains }

	/// Remove every candidate whose length differs from its slot's length.
	#[inline]
	pub fn enforce_node_consistency(&mut self)
	{
		consistency::enforce_node_consistency(&self.crossword, &mut self.domains)
	}

	/// Make `x` arc consistent with `y`. See [`consistency::revise`].
	///
	/// # Returns
	///
	/// `true` if the domain of `x` changed, `false` otherwise.
	#[inline]
	pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool
	{
		consistency::revise(&self.crossword, &mut self.domains, x, y)
	}

	/// Enforce arc consistency. See [`consistency::ac3`].
	///
	/// # Arguments
	///
	/// * `arcs` - The initial work list, or `None` for every arc.
	///
	/// # Returns
	///
	/// `true` if arc consistency holds and no domain is empty, `false` if the
	/// puzzle was shown to be unsatisfiable.
	#[inline]
	pub fn ac3(&mut self, arcs: Option<Vec<Arc>>) -> bool
	{
		consistency::ac3(&self.crossword, &mut self.domains, arcs)
	}

	/// Run node consistency and AC-3, then freeze the domains into a search
	/// that is ready to run.
	///
	/// # Returns
	///
	/// The search, or `None` if pruning alone proved the puzzle
	/// unsatisfiable. In that case no search is ever attempted.
	#[must_use]
	pub fn prepare(mut self) -> Option<Search>
	{
		self.enforce_node_consistency();
		if self.domains.any_empty()
		{
			debug!("some slot has no word of the right length");
			return None
		}
		if !self.ac3(None)
		{
			return None
		}
		Some(Search::new(self.crossword, Rc::new(self.domains), self.order))
	}

	/// Solve the crossword: node consistency, AC-3, then backtracking search.
	///
	/// # Returns
	///
	/// A complete, consistent assignment, or `None` if the crossword is
	/// unsatisfiable with this vocabulary.
	#[must_use]
	pub fn solve(self) -> Option<Assignment>
	{
		self.prepare()?.run_fully().into_solution()
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                  Errors.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The complete enumeration of malformed solver inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverError
{
	/// The vocabulary contains no words.
	EmptyVocabulary
}

impl Display for SolverError
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		match self
		{
			Self::EmptyVocabulary => write!(f, "vocabulary is empty")
		}
	}
}

impl Error for SolverError {}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::rc::Rc;

	use crate::{
		assignment::Assignment,
		crossword::{Crossword, Direction, Slot},
		search::ValueOrder,
		solver::{Solver, SolverError},
		vocabulary::Vocabulary
	};

	/// A 3-letter across slot crossed at its middle letter by a down slot of
	/// the given length, i.e., with overlap (1, 0).
	fn crossing(length: usize) -> Rc<Crossword>
	{
		Rc::new(
			Crossword::from_slots(
				3,
				length,
				vec![
					Slot::new(0, 0, Direction::Across, 3),
					Slot::new(0, 1, Direction::Down, length)
				]
			).unwrap()
		)
	}

	/// Build a vocabulary from literal words.
	fn vocabulary(words: &[&str]) -> Vocabulary
	{
		words.iter().collect()
	}

	/// Enumerate every assignment drawn from the vocabulary and report whether
	/// any of them is complete and consistent.
	fn brute_force(crossword: &Crossword, vocabulary: &Vocabulary) -> bool
	{
		fn extend(
			crossword: &Crossword,
			words: &[&str],
			assignment: &mut Assignment,
			slot: usize
		) -> bool
		{
			if slot == crossword.slot_count()
			{
				return assignment.is_consistent(crossword)
			}
			for word in words
			{
				assignment.insert(slot, *word);
				if extend(crossword, words, assignment, slot + 1)
				{
					return true
				}
			}
			assignment.remove(slot);
			false
		}
		let words = vocabulary.iter().collect::<Vec<_>>();
		extend(crossword, &words, &mut Assignment::new(), 0)
	}

	/// Small puzzles paired with small vocabularies, some satisfiable and some
	/// not.
	fn cases() -> Vec<(Rc<Crossword>, Vocabulary)>
	{
		let corner = Rc::new(Crossword::parse("___\n_#_\n___").unwrap());
		let square = Rc::new(Crossword::parse("__\n__").unwrap());
		let vocabularies = [
			vec!["cat", "art", "code", "byte"],
			vec!["cat", "dog", "code", "byte"],
			vec!["cat", "tac", "tot", "cot", "toc"],
			vec!["ab", "ba", "aa", "bb"],
			vec!["ab", "ba"],
			vec!["ab", "bc", "ca", "ac", "cb", "ba"],
			vec!["aba", "bab", "abb", "bba", "aab"],
			vec!["sat", "tan", "nap", "pas", "tea", "ant", "pan"]
		];
		let mut cases = Vec::new();
		for words in vocabularies.iter()
		{
			let crosswords = [
				crossing(3),
				crossing(4),
				Rc::clone(&corner),
				Rc::clone(&square)
			];
			for crossword in crosswords
			{
				cases.push((crossword, vocabulary(words)));
			}
		}
		cases
	}

	/// Ensure that an empty vocabulary is rejected up front.
	#[test]
	fn test_empty_vocabulary()
	{
		assert_eq!(
			Solver::new(crossing(4), &Vocabulary::new()).unwrap_err(),
			SolverError::EmptyVocabulary
		);
	}

	/// Two crossing slots with no pair of words agreeing on the shared letter
	/// have no solution, and AC-3 alone proves it.
	#[test]
	fn test_no_solution()
	{
		let words = vocabulary(&["cat", "dog", "code", "byte"]);
		let solver = Solver::new(crossing(4), &words).unwrap();
		assert!(solver.clone().prepare().is_none());
		assert_eq!(solver.solve(), None);
	}

	/// Two crossing slots whose words agree on the shared letter.
	#[test]
	fn test_crossing_solution()
	{
		let words = vocabulary(&["cat", "art"]);
		let solution = Solver::new(crossing(3), &words).unwrap().solve().unwrap();
		assert_eq!(solution.get(0), Some("CAT"));
		assert_eq!(solution.get(1), Some("ART"));
	}

	/// A single isolated slot takes the only word of its length.
	#[test]
	fn test_single_slot()
	{
		let crossword = Rc::new(
			Crossword::from_slots(
				5,
				1,
				vec![Slot::new(0, 0, Direction::Across, 5)]
			).unwrap()
		);
		let words = vocabulary(&["cat", "dog", "seven", "code"]);
		let solution = Solver::new(crossword, &words).unwrap().solve().unwrap();
		assert_eq!(solution.len(), 1);
		assert_eq!(solution.get(0), Some("SEVEN"));
	}

	/// Disjoint slots are only constrained by length and distinctness, so AC-3
	/// changes nothing.
	#[test]
	fn test_disjoint_slots()
	{
		let crossword = Rc::new(
			Crossword::from_slots(
				4,
				3,
				vec![
					Slot::new(0, 0, Direction::Across, 3),
					Slot::new(2, 0, Direction::Across, 4)
				]
			).unwrap()
		);
		let words = vocabulary(&["cat", "dog", "code", "byte", "seven"]);
		let mut solver = Solver::new(Rc::clone(&crossword), &words).unwrap();
		solver.enforce_node_consistency();
		let after_node = solver.domains().clone();
		assert!(solver.ac3(None));
		assert_eq!(solver.domains(), &after_node);
		let solution = solver.solve().unwrap();
		assert!(solution.is_complete(&crossword));
		assert!(solution.is_consistent(&crossword));

		// Two disjoint slots of the same length need two distinct words.
		let twins = Rc::new(
			Crossword::from_slots(
				3,
				3,
				vec![
					Slot::new(0, 0, Direction::Across, 3),
					Slot::new(2, 0, Direction::Across, 3)
				]
			).unwrap()
		);
		let solution = Solver::new(Rc::clone(&twins), &words)
			.unwrap()
			.solve()
			.unwrap();
		assert_ne!(solution.get(0), solution.get(1));
		let lonely = vocabulary(&["cat", "code"]);
		assert_eq!(Solver::new(twins, &lonely).unwrap().solve(), None);
	}

	/// A slot with no word of its length has no solution.
	#[test]
	fn test_no_word_of_length()
	{
		let words = vocabulary(&["cat", "art"]);
		let solver = Solver::new(crossing(5), &words).unwrap();
		assert!(solver.prepare().is_none());
	}

	/// Ensure that each stage can be observed on its own:
	///
	/// * [`Solver::enforce_node_consistency`]
	/// * [`Solver::revise`]
	/// * [`Solver::ac3`]
	#[test]
	fn test_stages()
	{
		let words = vocabulary(&["cat", "dog", "art", "arts", "code"]);
		let mut solver = Solver::new(crossing(4), &words).unwrap();
		assert_eq!(solver.domains().total_size(), 10);
		solver.enforce_node_consistency();
		assert_eq!(solver.domains().size(0), 3);
		assert_eq!(solver.domains().size(1), 2);
		assert!(solver.revise(0, 1));
		assert_eq!(solver.domains().size(0), 1);
		assert!(solver.ac3(None));
		assert_eq!(
			solver.domains()[1].iter().collect::<Vec<_>>(),
			["ARTS"]
		);
		let solution = solver.solve().unwrap();
		assert_eq!(solution.get(0), Some("CAT"));
		assert_eq!(solution.get(1), Some("ARTS"));
	}

	/// Ensure that the fixtures are solved and that the solutions are valid.
	#[test]
	fn test_fixtures()
	{
		for (structure, words) in
			[("structure0", "words0"), ("structure1", "words1")]
		{
			let crossword = Rc::new(
				Crossword::read_from_file(format!("data/{}.txt", structure))
					.unwrap()
			);
			let vocabulary =
				Vocabulary::read_from_file(format!("data/{}.txt", words))
					.unwrap();
			let solution = Solver::new(Rc::clone(&crossword), &vocabulary)
				.unwrap()
				.solve()
				.unwrap();
			assert!(solution.is_complete(&crossword), "{}", structure);
			assert!(solution.is_consistent(&crossword), "{}", structure);
			for (_, word) in solution.iter()
			{
				assert!(vocabulary.contains(word));
			}
		}
	}

	/// Ensure that the solver finds a solution exactly when brute force does,
	/// and that whatever it returns is valid.
	#[test]
	fn test_matches_brute_force()
	{
		for (crossword, vocabulary) in cases()
		{
			let expected = brute_force(&crossword, &vocabulary);
			let solution = Solver::new(Rc::clone(&crossword), &vocabulary)
				.unwrap()
				.solve();
			assert_eq!(
				solution.is_some(),
				expected,
				"{:?} with {:?}",
				crossword.slots(),
				vocabulary
			);
			if let Some(solution) = solution
			{
				assert!(solution.is_complete(&crossword));
				assert!(solution.is_consistent(&crossword));
			}
		}
	}

	/// Ensure that the value ordering affects only the cost of the search,
	/// never whether a solution is found.
	#[test]
	fn test_value_order_does_not_affect_outcome()
	{
		for (crossword, vocabulary) in cases()
		{
			let least = Solver::new(Rc::clone(&crossword), &vocabulary)
				.unwrap()
				.with_value_order(ValueOrder::LeastConstraining)
				.solve();
			let lexicographic = Solver::new(Rc::clone(&crossword), &vocabulary)
				.unwrap()
				.with_value_order(ValueOrder::Lexicographic)
				.solve();
			assert_eq!(least.is_some(), lexicographic.is_some());
			if let Some(solution) = lexicographic
			{
				assert!(solution.is_consistent(&crossword));
			}
		}
	}
}
