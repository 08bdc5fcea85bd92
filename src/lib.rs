//! # Crossword Solver
//!
//! Fill a crossword grid with words from a vocabulary so that every slot holds
//! a word of its length, no word is used twice, and crossing slots agree on
//! their shared letters. The puzzle is treated as a constraint satisfaction
//! problem: domains are pruned by node consistency and AC-3, then a
//! backtracking search ordered by the minimum-remaining-values, degree, and
//! least-constraining-value heuristics finds a complete assignment.

pub mod assignment;
pub mod consistency;
pub mod crossword;
pub mod domains;
pub mod search;
pub mod solver;
pub mod vocabulary;
