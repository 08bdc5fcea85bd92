//! # Vocabulary
//!
//! Herein is support for vocabulary construction and loading. The solver is
//! seeded from a [`Vocabulary`], an ordered set of upper-case words that every
//! slot starts out with. Vocabularies are authored as text, one word per line,
//! and cached in binary form to speed up subsequent loads.

use std::{
	collections::BTreeSet,
	fs::File,
	io::{self, BufRead, BufReader, ErrorKind, Read, Write},
	path::Path
};

use log::{trace, warn};
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
//                                Definitions.                                //
////////////////////////////////////////////////////////////////////////////////

/// A vocabulary is an ordered set of upper-case words.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Vocabulary(BTreeSet<String>);

impl Vocabulary
{
	/// Construct an empty vocabulary. Same as [`Default::default`].
	#[inline]
	pub fn new() -> Self { Self(Default::default()) }

	/// Check if the vocabulary is empty.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	/// The number of distinct words.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.0.len() }

	/// Check if the vocabulary contains the given word. The word must already
	/// be upper-case.
	#[inline]
	#[must_use]
	pub fn contains(&self, word: &str) -> bool { self.0.contains(word) }

	/// Get an iterator over the words, in ascending order.
	#[inline]
	pub fn iter(&self) -> impl Iterator<Item = &str> + '_
	{
		self.0.iter().map(String::as_str)
	}

	/// The words as an ordered set.
	#[inline]
	#[must_use]
	pub(crate) fn words(&self) -> &BTreeSet<String> { &self.0 }

	/// Populate the vocabulary with the given words. Each word is trimmed and
	/// upper-cased; blank words are ignored.
	///
	/// # Arguments
	///
	/// * `words` - The intended content of the vocabulary.
	pub fn populate<T: AsRef<str>>(&mut self, words: &[T])
	{
		for word in words
		{
			let word = word.as_ref().trim();
			if !word.is_empty()
			{
				self.0.insert(word.to_uppercase());
			}
		}
	}

	/// Open a vocabulary with the given name. Only the specified directory
	/// will be searched. `name` denotes the vocabulary file, sans the
	/// extension. If a binary vocabulary (`<name>.dict`) exists _and_ is newer
	/// than the text file (`<name>.txt`), it will be read; otherwise, the text
	/// file will be read and a binary vocabulary will be written for next
	/// time. A binary vocabulary that cannot be decoded is replaced from the
	/// text file.
	///
	/// # Arguments
	///
	/// * `dir` - The directory to search.
	/// * `name` - The name of the vocabulary file.
	///
	/// # Returns
	///
	/// A vocabulary containing the words from the file.
	///
	/// # Errors
	///
	/// If the text file cannot be opened or read, an error is returned.
	pub fn open<T: AsRef<Path>>(dir: T, name: &str) -> Result<Self, io::Error>
	{
		let dict_path = dir.as_ref().join(format!("{}.dict", name));
		let txt_path = dir.as_ref().join(format!("{}.txt", name));
		// Any failure to stat either file (including the binary file not
		// existing yet) falls back to the text file.
		let cache_is_fresh = dict_path
			.metadata()
			.and_then(|m| m.modified())
			.and_then(|dict_time| {
				txt_path
					.metadata()
					.and_then(|m| m.modified())
					.map(|txt_time| dict_time > txt_time)
			})
			.unwrap_or(false);
		if cache_is_fresh
		{
			match Self::deserialize_from_file(&dict_path)
			{
				Ok(vocabulary) =>
				{
					trace!("Read binary vocabulary: {}", dict_path.display());
					return Ok(vocabulary)
				},
				Err(e) => warn!(
					"Discarding unreadable binary vocabulary: {}: {}",
					dict_path.display(),
					e
				)
			}
		}
		let vocabulary = Self::read_from_file(&txt_path)?;
		trace!("Read text vocabulary: {}", txt_path.display());
		match vocabulary.serialize_to_file(&dict_path)
		{
			Ok(_) => trace!("Wrote binary vocabulary: {}", dict_path.display()),
			Err(e) => warn!(
				"Failed to write binary vocabulary: {}: {}",
				dict_path.display(),
				e
			)
		}
		Ok(vocabulary)
	}

	/// Construct a vocabulary from the contents of the given file. Each line
	/// in the file is considered a single word.
	///
	/// # Arguments
	///
	/// * `path` - The target file.
	///
	/// # Returns
	///
	/// A vocabulary containing the words from the file.
	///
	/// # Errors
	///
	/// If the file cannot be opened or read, an error is returned.
	pub fn read_from_file<T: AsRef<Path>>(path: T) -> Result<Self, io::Error>
	{
		let file = File::open(path)?;
		let reader = BufReader::new(file);
		let words = reader.lines().collect::<Result<Vec<_>, _>>()?;
		let mut vocabulary = Self::new();
		vocabulary.populate(&words);
		Ok(vocabulary)
	}

	/// Deserialize a vocabulary from the given file. The file must contain a
	/// serialized vocabulary in [`bincode`](bincode) format.
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
		let file = File::open(path)?;
		let mut reader = BufReader::new(file);
		let mut content = Vec::new();
		reader.read_to_end(&mut content)?;
		let vocabulary = bincode::deserialize(&content)
			.map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
		Ok(vocabulary)
	}

	/// Serialize the vocabulary to the given file, in [`bincode`](bincode)
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
		let mut file = File::create(path)?;
		let content = bincode::serialize(self)
			.map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
		file.write_all(&content)?;
		Ok(())
	}
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary
{
	fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self
	{
		let words = iter.into_iter().collect::<Vec<_>>();
		let mut vocabulary = Self::new();
		vocabulary.populate(&words);
		vocabulary
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
