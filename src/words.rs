use std::collections::HashMap;

use bit_set::BitSet;
use smallvec::SmallVec;

use crate::error::ParseError;
use crate::{Rank, WordId, MAX_SLOT_LENGTH};

/// A struct representing a word from the word list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub letters: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: &str) -> Word {
        Word {
            string: string.to_string(),
            letters: string.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// Lookup structure over a word list that answers "which words of length L have letter C at
/// position P" with a single hash lookup.
///
/// Words keep the id they were given by their position in the original list. Internally each
/// length bucket also numbers its words densely (a `Rank`), in increasing id order, and the
/// per-letter buckets and slot domains are bitsets over those ranks. That keeps every bitset
/// proportional to the number of words of one length rather than the whole list.
#[derive(Debug, Clone)]
pub struct WordIndex {
    words: Vec<Word>,

    /// Word ids for each length, indexed by rank.
    ids_by_length: Vec<Vec<WordId>>,

    /// Rank of each word within its length bucket, indexed by word id.
    ranks: Vec<Rank>,

    /// (length, position, letter) -> ranks of the matching words.
    buckets: HashMap<(usize, usize, char), BitSet>,

    /// Returned for lookups that have no bucket.
    empty: BitSet,
}

impl WordIndex {
    /// Index a word list. Building touches every letter of every word exactly once.
    pub fn build<S: AsRef<str>>(word_list: &[S]) -> WordIndex {
        let words: Vec<Word> = word_list.iter().map(|word| Word::new(word.as_ref())).collect();

        let max_length = words.iter().map(|word| word.len()).max().unwrap_or(0);
        let mut ids_by_length: Vec<Vec<WordId>> = (0..=max_length).map(|_| vec![]).collect();
        let mut ranks: Vec<Rank> = Vec::with_capacity(words.len());
        let mut buckets: HashMap<(usize, usize, char), BitSet> = HashMap::new();

        for (word_id, word) in words.iter().enumerate() {
            let length = word.len();
            let rank = ids_by_length[length].len();
            ids_by_length[length].push(word_id);
            ranks.push(rank);

            for (position, &letter) in word.letters.iter().enumerate() {
                buckets.entry((length, position, letter)).or_default().insert(rank);
            }
        }

        WordIndex { words, ids_by_length, ranks, buckets, empty: BitSet::new() }
    }

    /// All words of the given length with the given letter at the given position. A missing
    /// bucket just means there are no such words.
    pub fn candidates(
        &self,
        length: usize,
        position: usize,
        letter: char,
    ) -> impl Iterator<Item = WordId> + '_ {
        self.bucket(length, position, letter).iter().map(move |rank| self.word_id(length, rank))
    }

    /// Rank-level version of `candidates`, used for intersecting with domains.
    pub(crate) fn bucket(&self, length: usize, position: usize, letter: char) -> &BitSet {
        self.buckets.get(&(length, position, letter)).unwrap_or(&self.empty)
    }

    /// Every rank of the given length, i.e. the unconstrained domain of a slot of that length.
    pub(crate) fn all_ranks(&self, length: usize) -> BitSet {
        (0..self.count_of_length(length)).collect()
    }

    pub fn count_of_length(&self, length: usize) -> usize {
        self.ids_by_length.get(length).map(|ids| ids.len()).unwrap_or(0)
    }

    /// Word ids of the given length, in increasing order.
    pub fn words_of_length(&self, length: usize) -> &[WordId] {
        self.ids_by_length.get(length).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub(crate) fn word_id(&self, length: usize, rank: Rank) -> WordId {
        self.ids_by_length[length][rank]
    }

    /// Position of the word among the words of its length.
    pub fn rank(&self, word_id: WordId) -> Rank {
        self.ranks[word_id]
    }

    /// The letter at `position` of the word with the given length and rank.
    pub(crate) fn letter(&self, length: usize, rank: Rank, position: usize) -> char {
        self.words[self.word_id(length, rank)].letters[position]
    }
}

/// Lowercase a single letter. Letters whose lowercase form is more than one character are kept
/// as they are, so a word never changes length.
pub(crate) fn lowercase_letter(letter: char) -> char {
    let mut lower = letter.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(lower), None) => lower,
        _ => letter,
    }
}

/// Parse a word list with one word per line. Blank lines are skipped and words are lowercased;
/// anything besides letters and apostrophes is rejected.
pub fn parse_word_list(text: &str) -> Result<Vec<String>, ParseError> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line, word)| {
            if word.chars().all(|c| c.is_alphabetic() || c == '\'') {
                Ok(word.chars().map(lowercase_letter).collect())
            } else {
                Err(ParseError::InvalidWord { line, word: word.to_string() })
            }
        })
        .collect()
}
