//! The binary ballot buffer and its encoder.
//!
//! Layout (host-native word order; the buffer is not portable across
//! machines):
//!
//! ```text
//! u32  ballot_count = N
//! u32[N]  ballot_offsets      // absolute byte offset of each ballot's row stream
//! u32     mentions_offset     // absolute byte offset immediately after the last ballot
//! u16[*]  ballot rows         // concatenated; rank separator = 0, candidate id != 0
//! ..pad to 4 bytes..
//! ( u32 candidate_id, u32 mentions )[K]
//! ```
//!
//! A ballot is blank iff its offset equals its successor's (or
//! `mentions_offset`, for the last ballot).

use crate::errors::TallyError;
use std::collections::BTreeMap;
use std::convert::TryInto;
use vm_core::CandidateId;

/// One rank: an unordered, non-empty set of candidate ids tied at that
/// preference position.
pub type Rank = Vec<CandidateId>;

/// A finalised, read-only ballot buffer.
#[derive(Clone, Debug)]
pub struct BallotBuffer {
    bytes: Vec<u8>,
    ballot_count: u32,
    mentions_offset: u32,
}

impl BallotBuffer {
    pub fn ballot_count(&self) -> u32 {
        self.ballot_count
    }

    pub fn mentions_offset(&self) -> u32 {
        self.mentions_offset
    }

    fn header_len(&self) -> usize {
        8 + 4 * self.ballot_count as usize
    }

    fn read_u32(&self, at: usize) -> u32 {
        u32::from_ne_bytes(self.bytes[at..at + 4].try_into().unwrap())
    }

    /// Absolute byte offset of ballot `i`'s row stream.
    pub fn ballot_offset(&self, i: u32) -> u32 {
        debug_assert!(i < self.ballot_count);
        self.read_u32(4 + 4 * i as usize)
    }

    /// Absolute byte offset immediately after ballot `i`'s row stream.
    pub fn ballot_end(&self, i: u32) -> u32 {
        if i + 1 < self.ballot_count {
            self.ballot_offset(i + 1)
        } else {
            self.mentions_offset
        }
    }

    /// A ballot is blank when it carries zero ranks.
    pub fn is_blank(&self, i: u32) -> bool {
        self.ballot_offset(i) == self.ballot_end(i)
    }

    /// The u16 row words of ballot `i`, in order (0 = rank separator).
    pub fn ballot_rows(&self, i: u32) -> impl Iterator<Item = u16> + '_ {
        let start = self.ballot_offset(i) as usize;
        let end = self.ballot_end(i) as usize;
        self.bytes[start..end]
            .chunks_exact(2)
            .map(|w| u16::from_ne_bytes([w[0], w[1]]))
    }

    /// The `(candidate_id, mentions)` table, in ascending id order.
    pub fn mention_entries(&self) -> impl Iterator<Item = (CandidateId, u32)> + '_ {
        let pad = (4 - (self.mentions_offset as usize % 4)) % 4;
        let start = self.mentions_offset as usize + pad;
        self.bytes[start..].chunks_exact(8).map(|e| {
            let id = u32::from_ne_bytes([e[0], e[1], e[2], e[3]]);
            let mentions = u32::from_ne_bytes([e[4], e[5], e[6], e[7]]);
            let id = CandidateId::new(id as u16).expect("encoder never writes candidate id 0");
            (id, mentions)
        })
    }
}

/// Builds a [`BallotBuffer`]. `new(n)` is a capacity hint, not a
/// requirement to add exactly `n` ballots — exceeding it is the only
/// programmer error.
pub struct BallotEncoder {
    capacity: u32,
    row_offsets: Vec<u32>, // element (u16) index, converted to byte offsets in `finish`
    rows: Vec<u16>,
    mentions: BTreeMap<CandidateId, u32>,
}

impl BallotEncoder {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            row_offsets: Vec::with_capacity(capacity as usize),
            rows: Vec::new(),
            mentions: BTreeMap::new(),
        }
    }

    /// Appends a ballot: an ordered sequence of ranks, most preferred first.
    /// Ranks after the first are separated by a `0` row word.
    pub fn add_ballot<R, I>(&mut self, ranks: R) -> Result<(), TallyError>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = CandidateId>,
    {
        if self.row_offsets.len() as u32 >= self.capacity {
            return Err(TallyError::BallotCountExceeded { declared: self.capacity });
        }
        self.row_offsets.push(self.rows.len() as u32);
        let mut first_rank = true;
        for rank in ranks {
            if !first_rank {
                self.rows.push(0);
            }
            first_rank = false;
            for id in rank {
                self.rows.push(id.get());
                *self.mentions.entry(id).or_insert(0) += 1;
            }
        }
        Ok(())
    }

    /// Writes the mentions table and returns the finalised, read-only buffer.
    pub fn finish(self) -> BallotBuffer {
        let n = self.row_offsets.len() as u32;
        let header_len = 8 + 4 * n as usize;
        let rows_byte_len = self.rows.len() * 2;
        let mentions_offset = header_len + rows_byte_len;
        let pad = (4 - (mentions_offset % 4)) % 4;
        let mentions_start = mentions_offset + pad;
        let total_len = mentions_start + self.mentions.len() * 8;

        let mut bytes = Vec::with_capacity(total_len);
        bytes.extend_from_slice(&n.to_ne_bytes());
        for &off in &self.row_offsets {
            let abs = header_len as u32 + off * 2;
            bytes.extend_from_slice(&abs.to_ne_bytes());
        }
        bytes.extend_from_slice(&(mentions_offset as u32).to_ne_bytes());
        for &w in &self.rows {
            bytes.extend_from_slice(&w.to_ne_bytes());
        }
        bytes.resize(mentions_start, 0);
        for (id, count) in &self.mentions {
            bytes.extend_from_slice(&(id.get() as u32).to_ne_bytes());
            bytes.extend_from_slice(&count.to_ne_bytes());
        }
        debug_assert_eq!(bytes.len(), total_len);

        BallotBuffer {
            bytes,
            ballot_count: n,
            mentions_offset: mentions_offset as u32,
        }
    }
}
