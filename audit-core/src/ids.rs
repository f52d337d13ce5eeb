//! Monotonic id allocation for `PREFIX-NNN` style ids
//!
//! A counter remembers the highest numeric suffix it has ever seen and only
//! moves forward, so a deleted id is never handed out again.

use crate::error::{StoreError, StoreResult};

/// Allocates ids of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCounter {
    prefix: &'static str,
    width: usize,
    last: u32,
}

impl IdCounter {
    /// Creates a counter that has not issued anything yet
    pub fn new(prefix: &'static str, width: usize) -> Self {
        Self {
            prefix,
            width,
            last: 0,
        }
    }

    /// Creates a counter positioned at the highest suffix among `ids`
    pub fn from_ids<'a, I>(prefix: &'static str, width: usize, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counter = Self::new(prefix, width);
        counter.observe(ids);
        counter
    }

    /// Raises the counter to the highest suffix among `ids`. Never lowers it.
    pub fn observe<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max_seen = ids.into_iter().filter_map(parse_suffix).max().unwrap_or(0);
        if max_seen > self.last {
            log::debug!("{} counter raised from {} to {}", self.prefix, self.last, max_seen);
            self.last = max_seen;
        }
    }

    /// Highest number issued or observed so far
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Id the next call to `allocate` will return, or `None` once the
    /// counter is exhausted
    pub fn peek(&self) -> Option<String> {
        self.last.checked_add(1).map(|next| self.format(next))
    }

    /// Increments the counter and formats the new id.
    ///
    /// Fails with `Validation` when the suffix would overflow; the counter
    /// stays where it was so no earlier id comes back.
    pub(crate) fn allocate(&mut self) -> StoreResult<String> {
        let next = self.last.checked_add(1).ok_or_else(|| {
            StoreError::Validation(format!("no {} ids left after {}", self.prefix, self.format(self.last)))
        })?;
        self.last = next;
        Ok(self.format(next))
    }

    fn format(&self, number: u32) -> String {
        format!("{}-{:0width$}", self.prefix, number, width = self.width)
    }
}

/// Parses the numeric part after the first `-`, e.g. `PRM-012` -> 12
pub fn parse_suffix(id: &str) -> Option<u32> {
    let (_, number) = id.split_once('-')?;
    number.trim().parse::<u32>().ok()
}
