//! Cascading selector chain
//!
//! Each level owns a sequence counter. Issuing a fetch bumps it, and so
//! does invalidation, so a response is applied only if its ticket carries
//! the latest number issued for that level. That single gate covers both
//! superseded fetches and fetches made obsolete by an ancestor change.

use crate::error::{ChainError, FetchError};
use crate::provider::{fetch_with_timeout, OptionsProvider};
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

/// Declaration of one level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSpec {
    /// Form field key the level commits into
    pub key: String,
    /// Store column holding this level's values
    pub column: String,
}

impl LevelSpec {
    /// Create a level declaration
    #[inline]
    pub fn new(key: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            column: column.into(),
        }
    }
}

/// Runtime state of one level
#[derive(Debug, Clone)]
pub struct SelectionLevel {
    spec: LevelSpec,
    committed: Option<String>,
    options: Vec<String>,
    latest_seq: u64,
    pending: Option<u64>,
    last_error: Option<FetchError>,
}

impl SelectionLevel {
    fn new(spec: LevelSpec) -> Self {
        Self {
            spec,
            committed: None,
            options: Vec::new(),
            latest_seq: 0,
            pending: None,
            last_error: None,
        }
    }

    /// Field key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.spec.key
    }

    /// Store column
    #[inline]
    #[must_use]
    pub fn column(&self) -> &str {
        &self.spec.column
    }

    /// Committed value, if any
    #[inline]
    #[must_use]
    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    /// Sorted, duplicate-free options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Whether a fetch is outstanding
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Error of the most recent fetch, cleared by the next success
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Latest sequence number issued for this level
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.latest_seq
    }

    fn invalidate(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!(level = %self.spec.key, "pending fetch discarded");
        }
        self.committed = None;
        self.options.clear();
        self.last_error = None;
        self.latest_seq += 1;
    }
}

/// What a provider is asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsRequest {
    /// Level index
    pub level: usize,
    /// Column to project
    pub column: String,
    /// `(column, committed value)` of every ancestor, root first
    pub ancestors: Vec<(String, String)>,
}

/// Handle for one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    request: OptionsRequest,
}

impl FetchTicket {
    /// Target level
    #[inline]
    #[must_use]
    pub fn level(&self) -> usize {
        self.request.level
    }

    /// Sequence number stamped at issue time
    #[inline]
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Request to hand to the provider
    #[inline]
    #[must_use]
    pub fn request(&self) -> &OptionsRequest {
        &self.request
    }
}

/// Result of applying a fetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Options replaced
    Applied {
        /// Level updated
        level: usize,
        /// Number of distinct options now shown
        count: usize,
    },
    /// Response superseded; chain unchanged
    Stale {
        /// Level the ticket targeted
        level: usize,
        /// Sequence number of the dropped ticket
        seq: u64,
    },
    /// Provider failed; options and ancestors unchanged
    Failed {
        /// Level the ticket targeted
        level: usize,
        /// Failure
        error: FetchError,
    },
}

/// Chain of dependent selection levels
#[derive(Debug, Clone)]
pub struct CascadeChain {
    levels: Vec<SelectionLevel>,
    started: bool,
}

impl CascadeChain {
    /// Build a chain; level order is dependency order
    ///
    /// # Errors
    /// - `ChainError::Empty` for no levels
    /// - `ChainError::DuplicateLevel` if two levels share a key
    pub fn new(specs: Vec<LevelSpec>) -> Result<Self, ChainError> {
        if specs.is_empty() {
            return Err(ChainError::Empty);
        }
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.key.as_str()) {
                return Err(ChainError::DuplicateLevel(spec.key.clone()));
            }
        }

        Ok(Self {
            levels: specs.into_iter().map(SelectionLevel::new).collect(),
            started: false,
        })
    }

    /// Number of levels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; chains have at least one level
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// One level
    #[inline]
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&SelectionLevel> {
        self.levels.get(index)
    }

    /// All levels, root first
    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[SelectionLevel] {
        &self.levels
    }

    /// Index of the level committing into `key`
    ///
    /// # Errors
    /// - `ChainError::UnknownKey`
    pub fn index_of(&self, key: &str) -> Result<usize, ChainError> {
        self.levels
            .iter()
            .position(|l| l.key() == key)
            .ok_or_else(|| ChainError::UnknownKey(key.to_string()))
    }

    /// Committed values, root first
    #[must_use]
    pub fn committed_values(&self) -> Vec<Option<&str>> {
        self.levels.iter().map(SelectionLevel::committed).collect()
    }

    /// Whether a fetch for `level` is outstanding
    #[must_use]
    pub fn pending(&self, level: usize) -> bool {
        self.levels.get(level).is_some_and(SelectionLevel::is_pending)
    }

    /// Whether every ancestor of `level` has a committed value
    #[must_use]
    pub fn is_fetchable(&self, level: usize) -> bool {
        level < self.levels.len() && self.levels[..level].iter().all(|l| l.committed.is_some())
    }

    /// Issue the one-time root fetch
    ///
    /// # Errors
    /// - `ChainError::AlreadyStarted` on a second call
    pub fn start(&mut self) -> Result<FetchTicket, ChainError> {
        if self.started {
            return Err(ChainError::AlreadyStarted);
        }
        self.started = true;
        Ok(self.issue(0))
    }

    /// Commit `value` at `level` (`None` or empty clears it)
    ///
    /// Descendant levels are invalidated before this returns. When the new
    /// value is non-empty and a next level exists, the ticket for its fetch
    /// is returned. Committing the current value again is a no-op.
    ///
    /// # Errors
    /// - `ChainError::UnknownLevel` for an out-of-range level
    /// - `ChainError::NotFetchable` if an ancestor is uncommitted
    /// - `ChainError::NotAnOption` if the value is not currently offered
    pub fn commit(
        &mut self,
        level: usize,
        value: Option<String>,
    ) -> Result<Option<FetchTicket>, ChainError> {
        if level >= self.levels.len() {
            return Err(ChainError::UnknownLevel(level));
        }
        let value = value.filter(|v| !v.is_empty());

        if let Some(v) = &value {
            if !self.is_fetchable(level) {
                return Err(ChainError::NotFetchable { level });
            }
            if !self.levels[level].options.contains(v) {
                return Err(ChainError::NotAnOption {
                    level,
                    value: v.clone(),
                });
            }
        }

        if self.levels[level].committed == value {
            return Ok(None);
        }

        tracing::debug!(level = %self.levels[level].key(), value = ?value, "selection committed");
        let has_value = value.is_some();
        self.levels[level].committed = value;
        for descendant in &mut self.levels[level + 1..] {
            descendant.invalidate();
        }

        if has_value && level + 1 < self.levels.len() {
            Ok(Some(self.issue(level + 1)))
        } else {
            Ok(None)
        }
    }

    /// Re-issue the fetch for `level` with the current ancestor tuple
    ///
    /// # Errors
    /// - `ChainError::UnknownLevel` for an out-of-range level
    /// - `ChainError::NotFetchable` if an ancestor is uncommitted, or the
    ///   root has not been started
    pub fn retry(&mut self, level: usize) -> Result<FetchTicket, ChainError> {
        if level >= self.levels.len() {
            return Err(ChainError::UnknownLevel(level));
        }
        if !self.is_fetchable(level) || (level == 0 && !self.started) {
            return Err(ChainError::NotFetchable { level });
        }
        Ok(self.issue(level))
    }

    fn issue(&mut self, level: usize) -> FetchTicket {
        let ancestors = self.levels[..level]
            .iter()
            .map(|l| {
                (
                    l.spec.column.clone(),
                    l.committed.clone().unwrap_or_default(),
                )
            })
            .collect();

        let target = &mut self.levels[level];
        target.latest_seq += 1;
        target.pending = Some(target.latest_seq);

        tracing::debug!(level = %target.spec.key, seq = target.latest_seq, "options fetch issued");
        FetchTicket {
            seq: target.latest_seq,
            request: OptionsRequest {
                level,
                column: target.spec.column.clone(),
                ancestors,
            },
        }
    }

    /// Apply a provider response for `ticket`
    ///
    /// Stale tickets are dropped. Successful responses are deduplicated and
    /// sorted. Failures leave the options untouched.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<String>, FetchError>,
    ) -> ApplyOutcome {
        let level = ticket.level();
        let Some(target) = self.levels.get_mut(level) else {
            return ApplyOutcome::Stale {
                level,
                seq: ticket.seq,
            };
        };

        if target.pending != Some(ticket.seq) || target.latest_seq != ticket.seq {
            tracing::warn!(
                level = %target.spec.key,
                seq = ticket.seq,
                latest = target.latest_seq,
                "stale options response dropped"
            );
            return ApplyOutcome::Stale {
                level,
                seq: ticket.seq,
            };
        }
        target.pending = None;

        match result {
            Ok(values) => {
                let distinct: BTreeSet<String> =
                    values.into_iter().filter(|v| !v.is_empty()).collect();
                target.options = distinct.into_iter().collect();
                target.last_error = None;
                ApplyOutcome::Applied {
                    level,
                    count: target.options.len(),
                }
            }
            Err(error) => {
                tracing::warn!(level = %target.spec.key, %error, "options fetch failed");
                target.last_error = Some(error.clone());
                ApplyOutcome::Failed { level, error }
            }
        }
    }

    /// Clear every committed value; the root keeps its options
    pub fn reset(&mut self) {
        if let Some((root, rest)) = self.levels.split_first_mut() {
            root.committed = None;
            for level in rest {
                level.invalidate();
            }
        }
    }

    /// Start the chain and await the root options
    ///
    /// # Errors
    /// - `ChainError::AlreadyStarted` on a second call
    pub async fn initialize<P>(
        &mut self,
        provider: &P,
        timeout: Duration,
    ) -> Result<ApplyOutcome, ChainError>
    where
        P: OptionsProvider + ?Sized,
    {
        let ticket = self.start()?;
        let result = fetch_with_timeout(provider, ticket.request(), timeout).await;
        Ok(self.apply(ticket, result))
    }

    /// Commit a value and await the next level's options
    ///
    /// Returns `None` when no fetch was needed.
    ///
    /// # Errors
    /// Same as [`CascadeChain::commit`]
    pub async fn select<P>(
        &mut self,
        provider: &P,
        level: usize,
        value: Option<String>,
        timeout: Duration,
    ) -> Result<Option<ApplyOutcome>, ChainError>
    where
        P: OptionsProvider + ?Sized,
    {
        let Some(ticket) = self.commit(level, value)? else {
            return Ok(None);
        };
        let result = fetch_with_timeout(provider, ticket.request(), timeout).await;
        Ok(Some(self.apply(ticket, result)))
    }

    /// Retry a level and await its options
    ///
    /// # Errors
    /// Same as [`CascadeChain::retry`]
    pub async fn refetch<P>(
        &mut self,
        provider: &P,
        level: usize,
        timeout: Duration,
    ) -> Result<ApplyOutcome, ChainError>
    where
        P: OptionsProvider + ?Sized,
    {
        let ticket = self.retry(level)?;
        let result = fetch_with_timeout(provider, ticket.request(), timeout).await;
        Ok(self.apply(ticket, result))
    }
}
