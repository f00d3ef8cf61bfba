use crate::alert::annotate;
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::index::RelevanceIndex;
use crate::matcher::{best_match, MatchResult};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;

/// A corpus together with the index built from it. Never mutated once built.
#[derive(Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub built_at: String,
    corpus: Corpus,
    index: RelevanceIndex,
}

impl Snapshot {
    fn new(generation: u64, corpus: Corpus, index: RelevanceIndex) -> Self {
        let built_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        Self { generation, built_at, corpus, index }
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }
    pub fn index(&self) -> &RelevanceIndex { &self.index }

    /// Match `keyword` and annotate with `location`. A missing or blank keyword
    /// is rejected before the matcher runs.
    pub fn query(&self, keyword: Option<&str>, location: Option<&str>) -> Result<MatchResult> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty()).ok_or(Error::MissingKeyword)?;
        let result = best_match(&self.corpus, &self.index, keyword)?;
        Ok(annotate(result, location))
    }
}

/// Shared slot holding the current [`Snapshot`]. Cloning the handle shares the slot.
///
/// Readers take the lock only long enough to clone the `Arc`; the writer only
/// to swap it. Index construction happens outside the lock, and publishers are
/// serialized on a separate mutex that readers never touch.
#[derive(Debug, Clone)]
pub struct PublishedState {
    slot: Arc<RwLock<Arc<Snapshot>>>,
    publish_lock: Arc<Mutex<()>>,
}

impl Default for PublishedState {
    fn default() -> Self {
        Self::new(Corpus::empty(), RelevanceIndex::default())
    }
}

impl PublishedState {
    pub fn new(corpus: Corpus, index: RelevanceIndex) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(Snapshot::new(0, corpus, index)))),
            publish_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Build an index for `corpus` and wrap both as the initial state.
    pub fn from_corpus(corpus: Corpus) -> Result<Self> {
        let index = RelevanceIndex::build(&corpus)?;
        Ok(Self::new(corpus, index))
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.slot.read().clone()
    }

    /// Replace the current pair and return the new generation number.
    pub fn publish(&self, corpus: Corpus, index: RelevanceIndex) -> Result<u64> {
        if index.num_docs() != corpus.len() {
            return Err(Error::Build(format!(
                "refusing to publish index of {} documents for {} records",
                index.num_docs(),
                corpus.len()
            )));
        }
        let _publisher = self.publish_lock.lock();
        let generation = self.slot.read().generation + 1;
        let next = Arc::new(Snapshot::new(generation, corpus, index));
        // The write guard is a temporary; the old snapshot is freed after it is released.
        let previous = std::mem::replace(&mut *self.slot.write(), next);
        drop(previous);
        Ok(generation)
    }

    pub fn query(&self, keyword: Option<&str>, location: Option<&str>) -> Result<MatchResult> {
        self.current().query(keyword, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawRecord;

    fn corpus(headline: &str) -> Corpus {
        Corpus::from_raw(vec![RawRecord::new(headline, "l", None)]).0
    }

    #[test]
    fn default_state_has_no_data() {
        let state = PublishedState::default();
        assert!(matches!(state.query(Some("x"), None), Err(Error::NoData)));
    }

    #[test]
    fn missing_keyword_is_rejected_first() {
        let state = PublishedState::default();
        assert!(matches!(state.query(None, None), Err(Error::MissingKeyword)));
        assert!(matches!(state.query(Some("  "), None), Err(Error::MissingKeyword)));
    }

    #[test]
    fn publish_bumps_generation_and_old_snapshot_survives() {
        let state = PublishedState::from_corpus(corpus("old botnet")).unwrap();
        let before = state.current();
        let next = corpus("new phishing");
        let index = RelevanceIndex::build(&next).unwrap();
        assert_eq!(state.publish(next, index).unwrap(), 1);
        assert_eq!(before.corpus().get(0).unwrap().headline(), "old botnet");
        assert_eq!(state.current().corpus().get(0).unwrap().headline(), "new phishing");
    }

    #[test]
    fn concurrent_publishers_get_distinct_generations() {
        let state = PublishedState::default();
        let next = corpus("worm outbreak");
        let index = RelevanceIndex::build(&next).unwrap();
        let mut generations: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| state.publish(next.clone(), index.clone()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        generations.sort_unstable();
        assert_eq!(generations, (1..=8).collect::<Vec<u64>>());
        assert_eq!(state.current().generation, 8);
    }

    #[test]
    fn mismatched_pair_is_not_published() {
        let state = PublishedState::default();
        let index = RelevanceIndex::build(&corpus("a botnet")).unwrap();
        assert!(matches!(state.publish(Corpus::empty(), index), Err(Error::Build(_))));
        assert_eq!(state.current().generation, 0);
    }
}
