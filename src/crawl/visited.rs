// src/crawl/visited.rs
// =============================================================================
// The visited registry: decides which task gets to fetch a location.
//
// The whole "never fetch twice" guarantee rests on try_claim(). DashSet
// shards its keys across internal RwLocks, and insert() checks and inserts
// under the same shard write lock, so two racing callers can never both see
// a location as new.
//
// One VisitedSet is created per crawl run and shared by every task through
// the crawl context. There is no global state.
// =============================================================================

use dashmap::DashSet;
use url::Url;

#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: DashSet<Url>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `location` for the caller.
    ///
    /// Returns `true` exactly once per location for the lifetime of the set;
    /// every later (or concurrently losing) caller gets `false`.
    pub fn try_claim(&self, location: &Url) -> bool {
        self.claimed.insert(location.clone())
    }

    pub fn contains(&self, location: &Url) -> bool {
        self.claimed.contains(location)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not contains() followed by insert()?
//    - Two tasks could both see "not there yet" before either inserts
//    - insert() does the check and the write in one step and returns
//      whether the value was new, so only one caller ever gets `true`
//
// 2. Why does try_claim take &self and not &mut self?
//    - DashSet locks internally, so many tasks can share one VisitedSet
//      through an Arc without wrapping it in a Mutex
//
// 3. Are "https://x.org/a" and "https://x.org/a/" the same location?
//    - No. Url compares by its serialized form, so only syntactically equal
//      URLs collide
// -----------------------------------------------------------------------------
