//! Session cache.
//!
//! Each entity family keeps its last-known values in a [`SessionStore`].
//! State changes only through [`Reducer::reduce`], reads hand out clones or
//! borrow under a read lock, and every key is fetched at most once per
//! session unless a refresh explicitly overwrites it.

pub mod global;
pub mod pairs;

use std::hash::Hash;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;

pub use global::{GlobalAction, GlobalCache, GlobalKey, GlobalState};
pub use pairs::{PairAction, PairCache, PairEntry, PairKey, PairState};

/// State mutated exclusively by a closed set of typed actions.
pub trait Reducer: Send + Sync {
    type Action;
    type Key: Hash + Eq + Clone + Send + Sync;

    fn reduce(&mut self, action: Self::Action);
}

pub struct SessionStore<S: Reducer> {
    state: RwLock<S>,
    attempted: Mutex<FxHashSet<S::Key>>,
}

impl<S: Reducer> SessionStore<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: RwLock::new(state),
            attempted: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn snapshot(&self) -> S
    where
        S: Clone,
    {
        self.state.read().clone()
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.read())
    }

    pub fn dispatch(&self, action: S::Action) {
        self.state.write().reduce(action);
    }

    /// Claim the fetch for `key`.
    ///
    /// Returns `true` only for the first caller per key; later callers see
    /// the fetch as in flight or already attempted.
    pub fn begin_fetch(&self, key: S::Key) -> bool {
        self.attempted.lock().insert(key)
    }

    pub fn attempted(&self, key: &S::Key) -> bool {
        self.attempted.lock().contains(key)
    }
}
