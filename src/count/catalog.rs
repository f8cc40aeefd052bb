//! Per-motif pattern catalogs and operation caches
//!
//! The catalog owns everything derived from one `(motif, k)` pair: the list
//! of all separator patterns and, when memoisation is on, the results of the
//! inverse operations. Lifetime is tied to the counter that owns the motif,
//! so switching motifs between runs cannot leak stale entries.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::count::kpattern::{KPatternRep, MotifContext};

pub struct PatternCatalog<P: KPatternRep> {
    all: Vec<P>,
    memoize: bool,
    inverse_forget: RefCell<HashMap<(P, usize), Vec<P>>>,
    inverse_join: RefCell<HashMap<P, Vec<(P, P)>>>,
}

impl<P: KPatternRep> PatternCatalog<P> {
    pub fn new(ctx: &MotifContext, memoize: bool) -> Self {
        PatternCatalog {
            all: P::all_patterns(ctx),
            memoize,
            inverse_forget: RefCell::new(HashMap::new()),
            inverse_join: RefCell::new(HashMap::new()),
        }
    }

    /// Every separator pattern of the motif.
    pub fn all(&self) -> &[P] {
        &self.all
    }

    pub fn inverse_forget(&self, ctx: &MotifContext, pattern: &P, i: usize) -> Vec<P> {
        if !self.memoize {
            return pattern.inverse_forget(ctx, i);
        }
        let key = (pattern.clone(), i);
        if let Some(cached) = self.inverse_forget.borrow().get(&key) {
            return cached.clone();
        }
        let computed = pattern.inverse_forget(ctx, i);
        self.inverse_forget.borrow_mut().insert(key, computed.clone());
        computed
    }

    pub fn inverse_join(&self, ctx: &MotifContext, pattern: &P) -> Vec<(P, P)> {
        if !self.memoize {
            return pattern.inverse_join(ctx);
        }
        if let Some(cached) = self.inverse_join.borrow().get(pattern) {
            return cached.clone();
        }
        let computed = pattern.inverse_join(ctx);
        self.inverse_join
            .borrow_mut()
            .insert(pattern.clone(), computed.clone());
        computed
    }
}
