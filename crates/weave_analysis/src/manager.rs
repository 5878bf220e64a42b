//! The memoizing analysis cache.

use std::any::{type_name, Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use weave_decl::PackageGroup;

use crate::error::AnalysisError;

/// A derived fact about part of the declaration graph.
///
/// Each analysis declares the key it is computed for. Keys are plain values
/// (declaration IDs, [`Type`](weave_decl::Type)s, tuples of those), which makes
/// "every argument must be hashable" a compile-time property.
///
/// `create` receives the manager so it can request other analyses. Analyses
/// must form a DAG; re-entering a key that is still being computed fails with
/// [`AnalysisError::Cycle`]. Factories must not touch the filesystem, since the
/// order in which analyses are built depends on demand.
pub trait Analysis: Sized + 'static {
    /// The value this analysis is keyed by.
    type Key: Hash + Eq + Clone + Debug + 'static;

    /// Computes the analysis for `key`.
    fn create(am: &AnalysisManager, key: &Self::Key) -> Result<Self, AnalysisError>;
}

enum Slot<A> {
    Computing,
    Ready(Rc<A>),
}

type Table<A> = HashMap<<A as Analysis>::Key, Slot<A>>;

/// Hit/miss counters for one manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran a factory.
    pub misses: u64,
    /// Analyses currently cached.
    pub entries: usize,
}

/// Computes each `(analysis, key)` pair at most once and shares the result.
///
/// The manager is single-threaded: tables live behind a `RefCell` and
/// instances are handed out as `Rc`s. No borrow of the tables is held while a
/// factory runs, so factories may freely call [`get`](Self::get).
pub struct AnalysisManager {
    pg: Rc<PackageGroup>,
    tables: RefCell<HashMap<TypeId, Box<dyn Any>>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
    entries: Cell<usize>,
}

impl AnalysisManager {
    /// Creates an empty cache over a frozen declaration graph.
    pub fn new(pg: Rc<PackageGroup>) -> Self {
        Self {
            pg,
            tables: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
            entries: Cell::new(0),
        }
    }

    /// The declaration graph analyses are computed over.
    pub fn package_group(&self) -> &PackageGroup {
        &self.pg
    }

    /// Returns the cached analysis `A` for `key`, computing it on first use.
    ///
    /// Two calls with equal keys return the same `Rc` (pointer identity).
    pub fn get<A: Analysis>(&self, key: &A::Key) -> Result<Rc<A>, AnalysisError> {
        {
            let mut tables = self.tables.borrow_mut();
            let table = table_mut::<A>(&mut tables);
            match table.get(key) {
                Some(Slot::Ready(found)) => {
                    self.hits.set(self.hits.get() + 1);
                    tracing::trace!(analysis = type_name::<A>(), ?key, "analysis cache hit");
                    return Ok(Rc::clone(found));
                }
                Some(Slot::Computing) => {
                    return Err(AnalysisError::Cycle {
                        analysis: type_name::<A>(),
                        key: format!("{key:?}"),
                    });
                }
                None => {
                    table.insert(key.clone(), Slot::Computing);
                }
            }
        }

        self.misses.set(self.misses.get() + 1);
        tracing::trace!(analysis = type_name::<A>(), ?key, "analysis cache miss");
        let result = A::create(self, key);

        let mut tables = self.tables.borrow_mut();
        let table = table_mut::<A>(&mut tables);
        match result {
            Ok(analysis) => {
                let analysis = Rc::new(analysis);
                table.insert(key.clone(), Slot::Ready(Rc::clone(&analysis)));
                self.entries.set(self.entries.get() + 1);
                Ok(analysis)
            }
            Err(err) => {
                table.remove(key);
                Err(err)
            }
        }
    }

    /// Returns `true` if `A` for `key` is cached.
    pub fn contains<A: Analysis>(&self, key: &A::Key) -> bool {
        let mut tables = self.tables.borrow_mut();
        matches!(table_mut::<A>(&mut tables).get(key), Some(Slot::Ready(_)))
    }

    /// Drops a single cached analysis. Returns `true` if one was cached.
    ///
    /// Callers that still hold the `Rc` keep their instance; the next
    /// [`get`](Self::get) builds a fresh one.
    pub fn invalidate<A: Analysis>(&mut self, key: &A::Key) -> bool {
        let removed = matches!(
            table_mut::<A>(self.tables.get_mut()).remove(key),
            Some(Slot::Ready(_))
        );
        if removed {
            self.entries.set(self.entries.get() - 1);
        }
        removed
    }

    /// Drops every cached analysis and resets the statistics.
    pub fn clear(&mut self) {
        self.tables.get_mut().clear();
        self.hits.set(0);
        self.misses.set(0);
        self.entries.set(0);
    }

    /// Returns hit/miss counters and the number of cached analyses.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.entries.get(),
        }
    }
}

fn table_mut<A: Analysis>(tables: &mut HashMap<TypeId, Box<dyn Any>>) -> &mut Table<A> {
    tables
        .entry(TypeId::of::<A>())
        .or_insert_with(|| Box::new(Table::<A>::new()))
        .downcast_mut::<Table<A>>()
        .unwrap_or_else(|| unreachable!("analysis table for {} has a foreign type", type_name::<A>()))
}
