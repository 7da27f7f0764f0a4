//! Surface analyzers: pluggable extract-and-diff passes over one contract
//! surface each (routes, command line, migrations, API documents).
//!
//! Concrete analyzers implement the typed [`SurfaceAnalyzer`] trait. The
//! registry stores them behind the object-safe [`DynAnalyzer`] adaptor, which
//! moves states around as type-erased [`AnalyzerState`] values.

pub mod cli_surface;
pub mod migrations;
pub mod openapi;
pub mod registry;
pub mod web_routes;

use crate::core::{Error, Impact, Result};
use crate::vcs::SourceReader;
use std::any::Any;
use std::fmt;

pub use registry::{
    global, install, load_enabled, register_builtin, AnalyzerConstructor, AnalyzerRegistration,
    AnalyzerRegistry,
};

/// One contract surface, extracted at a revision and diffed between two.
pub trait SurfaceAnalyzer: Send + Sync {
    type State: Any + Send + Sync;

    /// Name used to tag collected states.
    fn name(&self) -> &str;

    /// Read the surface as observed at `rev`. A missing optional file is an
    /// empty state, not an error.
    fn collect(&self, reader: &dyn SourceReader, rev: &str) -> Result<Self::State>;

    /// Pure comparison of two states of this analyzer.
    fn compare(&self, old: &Self::State, new: &Self::State) -> Vec<Impact>;
}

/// Type-erased analyzer state, tagged with the analyzer that produced it.
pub struct AnalyzerState {
    analyzer: String,
    value: Box<dyn Any + Send + Sync>,
}

impl AnalyzerState {
    pub fn new<T: Any + Send + Sync>(analyzer: impl Into<String>, value: T) -> Self {
        Self {
            analyzer: analyzer.into(),
            value: Box::new(value),
        }
    }

    pub fn analyzer(&self) -> &str {
        &self.analyzer
    }

    /// Borrow the concrete state, failing with `StateMismatch` when it was
    /// produced by another analyzer or holds another type.
    pub fn downcast_ref<T: Any>(&self, expected: &str) -> Result<&T> {
        let mismatch = || Error::StateMismatch {
            expected: expected.to_string(),
            found: self.analyzer.clone(),
        };
        if self.analyzer != expected {
            return Err(mismatch());
        }
        self.value.downcast_ref::<T>().ok_or_else(mismatch)
    }
}

impl fmt::Debug for AnalyzerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerState")
            .field("analyzer", &self.analyzer)
            .finish_non_exhaustive()
    }
}

/// Object-safe face of [`SurfaceAnalyzer`], stored by the registry.
pub trait DynAnalyzer: Send + Sync {
    fn name(&self) -> &str;
    fn collect_state(&self, reader: &dyn SourceReader, rev: &str) -> Result<AnalyzerState>;
    fn compare_states(&self, old: &AnalyzerState, new: &AnalyzerState) -> Result<Vec<Impact>>;
}

impl<A: SurfaceAnalyzer> DynAnalyzer for A {
    fn name(&self) -> &str {
        SurfaceAnalyzer::name(self)
    }

    fn collect_state(&self, reader: &dyn SourceReader, rev: &str) -> Result<AnalyzerState> {
        let state = self.collect(reader, rev)?;
        Ok(AnalyzerState::new(SurfaceAnalyzer::name(self), state))
    }

    fn compare_states(&self, old: &AnalyzerState, new: &AnalyzerState) -> Result<Vec<Impact>> {
        let name = SurfaceAnalyzer::name(self);
        let old = old.downcast_ref::<A::State>(name)?;
        let new = new.downcast_ref::<A::State>(name)?;
        Ok(self.compare(old, new))
    }
}
