// Logsmith - core/levels.rs
//
// Per-module level storage (the backend the registry reads through) and the
// layer wrapper that applies it. Levels are consulted on every event, so
// changes take effect on the next record without a rebuild.
//
// A module name resolves by its longest `::`-separated prefix with an explicit
// entry, then the root. Reporting (`LevelBackend::level`) and filtering
// (`ModuleFilter`) share that one rule.

use crate::core::verbosity::Verbosity;
use crate::util::constants;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::level_filters::LevelFilter;
use tracing::span::{Attributes, Id, Record};
use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Storage for per-module thresholds.
///
/// The empty module name (`""`) is the root level that applies to any module
/// without its own entry.
pub trait LevelBackend: Send + Sync {
    /// Effective level for `module`.
    fn level(&self, module: &str) -> Verbosity;

    /// Change the level for `module` (`""` for the root).
    fn set_level(&self, level: Verbosity, module: &str);
}

/// In-memory [`LevelBackend`] keyed by module name.
#[derive(Debug, Default)]
pub struct LevelTable {
    levels: RwLock<HashMap<String, Verbosity>>,
}

impl LevelTable {
    /// Table with only a root level.
    pub fn with_root(level: Verbosity) -> Self {
        let table = Self::default();
        table.set_level(level, constants::ROOT_MODULE);
        table
    }

    /// Level for a module or `tracing` target such as `app::net::tcp`.
    ///
    /// The longest `::`-separated prefix with an explicit entry wins
    /// (`app::net::tcp`, then `app::net`, then `app`), otherwise the root.
    pub fn level_for_target(&self, target: &str) -> Verbosity {
        let levels = self.levels.read().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = target;
        loop {
            if let Some(level) = levels.get(candidate) {
                return *level;
            }
            match candidate.rfind("::") {
                Some(idx) => candidate = &candidate[..idx],
                None => break,
            }
        }
        levels
            .get(constants::ROOT_MODULE)
            .copied()
            .unwrap_or(constants::UNSET_MODULE_VERBOSITY)
    }
}

impl LevelBackend for LevelTable {
    fn level(&self, module: &str) -> Verbosity {
        self.level_for_target(module)
    }

    fn set_level(&self, level: Verbosity, module: &str) {
        self.levels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(module.to_string(), level);
    }
}

/// Threshold check backed by a [`LevelTable`].
#[derive(Debug, Clone)]
pub struct ModuleFilter {
    table: Arc<LevelTable>,
}

impl ModuleFilter {
    pub fn new(table: Arc<LevelTable>) -> Self {
        Self { table }
    }

    /// Whether a record with `meta` passes its target's current level.
    pub fn allows(&self, meta: &Metadata<'_>) -> bool {
        let threshold: LevelFilter = self.table.level_for_target(meta.target()).level_filter();
        *meta.level() <= threshold
    }

    /// Wrap `inner` so it only receives events this filter allows.
    pub fn layer<L>(self, inner: L) -> Leveled<L> {
        Leveled {
            filter: self,
            inner,
        }
    }
}

/// A layer that forwards events to `inner` only when its [`ModuleFilter`]
/// allows them. Span callbacks always pass through so span context still
/// formats.
///
/// The check runs in `on_event` rather than as a per-layer filter, so the
/// layer stays valid when swapped into an already running subscriber.
#[derive(Debug)]
pub struct Leveled<L> {
    filter: ModuleFilter,
    inner: L,
}

impl<S, L> Layer<S> for Leveled<L>
where
    S: Subscriber,
    L: Layer<S>,
{
    fn register_callsite(&self, _meta: &'static Metadata<'static>) -> Interest {
        // Levels change at runtime, so no callsite may be cached as never.
        Interest::sometimes()
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        None
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        self.inner.on_new_span(attrs, id, ctx);
    }

    fn on_record(&self, span: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        self.inner.on_record(span, values, ctx);
    }

    fn on_follows_from(&self, span: &Id, follows: &Id, ctx: Context<'_, S>) {
        self.inner.on_follows_from(span, follows, ctx);
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if self.filter.allows(event.metadata()) {
            self.inner.on_event(event, ctx);
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        self.inner.on_enter(id, ctx);
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        self.inner.on_exit(id, ctx);
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        self.inner.on_close(id, ctx);
    }

    fn on_id_change(&self, old: &Id, new: &Id, ctx: Context<'_, S>) {
        self.inner.on_id_change(old, new, ctx);
    }
}
