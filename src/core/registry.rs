// Logsmith - core/registry.rs
//
// Directory of logger (module) names plus the backend that owns their levels.
// The registry stores names only; every level it reports is read through the
// currently bound backend, so snapshots always reflect live thresholds.
//
// Lifecycle: `new()` starts unbound, `bind()` attaches (or replaces) the
// backend, `unbind()` detaches it. Level queries while unbound are errors.

use crate::core::levels::LevelBackend;
use crate::core::verbosity::Verbosity;
use crate::util::constants;
use crate::util::error::RegistryError;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Register the calling module's path (`module_path!()`) with a registry.
///
/// ```
/// let registry = logsmith::LevelRegistry::new();
/// logsmith::register_module!(registry);
/// assert_eq!(registry.modules(), vec![module_path!().to_string()]);
/// ```
#[macro_export]
macro_rules! register_module {
    ($registry:expr) => {
        $registry.register(::std::module_path!())
    };
}

#[derive(Default)]
struct RegistryState {
    backend: Option<Arc<dyn LevelBackend>>,
    modules: HashSet<String>,
}

/// Thread-safe catalogue of module names with delegated level storage.
#[derive(Default)]
pub struct LevelRegistry {
    state: Mutex<RegistryState>,
}

impl fmt::Debug for LevelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("LevelRegistry")
            .field("bound", &state.backend.is_some())
            .field("modules", &state.modules.len())
            .finish()
    }
}

impl LevelRegistry {
    /// Empty, unbound registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `name`. Registering the same name again has no effect.
    pub fn register(&self, name: &str) {
        let mut state = self.lock();
        if !state.modules.contains(name) {
            state.modules.insert(name.to_string());
        }
    }

    /// Attach `backend`, returning whichever backend it replaces.
    /// Tracked names survive; their levels are now read through `backend`.
    pub fn bind(&self, backend: Arc<dyn LevelBackend>) -> Option<Arc<dyn LevelBackend>> {
        let previous = self.lock().backend.replace(backend);
        tracing::debug!(rebound = previous.is_some(), "Level backend bound");
        previous
    }

    /// Detach the backend, returning the registry to the unbound state.
    pub fn unbind(&self) -> Option<Arc<dyn LevelBackend>> {
        self.lock().backend.take()
    }

    pub fn is_bound(&self) -> bool {
        self.lock().backend.is_some()
    }

    /// Tracked module names, sorted.
    pub fn modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().modules.iter().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of every tracked module's level plus the root (`""`).
    ///
    /// The map is an owned copy; changing it does not touch the registry.
    pub fn module_levels(&self) -> Result<BTreeMap<String, Verbosity>, RegistryError> {
        let state = self.lock();
        let backend = state.backend.as_ref().ok_or(RegistryError::NotInitialised)?;

        let mut levels = BTreeMap::new();
        levels.insert(
            constants::ROOT_MODULE.to_string(),
            backend.level(constants::ROOT_MODULE),
        );
        for module in &state.modules {
            levels.insert(module.clone(), backend.level(module));
        }
        Ok(levels)
    }

    /// Effective level of a single module (`""` for the root).
    pub fn level(&self, module: &str) -> Result<Verbosity, RegistryError> {
        Ok(self.backend()?.level(module))
    }

    /// Change the level of `module` (`""` for the root) on the bound
    /// backend. The module need not have been registered.
    pub fn set_level(&self, level: Verbosity, module: &str) -> Result<(), RegistryError> {
        self.backend()?.set_level(level, module);
        tracing::debug!(module, %level, "Log level changed");
        Ok(())
    }

    // The backend call itself happens outside the registry lock.
    fn backend(&self) -> Result<Arc<dyn LevelBackend>, RegistryError> {
        self.lock()
            .backend
            .clone()
            .ok_or(RegistryError::NotInitialised)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::levels::LevelTable;

    fn bound(root: Verbosity) -> (LevelRegistry, Arc<LevelTable>) {
        let registry = LevelRegistry::new();
        let table = Arc::new(LevelTable::with_root(root));
        registry.bind(table.clone());
        (registry, table)
    }

    #[test]
    fn test_unbound_queries_fail() {
        let registry = LevelRegistry::new();
        registry.register("app");
        assert!(!registry.is_bound());
        assert_eq!(
            registry.module_levels().unwrap_err(),
            RegistryError::NotInitialised
        );
        assert_eq!(
            registry.set_level(Verbosity::Debug, "app").unwrap_err(),
            RegistryError::NotInitialised
        );
        assert_eq!(registry.level("").unwrap_err(), RegistryError::NotInitialised);
    }

    #[test]
    fn test_register_is_idempotent() {
        let (registry, _) = bound(Verbosity::Warning);
        registry.register("app::net");
        registry.register("app::net");
        let levels = registry.module_levels().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels["app::net"], Verbosity::Warning);
        assert_eq!(levels[""], Verbosity::Warning);
    }

    #[test]
    fn test_set_level_visible_without_reregistering() {
        let (registry, table) = bound(Verbosity::Warning);
        registry.register("app::db");
        registry.set_level(Verbosity::Debug, "app::db").unwrap();
        assert_eq!(registry.module_levels().unwrap()["app::db"], Verbosity::Debug);
        assert_eq!(table.level("app::db"), Verbosity::Debug);
    }

    #[test]
    fn test_set_level_for_unregistered_module() {
        let (registry, _) = bound(Verbosity::Error);
        registry.set_level(Verbosity::Info, "late").unwrap();
        assert_eq!(registry.level("late").unwrap(), Verbosity::Info);
        assert!(!registry.module_levels().unwrap().contains_key("late"));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let (registry, _) = bound(Verbosity::Notice);
        registry.register("a");
        let mut snapshot = registry.module_levels().unwrap();
        snapshot.insert("a".to_string(), Verbosity::Critical);
        snapshot.insert("b".to_string(), Verbosity::Critical);
        let fresh = registry.module_levels().unwrap();
        assert_eq!(fresh["a"], Verbosity::Notice);
        assert!(!fresh.contains_key("b"));
    }

    #[test]
    fn test_rebind_keeps_names_and_reads_new_backend() {
        let (registry, _) = bound(Verbosity::Warning);
        registry.register("app");
        let replacement = Arc::new(LevelTable::with_root(Verbosity::Info));
        assert!(registry.bind(replacement).is_some());
        assert_eq!(registry.module_levels().unwrap()["app"], Verbosity::Info);
    }

    #[test]
    fn test_unbind_returns_to_unbound() {
        let (registry, _) = bound(Verbosity::Warning);
        assert!(registry.unbind().is_some());
        assert!(registry.module_levels().is_err());
        assert!(registry.unbind().is_none());
    }

    #[test]
    fn test_register_module_macro_uses_module_path() {
        let registry = LevelRegistry::new();
        crate::register_module!(registry);
        assert_eq!(registry.modules(), vec!["logsmith::core::registry::tests".to_string()]);
    }
}
