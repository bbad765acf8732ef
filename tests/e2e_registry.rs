// Logsmith - tests/e2e_registry.rs
//
// Level registry behaviour under concurrent use and across backend rebinds.

use logsmith::{LevelBackend, LevelRegistry, LevelTable, RegistryError, Verbosity};
use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

/// Many threads registering overlapping names end up with exactly the union.
#[test]
fn e2e_concurrent_register_yields_union() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 50;

    let registry = Arc::new(LevelRegistry::new());
    registry.bind(Arc::new(LevelTable::with_root(Verbosity::Notice)));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    // Half the names are shared by every thread.
                    registry.register(&format!("shared::m{i}"));
                    registry.register(&format!("t{t}::m{i}"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut expected: BTreeSet<String> = BTreeSet::new();
    for i in 0..PER_THREAD {
        expected.insert(format!("shared::m{i}"));
        for t in 0..THREADS {
            expected.insert(format!("t{t}::m{i}"));
        }
    }

    let names: BTreeSet<String> = registry.modules().into_iter().collect();
    assert_eq!(names, expected);

    let levels = registry.module_levels().unwrap();
    assert_eq!(levels.len(), expected.len() + 1, "root entry plus every module");
    assert!(levels.values().all(|l| *l == Verbosity::Notice));
}

/// Readers and writers racing on the same registry never observe a torn
/// state: every snapshot contains the root and only registered names.
#[test]
fn e2e_concurrent_snapshots_and_level_changes() {
    let registry = Arc::new(LevelRegistry::new());
    registry.bind(Arc::new(LevelTable::with_root(Verbosity::Warning)));
    registry.register("app::worker");

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..200 {
                let level = Verbosity::all()[i % Verbosity::all().len()];
                registry.set_level(level, "app::worker").unwrap();
            }
            registry.set_level(Verbosity::Info, "app::worker").unwrap();
        })
    };
    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..200 {
                let snapshot = registry.module_levels().unwrap();
                assert!(snapshot.contains_key(""));
                assert!(snapshot.contains_key("app::worker"));
                assert_eq!(snapshot.len(), 2);
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(registry.module_levels().unwrap()["app::worker"], Verbosity::Info);
}

/// Unbound -> bound -> rebound lifecycle.
#[test]
fn e2e_registry_lifecycle() {
    let registry = LevelRegistry::new();
    registry.register("app");

    assert_eq!(
        registry.module_levels().unwrap_err(),
        RegistryError::NotInitialised
    );

    let console = Arc::new(LevelTable::with_root(Verbosity::Warning));
    assert!(registry.bind(console.clone()).is_none());
    registry.set_level(Verbosity::Debug, "app").unwrap();
    assert_eq!(console.level("app"), Verbosity::Debug);

    // Rebinding keeps the names but reads the new backend's truth.
    let replacement = Arc::new(LevelTable::with_root(Verbosity::Error));
    registry.bind(replacement.clone());
    let levels = registry.module_levels().unwrap();
    assert_eq!(levels["app"], Verbosity::Error);
    assert_eq!(levels[""], Verbosity::Error);

    // The old backend is no longer touched.
    registry.set_level(Verbosity::Notice, "").unwrap();
    assert_eq!(console.level(""), Verbosity::Warning);
    assert_eq!(replacement.level(""), Verbosity::Notice);

    registry.unbind();
    assert!(registry.set_level(Verbosity::Info, "app").is_err());
    assert_eq!(registry.modules(), vec!["app".to_string()]);
}

/// Changing a level directly on the backend shows up in the registry: it
/// is a directory of names, not a cache of levels.
#[test]
fn e2e_module_levels_read_through_backend() {
    let registry = LevelRegistry::new();
    let table = Arc::new(LevelTable::with_root(Verbosity::Warning));
    registry.bind(table.clone());
    registry.register("app::db");

    table.set_level(Verbosity::Critical, "app::db");
    assert_eq!(registry.module_levels().unwrap()["app::db"], Verbosity::Critical);
}
