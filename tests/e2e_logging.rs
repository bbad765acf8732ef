// Logsmith - tests/e2e_logging.rs
//
// End-to-end tests for the initialisation layer: real file sinks, real
// `tracing` dispatchers, and live level changes through the registry.
//
// Dispatchers are installed with `with_default` (scoped to the test thread)
// so tests can run in parallel without fighting over the global default.

use logsmith::{LevelRegistry, LoggingOptions, LoggingSetup, SinkPolicy, Verbosity};
use std::fs;
use std::path::Path;

// =============================================================================
// Helpers
// =============================================================================

fn file_options(path: &Path, structured: bool) -> LoggingOptions {
    LoggingOptions {
        // Keep stderr quiet; everything under test goes to the file.
        verbosity: Verbosity::Critical,
        file: Some(path.to_path_buf()),
        file_verbosity: Verbosity::Debug,
        structured,
        ..LoggingOptions::default()
    }
}

fn json_lines(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON {l:?}: {e}")))
        .collect()
}

// =============================================================================
// Structured output
// =============================================================================

/// Structured file output is one JSON object per record with the expected keys.
#[test]
fn e2e_structured_file_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("json.log");
    let setup = LoggingSetup::build(&file_options(&path, true)).unwrap();

    tracing::dispatcher::with_default(setup.dispatch(), || {
        tracing::warn!(target: "app::net", peer = "10.0.0.1", "connection reset");
        tracing::debug!(target: "app::db", "query done");
    });
    setup.sink().unwrap().close().unwrap();

    let entries = json_lines(&path);
    assert_eq!(entries.len(), 2, "entries: {entries:?}");

    let first = &entries[0];
    assert_eq!(first["level"], "warning");
    assert_eq!(first["module"], "app::net");
    assert_eq!(first["msg"], "connection reset peer=10.0.0.1");
    assert!(first["file"].as_str().unwrap().contains("e2e_logging.rs:"));
    assert!(first["func"].as_str().unwrap().starts_with("e2e_logging"));
    assert!(first["time"].as_str().unwrap().contains('T'));

    assert_eq!(entries[1]["level"], "debug");
    assert_eq!(entries[1]["module"], "app::db");
}

/// Plain text output carries the level, target and message.
#[test]
fn e2e_text_file_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("text.log");
    let setup = LoggingSetup::build(&file_options(&path, false)).unwrap();

    tracing::dispatcher::with_default(setup.dispatch(), || {
        tracing::info!(target: "app::startup", "ready to serve");
    });
    setup.sink().unwrap().close().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("INFO"), "got: {content}");
    assert!(content.contains("app::startup"), "got: {content}");
    assert!(content.contains("ready to serve"), "got: {content}");
}

// =============================================================================
// Live level control
// =============================================================================

/// The registry reads and writes the console table; the file table is
/// independent of it.
#[test]
fn e2e_registry_controls_bound_levels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("levels.log");
    let registry = LevelRegistry::new();
    let setup = LoggingSetup::build(&file_options(&path, true)).unwrap();
    setup.bind(&registry);
    logsmith::register_module!(registry);

    let me = module_path!();
    assert_eq!(registry.module_levels().unwrap()[me], Verbosity::Critical);

    registry.set_level(Verbosity::Info, me).unwrap();
    assert_eq!(registry.module_levels().unwrap()[me], Verbosity::Info);
    assert_eq!(setup.console_levels().level_for_target(me), Verbosity::Info);

    // The file table is not the bound backend.
    assert_eq!(
        setup.file_levels().unwrap().level_for_target(me),
        Verbosity::Debug
    );
}

/// Changing the file table at runtime changes which records reach the file
/// on the very next event.
#[test]
fn e2e_runtime_level_change_applies_immediately() {
    use logsmith::LevelBackend;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live.log");
    let setup = LoggingSetup::build(&file_options(&path, true)).unwrap();
    let file_levels = setup.file_levels().unwrap().clone();

    tracing::dispatcher::with_default(setup.dispatch(), || {
        for round in 0..2 {
            tracing::debug!(target: "app::chatty", round, "chatter");
            tracing::error!(target: "app::chatty", round, "failure");
            file_levels.set_level(Verbosity::Error, "app::chatty");
        }
        file_levels.set_level(Verbosity::Debug, "app");
        tracing::debug!(target: "app::other", "other module still verbose");
    });
    setup.sink().unwrap().close().unwrap();

    let msgs: Vec<String> = json_lines(&path)
        .iter()
        .map(|e| e["msg"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        msgs,
        vec![
            "chatter round=0",
            "failure round=0",
            "failure round=1",
            "other module still verbose",
        ]
    );
}

/// A level set on a parent module is both what the registry reports for a
/// child module and what the filter applies to the child's records.
#[test]
fn e2e_reported_level_matches_applied_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inherit.log");
    let mut opts = file_options(&path, true);
    opts.file_verbosity = Verbosity::Error;
    let setup = LoggingSetup::build(&opts).unwrap();

    let registry = LevelRegistry::new();
    registry.bind(setup.file_levels().unwrap().clone());
    registry.register("app::net");
    assert_eq!(registry.module_levels().unwrap()["app::net"], Verbosity::Error);

    tracing::dispatcher::with_default(setup.dispatch(), || {
        tracing::debug!(target: "app::net", "before parent change");
        registry.set_level(Verbosity::Debug, "app").unwrap();
        tracing::debug!(target: "app::net", "after parent change");
    });
    setup.sink().unwrap().close().unwrap();

    assert_eq!(registry.module_levels().unwrap()["app::net"], Verbosity::Debug);
    let msgs: Vec<String> = json_lines(&path)
        .iter()
        .map(|e| e["msg"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(msgs, vec!["after parent change"]);
}

// =============================================================================
// File selection through the setup
// =============================================================================

/// Two setups on the same base path pick different files.
#[test]
fn e2e_two_setups_get_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dual.log");
    let a = LoggingSetup::build(&file_options(&path, false)).unwrap();
    let b = LoggingSetup::build(&file_options(&path, false)).unwrap();

    assert_eq!(a.sink().unwrap().path(), path);
    assert_eq!(b.sink().unwrap().path(), dir.path().join("dual.log.1"));
}

/// Append policy flows through the options to the sink.
#[test]
fn e2e_append_policy_shares_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.log");
    let mut opts = file_options(&path, false);
    opts.sink_policy = SinkPolicy::Append;

    let a = LoggingSetup::build(&opts).unwrap();
    let b = LoggingSetup::build(&opts).unwrap();
    assert_eq!(a.sink().unwrap().path(), path);
    assert_eq!(b.sink().unwrap().path(), path);
    assert!(a.sink().unwrap().locked());
    assert!(!b.sink().unwrap().locked());
}

/// A file that cannot be acquired surfaces as a sink error from the setup.
#[test]
fn e2e_setup_reports_sink_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").unwrap();

    let result = LoggingSetup::build(&file_options(&blocker.join("app.log"), false));
    assert!(
        matches!(result, Err(logsmith::LoggingError::Sink(_))),
        "expected a sink error"
    );
}
