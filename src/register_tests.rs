use super::*;
use std::fs;

use tempfile::TempDir;

fn write(dir: &Path, file: &str, content: &str) {
    fs::write(dir.join(file), content).unwrap();
}

fn registry_with_console() -> HandlerRegistry {
    let registry = HandlerRegistry::new();
    register_console(&registry).unwrap();
    registry
}

#[test]
fn test_console_is_registered_once() {
    let registry = registry_with_console();
    assert!(registry.contains(CONSOLE_HANDLER));
    assert_eq!(registry.get(CONSOLE_HANDLER).unwrap().kind(), "console");
    assert_eq!(
        register_console(&registry).unwrap_err(),
        RegistryError::DuplicateName(CONSOLE_HANDLER.to_string())
    );
}

#[test]
fn test_register_handlers() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "chat.json",
        r#"{
            "ops-slack": { "type": "slack", "webhookUrl": "https://hooks.example.com/T000/B000" },
            "stdout": { "type": "console" }
        }"#,
    );

    let registry = registry_with_console();
    assert_eq!(register_handlers(&registry, dir.path()), 2);
    assert_eq!(registry.get("ops-slack").unwrap().kind(), "slack");
    assert_eq!(registry.get("stdout").unwrap().kind(), "console");
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_handler_file_with_unknown_type_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.json",
        r#"{ "good": { "type": "console" }, "bad": { "type": "carrier-pigeon" } }"#,
    );
    write(dir.path(), "b.json", r#"{ "other": { "type": "console" } }"#);

    let registry = registry_with_console();
    assert_eq!(register_handlers(&registry, dir.path()), 1);
    assert!(!registry.contains("good"));
    assert!(!registry.contains("bad"));
    assert!(registry.contains("other"));
}

#[test]
fn test_handler_file_redefining_console_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.json",
        r#"{ "console": { "type": "console" }, "extra": { "type": "console" } }"#,
    );

    let registry = registry_with_console();
    assert_eq!(register_handlers(&registry, dir.path()), 0);
    assert!(!registry.contains("extra"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_handler_name_used_by_earlier_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.json", r#"{ "mail": { "type": "console" } }"#);
    write(dir.path(), "b.json", r#"{ "mail": { "type": "console" } }"#);

    let registry = registry_with_console();
    assert_eq!(register_handlers(&registry, dir.path()), 1);
}

#[test]
fn test_missing_handler_folder() {
    let dir = TempDir::new().unwrap();
    let registry = registry_with_console();
    assert_eq!(register_handlers(&registry, &dir.path().join("absent")), 0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_bind_checks() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "system.json",
        r#"{
            "disk-check": { "command": "check_disk -w 80", "interval": 60, "max_attempts": 3, "handlers": ["console"] },
            "load-check": { "command": "check_load", "interval": 30 }
        }"#,
    );

    let registry = registry_with_console();
    let mut checks = bind_checks(&registry, dir.path());
    checks.sort_by(|a, b| a.name().cmp(b.name()));

    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0].name(), "disk-check");
    assert_eq!(checks[0].definition.max_attempts, 3);
    assert_eq!(checks[0].handlers().len(), 1);
    assert_eq!(checks[0].handlers()[0].name(), "console");
    assert_eq!(checks[1].name(), "load-check");
    assert!(checks[1].handlers().is_empty());
}

#[test]
fn test_check_file_with_unknown_handler_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.json",
        r#"{
            "disk-check": { "command": "check_disk", "interval": 60, "handlers": ["console"] },
            "ping-check": { "command": "check_ping", "interval": 60, "handlers": ["pager"] }
        }"#,
    );
    write(
        dir.path(),
        "b.json",
        r#"{ "load-check": { "command": "check_load", "interval": 30, "handlers": ["console"] } }"#,
    );

    let registry = registry_with_console();
    let checks = bind_checks(&registry, dir.path());

    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].name(), "load-check");
}

#[test]
fn test_invalid_check_file_does_not_block_others() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.json", "{ not json");
    write(
        dir.path(),
        "b.json",
        r#"{ "load-check": { "command": "check_load", "interval": 30 } }"#,
    );

    let registry = registry_with_console();
    let checks = bind_checks(&registry, dir.path());
    assert_eq!(checks.len(), 1);
}

#[test]
fn test_first_accepted_check_definition_wins() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.json",
        r#"{ "disk-check": { "command": "first", "interval": 60 } }"#,
    );
    write(
        dir.path(),
        "b.json",
        r#"{
            "disk-check": { "command": "second", "interval": 60 },
            "load-check": { "command": "check_load", "interval": 30 }
        }"#,
    );

    let registry = registry_with_console();
    let mut checks = bind_checks(&registry, dir.path());
    checks.sort_by(|a, b| a.name().cmp(b.name()));

    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0].name(), "disk-check");
    assert_eq!(checks[0].definition.command, "first");
    assert_eq!(checks[1].name(), "load-check");
}

#[test]
fn test_skipped_check_file_does_not_reserve_names() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.json",
        r#"{ "disk-check": { "command": "first", "interval": 60, "handlers": ["pager"] } }"#,
    );
    write(
        dir.path(),
        "b.json",
        r#"{ "disk-check": { "command": "second", "interval": 60, "handlers": ["console"] } }"#,
    );

    let registry = registry_with_console();
    let checks = bind_checks(&registry, dir.path());

    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].name(), "disk-check");
    assert_eq!(checks[0].definition.command, "second");
    assert_eq!(checks[0].handlers()[0].name(), "console");
}
