use super::*;
use serde_json::json;

struct V1ToV2;

impl Migration for V1ToV2 {
    fn source_version(&self) -> u32 {
        1
    }

    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("added_in_v2".to_string(), json!(true));
        }
        Ok(())
    }
}

struct V2ToV3;

impl Migration for V2ToV3 {
    fn source_version(&self) -> u32 {
        2
    }

    fn target_version(&self) -> u32 {
        3
    }

    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("added_in_v3".to_string(), json!(true));
        }
        Ok(())
    }
}

#[test]
fn migrate_to_same_version_is_noop() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 1, "x": 1});
    let migrated = registry.migrate_to(snapshot.clone(), 1).unwrap();
    assert_eq!(migrated, snapshot);
}

#[test]
fn migrate_to_newer_than_supported_errors() {
    let mut registry = MigrationRegistry::new();
    registry.migrations.push(Box::new(V1ToV2));
    let snapshot = json!({"v": 99});
    let err = registry.migrate_to(snapshot, 1).unwrap_err();
    assert_eq!(err, MigrationError::TooNew(99, 1));
}

#[test]
fn migrate_with_no_path_errors() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 1});
    let err = registry.migrate_to(snapshot, 2).unwrap_err();
    assert_eq!(err, MigrationError::NoPath(1, 2));
}

#[test]
fn migrate_chains_through_multiple_steps() {
    let mut registry = MigrationRegistry::new();
    registry.migrations.push(Box::new(V1ToV2));
    registry.migrations.push(Box::new(V2ToV3));

    let snapshot = json!({"v": 1});
    let migrated = registry.migrate_to(snapshot, 3).unwrap();
    assert_eq!(migrated["v"], json!(3));
    assert_eq!(migrated["added_in_v2"], json!(true));
    assert_eq!(migrated["added_in_v3"], json!(true));
}

#[test]
fn migrate_missing_version_field_is_malformed() {
    let registry = MigrationRegistry::new();
    let err = registry.migrate_to(json!({}), 1).unwrap_err();
    assert_eq!(err, MigrationError::MalformedVersion);
}
