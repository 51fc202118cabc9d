//! Session persistence across simulated browser restarts.

#![cfg_attr(
    test,
    allow(
        clippy::tests_outside_test_module,
        clippy::missing_panics_doc,
        reason = "Test file allows"
    )
)]

use anyhow::Result;
use facepalm_core::config::DEFAULT_STORAGE_KEY;
use facepalm_core::{Session, SessionConfig, UserProfile};
use facepalm_session::{FileStore, MemoryStore, SessionBridge};
use std::path::Path;
use tempfile::TempDir;

fn session(remember_me: bool) -> Session {
    Session {
        user: UserProfile {
            id: 2,
            name: "Alice".to_owned(),
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            phone_number: Some("555-0100".to_owned()),
            remember_me,
        },
    }
}

/// A fresh "browser": same durable directory, new ephemeral storage.
fn browser(dir: &Path) -> SessionBridge<FileStore, MemoryStore> {
    SessionBridge::from_config(
        &SessionConfig::default(),
        FileStore::new(dir),
        MemoryStore::new(),
    )
}

#[test]
fn test_remembered_session_survives_restart() -> Result<()> {
    let temp = TempDir::new()?;

    let mut first = browser(temp.path());
    first.save(&session(true))?;
    assert!(temp.path().join(format!("{DEFAULT_STORAGE_KEY}.json")).exists());

    let second = browser(temp.path());
    assert_eq!(second.restore()?, Some(session(true)));
    Ok(())
}

#[test]
fn test_unremembered_session_ends_with_browser() -> Result<()> {
    let temp = TempDir::new()?;

    let mut first = browser(temp.path());
    first.save(&session(false))?;
    assert_eq!(first.restore()?, Some(session(false)));

    let second = browser(temp.path());
    assert!(second.restore()?.is_none());
    Ok(())
}

#[test]
fn test_clear_removes_durable_file() -> Result<()> {
    let temp = TempDir::new()?;

    let mut first = browser(temp.path());
    first.save(&session(true))?;
    first.clear()?;

    let second = browser(temp.path());
    assert!(second.load_blob()?.is_none());
    Ok(())
}

#[test]
fn test_blob_shape_is_user_object() -> Result<()> {
    let temp = TempDir::new()?;
    let mut bridge = browser(temp.path());
    bridge.save(&session(true))?;

    let blob = bridge.load_blob()?.unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&blob)?;
    assert_eq!(value["user"]["username"], "alice");
    assert_eq!(value["user"]["rememberMe"], true);
    assert_eq!(value["user"]["phoneNumber"], "555-0100");
    Ok(())
}
