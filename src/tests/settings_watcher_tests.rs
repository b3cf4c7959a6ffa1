//! Settings file changes flowing into a running monitor.

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use super::fake_desktop::Harness;
use crate::settings::{IgnoreConfig, Settings};
use crate::settings_watcher::{apply_settings, SettingsWatcher};

fn disabled() -> Settings {
    Settings {
        text_selection_enabled: false,
        ..Settings::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_apply_settings_toggles_and_reloads() {
    let h = Harness::started("hello").await;

    apply_settings(&h.handle, &disabled()).await.unwrap();
    assert!(!h.handle.is_monitoring());

    apply_settings(&h.handle, &Settings::default()).await.unwrap();
    h.phase().await;
    assert!(h.handle.is_monitoring());
    // One reload per start plus one per apply
    assert_eq!(h.desktop.with(|d| d.gate_reloads), 4);
}

#[tokio::test(start_paused = true)]
async fn test_watcher_applies_file_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    Settings::default().save(&path).unwrap();

    let h = Harness::started("hello").await;
    let mut watcher =
        SettingsWatcher::with_interval(path.clone(), h.handle.clone(), Duration::from_secs(2));
    watcher.start(Settings::default());

    h.advance(2100).await;
    assert!(h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.uninstalls), 0);

    disabled().save(&path).unwrap();
    h.advance(2000).await;
    assert!(!h.handle.is_monitoring());

    Settings::default().save(&path).unwrap();
    h.advance(2000).await;
    assert!(h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.installs), 2);
}

#[tokio::test(start_paused = true)]
async fn test_watcher_reloads_ignore_list_on_change() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    Settings::default().save(&path).unwrap();

    let h = Harness::started("hello").await;
    let mut watcher =
        SettingsWatcher::with_interval(path.clone(), h.handle.clone(), Duration::from_secs(2));
    watcher.start(Settings::default());

    let edited = Settings {
        ignore: IgnoreConfig {
            enabled: true,
            ignored_applications: vec!["KeePass".to_string()],
        },
        ..Settings::default()
    };
    edited.save(&path).unwrap();
    h.advance(2100).await;

    assert!(h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.gate_reloads), 2);
}

#[tokio::test(start_paused = true)]
async fn test_watcher_skips_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let h = Harness::started("hello").await;
    let mut watcher =
        SettingsWatcher::with_interval(path.clone(), h.handle.clone(), Duration::from_secs(2));
    watcher.start(Settings::default());

    fs::write(&path, "{ \"text_selection_enabled\": fal").unwrap();
    h.advance(2100).await;

    assert!(h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.gate_reloads), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_watcher_stops_applying() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let h = Harness::started("hello").await;
    let mut watcher =
        SettingsWatcher::with_interval(path.clone(), h.handle.clone(), Duration::from_secs(2));
    watcher.start(Settings::default());
    drop(watcher);

    disabled().save(&path).unwrap();
    h.advance(4100).await;

    assert!(h.handle.is_monitoring());
}
