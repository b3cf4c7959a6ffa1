//! Start/stop, pause/resume and the control handle.

use std::time::Duration;

use super::fake_desktop::{FakeDesktop, Harness};
use crate::selection::MonitorError;
use crate::state_machine::MonitorPhase;

// ============================================================================
// Start / Stop
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_new_service_is_stopped() {
    let h = Harness::spawn(FakeDesktop::default());

    assert!(!h.handle.is_monitoring());
    assert_eq!(h.phase().await, MonitorPhase::Stopped);
    assert_eq!(h.desktop.with(|d| d.installs), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent() {
    let h = Harness::spawn(FakeDesktop::default());

    h.handle.start_monitoring().await.unwrap();
    h.handle.start_monitoring().await.unwrap();

    assert!(h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.installs), 1);
    assert_eq!(h.phase().await, MonitorPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let h = Harness::started("hello").await;

    h.handle.stop_monitoring().await.unwrap();
    h.handle.stop_monitoring().await.unwrap();

    assert!(!h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.uninstalls), 1);
    assert_eq!(h.phase().await, MonitorPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_copy() {
    let h = Harness::started("hello").await;

    h.double_click(100.0, 100.0).await;
    h.handle.stop_monitoring().await.unwrap();
    h.advance(2000).await;

    assert_eq!(h.desktop.copies_sent(), 0);
    assert_eq!(h.desktop.popups_opened(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_mid_copy_restores_clipboard() {
    let h = Harness::started("hello").await;
    h.desktop.with(|d| d.clipboard = Some("before".to_string()));

    h.double_click(100.0, 100.0).await;
    h.advance(310).await;
    assert_eq!(h.desktop.copies_sent(), 1);

    h.handle.stop_monitoring().await.unwrap();
    h.advance(1000).await;

    assert_eq!(h.desktop.clipboard().as_deref(), Some("before"));
    assert_eq!(h.desktop.popups_opened(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_closes_popup_without_clearing() {
    let h = Harness::started("hello").await;
    h.double_click(100.0, 100.0).await;
    h.run_to_popup().await;

    h.handle.stop_monitoring().await.unwrap();

    assert_eq!(h.desktop.open_popups(), 0);
    assert_eq!(h.desktop.clipboard().as_deref(), Some("hello"));

    // Auto-hide was cancelled along with everything else
    h.advance(6000).await;
    assert_eq!(h.desktop.clipboard().as_deref(), Some("hello"));
}

#[tokio::test(start_paused = true)]
async fn test_input_ignored_while_stopped() {
    let h = Harness::started("hello").await;
    h.handle.stop_monitoring().await.unwrap();

    h.double_click(100.0, 100.0).await;
    h.advance(1000).await;

    assert_eq!(h.desktop.copies_sent(), 0);
    assert_eq!(h.phase().await, MonitorPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_restart_starts_a_clean_cycle() {
    let h = Harness::started("hello").await;

    // First click of a pair, then a stop/start in between
    h.click(100.0, 100.0).await;
    h.handle.stop_monitoring().await.unwrap();
    h.handle.start_monitoring().await.unwrap();
    h.advance(50).await;
    h.click(100.0, 100.0).await;
    h.advance(1000).await;

    assert_eq!(h.desktop.copies_sent(), 0);
    assert_eq!(h.desktop.with(|d| d.installs), 2);
}

// ============================================================================
// Hook Installation Failure
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_hook_install_failure_leaves_monitor_stopped() {
    let desktop = FakeDesktop::default();
    desktop.with(|d| d.fail_install = true);
    let h = Harness::spawn(desktop);

    let result = h.handle.start_monitoring().await;

    assert!(matches!(result, Err(MonitorError::HookInstall(_))));
    assert!(!h.handle.is_monitoring());
    assert_eq!(h.phase().await, MonitorPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_start_can_be_retried_after_failure() {
    let desktop = FakeDesktop::default();
    desktop.with(|d| d.fail_install = true);
    let h = Harness::spawn(desktop);
    assert!(h.handle.start_monitoring().await.is_err());

    h.desktop.with(|d| d.fail_install = false);
    h.handle.start_monitoring().await.unwrap();

    assert!(h.handle.is_monitoring());
}

// ============================================================================
// Pause / Resume
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_hides_popup_and_ignores_mouse() {
    let h = Harness::started("hello").await;
    h.double_click(100.0, 100.0).await;
    h.run_to_popup().await;

    h.handle.pause().unwrap();
    h.phase().await;
    assert_eq!(h.desktop.open_popups(), 0);
    assert_eq!(h.desktop.clipboard().as_deref(), Some("hello"));

    h.double_click(300.0, 300.0).await;
    h.run_to_popup().await;
    assert_eq!(h.desktop.copies_sent(), 1);
    // Hooks stay installed while paused
    assert!(h.handle.is_monitoring());

    h.handle.resume().unwrap();
    h.double_click(300.0, 300.0).await;
    h.run_to_popup().await;
    assert_eq!(h.desktop.copies_sent(), 2);
    assert_eq!(h.desktop.open_popups(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pause_cancels_pending_copy() {
    let h = Harness::started("hello").await;

    h.double_click(100.0, 100.0).await;
    h.handle.pause().unwrap();
    h.run_to_popup().await;

    assert_eq!(h.desktop.copies_sent(), 0);
    assert_eq!(h.phase().await, MonitorPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_resume_forgets_the_last_shown_text() {
    let h = Harness::started("unused").await;
    h.desktop.with(|d| d.clipboard = Some("same text".to_string()));

    // Remembered as seen, but paused before the popup appears
    h.handle.show_popup_at_cursor().unwrap();
    h.advance(50).await;
    h.handle.pause().unwrap();
    h.handle.resume().unwrap();

    h.handle.show_popup_at_cursor().unwrap();
    h.advance(230).await;

    assert_eq!(h.desktop.popups_opened(), 1);
    assert_eq!(h.desktop.last_popup().unwrap().1, "same text");
}

#[tokio::test(start_paused = true)]
async fn test_repeat_show_without_resume_is_skipped() {
    let h = Harness::started("unused").await;
    h.desktop.with(|d| d.clipboard = Some("same text".to_string()));

    h.handle.show_popup_at_cursor().unwrap();
    h.advance(50).await;
    h.handle.show_popup_at_cursor().unwrap();
    h.advance(50).await;

    // The second request did not restart the display debounce
    h.advance(110).await;
    assert_eq!(h.desktop.popups_opened(), 1);
}

// ============================================================================
// Handle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_set_enabled_toggles_monitoring() {
    let h = Harness::spawn(FakeDesktop::default());

    h.handle.set_enabled(true).await.unwrap();
    assert!(h.handle.is_monitoring());

    h.handle.set_enabled(false).await.unwrap();
    assert!(!h.handle.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_reload_ignore_config_reaches_gate() {
    let h = Harness::started("hello").await;
    assert_eq!(h.desktop.with(|d| d.gate_reloads), 1);

    h.handle.reload_ignore_config().unwrap();
    h.phase().await;

    assert_eq!(h.desktop.with(|d| d.gate_reloads), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_stops_monitoring() {
    let h = Harness::started("hello").await;
    h.double_click(100.0, 100.0).await;
    h.run_to_popup().await;
    assert_eq!(h.desktop.open_popups(), 1);

    let desktop = h.desktop.clone();
    drop(h);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(desktop.with(|d| d.uninstalls), 1);
    assert_eq!(desktop.open_popups(), 0);

    // Auto-hide died with the loop, so nothing clears the clipboard later
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(desktop.clipboard().as_deref(), Some("hello"));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handles_mid_copy_restores_clipboard() {
    let h = Harness::started("hello").await;
    h.desktop.with(|d| d.clipboard = Some("before".to_string()));
    h.double_click(100.0, 100.0).await;
    h.advance(310).await;
    assert_eq!(h.desktop.copies_sent(), 1);

    let desktop = h.desktop.clone();
    drop(h);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(desktop.with(|d| d.uninstalls), 1);
    assert_eq!(desktop.clipboard().as_deref(), Some("before"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_ends_the_service() {
    let h = Harness::started("hello").await;

    h.handle.shutdown().await.unwrap();

    assert!(!h.handle.is_monitoring());
    assert_eq!(h.desktop.with(|d| d.uninstalls), 1);
    assert!(matches!(
        h.handle.phase().await,
        Err(MonitorError::ServiceUnavailable)
    ));
    assert!(matches!(
        h.handle.start_monitoring().await,
        Err(MonitorError::ServiceUnavailable)
    ));
}
