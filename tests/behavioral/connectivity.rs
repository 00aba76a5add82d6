// ABOUTME: Connectivity transitions toast once per edge and gate auto-save only

use std::time::Duration;
use tokio::sync::watch;

use super::fixtures::Fixture;
use simple_tracker::models::Category;
use simple_tracker::notifications::ToastLevel;
use simple_tracker::runtime::{ConnectivityEvent, WizardRuntime};
use simple_tracker::storage::{DraftStorage, DRAFT_KEY};
use simple_tracker::wizard::{shared, AutoSaveOutcome};

#[test]
fn test_offline_then_online_toasts_once_each() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    assert!(ctx.is_online());

    assert_eq!(ctx.set_online(false), Some(ConnectivityEvent::WentOffline));
    assert_eq!(ctx.set_online(false), None);
    assert_eq!(ctx.set_online(true), Some(ConnectivityEvent::Restored));
    assert_eq!(ctx.set_online(true), None);

    let toasts = ctx.take_toasts();
    let messages: Vec<_> = toasts.iter().map(|t| t.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["You are offline. Changes are saved locally.", "Connection restored"]
    );
    assert_eq!(toasts[1].level, ToastLevel::Success);
}

#[test]
fn test_offline_skips_auto_save_but_not_edits() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    ctx.set_online(false);

    ctx.set_category(Category::Spotting, 2).unwrap();
    assert!(fixture.storage.get_item(DRAFT_KEY).unwrap().is_some());
    assert_eq!(ctx.auto_save().unwrap(), AutoSaveOutcome::SkippedOffline);

    ctx.set_online(true);
    assert_eq!(ctx.auto_save().unwrap(), AutoSaveOutcome::Saved);
}

#[tokio::test]
async fn test_runtime_forwards_signal_changes() {
    let fixture = Fixture::new();
    let ctx = shared(fixture.open());
    let mut events = ctx.lock().await.subscribe_connectivity();
    let (tx, rx) = watch::channel(true);

    let mut runtime = WizardRuntime::mount(&ctx, Duration::from_secs(3600), rx);
    assert!(runtime.is_mounted());

    tx.send(false).unwrap();
    assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::WentOffline);
    assert!(!ctx.lock().await.is_online());

    tx.send(true).unwrap();
    assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::Restored);

    runtime.unmount().await;
    assert!(!runtime.is_mounted());

    let toasts = ctx.lock().await.take_toasts();
    let restored = toasts
        .iter()
        .filter(|t| t.message == "Connection restored")
        .count();
    assert_eq!(restored, 1);
    assert_eq!(toasts.len(), 2);
}

#[tokio::test]
async fn test_runtime_applies_initial_offline_signal() {
    let fixture = Fixture::new();
    let ctx = shared(fixture.open());
    let mut events = ctx.lock().await.subscribe_connectivity();
    let (_tx, rx) = watch::channel(false);

    let mut runtime = WizardRuntime::mount(&ctx, Duration::from_secs(3600), rx);

    assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::WentOffline);
    runtime.unmount().await;
}
