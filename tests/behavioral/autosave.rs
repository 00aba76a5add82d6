// ABOUTME: Background auto-save timer, driven with paused tokio time

use std::time::Duration;
use tokio::sync::watch;

use super::fixtures::Fixture;
use simple_tracker::models::Category;
use simple_tracker::runtime::{AutoSaver, ConnectivityEvent, WizardRuntime};
use simple_tracker::storage::{DraftStorage, MemoryStorage, DRAFT_KEY};
use simple_tracker::wizard::{shared, SharedContext};

const INTERVAL: Duration = Duration::from_secs(30);

async fn started_draft(fixture: &Fixture) -> SharedContext<MemoryStorage> {
    let ctx = shared(fixture.open());
    ctx.lock().await.set_category(Category::Hauling, 2).unwrap();
    ctx
}

fn stored_auto_saved_flag(fixture: &Fixture) -> bool {
    let raw = fixture.storage.get_item(DRAFT_KEY).unwrap().unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    record["state"]["session"]["autoSaved"].as_bool().unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_saves_on_each_tick_while_online() {
    let fixture = Fixture::new();
    let ctx = started_draft(&fixture).await;
    assert!(!stored_auto_saved_flag(&fixture));

    let mut saver = AutoSaver::new(INTERVAL);
    saver.start(ctx.clone());
    assert!(saver.is_running());

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(saver.save_count(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(saver.save_count(), 1);
    assert!(stored_auto_saved_flag(&fixture));

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(saver.save_count(), 3);

    // A manual edit clears the flag again
    ctx.lock().await.increment_category(Category::Hauling).unwrap();
    assert!(!stored_auto_saved_flag(&fixture));

    saver.stop().await;
    assert!(!saver.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_offline_ticks_are_skipped() {
    let fixture = Fixture::new();
    let ctx = started_draft(&fixture).await;
    let mut events = ctx.lock().await.subscribe_connectivity();
    let (tx, rx) = watch::channel(true);

    let mut runtime = WizardRuntime::mount(&ctx, INTERVAL, rx);

    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
    assert_eq!(runtime.autosaver().save_count(), 1);

    tx.send(false).unwrap();
    assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::WentOffline);
    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(runtime.autosaver().save_count(), 1);

    tx.send(true).unwrap();
    assert_eq!(events.recv().await.unwrap(), ConnectivityEvent::Restored);
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(runtime.autosaver().save_count(), 2);

    runtime.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_after_unmount() {
    let fixture = Fixture::new();
    let ctx = started_draft(&fixture).await;
    let (_tx, rx) = watch::channel(true);

    let mut runtime = WizardRuntime::mount(&ctx, INTERVAL, rx);
    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
    assert_eq!(runtime.autosaver().save_count(), 1);

    runtime.unmount().await;
    assert!(!runtime.autosaver().is_running());

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(runtime.autosaver().save_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_auto_save_never_writes() {
    let fixture = Fixture::new();
    let ctx = started_draft(&fixture).await;
    ctx.lock().await.set_autosave_enabled(false);

    let mut saver = AutoSaver::new(INTERVAL);
    saver.start(ctx.clone());
    tokio::time::sleep(INTERVAL * 4).await;

    assert_eq!(saver.save_count(), 0);
    assert!(!stored_auto_saved_flag(&fixture));
    saver.stop().await;
}
