// ABOUTME: Draft snapshots survive a restart, on memory and file storage alike

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

use super::fixtures::{complete_basic_info, fill_basic_info, start_time, Fixture};
use simple_tracker::clock::ManualClock;
use simple_tracker::models::Category;
use simple_tracker::storage::{DraftStorage, FileStorage, DRAFT_KEY};
use simple_tracker::wizard::{WizardContext, WizardSettings, WizardStep};

#[test]
fn test_reopen_restores_step_and_data() {
    let fixture = Fixture::new();
    let (session_id, device_id) = {
        let mut ctx = fixture.open();
        fill_basic_info(&mut ctx);
        ctx.next_step().unwrap();
        ctx.set_category(Category::Rigging, 4).unwrap();
        (ctx.session().unwrap().session_id, ctx.device_id())
    };

    fixture.advance(chrono::Duration::hours(2));
    let ctx = fixture.open();

    assert_eq!(ctx.current_step(), WizardStep::Categories);
    assert_eq!(ctx.data().basic_info, complete_basic_info());
    assert_eq!(ctx.data().categories.get(Category::Rigging), 4);
    assert_eq!(ctx.session().unwrap().session_id, session_id);
    assert_eq!(ctx.device_id(), device_id);
}

#[test]
fn test_every_mutation_writes_a_snapshot() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();

    ctx.set_category(Category::Hauling, 2).unwrap();
    let first = fixture.storage.get_item(DRAFT_KEY).unwrap().unwrap();

    fixture.advance(chrono::Duration::minutes(1));
    ctx.increment_category(Category::Hauling).unwrap();
    let second = fixture.storage.get_item(DRAFT_KEY).unwrap().unwrap();

    assert_ne!(first, second);
    let record: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(record["version"], 1);
    assert_eq!(record["state"]["currentStep"], "basic-info");
    assert_eq!(record["state"]["categories"]["hauling"], 3);
    assert_eq!(
        record["state"]["lastModified"],
        serde_json::to_value(fixture.clock_now()).unwrap()
    );
}

#[test]
fn test_unreadable_record_starts_fresh() {
    let fixture = Fixture::new();
    let mut storage = fixture.storage.clone();
    storage.set_item(DRAFT_KEY, "{ not json").unwrap();

    let ctx = fixture.open();

    assert!(ctx.session().is_none());
    assert!(ctx.recovery_prompt().is_none());
    assert!(fixture.storage.get_item(DRAFT_KEY).unwrap().is_none());
}

#[test]
fn test_unknown_format_version_is_discarded() {
    let fixture = Fixture::new();
    {
        let mut ctx = fixture.open();
        ctx.set_category(Category::Cleanup, 1).unwrap();
    }
    let raw = fixture.storage.get_item(DRAFT_KEY).unwrap().unwrap();
    let mut record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    record["version"] = serde_json::json!(99);
    let mut storage = fixture.storage.clone();
    storage.set_item(DRAFT_KEY, &record.to_string()).unwrap();

    let ctx = fixture.open();

    assert!(ctx.session().is_none());
    assert!(fixture.storage.get_item(DRAFT_KEY).unwrap().is_none());
}

#[test]
fn test_clear_removes_record_but_keeps_device_id() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    let device_id = ctx.device_id();
    fill_basic_info(&mut ctx);

    ctx.clear().unwrap();

    assert!(ctx.session().is_none());
    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);
    assert!(fixture.storage.get_item(DRAFT_KEY).unwrap().is_none());
    assert_eq!(fixture.open().device_id(), device_id);
}

#[test]
fn test_file_storage_round_trip_across_restarts() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(start_time());
    let open = || {
        WizardContext::open_with_clock(
            FileStorage::new(dir.path().join("drafts")),
            WizardSettings::default(),
            Arc::new(clock.clone()),
        )
        .unwrap()
    };

    {
        let mut ctx = open();
        fill_basic_info(&mut ctx);
        ctx.next_step().unwrap();
        ctx.set_category(Category::Teardown, 7).unwrap();
    }
    assert!(dir.path().join("drafts").join("ticket-wizard.json").exists());

    let ctx = open();
    assert_eq!(ctx.current_step(), WizardStep::Categories);
    assert_eq!(ctx.data().categories.get(Category::Teardown), 7);
    assert!(ctx.recovery_prompt().is_some());
}

#[test]
fn test_non_utf8_draft_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let drafts = dir.path().join("drafts");
    std::fs::create_dir_all(&drafts).unwrap();
    let record = drafts.join("ticket-wizard.json");
    std::fs::write(&record, [0xff, 0xfe, 0x00]).unwrap();

    let ctx = WizardContext::open_with_clock(
        FileStorage::new(&drafts),
        WizardSettings::default(),
        Arc::new(ManualClock::new(start_time())),
    )
    .unwrap();

    assert!(ctx.session().is_none());
    assert!(ctx.recovery_prompt().is_none());
    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);
    assert!(!record.exists());
}
