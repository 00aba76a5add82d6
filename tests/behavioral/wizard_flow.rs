// ABOUTME: Step gating, navigation and the assembled submission payload

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::fixtures::{fill_all_categories, fill_basic_info, FakeTicketApi, Fixture};
use simple_tracker::models::{BasicInfoPatch, Categories, Category, SubmittedImage, TicketSubmission};
use simple_tracker::notifications::ToastLevel;
use simple_tracker::storage::{DraftStorage, DRAFT_KEY};
use simple_tracker::wizard::{ValidationIssue, WizardError, WizardStep};

#[test]
fn test_fresh_wizard_starts_on_basic_info_without_session() {
    let fixture = Fixture::new();
    let ctx = fixture.open();

    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);
    assert!(ctx.session().is_none());
    assert!(!ctx.can_proceed_to_next_step());
    assert!(ctx.recovery_prompt().is_none());
}

#[test]
fn test_next_is_blocked_until_basic_info_complete() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();

    ctx.update_basic_info(BasicInfoPatch {
        truck_id: Some("TRK-1".to_string()),
        ..BasicInfoPatch::default()
    })
    .unwrap();

    match ctx.next_step() {
        Err(WizardError::StepIncomplete {
            step: WizardStep::BasicInfo,
            issue: ValidationIssue::MissingFields(missing),
        }) => assert_eq!(missing, vec!["date", "jobsiteId", "notes"]),
        other => panic!("expected StepIncomplete, got {other:?}"),
    }
    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);

    // Whitespace-only notes do not count
    ctx.update_basic_info(BasicInfoPatch {
        date: NaiveDate::from_ymd_opt(2024, 3, 18),
        jobsite_id: Some("JS-1".to_string()),
        notes: Some("   ".to_string()),
        ..BasicInfoPatch::default()
    })
    .unwrap();
    assert!(!ctx.can_proceed_to_next_step());

    ctx.update_basic_info(BasicInfoPatch {
        notes: Some("Pad prep".to_string()),
        ..BasicInfoPatch::default()
    })
    .unwrap();
    assert!(ctx.can_proceed_to_next_step());
    assert_eq!(ctx.next_step().unwrap(), WizardStep::Categories);
}

#[test]
fn test_categories_need_at_least_one_count() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    ctx.next_step().unwrap();

    assert!(matches!(
        ctx.next_step(),
        Err(WizardError::StepIncomplete {
            step: WizardStep::Categories,
            issue: ValidationIssue::NoCategoryCounts,
        })
    ));

    ctx.increment_category(Category::Standby).unwrap();
    assert_eq!(ctx.next_step().unwrap(), WizardStep::ImageUpload);
}

#[test]
fn test_category_counts_are_clamped() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();

    assert_eq!(ctx.set_category(Category::Hauling, 500).unwrap(), 150);
    assert_eq!(ctx.increment_category(Category::Hauling).unwrap(), 150);
    assert_eq!(ctx.set_category(Category::Rigging, -3).unwrap(), 0);
    assert_eq!(ctx.decrement_category(Category::Rigging).unwrap(), 0);
    assert_eq!(ctx.data().categories.get(Category::Hauling), 150);
}

#[test]
fn test_images_step_is_optional() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    fill_all_categories(&mut ctx);

    ctx.go_to_step(WizardStep::ImageUpload).unwrap();
    assert!(ctx.data().images.is_empty());
    assert_eq!(ctx.next_step().unwrap(), WizardStep::Confirmation);
    assert!(!ctx.can_proceed_to_next_step());
    assert!(matches!(ctx.next_step(), Err(WizardError::NoNextStep)));
}

#[test]
fn test_forward_jump_requires_valid_predecessors() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);

    match ctx.go_to_step(WizardStep::Confirmation) {
        Err(WizardError::InvalidJump { target, blocked_by }) => {
            assert_eq!(target, WizardStep::Confirmation);
            assert_eq!(blocked_by, WizardStep::Categories);
        }
        other => panic!("expected InvalidJump, got {other:?}"),
    }
    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);

    ctx.go_to_step(WizardStep::Categories).unwrap();
    assert_eq!(ctx.current_step(), WizardStep::Categories);

    // Backward jumps are always allowed
    ctx.go_to_step(WizardStep::BasicInfo).unwrap();
    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);
    assert_eq!(ctx.previous_step().unwrap(), None);
}

#[test]
fn test_first_mutation_creates_session_with_ttl() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();

    ctx.increment_category(Category::Cleanup).unwrap();

    let session = ctx.session().expect("session created").clone();
    assert_eq!(session.created_at, fixture.clock_now());
    assert_eq!(session.expires_at - session.created_at, chrono::Duration::hours(24));
    assert_eq!(session.device_id, ctx.device_id());
    assert_eq!(session.user_id.as_deref(), Some("driver-7"));
    assert!(ctx.storage().get_item(DRAFT_KEY).unwrap().is_some());

    // Further mutations keep the same session
    ctx.increment_category(Category::Cleanup).unwrap();
    assert_eq!(ctx.session().unwrap().session_id, session.session_id);
}

#[tokio::test]
async fn test_full_flow_submits_expected_payload() {
    let fixture = Fixture::new();
    let api = FakeTicketApi::new();
    let mut ctx = fixture.open();

    fill_basic_info(&mut ctx);
    assert_eq!(ctx.next_step().unwrap(), WizardStep::Categories);
    fill_all_categories(&mut ctx);
    assert_eq!(ctx.next_step().unwrap(), WizardStep::ImageUpload);
    let image = ctx
        .upload_image(&api, "pad.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0])
        .await
        .unwrap();
    assert_eq!(ctx.next_step().unwrap(), WizardStep::Confirmation);

    let session = ctx.session().unwrap().clone();
    let device_id = ctx.device_id();
    let submitted_at = fixture.clock_now();

    let ticket_id = ctx.submit(&api).await.unwrap();
    assert_eq!(ticket_id, "T-1001");

    let expected = TicketSubmission {
        session_id: session.session_id,
        device_id,
        user_id: Some("driver-7".to_string()),
        date: NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
        truck_id: "TRK-042".to_string(),
        jobsite_id: "JS-7781".to_string(),
        notes: "Crane pad prep, north gate".to_string(),
        categories: Categories {
            hauling: 3,
            spotting: 6,
            rigging: 9,
            teardown: 12,
            cleanup: 15,
            standby: 18,
        },
        images: vec![SubmittedImage {
            temp_id: image.temp_id.clone(),
            url: image.url.clone(),
        }],
        submitted_at,
    };
    assert_eq!(api.submissions(), vec![expected]);
    assert_eq!(api.uploads(), vec![("pad.jpg".to_string(), 4)]);

    // Success resets the wizard and drops the stored draft
    assert_eq!(ctx.current_step(), WizardStep::BasicInfo);
    assert!(ctx.session().is_none());
    assert!(!ctx.state().has_user_data());
    assert!(ctx.storage().get_item(DRAFT_KEY).unwrap().is_none());

    let toasts = ctx.take_toasts();
    let last = toasts.last().unwrap();
    assert_eq!(last.level, ToastLevel::Success);
    assert_eq!(last.message, "Ticket T-1001 submitted");
}

#[test]
fn test_submission_payload_serializes_camel_case() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    ctx.set_category(Category::Spotting, 2).unwrap();

    let payload = serde_json::to_value(ctx.build_submission().unwrap()).unwrap();

    assert_eq!(payload["truckId"], "TRK-042");
    assert_eq!(payload["jobsiteId"], "JS-7781");
    assert_eq!(payload["date"], "2024-03-18");
    assert_eq!(payload["categories"]["spotting"], 2);
    assert_eq!(payload["categories"]["hauling"], 0);
    assert_eq!(payload["images"], serde_json::json!([]));
}

#[tokio::test]
async fn test_single_category_submit_sends_every_field() {
    let fixture = Fixture::new();
    let api = FakeTicketApi::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    ctx.set_category(Category::Rigging, 10).unwrap();

    ctx.submit(&api).await.unwrap();

    let sent = serde_json::to_value(&api.submissions()[0]).unwrap();
    for field in ["date", "truckId", "jobsiteId", "notes"] {
        assert!(sent[field].is_string(), "missing {field}");
    }
    let categories = sent["categories"].as_object().unwrap();
    assert_eq!(categories.len(), 6);
    for category in Category::all() {
        let expected = if *category == Category::Rigging { 10 } else { 0 };
        assert_eq!(categories[category.as_str()], expected);
    }
}
