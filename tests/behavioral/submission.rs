// ABOUTME: Submission failures, retries, upload errors and expired temporary uploads

use chrono::Duration;
use pretty_assertions::assert_eq;

use super::fixtures::{fill_all_categories, fill_basic_info, start_time, FakeTicketApi, Fixture};
use simple_tracker::api::{ApiError, SubmitResponse, TempUploadResponse, TicketApi};
use simple_tracker::models::{Category, ImageUpload, TicketSubmission};
use simple_tracker::notifications::ToastLevel;
use simple_tracker::storage::{DraftStorage, DRAFT_KEY};
use simple_tracker::wizard::{WizardError, WizardStep};

#[tokio::test]
async fn test_failed_submit_keeps_draft_for_retry() {
    let fixture = Fixture::new();
    let api = FakeTicketApi::new();
    api.fail_next_submit(503);

    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    fill_all_categories(&mut ctx);
    ctx.go_to_step(WizardStep::Confirmation).unwrap();
    let before = ctx.state().clone();
    let stored_before = fixture.storage.get_item(DRAFT_KEY).unwrap();

    match ctx.submit(&api).await {
        Err(WizardError::Submission(ApiError::Status { status, .. })) => assert_eq!(status, 503),
        other => panic!("expected submission failure, got {other:?}"),
    }

    assert_eq!(ctx.state(), &before);
    assert_eq!(fixture.storage.get_item(DRAFT_KEY).unwrap(), stored_before);
    let toasts = ctx.take_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);

    // The retry goes through with the same session
    let ticket_id = ctx.submit(&api).await.unwrap();
    assert_eq!(ticket_id, "T-1002");
    let submissions = api.submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0], submissions[1]);
    assert!(ctx.session().is_none());
}

/// Backend that never answers
struct UnresponsiveApi;

impl TicketApi for UnresponsiveApi {
    async fn submit_ticket(&self, _submission: &TicketSubmission) -> Result<SubmitResponse, ApiError> {
        std::future::pending().await
    }

    async fn upload_temp_image(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<TempUploadResponse, ApiError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_submit_can_be_retried() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    fill_all_categories(&mut ctx);
    let before = ctx.state().clone();

    let timed_out = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        ctx.submit(&UnresponsiveApi),
    )
    .await;
    assert!(timed_out.is_err());
    assert_eq!(ctx.state(), &before);

    let api = FakeTicketApi::new();
    assert_eq!(ctx.submit(&api).await.unwrap(), "T-1001");
    assert_eq!(api.submissions().len(), 1);
    assert!(ctx.session().is_none());
}

#[tokio::test]
async fn test_incomplete_draft_is_not_sent() {
    let fixture = Fixture::new();
    let api = FakeTicketApi::new();
    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);

    assert!(matches!(
        ctx.submit(&api).await,
        Err(WizardError::StepIncomplete {
            step: WizardStep::Confirmation,
            ..
        })
    ));
    assert!(api.submissions().is_empty());
    assert!(ctx.session().is_some());
}

#[tokio::test]
async fn test_expired_uploads_are_dropped_before_submit() {
    let fixture = Fixture::new();
    let api = FakeTicketApi::new();
    api.set_upload_expiry(start_time() + Duration::hours(1));

    let mut ctx = fixture.open();
    fill_basic_info(&mut ctx);
    ctx.set_category(Category::Hauling, 1).unwrap();
    ctx.upload_image(&api, "gate.png", vec![1, 2, 3]).await.unwrap();
    assert_eq!(ctx.data().images.len(), 1);

    fixture.advance(Duration::hours(2));
    ctx.submit(&api).await.unwrap();

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].images.is_empty());

    let levels: Vec<_> = ctx.take_toasts().iter().map(|t| t.level).collect();
    assert_eq!(levels, vec![ToastLevel::Warning, ToastLevel::Success]);
}

#[tokio::test]
async fn test_upload_failure_attaches_nothing() {
    let fixture = Fixture::new();
    let api = FakeTicketApi::new();
    api.fail_uploads();

    let mut ctx = fixture.open();
    let result = ctx.upload_image(&api, "huge.jpg", vec![0; 16]).await;

    assert!(matches!(result, Err(WizardError::Upload(ApiError::Status { status: 413, .. }))));
    assert!(ctx.data().images.is_empty());
    let toasts = ctx.take_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
}

#[test]
fn test_duplicate_and_missing_images() {
    let fixture = Fixture::new();
    let mut ctx = fixture.open();
    let image = ImageUpload {
        temp_id: "tmp-9".to_string(),
        url: "https://uploads.example/tmp-9".to_string(),
        expires_at: start_time() + Duration::hours(24),
    };

    assert!(ctx.add_image(image.clone()).unwrap());
    assert!(!ctx.add_image(image).unwrap());
    assert_eq!(ctx.data().images.len(), 1);

    assert!(!ctx.remove_image("tmp-404").unwrap());
    assert!(ctx.remove_image("tmp-9").unwrap());
    assert!(ctx.data().images.is_empty());
}
