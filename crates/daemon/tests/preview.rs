//! Integration tests for the view-only preview broker

mod common;

use std::time::Duration;

use ::common::mime_class::MimeClass;
use ssv_daemon::preview::PreviewError;
use ssv_daemon::vault::VaultStoreError;

#[tokio::test]
async fn test_open_and_read_image_preview() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let plaintext = b"fake png bytes".to_vec();
    let record = state
        .vault()
        .put(owner.id, "photo.png", plaintext.clone())
        .await
        .unwrap();

    let session = state.previews().open(&record.id, &owner).await.unwrap();
    assert_eq!(session.file_id, record.id);
    assert_eq!(session.mime_class, MimeClass::Image);
    assert!(session.previewable);

    let content = state.previews().read(&session.id).unwrap();
    assert_eq!(content.bytes, plaintext);
    assert_eq!(content.mime_hint, "image/png");
    assert_eq!(content.mime_class, MimeClass::Image);
}

#[tokio::test]
async fn test_unsupported_class_opens_but_has_no_inline_content() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "archive.zip", b"zip bytes".to_vec())
        .await
        .unwrap();

    // still a valid session, the caller falls back to the download path
    let session = state.previews().open(&record.id, &owner).await.unwrap();
    assert_eq!(session.mime_class, MimeClass::Unsupported);
    assert!(!session.previewable);

    let result = state.previews().read(&session.id);
    assert!(matches!(result, Err(PreviewError::Unsupported)));
}

#[tokio::test]
async fn test_close_invalidates_the_handle() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "clip.mp4", b"mp4 bytes".to_vec())
        .await
        .unwrap();

    let session = state.previews().open(&record.id, &owner).await.unwrap();
    assert!(state.previews().read(&session.id).is_ok());

    state.previews().close(&session.id);
    let result = state.previews().read(&session.id);
    assert!(matches!(result, Err(PreviewError::SessionNotFound)));

    // closing again is a no-op
    state.previews().close(&session.id);
}

#[tokio::test]
async fn test_expired_handle_is_unusable_without_any_sweep() {
    let (state, _, _temp) =
        common::setup_with_preview_ttl(Duration::from_millis(50)).await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "photo.jpg", b"jpeg bytes".to_vec())
        .await
        .unwrap();

    let session = state.previews().open(&record.id, &owner).await.unwrap();
    assert!(state.previews().read(&session.id).is_ok());

    tokio::time::sleep(Duration::from_millis(120)).await;

    // nobody called close and no purge task is running; access alone
    // must refuse the handle
    let result = state.previews().read(&session.id);
    assert!(matches!(result, Err(PreviewError::SessionNotFound)));
}

#[tokio::test]
async fn test_purge_drops_expired_sessions() {
    let (state, _, _temp) =
        common::setup_with_preview_ttl(Duration::from_millis(50)).await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "scan.png", b"scan bytes".to_vec())
        .await
        .unwrap();

    state.previews().open(&record.id, &owner).await.unwrap();
    state.previews().open(&record.id, &owner).await.unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(state.previews().purge_expired(), 2);
    assert_eq!(state.previews().purge_expired(), 0);
}

#[tokio::test]
async fn test_preview_is_owner_gated() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();
    let stranger = common::user();

    let record = state
        .vault()
        .put(owner.id, "secret.png", b"private pixels".to_vec())
        .await
        .unwrap();

    let result = state.previews().open(&record.id, &stranger).await;
    assert!(matches!(result, Err(PreviewError::Forbidden { .. })));

    // an admin can view anything
    assert!(state
        .previews()
        .open(&record.id, &common::admin())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_preview_of_missing_file_is_not_found() {
    let (state, _, _temp) = common::setup_test_env().await;

    let result = state
        .previews()
        .open(&uuid::Uuid::new_v4(), &common::user())
        .await;
    assert!(matches!(
        result,
        Err(PreviewError::Vault(VaultStoreError::NotFound(_)))
    ));
}
