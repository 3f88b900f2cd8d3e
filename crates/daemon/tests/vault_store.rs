//! Integration tests for the file vault store

mod common;

use axum::response::IntoResponse;
use time::OffsetDateTime;
use uuid::Uuid;

use ::common::container::Container;
use ssv_daemon::http_server::api::v0::files::delete::DeleteError;
use ssv_daemon::vault::VaultStoreError;

#[tokio::test]
async fn test_put_then_list_shows_metadata() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let plaintext = vec![0x42u8; 1200];
    let record = state
        .vault()
        .put(owner.id, "report.pdf", plaintext)
        .await
        .unwrap();

    assert_eq!(record.plain_size, 1200);
    // magic + version + three length-prefixed 16-byte fields + padded body
    assert_eq!(record.container_size, 4 + 1 + (2 + 16) + (2 + 16) + (2 + 16) + 1216);
    assert_eq!(record.mime_hint, "application/pdf");

    let listed = state.vault().list(Some(&owner.id)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record.id);
    assert_eq!(listed[0].original_filename, "report.pdf");
    assert_eq!(listed[0].plain_size, 1200);
    assert!(listed[0].created_at <= OffsetDateTime::now_utc());

    // other owners see nothing
    let other = common::user();
    assert!(state.vault().list(Some(&other.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_plaintext_roundtrip() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let plaintext = b"the quick brown fox jumps over the lazy dog".to_vec();
    let record = state
        .vault()
        .put(owner.id, "notes.txt", plaintext.clone())
        .await
        .unwrap();

    let (opened, decrypted) = state.vault().open_plaintext(&record.id).await.unwrap();
    assert_eq!(opened.id, record.id);
    assert_eq!(decrypted, plaintext);
}

#[tokio::test]
async fn test_downloaded_container_decodes_and_decrypts() {
    let (state, vault_key, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let plaintext = vec![7u8; 999];
    let record = state
        .vault()
        .put(owner.id, "blob.bin", plaintext.clone())
        .await
        .unwrap();

    let bytes = state.vault().read_container(&record.id).await.unwrap();
    assert_eq!(bytes.len() as i64, record.container_size);

    let payload = Container::decode(&bytes).unwrap().into_payload().unwrap();
    assert_eq!(vault_key.decrypt(&payload).unwrap(), plaintext);
}

#[tokio::test]
async fn test_fresh_salt_and_iv_per_upload() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let plaintext = b"identical plaintext".to_vec();
    let a = state
        .vault()
        .put(owner.id, "a.txt", plaintext.clone())
        .await
        .unwrap();
    let b = state.vault().put(owner.id, "b.txt", plaintext).await.unwrap();

    let container_a = Container::decode(&state.vault().read_container(&a.id).await.unwrap()).unwrap();
    let container_b = Container::decode(&state.vault().read_container(&b.id).await.unwrap()).unwrap();

    assert_ne!(container_a.salt, container_b.salt);
    assert_ne!(container_a.iv, container_b.iv);
    assert_ne!(container_a.ciphertext, container_b.ciphertext);
}

#[tokio::test]
async fn test_tampered_container_fails_closed() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "evidence.txt", b"original content".to_vec())
        .await
        .unwrap();

    let bytes = state.vault().read_container(&record.id).await.unwrap();
    let path = _temp
        .path()
        .join("containers")
        .join(format!("{}.ssv", record.id));

    // flip one bit at the end of the ciphertext
    let mut tampered = bytes.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    tokio::fs::write(&path, &tampered).await.unwrap();

    let result = state.vault().open_plaintext(&record.id).await;
    assert!(matches!(result, Err(VaultStoreError::Integrity(_))));

    // restore and it opens again
    tokio::fs::write(&path, &bytes).await.unwrap();
    assert!(state.vault().open_plaintext(&record.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_by_owner_removes_everything() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "gone.txt", b"soon deleted".to_vec())
        .await
        .unwrap();

    state.vault().delete(&record.id, &owner).await.unwrap();

    assert!(state.vault().list(Some(&owner.id)).await.unwrap().is_empty());
    assert!(matches!(
        state.vault().get(&record.id).await,
        Err(VaultStoreError::NotFound(_))
    ));
    let path = _temp
        .path()
        .join("containers")
        .join(format!("{}.ssv", record.id));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_admin_may_delete_any_file() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let record = state
        .vault()
        .put(owner.id, "held.txt", b"admin purge".to_vec())
        .await
        .unwrap();

    state.vault().delete(&record.id, &common::admin()).await.unwrap();
    assert!(state.vault().list(Some(&owner.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_owner_delete_matches_missing_file_externally() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();
    let stranger = common::user();

    let record = state
        .vault()
        .put(owner.id, "private.txt", b"not yours".to_vec())
        .await
        .unwrap();

    // internally distinguishable
    let forbidden = state.vault().delete(&record.id, &stranger).await.unwrap_err();
    assert!(matches!(forbidden, VaultStoreError::Forbidden { .. }));

    let missing = state
        .vault()
        .delete(&Uuid::new_v4(), &stranger)
        .await
        .unwrap_err();
    assert!(matches!(missing, VaultStoreError::NotFound(_)));

    // externally identical
    let forbidden_response = DeleteError::Vault(forbidden).into_response();
    let missing_response = DeleteError::Vault(missing).into_response();
    assert_eq!(forbidden_response.status(), missing_response.status());
    assert_eq!(forbidden_response.status(), http::StatusCode::NOT_FOUND);

    // and the file is still there
    assert!(state.vault().get(&record.id).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_puts_land_independently() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let vault = state.vault().clone();
        let owner_id = owner.id;
        handles.push(tokio::spawn(async move {
            vault
                .put(owner_id, &format!("file-{}.txt", i), vec![i; 64])
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let listed = state.vault().list(Some(&owner.id)).await.unwrap();
    assert_eq!(listed.len(), 8);
}
