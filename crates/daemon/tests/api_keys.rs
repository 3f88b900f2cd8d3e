//! Integration tests for the API key registry

mod common;

use time::Duration;

use ssv_daemon::keys::{CredentialError, KeyRegistryError};

#[tokio::test]
async fn test_issue_then_validate() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let issued = state
        .keys()
        .issue(&owner, "test-app", 30, None)
        .await
        .unwrap();
    assert!(issued.secret.starts_with("ssv_"));
    assert_eq!(issued.record.owner_id, owner.id);
    assert_eq!(issued.record.hit_count, 0);

    let principal = state.keys().validate(&issued.secret).await.unwrap();
    assert_eq!(principal.id, owner.id);
    assert!(!principal.is_admin());

    // exactly one hit recorded
    let key = state
        .database()
        .get_key(&issued.record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(key.hit_count, 1);
}

#[tokio::test]
async fn test_unknown_secret_is_invalid_and_leaves_no_trace() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let issued = state
        .keys()
        .issue(&owner, "test-app", 30, None)
        .await
        .unwrap();

    let result = state.keys().validate("ssv_definitely-not-a-real-secret").await;
    assert!(matches!(result, Err(CredentialError::Invalid)));

    let key = state
        .database()
        .get_key(&issued.record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(key.hit_count, 0);
}

#[tokio::test]
async fn test_expiry_matrix_against_injected_clock() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    for ttl_days in [7i64, 30, 90, 365] {
        let issued = state
            .keys()
            .issue(&owner, &format!("app-{}", ttl_days), ttl_days, None)
            .await
            .unwrap();

        // active one second after issuance
        let just_after = issued.record.issued_at + Duration::seconds(1);
        assert!(
            state
                .keys()
                .validate_at(&issued.secret, just_after)
                .await
                .is_ok(),
            "ttl {} should validate right after issuance",
            ttl_days
        );

        // expired one second past the deadline, with no sweep involved
        let past_deadline = issued.record.expires_at + Duration::seconds(1);
        let result = state.keys().validate_at(&issued.secret, past_deadline).await;
        assert!(
            matches!(result, Err(CredentialError::Expired)),
            "ttl {} should expire",
            ttl_days
        );
    }
}

#[tokio::test]
async fn test_failed_validations_never_count_as_hits() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let issued = state
        .keys()
        .issue(&owner, "test-app", 7, None)
        .await
        .unwrap();

    let past_deadline = issued.record.expires_at + Duration::seconds(1);
    for _ in 0..5 {
        let result = state.keys().validate_at(&issued.secret, past_deadline).await;
        assert!(matches!(result, Err(CredentialError::Expired)));
    }

    let key = state
        .database()
        .get_key(&issued.record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(key.hit_count, 0);
}

#[tokio::test]
async fn test_revocation_is_immediate_and_scoped() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();
    let stranger = common::user();

    let issued = state
        .keys()
        .issue(&owner, "test-app", 30, None)
        .await
        .unwrap();

    // a stranger may not revoke it
    let result = state.keys().revoke(&stranger, &issued.record.id).await;
    assert!(matches!(result, Err(KeyRegistryError::Forbidden { .. })));

    // the owner may, and the key dies immediately
    state.keys().revoke(&owner, &issued.record.id).await.unwrap();
    let result = state.keys().validate(&issued.secret).await;
    assert!(matches!(result, Err(CredentialError::Revoked)));
}

#[tokio::test]
async fn test_owner_scoped_issuance_with_admin_override() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();
    let other = common::user();

    // a user may not issue for someone else
    let result = state
        .keys()
        .issue(&owner, "sneaky", 30, Some(other.id))
        .await;
    assert!(matches!(result, Err(KeyRegistryError::Forbidden { .. })));

    // an admin may
    let issued = state
        .keys()
        .issue(&common::admin(), "delegated", 30, Some(other.id))
        .await
        .unwrap();
    assert_eq!(issued.record.owner_id, other.id);

    let principal = state.keys().validate(&issued.secret).await.unwrap();
    assert_eq!(principal.id, other.id);
}

#[tokio::test]
async fn test_listing_shows_fingerprints_never_secrets() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let issued = state
        .keys()
        .issue(&owner, "test-app", 30, None)
        .await
        .unwrap();

    let keys = state.keys().list(&owner).await.unwrap();
    assert_eq!(keys.len(), 1);
    let fingerprint = keys[0].fingerprint();
    assert_eq!(fingerprint.len(), 8);
    assert!(!issued.secret.contains(&fingerprint));

    // another user's listing is empty; an admin sees everything
    assert!(state.keys().list(&common::user()).await.unwrap().is_empty());
    assert_eq!(state.keys().list(&common::admin()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejects_non_positive_ttl() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    for ttl in [0i64, -7] {
        let result = state.keys().issue(&owner, "bad-ttl", ttl, None).await;
        assert!(matches!(result, Err(KeyRegistryError::InvalidTtl(_))));
    }
}

#[tokio::test]
async fn test_concurrent_validations_count_exactly() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let issued = state
        .keys()
        .issue(&owner, "hot-key", 30, None)
        .await
        .unwrap();

    const N: usize = 16;
    let mut handles = Vec::new();
    for _ in 0..N {
        let keys = state.keys().clone();
        let secret = issued.secret.clone();
        handles.push(tokio::spawn(async move {
            keys.validate(&secret).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let key = state
        .database()
        .get_key(&issued.record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(key.hit_count as usize, N);
}

#[tokio::test]
async fn test_validate_is_keyed_by_digest_not_id() {
    let (state, _, _temp) = common::setup_test_env().await;
    let owner = common::user();

    let issued = state
        .keys()
        .issue(&owner, "test-app", 30, None)
        .await
        .unwrap();

    // presenting the key id (a guessable shape) is worthless
    let result = state
        .keys()
        .validate(&issued.record.id.to_string())
        .await;
    assert!(matches!(result, Err(CredentialError::Invalid)));

    // so is presenting the stored digest itself
    let result = state.keys().validate(&issued.record.secret_digest).await;
    assert!(matches!(result, Err(CredentialError::Invalid)));
}
