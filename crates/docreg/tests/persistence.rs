//! State and the event log survive reopening a SQLite database.

use std::path::Path;
use std::time::Duration;

use docreg::core::{Keypair, MAX_NONCE};
use docreg::store::{SqliteStore, StoreError};
use docreg::{Call, Error, Registry, RegistryConfig, SignedCall, VerificationStatus};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn reopen(path: &Path, config: RegistryConfig) -> Registry<SqliteStore> {
    let store = SqliteStore::open(path).unwrap();
    Registry::load(store, config).await.unwrap()
}

#[tokio::test]
async fn test_reopen_restores_everything() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let admin = Keypair::from_seed(&[0x01; 32]);
    let owner = Keypair::from_seed(&[0x02; 32]);
    let verifier = Keypair::from_seed(&[0x03; 32]).identity();

    {
        let store = SqliteStore::open(&path).unwrap();
        let registry = Registry::initialize(admin.identity(), store, RegistryConfig::default())
            .await
            .unwrap();

        registry
            .add_verifier(&admin.identity(), &verifier)
            .await
            .unwrap();
        registry
            .register_document(&owner.identity(), "0xabc", "Deed")
            .await
            .unwrap();
        registry
            .register_document(&owner.identity(), "0xdef", "Scan")
            .await
            .unwrap();
        registry
            .verify_document(&verifier, "0xdef", false, "bad scan")
            .await
            .unwrap();

        let signed = SignedCall::sign(
            &owner,
            1,
            Call::RequestVerification {
                hash: "0xabc".into(),
            },
        )
        .unwrap();
        registry.submit(&signed).await.unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let registry = Registry::load(store, RegistryConfig::default())
        .await
        .unwrap();

    assert_eq!(registry.administrator().await, admin.identity());
    assert!(registry.is_verifier(&verifier).await);
    assert!(registry.is_verifier(&admin.identity()).await);
    assert_eq!(registry.document_count().await, 2);

    let abc = registry.get_document("0xabc").await;
    assert_eq!(abc.title, "Deed");
    assert_eq!(abc.status, VerificationStatus::Pending);

    let def = registry.get_document("0xdef").await;
    assert_eq!(def.status, VerificationStatus::Rejected);
    assert_eq!(def.rejection_reason, "bad scan");
    assert_eq!(def.verifiers, vec![verifier]);

    assert_eq!(registry.next_nonce(&owner.identity()).await, 2);
    assert_eq!(registry.events_since(0).await.unwrap().len(), 5);

    // Numbering continues after the reopen.
    registry
        .verify_document(&verifier, "0xabc", true, "")
        .await
        .unwrap();
    let tail = registry.events_since(5).await.unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].seq, 6);
}

#[tokio::test]
async fn test_initialize_existing_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let admin = Keypair::from_seed(&[0x01; 32]).identity();

    {
        let store = SqliteStore::open(&path).unwrap();
        Registry::initialize(admin, store, RegistryConfig::default())
            .await
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let err = Registry::initialize(admin, store, RegistryConfig::default())
        .await
        .err()
        .expect("second initialize must fail");
    assert!(matches!(err, Error::Store(StoreError::AlreadyInitialized)));
}

#[tokio::test]
async fn test_replay_after_reopen_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let admin = Keypair::from_seed(&[0x01; 32]);

    let signed = SignedCall::sign(
        &admin,
        1,
        Call::RegisterDocument {
            hash: "0xabc".into(),
            title: "T".into(),
        },
    )
    .unwrap();

    {
        let store = SqliteStore::open(&path).unwrap();
        let registry = Registry::initialize(admin.identity(), store, RegistryConfig::default())
            .await
            .unwrap();
        registry.submit(&signed).await.unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let registry = Registry::load(store, RegistryConfig::default())
        .await
        .unwrap();
    assert!(matches!(
        registry.submit(&signed).await,
        Err(Error::InvalidNonce {
            expected: 2,
            got: 1
        })
    ));
}

#[tokio::test]
async fn test_abandoned_call_keeps_store_and_memory_in_step() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let admin = Keypair::from_seed(&[0x01; 32]).identity();
    let owner = Keypair::from_seed(&[0x02; 32]).identity();

    {
        let store = SqliteStore::open(&path).unwrap();
        let registry = Registry::initialize(admin, store, RegistryConfig::default())
            .await
            .unwrap();
        let mut rx = registry.subscribe();

        // Poll the registration once, then stop waiting for it.
        let abandoned = tokio::time::timeout(
            Duration::ZERO,
            registry.register_document(&owner, "0x0", "T"),
        )
        .await;
        drop(abandoned);

        assert_eq!(rx.recv().await.unwrap().seq, 1);
        assert!(registry.get_document("0x0").await.exists);

        registry.register_document(&owner, "0x1", "T").await.unwrap();
        assert_eq!(registry.document_count().await, 2);
        assert_eq!(registry.events_since(0).await.unwrap().len(), 2);
    }

    let registry = reopen(&path, RegistryConfig::default()).await;
    assert_eq!(registry.document_count().await, 2);
    registry.register_document(&owner, "0x2", "T").await.unwrap();
    assert_eq!(registry.events_since(2).await.unwrap()[0].seq, 3);
}

#[tokio::test]
async fn test_highest_nonce_survives_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let config = RegistryConfig {
        require_sequential_nonces: false,
        ..RegistryConfig::default()
    };
    let admin = Keypair::from_seed(&[0x01; 32]);
    let extra = Keypair::from_seed(&[0x07; 32]).identity();
    let add = Call::AddVerifier { identity: extra };

    // Unrepresentable nonces are refused before anything is stored.
    let too_high = SignedCall::sign(&admin, u64::MAX, add.clone()).unwrap();
    let highest = SignedCall::sign(&admin, MAX_NONCE, add).unwrap();

    {
        let store = SqliteStore::open(&path).unwrap();
        let registry = Registry::initialize(admin.identity(), store, config.clone())
            .await
            .unwrap();

        assert!(matches!(
            registry.submit(&too_high).await,
            Err(Error::InvalidNonce { .. })
        ));
        assert!(!registry.is_verifier(&extra).await);

        registry.submit(&highest).await.unwrap();
        registry
            .remove_verifier(&admin.identity(), &extra)
            .await
            .unwrap();
    }

    let registry = reopen(&path, config).await;
    assert_eq!(registry.next_nonce(&admin.identity()).await, MAX_NONCE + 1);
    for envelope in [&highest, &too_high] {
        assert!(matches!(
            registry.submit(envelope).await,
            Err(Error::InvalidNonce { .. })
        ));
    }
    assert!(!registry.is_verifier(&extra).await);
}
