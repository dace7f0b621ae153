//! End-to-end registry workflows against the in-memory store.

use docreg::core::Keypair;
use docreg::store::MemoryStore;
use docreg::{
    canonicalize, DocumentRecord, Event, Identity, Registry, RegistryConfig, RegistryError,
    VerificationStatus,
};

struct Parties {
    admin: Identity,
    owner: Identity,
    verifier: Identity,
    outsider: Identity,
}

fn parties() -> Parties {
    Parties {
        admin: Keypair::from_seed(&[0x01; 32]).identity(),
        owner: Keypair::from_seed(&[0x02; 32]).identity(),
        verifier: Keypair::from_seed(&[0x03; 32]).identity(),
        outsider: Keypair::from_seed(&[0x04; 32]).identity(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn setup(p: &Parties) -> Registry<MemoryStore> {
    init_tracing();
    let registry = Registry::initialize(p.admin, MemoryStore::new(), RegistryConfig::default())
        .await
        .unwrap();
    registry.add_verifier(&p.admin, &p.verifier).await.unwrap();
    registry
}

fn rejection(result: docreg::Result<()>) -> RegistryError {
    result
        .unwrap_err()
        .rejection()
        .cloned()
        .expect("expected a registry rejection")
}

#[tokio::test]
async fn test_register_and_approve() {
    let p = parties();
    let registry = setup(&p).await;

    registry.register_document(&p.owner, "0xabc", "T").await.unwrap();
    registry.request_verification(&p.owner, "0xabc").await.unwrap();
    registry
        .verify_document(&p.verifier, "0xabc", true, "")
        .await
        .unwrap();

    let record = registry.get_document("0xabc").await;
    assert!(record.exists);
    assert_eq!(record.status, VerificationStatus::Approved);
    assert_eq!(record.verifiers, vec![p.verifier]);
    assert_eq!(record.rejection_reason, "");
    assert_eq!(record.owner, p.owner);

    assert_eq!(
        rejection(registry.verify_document(&p.verifier, "0xabc", false, "x").await),
        RegistryError::VerificationCompleted
    );
    assert_eq!(registry.get_document("0xabc").await, record);
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let p = parties();
    let registry = setup(&p).await;
    registry.register_document(&p.owner, "0xdef", "T").await.unwrap();

    assert_eq!(
        rejection(registry.verify_document(&p.verifier, "0xdef", false, "").await),
        RegistryError::RejectionReasonRequired
    );
    assert_eq!(
        registry.get_document("0xdef").await.status,
        VerificationStatus::Pending
    );

    registry
        .verify_document(&p.verifier, "0xdef", false, "bad scan")
        .await
        .unwrap();
    let record = registry.get_document("0xdef").await;
    assert_eq!(record.status, VerificationStatus::Rejected);
    assert_eq!(record.rejection_reason, "bad scan");
}

#[tokio::test]
async fn test_blank_reason_is_kept_verbatim() {
    let p = parties();
    let registry = setup(&p).await;
    registry.register_document(&p.owner, "0xdef", "T").await.unwrap();

    registry
        .verify_document(&p.verifier, "0xdef", false, " ")
        .await
        .unwrap();
    let record = registry.get_document("0xdef").await;
    assert_eq!(record.status, VerificationStatus::Rejected);
    assert_eq!(record.rejection_reason, " ");
}

#[tokio::test]
async fn test_duplicate_registration() {
    let p = parties();
    let registry = setup(&p).await;
    registry
        .register_document(&p.owner, "0xabcdef1234567890", "Test Document")
        .await
        .unwrap();

    assert_eq!(
        rejection(
            registry
                .register_document(&p.outsider, "0xabcdef1234567890", "Other")
                .await
        ),
        RegistryError::DocumentAlreadyRegistered(canonicalize("0xabcdef1234567890"))
    );
    assert_eq!(
        registry.get_document("0xabcdef1234567890").await.owner,
        p.owner
    );
}

#[tokio::test]
async fn test_empty_hash() {
    let p = parties();
    let registry = setup(&p).await;
    assert_eq!(
        rejection(registry.register_document(&p.owner, "", "T").await),
        RegistryError::EmptyHash
    );
    assert_eq!(registry.document_count().await, 0);
}

#[tokio::test]
async fn test_unregistered_read_is_zero_record() {
    let p = parties();
    let registry = setup(&p).await;
    assert_eq!(registry.get_document("0xmissing").await, DocumentRecord::absent());
}

#[tokio::test]
async fn test_only_owner_requests() {
    let p = parties();
    let registry = setup(&p).await;
    registry.register_document(&p.owner, "0xabc", "T").await.unwrap();

    assert_eq!(
        rejection(registry.request_verification(&p.outsider, "0xabc").await),
        RegistryError::OnlyOwnerCanRequest
    );
    assert_eq!(
        rejection(registry.request_verification(&p.owner, "0xother").await),
        RegistryError::DocumentDoesNotExist(canonicalize("0xother"))
    );
}

#[tokio::test]
async fn test_request_is_notification_only() {
    let p = parties();
    let registry = setup(&p).await;
    registry.register_document(&p.owner, "0xabc", "T").await.unwrap();
    let before = registry.get_document("0xabc").await;

    let mut rx = registry.subscribe();
    registry.request_verification(&p.owner, "0xabc").await.unwrap();
    registry.request_verification(&p.owner, "0xabc").await.unwrap();

    assert_eq!(registry.get_document("0xabc").await, before);
    for _ in 0..2 {
        assert_eq!(
            rx.recv().await.unwrap().event,
            Event::VerificationRequested {
                fingerprint: canonicalize("0xabc"),
                owner: p.owner,
            }
        );
    }
}

#[tokio::test]
async fn test_check_precedence() {
    let p = parties();
    let registry = setup(&p).await;

    // Missing document outranks a missing role.
    assert_eq!(
        rejection(registry.verify_document(&p.outsider, "0xabc", false, "").await),
        RegistryError::DocumentDoesNotExist(canonicalize("0xabc"))
    );

    registry.register_document(&p.owner, "0xabc", "T").await.unwrap();
    registry
        .verify_document(&p.verifier, "0xabc", true, "")
        .await
        .unwrap();

    // Missing role outranks a completed verification.
    assert_eq!(
        rejection(registry.verify_document(&p.outsider, "0xabc", true, "").await),
        RegistryError::NotAuthorizedVerifier
    );
    // Completed verification outranks a missing reason.
    assert_eq!(
        rejection(registry.verify_document(&p.verifier, "0xabc", false, "").await),
        RegistryError::VerificationCompleted
    );
}

#[tokio::test]
async fn test_verifier_management() {
    let p = parties();
    let registry = setup(&p).await;

    assert!(registry.is_verifier(&p.verifier).await);
    assert_eq!(
        rejection(registry.add_verifier(&p.verifier, &p.outsider).await),
        RegistryError::NotAuthorized
    );
    assert_eq!(
        rejection(registry.add_verifier(&p.admin, &p.verifier).await),
        RegistryError::AlreadyVerifier(p.verifier)
    );
    assert_eq!(
        rejection(registry.remove_verifier(&p.admin, &p.outsider).await),
        RegistryError::NotVerifier(p.outsider)
    );

    registry.remove_verifier(&p.admin, &p.admin).await.unwrap();
    assert_eq!(registry.verifiers().await, vec![p.verifier]);
    assert_eq!(
        rejection(registry.remove_verifier(&p.admin, &p.verifier).await),
        RegistryError::CannotRemoveLastVerifier
    );
    assert_eq!(registry.verifier_count().await, 1);
    assert_eq!(registry.administrator().await, p.admin);

    // A removed verifier can no longer decide.
    registry.add_verifier(&p.admin, &p.outsider).await.unwrap();
    registry.remove_verifier(&p.admin, &p.verifier).await.unwrap();
    registry.register_document(&p.owner, "0xabc", "T").await.unwrap();
    assert_eq!(
        rejection(registry.verify_document(&p.verifier, "0xabc", true, "").await),
        RegistryError::NotAuthorizedVerifier
    );
    registry
        .verify_document(&p.outsider, "0xabc", true, "")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_documents_by_owner() {
    let p = parties();
    let registry = setup(&p).await;
    registry.register_document(&p.owner, "0x1", "one").await.unwrap();
    registry.register_document(&p.outsider, "0x2", "two").await.unwrap();
    registry.register_document(&p.owner, "0x3", "three").await.unwrap();

    let titles: Vec<String> = registry
        .documents_by_owner(&p.owner)
        .await
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"one".to_string()));
    assert!(titles.contains(&"three".to_string()));
    assert_eq!(registry.document_count().await, 3);
}

#[tokio::test]
async fn test_event_log_order() {
    let p = parties();
    let registry = setup(&p).await;
    registry.register_document(&p.owner, "0xabc", "T").await.unwrap();
    registry.request_verification(&p.owner, "0xabc").await.unwrap();
    let _ = registry.verify_document(&p.outsider, "0xabc", true, "").await;
    registry
        .verify_document(&p.verifier, "0xabc", false, "blurry")
        .await
        .unwrap();

    let events = registry.events_since(0).await.unwrap();
    let names: Vec<&str> = events.iter().map(|e| e.event.name()).collect();
    assert_eq!(
        names,
        vec![
            "VerifierAdded",
            "DocumentRegistered",
            "VerificationRequested",
            "DocumentVerified",
        ]
    );
    let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);

    assert_eq!(registry.events_since(3).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_load_empty_store_fails() {
    let err = Registry::load(MemoryStore::new(), RegistryConfig::default())
        .await
        .err()
        .expect("empty store must not load");
    assert!(matches!(
        err,
        docreg::Error::Store(docreg::store::StoreError::NotInitialized)
    ));
}
