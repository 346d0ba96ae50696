// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, B256, U256};
use anyhow::Result;
use dfb_test_helpers::{
    business_data, EncryptCall, MockFeedbackContract, MockFheEngine, MOCK_CONTRACT_ADDRESS,
    MOCK_SIGNER_ADDRESS,
};
use dfb_workflow::{
    FeedbackState, FeedbackWorkflow, LocalSession, Rating, RecordId, SubmitFeedback,
    TransactionStatus, WorkflowError,
};
use std::collections::HashSet;
use tracing_test::traced_test;

type TestWorkflow =
    FeedbackWorkflow<MockFeedbackContract, MockFeedbackContract, MockFheEngine, LocalSession>;

struct Harness {
    workflow: TestWorkflow,
    contract: MockFeedbackContract,
    engine: MockFheEngine,
    state: FeedbackState,
}

fn harness(session: LocalSession) -> Harness {
    let contract = MockFeedbackContract::new();
    let engine = MockFheEngine::new();
    let workflow = FeedbackWorkflow::new(
        contract.clone(),
        Some(contract.clone()),
        engine.clone(),
        session,
    );
    Harness {
        workflow,
        contract,
        engine,
        state: FeedbackState::default(),
    }
}

fn connected() -> Harness {
    harness(LocalSession::connected(MOCK_SIGNER_ADDRESS))
}

fn feedback(name: &str, score: u32) -> SubmitFeedback {
    SubmitFeedback {
        partner_name: name.to_string(),
        score,
        tags: "Coffee, Long walk".to_string(),
        public_value1: 0,
        public_value2: 0,
    }
}

/// Seed an unverified record whose ciphertext decrypts to `value`
fn seed(h: &Harness, id: &str, creator: Address, value: u32) {
    let handle = B256::repeat_byte(value as u8 + 1);
    h.contract
        .insert(id, business_data("Robin", u64::from(value), creator), handle);
    h.engine.register(handle, value);
}

fn banner(state: &FeedbackState) -> (TransactionStatus, String) {
    let banner = state.banner().expect("banner should be visible");
    (banner.status, banner.message.clone())
}

#[tokio::test]
async fn test_submit_requires_connected_wallet() {
    let mut h = harness(LocalSession::disconnected());

    let err = h
        .workflow
        .submit(&mut h.state, feedback("Alex", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::NotConnected));
    assert!(h.contract.calls().is_empty());
    assert!(h.engine.encrypt_calls().is_empty());
    assert_eq!(h.engine.init_calls(), 0);
    assert_eq!(
        banner(&h.state),
        (TransactionStatus::Error, "Please connect wallet first".to_string())
    );
}

#[tokio::test]
async fn test_submit_without_signer_is_not_connected() {
    let contract = MockFeedbackContract::new();
    let workflow = FeedbackWorkflow::new(
        contract.clone(),
        None::<MockFeedbackContract>,
        MockFheEngine::new(),
        LocalSession::connected(MOCK_SIGNER_ADDRESS),
    );
    let mut state = FeedbackState::default();

    let err = workflow
        .submit(&mut state, feedback("Alex", 8))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotConnected));
    assert!(contract.calls().is_empty());
}

#[tokio::test]
async fn test_submit_creates_record_and_reloads() -> Result<()> {
    let mut h = connected();

    let submitted = h.workflow.submit(&mut h.state, feedback("Alex", 8)).await?;

    assert!(submitted.id.as_str().starts_with("feedback-"));
    assert!(submitted.block_number.is_some());
    assert_eq!(
        h.engine.encrypt_calls(),
        vec![EncryptCall {
            contract: MOCK_CONTRACT_ADDRESS,
            user: MOCK_SIGNER_ADDRESS,
            value: 8,
        }]
    );

    let stored = h.contract.record(submitted.id.as_str()).unwrap();
    assert_eq!(stored.name, "Alex");
    assert_eq!(stored.description, "Coffee, Long walk");
    assert!(!stored.is_verified);
    // Only the ciphertext carries the score
    assert_eq!(stored.public_value1, U256::ZERO);

    let record = h.state.find(&submitted.id).unwrap();
    assert_eq!(record.rating, Rating::Encrypted);
    assert_eq!(h.state.user_history().len(), 1);
    assert_eq!(h.state.stats().total, 1);
    assert_eq!(
        banner(&h.state),
        (TransactionStatus::Success, "Feedback submitted successfully!".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_submit_initializes_engine_once() -> Result<()> {
    let mut h = connected();

    h.workflow.submit(&mut h.state, feedback("Alex", 8)).await?;
    h.workflow.submit(&mut h.state, feedback("Blake", 3)).await?;

    assert_eq!(h.engine.init_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_submitted_ids_are_unique() -> Result<()> {
    let mut h = connected();

    let mut ids = HashSet::new();
    for score in 1..=10 {
        let submitted = h
            .workflow
            .submit(&mut h.state, feedback("Alex", score))
            .await?;
        ids.insert(submitted.id);
    }

    assert_eq!(ids.len(), 10);
    assert_eq!(h.state.records().len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_submit_rejects_blank_partner() {
    let mut h = connected();

    let err = h
        .workflow
        .submit(&mut h.state, feedback("   ", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::InvalidInput(_)));
    assert!(h.contract.calls().is_empty());
}

#[tokio::test]
async fn test_user_rejection_is_distinct() {
    let mut h = connected();
    h.contract.reject_writes(true);

    let err = h
        .workflow
        .submit(&mut h.state, feedback("Alex", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::UserRejected));
    assert!(h.contract.ids().is_empty());
    assert_eq!(
        banner(&h.state),
        (TransactionStatus::Error, "Transaction rejected by user".to_string())
    );
}

#[tokio::test]
async fn test_reverted_submission_is_transaction_error() {
    let mut h = connected();
    h.contract.revert_next_confirmation();

    let err = h
        .workflow
        .submit(&mut h.state, feedback("Alex", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Transaction(_)));
    assert!(h.contract.ids().is_empty());
    assert_eq!(banner(&h.state).1, "Submission failed");
}

#[tokio::test]
async fn test_encryption_failure_skips_write() {
    let mut h = connected();
    h.engine.fail_encrypt(true);

    let err = h
        .workflow
        .submit(&mut h.state, feedback("Alex", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Encryption(_)));
    assert_eq!(h.contract.write_count(), 0);
    assert_eq!(banner(&h.state).1, "Encryption failed");
}

#[tokio::test]
async fn test_engine_initialization_failure() {
    let mut h = connected();
    h.engine.fail_init(true);

    let err = h
        .workflow
        .submit(&mut h.state, feedback("Alex", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Encryption(_)));
    assert!(h.engine.encrypt_calls().is_empty());
    assert_eq!(banner(&h.state).1, "FHE initialization failed");
}

#[tokio::test]
async fn test_engine_initialization_failure_during_verify() {
    let mut h = connected();
    seed(&h, "feedback-a", Address::repeat_byte(2), 4);
    h.engine.fail_init(true);

    let err = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-a"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Decryption(msg) if msg.contains("key service unreachable")));
    assert_eq!(h.engine.decrypt_calls(), 0);
    assert_eq!(h.contract.write_count(), 0);
    assert_eq!(
        banner(&h.state),
        (
            TransactionStatus::Error,
            "Decryption failed: FHE gateway error: key service unreachable".to_string()
        )
    );
}

#[tokio::test]
async fn test_initialize_engine_waits_for_connection() -> Result<()> {
    let mut h = harness(LocalSession::disconnected());
    h.workflow.initialize_engine(&mut h.state).await?;
    assert_eq!(h.engine.init_calls(), 0);

    let mut h = connected();
    h.workflow.initialize_engine(&mut h.state).await?;
    h.workflow.initialize_engine(&mut h.state).await?;
    assert_eq!(h.engine.init_calls(), 1);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_refresh_skips_records_that_fail() -> Result<()> {
    let mut h = connected();
    seed(&h, "feedback-a", MOCK_SIGNER_ADDRESS, 6);
    seed(&h, "feedback-b", Address::repeat_byte(2), 9);
    seed(&h, "feedback-c", Address::repeat_byte(3), 7);
    h.contract.fail_record("feedback-b");

    let report = h.workflow.refresh(&mut h.state).await?;

    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped, vec![RecordId::from("feedback-b")]);
    let ids: Vec<_> = h.state.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["feedback-a", "feedback-c"]);
    assert_eq!(h.state.stats().total, 2);
    assert_eq!(h.state.stats().average_score, 6.5);
    assert!(logs_contain("Skipping record that failed to load"));
    Ok(())
}

#[tokio::test]
async fn test_refresh_listing_failure_keeps_previous_records() -> Result<()> {
    let mut h = connected();
    seed(&h, "feedback-a", MOCK_SIGNER_ADDRESS, 6);
    h.workflow.refresh(&mut h.state).await?;
    assert_eq!(h.state.records().len(), 1);

    h.contract.fail_listing(true);
    let err = h.workflow.refresh(&mut h.state).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Load(_)));
    assert_eq!(h.state.records().len(), 1);
    assert_eq!(h.state.user_history().len(), 1);
    assert_eq!(
        banner(&h.state),
        (TransactionStatus::Error, "Failed to load data".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_user_history_matches_active_address() -> Result<()> {
    let mut h = connected();
    seed(&h, "feedback-a", MOCK_SIGNER_ADDRESS, 6);
    seed(&h, "feedback-b", Address::repeat_byte(2), 9);
    seed(&h, "feedback-c", MOCK_SIGNER_ADDRESS, 7);

    h.workflow.refresh(&mut h.state).await?;

    let history: Vec<_> = h
        .state
        .user_history()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(history, vec!["feedback-a", "feedback-c"]);
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_wallet_has_no_history() -> Result<()> {
    let mut h = harness(LocalSession::disconnected());
    seed(&h, "feedback-a", MOCK_SIGNER_ADDRESS, 6);

    h.workflow.refresh(&mut h.state).await?;

    assert_eq!(h.state.records().len(), 1);
    assert!(h.state.user_history().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_verify_reveals_value() -> Result<()> {
    let mut h = connected();
    seed(&h, "feedback-a", Address::repeat_byte(2), 7);
    let id = RecordId::from("feedback-a");

    let verification = h.workflow.verify(&mut h.state, &id).await?;

    assert_eq!(verification.value, 7);
    assert!(!verification.already_verified);
    let stored = h.contract.record("feedback-a").unwrap();
    assert!(stored.is_verified);
    assert_eq!(stored.decrypted_value, 7);
    assert_eq!(h.state.find(&id).unwrap().rating, Rating::Verified(7));
    assert_eq!(h.state.stats().verified, 1);
    assert_eq!(
        banner(&h.state),
        (
            TransactionStatus::Success,
            "Data decrypted and verified successfully!".to_string()
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_verify_short_circuits_when_already_verified() -> Result<()> {
    let mut h = connected();
    let mut data = business_data("Robin", 5, Address::repeat_byte(2));
    data.is_verified = true;
    data.decrypted_value = 9;
    h.contract.insert("feedback-a", data, B256::repeat_byte(1));

    let verification = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-a"))
        .await?;

    assert_eq!(verification.value, 9);
    assert!(verification.already_verified);
    assert_eq!(h.contract.calls(), vec!["getBusinessData".to_string()]);
    assert_eq!(h.engine.decrypt_calls(), 0);
    assert_eq!(
        banner(&h.state),
        (TransactionStatus::Success, "Data already verified on-chain".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_verify_is_idempotent() -> Result<()> {
    let mut h = connected();
    seed(&h, "feedback-a", Address::repeat_byte(2), 4);
    let id = RecordId::from("feedback-a");

    let first = h.workflow.verify(&mut h.state, &id).await?;
    let second = h.workflow.verify(&mut h.state, &id).await?;

    assert_eq!(first.value, second.value);
    assert!(!first.already_verified);
    assert!(second.already_verified);
    assert_eq!(h.contract.write_count(), 1);
    assert_eq!(h.engine.decrypt_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_verify_race_reports_stored_value() -> Result<()> {
    let mut h = connected();
    seed(&h, "feedback-a", Address::repeat_byte(2), 4);
    h.contract.verify_elsewhere_before_write(4);

    let verification = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-a"))
        .await?;

    assert_eq!(verification.value, 4);
    assert!(verification.already_verified);
    assert_eq!(
        h.state.find(&RecordId::from("feedback-a")).unwrap().rating,
        Rating::Verified(4)
    );
    assert_eq!(banner(&h.state).0, TransactionStatus::Success);
    Ok(())
}

#[tokio::test]
async fn test_verify_requires_connected_wallet() {
    let mut h = harness(LocalSession::disconnected());
    seed(&h, "feedback-a", Address::repeat_byte(2), 4);

    let err = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-a"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::NotConnected));
    assert!(h.contract.calls().is_empty());
    assert_eq!(h.engine.decrypt_calls(), 0);
}

#[tokio::test]
async fn test_decryption_failure_leaves_record_pending() {
    let mut h = connected();
    seed(&h, "feedback-a", Address::repeat_byte(2), 4);
    h.engine.fail_decrypt(true);

    let err = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-a"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Decryption(_)));
    assert!(!h.contract.record("feedback-a").unwrap().is_verified);
    assert_eq!(h.contract.write_count(), 0);
    assert_eq!(
        banner(&h.state),
        (
            TransactionStatus::Error,
            "Decryption failed: FHE gateway error: relayer timeout".to_string()
        )
    );
}

#[tokio::test]
async fn test_rejected_verification_is_decryption_error() {
    let mut h = connected();
    seed(&h, "feedback-a", Address::repeat_byte(2), 4);
    h.contract.reject_writes(true);

    let err = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-a"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Decryption(_)));
    assert!(!h.contract.record("feedback-a").unwrap().is_verified);
}

#[tokio::test]
async fn test_verify_unknown_record() {
    let mut h = connected();

    let err = h
        .workflow
        .verify(&mut h.state, &RecordId::from("feedback-missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Decryption(msg) if msg.contains("not found")));
}

#[tokio::test]
async fn test_probe_availability() -> Result<()> {
    let mut h = harness(LocalSession::disconnected());

    assert!(h.workflow.probe_availability(&mut h.state).await?);
    assert_eq!(
        banner(&h.state),
        (TransactionStatus::Success, "Contract is available!".to_string())
    );

    h.contract.set_available(false);
    assert!(!h.workflow.probe_availability(&mut h.state).await?);
    assert_eq!(banner(&h.state).0, TransactionStatus::Error);
    Ok(())
}
