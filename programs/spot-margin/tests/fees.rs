mod common;

use anchor_lang::prelude::*;
use common::*;
use spot_margin::{constants::WAD, Asset, ErrorKind, MarginError};

fn with_open_borrow() -> Host {
    let mut host = Host::new();
    host.batch(
        ALICE,
        &[deposit(Asset::Token1, 1_000 * WAD), borrow(100 * WAD)],
    )
    .unwrap();
    host
}

#[test]
fn test_fees_are_handed_to_liquidity_manager() {
    let mut host = with_open_borrow();
    host.advance(30 * DAY);

    assert!(host.trigger_fees(REINVESTOR).unwrap());

    assert_eq!(host.engine.accumulated_fees(POOL).unwrap(), 0);
    assert_eq!(host.mocks.liquidity.reinvested.len(), 1);
    assert!(host.mocks.liquidity.reinvested[0] > 0);
    assert_eq!(host.pool().last_accrual_timestamp, host.now);
}

#[test]
fn test_second_trigger_is_a_successful_noop() {
    let mut host = with_open_borrow();
    host.advance(30 * DAY);

    assert!(host.trigger_fees(REINVESTOR).unwrap());
    assert_eq!(host.engine.accumulated_fees(POOL).unwrap(), 0);

    assert!(host.trigger_fees(REINVESTOR).unwrap());
    assert_eq!(host.engine.accumulated_fees(POOL).unwrap(), 0);
    assert_eq!(host.mocks.liquidity.reinvested.len(), 1);
}

#[test]
fn test_trigger_with_no_fees_skips_manager() {
    let mut host = Host::new();
    host.advance(DAY);
    assert!(host.trigger_fees(REINVESTOR).unwrap());
    assert!(host.mocks.liquidity.reinvested.is_empty());
}

#[test]
fn test_fees_accumulate_across_batches() {
    let mut host = with_open_borrow();
    host.advance(DAY);
    host.batch(ALICE, &[deposit(Asset::Token0, WAD)]).unwrap();
    let first = host.engine.accumulated_fees(POOL).unwrap();
    assert!(first > 0);

    host.advance(DAY);
    host.batch(ALICE, &[deposit(Asset::Token0, WAD)]).unwrap();
    assert!(host.engine.accumulated_fees(POOL).unwrap() > first);
}

#[test]
fn test_unauthorized_caller_is_rejected() {
    let mut host = with_open_borrow();
    host.advance(DAY);

    let err = host.trigger_fees(BOB).unwrap_err();
    assert_eq!(err, error!(MarginError::NotAuthorized));
    assert_eq!(MarginError::NotAuthorized.kind(), ErrorKind::Authorization);
    // No accrual happened either
    assert_eq!(host.pool().last_accrual_timestamp, START);
}

#[test]
fn test_unlinked_engine_reports_missing_manager() {
    let mut host = Host::bare();
    let err = host.trigger_fees(REINVESTOR).unwrap_err();
    assert_eq!(err, error!(MarginError::MarginContractNotSet));
    assert_eq!(
        MarginError::MarginContractNotSet.kind(),
        ErrorKind::MisconfiguredCollaborator
    );
}

#[test]
fn test_wrong_manager_is_rejected() {
    let mut host = Host::new();
    host.mocks.liquidity.key = Pubkey::new_from_array([77; 32]);
    let err = host.trigger_fees(REINVESTOR).unwrap_err();
    assert_eq!(err, error!(MarginError::MarginContractNotSet));
}

#[test]
fn test_failed_reinvestment_keeps_fees() {
    let mut host = with_open_borrow();
    host.advance(30 * DAY);
    let before = host.state_bytes(ALICE);

    host.mocks.liquidity.fail = true;
    assert!(host.trigger_fees(REINVESTOR).is_err());
    assert_eq!(host.state_bytes(ALICE), before);

    host.mocks.liquidity.fail = false;
    assert!(host.trigger_fees(REINVESTOR).unwrap());
    assert_eq!(host.mocks.liquidity.reinvested.len(), 1);
}

#[test]
fn test_revoked_reinvestor_loses_access() {
    let mut host = Host::new();
    host.mocks
        .config
        .remove_reinvestor(&ADMIN, REINVESTOR)
        .unwrap();
    let err = host.trigger_fees(REINVESTOR).unwrap_err();
    assert_eq!(err, error!(MarginError::NotAuthorized));
}
