// crates/weir-distribution/tests/distribution_flow.rs
//
// End-to-end tests for the revenue flow: deposits split across the vault
// registry, the escrow epoch log, and the treasury; weight holders and
// vault members then claim pro rata against the weight in effect when
// each deposit landed.
//
// These tests use the public APIs of the library crates directly, with the
// in-memory settlement asset and vault-stake oracle from weir-core and the
// real escrow ledger from weir-escrow as the weight oracle.

use weir_core::asset::{AssetTransfer, MemoryAsset};
use weir_core::auth::{AuthContext, Capability};
use weir_core::oracle::MemoryVaultStakes;
use weir_core::types::{AccountId, Amount};
use weir_distribution::registry::VaultDistributionRegistry;
use weir_distribution::splitter::{RevenueSplitter, SplitConfig};
use weir_escrow::boost::MAX_LOCK_SECS;
use weir_escrow::ledger::EscrowLedger;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ESCROW: AccountId = [0xEE; 32];
const SPLITTER: AccountId = [0xCC; 32];
const REGISTRY: AccountId = [0xDD; 32];
const TREASURY: AccountId = [0xBB; 32];

fn acct(n: u8) -> AccountId {
    [n; 32]
}

fn admin() -> AuthContext {
    AuthContext::with_capabilities(acct(9), &[Capability::RegisterVault])
}

struct Engine {
    asset: MemoryAsset,
    ledger: EscrowLedger,
    splitter: RevenueSplitter,
    registry: VaultDistributionRegistry,
    stakes: MemoryVaultStakes,
}

fn engine() -> Engine {
    Engine {
        asset: MemoryAsset::new(),
        ledger: EscrowLedger::new(ESCROW),
        splitter: RevenueSplitter::new(SPLITTER, TREASURY, SplitConfig::standard()).unwrap(),
        registry: VaultDistributionRegistry::new(REGISTRY),
        stakes: MemoryVaultStakes::new(),
    }
}

impl Engine {
    fn deposit(&mut self, caller: &AccountId, amount: Amount, now: u64) {
        self.splitter
            .deposit(
                &mut self.asset,
                &mut self.registry,
                &self.stakes,
                caller,
                amount,
                now,
            )
            .unwrap();
    }

    fn claim(&mut self, caller: &AccountId) -> Amount {
        self.splitter
            .claim_from_last(&mut self.asset, &self.ledger, caller)
            .unwrap()
            .amount
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn deposit_with_no_weight_leaves_escrow_share_unclaimable() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 1_000);

    engine.deposit(&acct(1), 1_000, 100);

    // The whole escrow share sits in one epoch
    assert_eq!(engine.splitter.epoch_count(), 1);
    assert_eq!(engine.splitter.epoch(0).unwrap().amount, 150);

    // A claim pays nothing but still advances the cursor past the epoch
    assert_eq!(engine.claim(&acct(2)), 0);
    assert_eq!(engine.splitter.cursor(&acct(2)), 1);

    // The share stays reachable in the splitter's account
    assert_eq!(engine.asset.balance_of(&SPLITTER), 150);
}

#[test]
fn sole_weight_holder_collects_the_full_escrow_share() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 1_000);
    engine.asset.mint(&acct(2), 1_000);

    // Vault 0 has one member with all its stake
    engine
        .registry
        .register_vault(&admin(), &acct(100), 10)
        .unwrap();
    engine.stakes.set_stake(0, &acct(3), 500, 50);

    // Account 2 locks 1000 for the maximum duration: weight 2000
    let weight = engine
        .ledger
        .lock(&mut engine.asset, &acct(2), 1_000, 100 + MAX_LOCK_SECS, 100)
        .unwrap();
    assert_eq!(weight, 2_000);

    engine.deposit(&acct(1), 1_000, 200);

    // 70% went to the registry and landed in vault 0's epoch
    assert_eq!(engine.registry.epoch(0, 0).unwrap().amount, 700);
    // 15% settled with the treasury immediately
    assert_eq!(engine.asset.balance_of(&TREASURY), 150);

    // The sole weight holder collects the full 15% escrow share
    assert_eq!(engine.claim(&acct(2)), 150);

    // The vault's sole member collects the full vault allocation
    let receipt = engine
        .registry
        .claim(&mut engine.asset, &engine.stakes, &acct(3), 0, u64::MAX)
        .unwrap();
    assert_eq!(receipt.amount, 700);

    // Every unit of the deposit is accounted for
    assert_eq!(
        engine.asset.balance_of(&TREASURY)
            + engine.asset.balance_of(&acct(2))
            + engine.asset.balance_of(&acct(3)),
        1_000
    );
}

#[test]
fn entitlement_follows_weight_at_deposit_time() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 2_000);
    engine.asset.mint(&acct(2), 1_000);
    engine.asset.mint(&acct(3), 3_000);

    // Account 2 locks early; account 3 locks between the two deposits
    engine
        .ledger
        .lock(&mut engine.asset, &acct(2), 1_000, 100 + MAX_LOCK_SECS, 100)
        .unwrap();
    engine.deposit(&acct(1), 1_000, 150_000);
    engine
        .ledger
        .lock(
            &mut engine.asset,
            &acct(3),
            3_000,
            200_000 + MAX_LOCK_SECS,
            200_000,
        )
        .unwrap();
    engine.deposit(&acct(1), 1_000, 250_000);

    // Epoch 0: account 2 held all 2000 weight. Epoch 1: 2000 of 8000.
    assert_eq!(engine.claim(&acct(2)), 150 + 150 * 2_000 / 8_000);
    // Account 3 had no weight at epoch 0, 6000 of 8000 at epoch 1
    assert_eq!(engine.claim(&acct(3)), 150 * 6_000 / 8_000);

    // Claimed amounts never exceed the escrow shares deposited
    let paid = engine.asset.balance_of(&acct(2)) + engine.asset.balance_of(&acct(3));
    assert!(paid <= 300);
    // Only floor-division dust remains unclaimed
    assert_eq!(engine.asset.balance_of(&SPLITTER), 300 - paid);
}

#[test]
fn repeated_claims_converge_and_never_double_pay() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 10_000);
    engine.asset.mint(&acct(2), 1_000);

    engine
        .ledger
        .lock(&mut engine.asset, &acct(2), 1_000, 100 + MAX_LOCK_SECS, 100)
        .unwrap();
    for i in 0..10u64 {
        engine.deposit(&acct(1), 1_000, 200 + i);
    }

    // First claim takes everything outstanding; later claims pay nothing
    assert_eq!(engine.claim(&acct(2)), 10 * 150);
    assert_eq!(engine.claim(&acct(2)), 0);
    assert_eq!(engine.claim(&acct(2)), 0);
    assert_eq!(engine.asset.balance_of(&acct(2)), 10 * 150);
}

#[test]
fn weight_gone_by_later_epochs_stops_earning() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 2_000);
    engine.asset.mint(&acct(2), 1_000);

    let unlock_at = 100 + MAX_LOCK_SECS;
    engine
        .ledger
        .lock(&mut engine.asset, &acct(2), 1_000, unlock_at, 100)
        .unwrap();
    engine.deposit(&acct(1), 1_000, 200);

    // The lock expires and is withdrawn; weight burns to zero
    engine
        .ledger
        .unlock(&mut engine.asset, &acct(2), unlock_at)
        .unwrap();
    engine.deposit(&acct(1), 1_000, unlock_at + 10);

    // Entitled to the first epoch only
    assert_eq!(engine.claim(&acct(2)), 150);
    // The second epoch's share is unclaimable but the cursor is past it
    assert_eq!(engine.splitter.cursor(&acct(2)), 2);
}

#[test]
fn bounded_scan_catches_up_in_batches() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 250_000);
    engine.asset.mint(&acct(2), 1_000);

    engine
        .ledger
        .lock(&mut engine.asset, &acct(2), 1_000, 100 + MAX_LOCK_SECS, 100)
        .unwrap();
    for i in 0..250u64 {
        engine.deposit(&acct(1), 1_000, 200 + i);
    }

    let first = engine
        .splitter
        .claim(&mut engine.asset, &engine.ledger, &acct(2), 0, 250)
        .unwrap();
    assert_eq!((first.from_epoch, first.to_epoch), (0, 100));
    assert_eq!(first.amount, 100 * 150);

    let second = engine
        .splitter
        .claim(&mut engine.asset, &engine.ledger, &acct(2), 0, 250)
        .unwrap();
    assert_eq!((second.from_epoch, second.to_epoch), (100, 200));

    let third = engine
        .splitter
        .claim(&mut engine.asset, &engine.ledger, &acct(2), 0, 250)
        .unwrap();
    assert_eq!((third.from_epoch, third.to_epoch), (200, 250));
    assert_eq!(engine.asset.balance_of(&acct(2)), 250 * 150);
}

#[test]
fn vault_members_claim_against_snapshot_denominators() {
    let mut engine = engine();
    engine.asset.mint(&acct(1), 1_000);

    engine
        .registry
        .register_vault(&admin(), &acct(100), 10)
        .unwrap();
    engine
        .registry
        .register_vault(&admin(), &acct(101), 10)
        .unwrap();
    // Vault 0 carries 300 of the 400 total stake, vault 1 the rest
    engine.stakes.set_stake(0, &acct(3), 200, 50);
    engine.stakes.set_stake(0, &acct(4), 100, 50);
    engine.stakes.set_stake(1, &acct(5), 100, 50);

    engine.deposit(&acct(1), 1_000, 200);

    // 700 split 3:1 between the vaults
    assert_eq!(engine.registry.epoch(0, 0).unwrap().amount, 525);
    assert_eq!(engine.registry.epoch(1, 0).unwrap().amount, 175);

    // Members split vault 0's allocation by their stake at the snapshot,
    // against the stored denominator
    let a = engine
        .registry
        .claim(&mut engine.asset, &engine.stakes, &acct(3), 0, u64::MAX)
        .unwrap();
    let b = engine
        .registry
        .claim(&mut engine.asset, &engine.stakes, &acct(4), 0, u64::MAX)
        .unwrap();
    assert_eq!(a.amount, 350);
    assert_eq!(b.amount, 175);

    // A member who staked after the snapshot gets nothing from it
    engine.stakes.set_stake(0, &acct(6), 1_000, 300);
    let late = engine
        .registry
        .claim(&mut engine.asset, &engine.stakes, &acct(6), 0, u64::MAX)
        .unwrap();
    assert_eq!(late.amount, 0);
    assert_eq!(engine.registry.cursor(&acct(6), 0), 1);
}
