use clawnet_core::constants::ENVELOPE_VERSION;
use clawnet_core::envelope::Envelope;
use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Address, Ed25519PublicKey, Timestamp};
use clawnet_crypto::verify_signature;

use clawnet_contracts::types::MilestoneStatus;
use clawnet_dao::types::VotingInputs;

use tracing::info;

use crate::db::StateDb;
use crate::resource::{contract_id_of, proposal_id_of, resource_id_for};

/// The state transition engine: validates and applies one envelope at a
/// time against a [`StateDb`], per the six-step pipeline of §4.1.
///
/// Out-of-order delivery is handled one layer up, by [`crate::buffer::OutOfOrderBuffer`] —
/// this type only ever sees envelopes presented in the order they are to be
/// applied, and fails closed (`NonceOutOfOrder` / `ResourcePrevMismatch`) on
/// anything else.
pub struct StateEngine {
    db: StateDb,
}

impl StateEngine {
    pub fn new(db: StateDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &StateDb {
        &self.db
    }

    /// Validate `envelope` against current state and, if every step
    /// passes, apply it. Re-delivery of an envelope whose hash has already
    /// been applied is a no-op success (§4.1 "duplicate handling").
    pub fn validate_and_apply(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        if envelope.v != ENVELOPE_VERSION {
            return Err(ClawNetError::UnsupportedVersion(envelope.v));
        }

        if self.db.has_envelope(&envelope.hash)? {
            return Ok(());
        }

        // 1. Schema — resolving the resource a payload addresses doubles as
        //    its structural validation; a payload missing a required field
        //    fails here as `SchemaInvalid` before any crypto is checked.
        let family = envelope.type_family();
        let resource_id = resource_id_for(&envelope.event_type, &envelope.issuer, &envelope.payload)?;

        // 2. Canonical hash.
        envelope.verify_hash()?;

        // 3. Signature, against the issuer's current authentication key.
        //    `identity.create` is self-certifying: there is no stored
        //    document yet, so the key is taken from the DID itself.
        let existing_document = self.db.get_identity_document(&envelope.issuer)?;
        let auth_key: Ed25519PublicKey = match (&existing_document, envelope.event_type.as_str()) {
            (Some(doc), _) => doc.auth_key,
            (None, "identity.create") => {
                let raw = clawnet_core::types::ed25519_pub_from_did(&envelope.issuer)
                    .map_err(|_| ClawNetError::UnknownIssuer(envelope.issuer.to_string()))?;
                Ed25519PublicKey(raw)
            }
            (None, _) => return Err(ClawNetError::UnknownIssuer(envelope.issuer.to_string())),
        };
        let signing_bytes = envelope.signing_bytes()?;
        verify_signature(&auth_key, &signing_bytes, &envelope.sig).map_err(|_| ClawNetError::BadSignature)?;

        // 4. Nonce — strictly increasing per (issuer, type-family).
        let expected = self.db.last_nonce(&envelope.issuer, family)?.map(|n| n + 1).unwrap_or(1);
        if envelope.nonce != expected {
            return Err(ClawNetError::NonceOutOfOrder {
                issuer: envelope.issuer.to_string(),
                family: family.to_string(),
                expected,
                got: envelope.nonce,
            });
        }

        // 5. Resource chain — `resourcePrev` must match the resource's
        //    current head, or be absent if the resource has never been
        //    touched. Independent resources never contend with each other;
        //    two envelopes racing for the same resource's head mean the
        //    loser must rebase (see module docs on the buffer).
        if let Some(resource_id) = &resource_id {
            let head = self.db.resource_head(resource_id)?;
            if head != envelope.resource_prev {
                return Err(ClawNetError::ResourcePrevMismatch {
                    resource: resource_id.clone(),
                    expected: head.map(|h| h.to_hex()).unwrap_or_default(),
                    got: envelope.resource_prev.map(|h| h.to_hex()).unwrap_or_default(),
                });
            }
        }

        // 6. Reducer-specific preconditions — dispatch into the subsystem.
        self.dispatch(family, envelope, now)?;

        // ── Commit ────────────────────────────────────────────────────────
        // Every mutation above either returned early with no write, or ran
        // to completion — each reducer only calls `store.put_*` after its
        // own preconditions pass, so there is nothing to roll back here.
        self.db.set_last_nonce(&envelope.issuer, family, envelope.nonce)?;
        if let Some(resource_id) = &resource_id {
            self.db.set_resource_head(resource_id, envelope.hash)?;
        }
        self.db.mark_envelope_applied(&envelope.hash)?;

        info!(event = %envelope.event_type, issuer = %envelope.issuer, hash = %envelope.hash, "applied envelope");
        Ok(())
    }

    fn dispatch(&mut self, family: &str, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        match family {
            "identity" => self.dispatch_identity(envelope, now),
            "wallet" => self.dispatch_wallet(envelope, now),
            "market" => self.dispatch_markets(envelope, now),
            "contract" => self.dispatch_contracts(envelope, now),
            "reputation" => self.dispatch_reputation(envelope, now),
            "dao" => self.dispatch_dao(envelope, now),
            other => Err(ClawNetError::UnknownEventType(other.to_string())),
        }
    }

    // ── Identity ─────────────────────────────────────────────────────────────

    fn dispatch_identity(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        let event = clawnet_identity::parse_payload(&envelope.event_type, &envelope.payload)?;
        clawnet_identity::apply(&event, &envelope.issuer, now, &mut self.db)
    }

    // ── Wallet ───────────────────────────────────────────────────────────────

    fn milestone_approved_closure(&self) -> impl Fn(&str, &str) -> bool {
        let db = self.db.clone();
        move |contract_id: &str, milestone_id: &str| -> bool {
            db.get_contract(contract_id)
                .ok()
                .flatten()
                .and_then(|c| c.milestone(milestone_id).cloned())
                .map(|m| m.status == MilestoneStatus::Approved)
                .unwrap_or(false)
        }
    }

    fn dispatch_wallet(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        let event = clawnet_wallet::parse_payload(&envelope.event_type, &envelope.payload)?;
        let from = Address::from_did(&envelope.issuer)
            .map_err(|_| ClawNetError::UnknownIssuer(envelope.issuer.to_string()))?;
        let milestone_approved = self.milestone_approved_closure();
        clawnet_wallet::apply(&event, &from, now, &milestone_approved, &mut self.db)
    }

    // ── Markets ──────────────────────────────────────────────────────────────

    fn dispatch_markets(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        let event = clawnet_markets::parse_payload(&envelope.event_type, &envelope.payload)?;
        let effects = clawnet_markets::apply(&event, &envelope.issuer, now, envelope.hash, &mut self.db)?;

        for effect in effects {
            match effect {
                clawnet_markets::MarketsEffect::CreateContractForBid {
                    contract_id,
                    order_id,
                    listing_id,
                    client,
                    provider,
                    total,
                } => {
                    self.create_bid_contract(contract_id, client.clone(), provider.clone(), total, now)?;
                    self.create_bid_order(order_id, listing_id, client, provider, total, now)?;
                }
                clawnet_markets::MarketsEffect::EmitWalletTransfer { from, to, amount } => {
                    self.internal_transfer(&from, &to, amount, now)?;
                }
                clawnet_markets::MarketsEffect::EmitReputationRecord {
                    target,
                    dimension,
                    score,
                    reference,
                } => {
                    self.emit_reputation_record(&envelope.issuer, &target, &dimension, score, &reference, now)?;
                }
            }
        }
        Ok(())
    }

    /// A bid acceptance creates the underlying service contract in
    /// `pending_signature` before the order that references it (§4.4) —
    /// the contract itself still needs both parties' `contract.sign`
    /// envelopes before it can be funded and activated.
    fn create_bid_contract(
        &mut self,
        contract_id: String,
        client: clawnet_core::types::Did,
        provider: clawnet_core::types::Did,
        total: clawnet_core::types::Balance,
        now: Timestamp,
    ) -> Result<(), ClawNetError> {
        use clawnet_contracts::types::{Contract, ContractStatus};
        let contract = Contract {
            id: contract_id,
            client,
            provider,
            other_parties: Vec::new(),
            total,
            escrow_required: false,
            escrow_id: None,
            arbiter: None,
            status: ContractStatus::Draft,
            milestones: Vec::new(),
            signatures: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.db.put_contract(&contract)
    }

    /// The order side of a bid acceptance (§4.4) — created alongside the
    /// contract in the same reducer step so the two can never diverge.
    fn create_bid_order(
        &mut self,
        order_id: String,
        listing_id: String,
        client: clawnet_core::types::Did,
        provider: clawnet_core::types::Did,
        total: clawnet_core::types::Balance,
        now: Timestamp,
    ) -> Result<(), ClawNetError> {
        use clawnet_markets::types::{Order, OrderStatus};
        let order = Order {
            id: order_id,
            listing_id,
            buyer: client,
            seller: provider,
            amount: total,
            escrow_id: None,
            status: OrderStatus::Pending,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.db.put_order(&order)
    }

    /// Credit/debit a wallet transfer that originates from a reducer effect
    /// rather than a freshly signed `wallet.transfer` envelope (pay-per-use
    /// capability billing, §4.4). The originating envelope's own signature
    /// already authorized this debit as part of its own preconditions, so
    /// no additional signature check applies here.
    fn internal_transfer(
        &mut self,
        from: &clawnet_core::types::Did,
        to: &clawnet_core::types::Did,
        amount: clawnet_core::types::Balance,
        now: Timestamp,
    ) -> Result<(), ClawNetError> {
        let from_addr = Address::from_did(from).map_err(|_| ClawNetError::UnknownIssuer(from.to_string()))?;
        let to_addr = Address::from_did(to).map_err(|_| ClawNetError::UnknownIssuer(to.to_string()))?;
        let event = clawnet_wallet::WalletEvent::Transfer { to: to_addr, amount, fee: 0 };
        let milestone_approved = self.milestone_approved_closure();
        clawnet_wallet::apply(&event, &from_addr, now, &milestone_approved, &mut self.db)
    }

    fn emit_reputation_record(
        &mut self,
        issuer: &clawnet_core::types::Did,
        target: &clawnet_core::types::Did,
        dimension: &str,
        score: u16,
        reference: &str,
        now: Timestamp,
    ) -> Result<(), ClawNetError> {
        let dimension: clawnet_reputation::types::Dimension = serde_json::from_value(serde_json::Value::String(dimension.to_string()))
            .map_err(|e| ClawNetError::SchemaInvalid(e.to_string()))?;
        let event = clawnet_reputation::ReputationEvent::Record {
            target: target.clone(),
            dimension,
            score,
            reference: reference.to_string(),
        };
        clawnet_reputation::apply(&event, issuer, now, &mut self.db)
    }

    // ── Contracts ────────────────────────────────────────────────────────────

    fn dispatch_contracts(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        let contract_id = contract_id_of(&envelope.event_type, &envelope.payload)?;
        let event = clawnet_contracts::events::parse_payload(&envelope.event_type, &envelope.payload)?;

        let escrow = match self.db.get_contract(&contract_id)? {
            Some(contract) => match &contract.escrow_id {
                Some(escrow_id) => self.db.get_escrow(escrow_id)?,
                None => None,
            },
            None => None,
        };

        let effects = clawnet_contracts::apply(&event, &contract_id, &envelope.issuer, now, escrow.as_ref(), &mut self.db)?;

        for effect in effects {
            match effect {
                clawnet_contracts::ContractsEffect::ReleaseEscrow { escrow_id, amount, beneficiary: _ } => {
                    self.internal_escrow_release(&escrow_id, amount, now)?;
                }
                clawnet_contracts::ContractsEffect::SplitEscrow {
                    escrow_id,
                    provider_amount,
                    client_amount,
                    provider: _,
                    client: _,
                } => {
                    if provider_amount > 0 {
                        self.internal_escrow_release(&escrow_id, provider_amount, now)?;
                    }
                    if client_amount > 0 {
                        self.internal_escrow_refund(&escrow_id, client_amount, now)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn internal_escrow_release(&mut self, escrow_id: &str, amount: clawnet_core::types::Balance, now: Timestamp) -> Result<(), ClawNetError> {
        let escrow = self.db.get_escrow(escrow_id)?.ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;
        let event = clawnet_wallet::WalletEvent::EscrowRelease { escrow_id: escrow_id.to_string(), amount, provided_signers: Vec::new() };
        let milestone_approved = self.milestone_approved_closure();
        // `from` is only meaningful for Transfer/EscrowCreate/EscrowFund —
        // release and refund resolve the depositor from the escrow record
        // itself, so any address satisfies the reducer's dispatch here.
        clawnet_wallet::apply(&event, &escrow.depositor, now, &milestone_approved, &mut self.db)
    }

    fn internal_escrow_refund(&mut self, escrow_id: &str, amount: clawnet_core::types::Balance, now: Timestamp) -> Result<(), ClawNetError> {
        let escrow = self.db.get_escrow(escrow_id)?.ok_or_else(|| ClawNetError::EscrowNotFound(escrow_id.to_string()))?;
        let event = clawnet_wallet::WalletEvent::EscrowRefund { escrow_id: escrow_id.to_string(), amount };
        let milestone_approved = self.milestone_approved_closure();
        clawnet_wallet::apply(&event, &escrow.depositor.clone(), now, &milestone_approved, &mut self.db)
    }

    // ── Reputation ───────────────────────────────────────────────────────────

    fn dispatch_reputation(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        let event = clawnet_reputation::parse_payload(&envelope.event_type, &envelope.payload)?;
        clawnet_reputation::apply(&event, &envelope.issuer, now, &mut self.db)
    }

    // ── DAO ──────────────────────────────────────────────────────────────────

    fn dispatch_dao(&mut self, envelope: &Envelope, now: Timestamp) -> Result<(), ClawNetError> {
        let proposal_id = match envelope.event_type.as_str() {
            "dao.delegate.set" | "dao.delegate.revoke" | "dao.treasury.deposit" | "dao.treasury.spend" => String::new(),
            _ => proposal_id_of(&envelope.event_type, &envelope.payload)?,
        };
        let event = clawnet_dao::parse_payload(&envelope.event_type, &envelope.payload)?;

        // Delegation honors scope against the proposal type in play (§4.7
        // condition (c)) — for proposal-create it's the type being created,
        // for advance/vote it's the type already on record, and for the
        // proposal-less events below no delegation applies.
        let proposal_type = match &event {
            clawnet_dao::DaoEvent::ProposalCreate { proposal } => Some(proposal.proposal_type),
            clawnet_dao::DaoEvent::ProposalAdvance | clawnet_dao::DaoEvent::VoteCast { .. } => {
                self.db.get_proposal(&proposal_id)?.map(|p| p.proposal_type)
            }
            _ => None,
        };

        let voting_power = self.compute_voting_power(&envelope.issuer, proposal_type, now)?;
        let total_registered_power = self.total_registered_power(proposal_type, now)?;

        let effects = clawnet_dao::apply(
            &event,
            &proposal_id,
            &envelope.issuer,
            now,
            voting_power,
            total_registered_power,
            &mut self.db,
        )?;

        for effect in effects {
            match effect {
                clawnet_dao::DaoEffect::ApplyParameterChange { parameter, new_value } => {
                    info!(parameter = %parameter, value = %new_value, "dao parameter change executed");
                }
                clawnet_dao::DaoEffect::ApplyProtocolUpgrade { description } => {
                    info!(description = %description, "dao protocol upgrade executed");
                }
                clawnet_dao::DaoEffect::ExecuteTreasurySpend { to, amount } => {
                    self.execute_treasury_spend(&to, amount)?;
                }
            }
        }
        Ok(())
    }

    fn execute_treasury_spend(&mut self, to: &clawnet_core::types::Did, amount: clawnet_core::types::Balance) -> Result<(), ClawNetError> {
        let current = self.db.treasury_balance()?;
        if current < amount {
            return Err(ClawNetError::TreasuryInsufficientBalance { need: amount, have: current });
        }
        self.db.set_treasury_balance(current - amount)?;
        let to_addr = Address::from_did(to).map_err(|_| ClawNetError::UnknownIssuer(to.to_string()))?;
        let mut account = self.db.get_wallet_account(&to_addr)?.unwrap_or_default();
        account.available += amount;
        self.db.put_wallet_account(&to_addr, &account)
    }

    /// Voting power (§4.7) folds in a DID's wallet balance, any tokens it
    /// has locked for governance, and its reputation score. This
    /// implementation has no dedicated lockup-duration event, so locked
    /// tokens always carry the base (no-bonus) lockup multiplier — see
    /// DESIGN.md.
    ///
    /// `proposal_type` gates which delegations apply (§4.7 condition (c)):
    /// `None` means no proposal is in play, so no delegation is honored
    /// either way.
    pub fn compute_voting_power(
        &self,
        did: &clawnet_core::types::Did,
        proposal_type: Option<clawnet_dao::types::ProposalType>,
        now: Timestamp,
    ) -> Result<u128, ClawNetError> {
        let base = self.base_power_of(did, now)?;

        let delegation = self.db.get_delegation(did)?;
        let outgoing = match (&delegation, proposal_type) {
            (Some(d), Some(pt)) if d.covers(pt, now) => {
                base * d.percentage as u128 / 100
            }
            _ => 0,
        };
        let incoming = match proposal_type {
            Some(pt) => self.incoming_delegated_power(did, pt, now)?,
            None => 0,
        };
        Ok(clawnet_dao::effective_power(base, outgoing, incoming))
    }

    fn base_power_of(&self, did: &clawnet_core::types::Did, now: Timestamp) -> Result<u128, ClawNetError> {
        let address = Address::from_did(did).map_err(|_| ClawNetError::UnknownIssuer(did.to_string()))?;
        let account = self.db.get_wallet_account(&address)?.unwrap_or_default();
        let reputation_score = self.reputation_score(did, now)?;

        let inputs = VotingInputs {
            balance: account.available + account.pending,
            locked_tokens: account.locked_governance,
            lockup_duration_secs: 0,
            reputation_score,
        };
        Ok(clawnet_dao::base_power(inputs))
    }

    /// Sum of every other DID's delegated share of base power that
    /// currently delegates to `did`, scoped to `proposal_type`. A full
    /// scan over identity documents — the same filtered-linear-scan shape
    /// the rest of this engine uses for small aggregate queries rather
    /// than maintaining a reverse index.
    fn incoming_delegated_power(
        &self,
        did: &clawnet_core::types::Did,
        proposal_type: clawnet_dao::types::ProposalType,
        now: Timestamp,
    ) -> Result<u128, ClawNetError> {
        let mut total = 0u128;
        for document in self.all_identity_documents()? {
            if &document.did == did {
                continue;
            }
            if let Some(delegation) = self.db.get_delegation(&document.did)? {
                if delegation.delegate != *did || !delegation.covers(proposal_type, now) {
                    continue;
                }
                let base = self.base_power_of(&document.did, now)?;
                total += base * delegation.percentage as u128 / 100;
            }
        }
        Ok(total)
    }

    fn total_registered_power(
        &self,
        proposal_type: Option<clawnet_dao::types::ProposalType>,
        now: Timestamp,
    ) -> Result<u128, ClawNetError> {
        let mut total = 0u128;
        for document in self.all_identity_documents()? {
            total += self.compute_voting_power(&document.did, proposal_type, now)?;
        }
        Ok(total)
    }

    fn all_identity_documents(&self) -> Result<Vec<clawnet_identity::document::DidDocument>, ClawNetError> {
        self.db.all_identity_documents()
    }

    fn reputation_score(&self, did: &clawnet_core::types::Did, now: Timestamp) -> Result<u32, ClawNetError> {
        use clawnet_reputation::query::ReputationQuery;
        let store = self.db.clone();
        let query = ReputationQuery::new(&store);
        let reference_completed = |reference: &str| -> bool {
            self.db.get_order(reference).unwrap_or(None).map(|o| o.status == clawnet_markets::types::OrderStatus::Completed).unwrap_or(false)
                || self.db.get_contract(reference).unwrap_or(None).map(|c| c.status == clawnet_contracts::types::ContractStatus::Completed).unwrap_or(false)
        };
        let profile = query.profile(did, now, clawnet_core::constants::REPUTATION_HALF_LIFE_DAYS, &reference_completed);
        Ok(profile.overall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawnet_core::constants::ENVELOPE_VERSION;
    use clawnet_core::types::{Balance, Did, Ed25519Signature, Hash32};
    use clawnet_crypto::KeyPair;
    use clawnet_dao::types::ProposalType;
    use clawnet_identity::document::DidDocument;
    use clawnet_markets::types::{Bid, BidStatus, Listing, ListingStats, ListingStatus, MarketType};
    use clawnet_wallet::types::WalletAccount;

    fn temp_engine(name: &str) -> StateEngine {
        let dir = std::env::temp_dir().join(format!("clawnet_engine_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        StateEngine::new(StateDb::open(&dir).expect("open temp db"))
    }

    fn sign_envelope(kp: &KeyPair, event_type: &str, nonce: u64, payload: serde_json::Value) -> Envelope {
        let mut envelope = Envelope {
            v: ENVELOPE_VERSION,
            event_type: event_type.to_string(),
            issuer: kp.did.clone(),
            ts: 1_700_000_000_000,
            nonce,
            resource_prev: None,
            payload,
            hash: Hash32::from_bytes([0u8; 32]),
            sig: Ed25519Signature([0u8; 64]),
        };
        let bytes = envelope.signing_bytes().expect("signing bytes");
        envelope.hash = Hash32::of(&bytes);
        envelope.sig = kp.sign(&bytes);
        envelope
    }

    fn register_identity(engine: &mut StateEngine, kp: &KeyPair) {
        let document = DidDocument {
            did: kp.did.clone(),
            auth_key: kp.public_key,
            agreement_key: None,
            platforms: Vec::new(),
            capabilities: Vec::new(),
            prev_doc_hash: None,
            created_at: 0,
            updated_at: 0,
        };
        let payload = serde_json::json!({ "document": document });
        engine
            .validate_and_apply(&sign_envelope(kp, "identity.create", 1, payload), 0)
            .expect("identity.create must succeed");
    }

    fn set_balance(engine: &StateEngine, did: &Did, available: Balance) {
        let address = Address::from_did(did).expect("derive address");
        engine
            .db
            .put_wallet_account(&address, &WalletAccount { available, ..WalletAccount::default() })
            .expect("seed wallet balance");
    }

    /// Scenario: V2 (balance 40000 -> base 200) delegates 50% of its power
    /// to V1 (balance 10000 -> base 100), scoped to every proposal type.
    /// V1's effective power must be 100 + 200*0.5 = 200, and V2 keeps its
    /// own undelegated half rather than being zeroed out.
    #[test]
    fn delegation_scales_by_percentage_instead_of_moving_full_power() {
        let mut engine = temp_engine("delegation_percentage");
        let v1 = KeyPair::generate();
        let v2 = KeyPair::generate();
        register_identity(&mut engine, &v1);
        register_identity(&mut engine, &v2);
        set_balance(&engine, &v1.did, 10_000);
        set_balance(&engine, &v2.did, 40_000);

        let payload = serde_json::json!({ "delegate": v1.did.0, "percentage": 50 });
        engine
            .validate_and_apply(&sign_envelope(&v2, "dao.delegate.set", 1, payload), 0)
            .expect("dao.delegate.set must succeed");

        let v1_power = engine.compute_voting_power(&v1.did, Some(ProposalType::Signal), 0).unwrap();
        let v2_power = engine.compute_voting_power(&v2.did, Some(ProposalType::Signal), 0).unwrap();
        assert_eq!(v1_power, 200);
        assert_eq!(v2_power, 100);
    }

    /// A delegation scoped to `TreasurySpend` must not apply to a `Signal`
    /// proposal (§4.7 condition (c)).
    #[test]
    fn out_of_scope_delegation_is_not_honored() {
        let mut engine = temp_engine("delegation_scope");
        let v1 = KeyPair::generate();
        let v2 = KeyPair::generate();
        register_identity(&mut engine, &v1);
        register_identity(&mut engine, &v2);
        set_balance(&engine, &v1.did, 10_000);
        set_balance(&engine, &v2.did, 40_000);

        let payload = serde_json::json!({
            "delegate": v1.did.0,
            "scope": "treasury_spend",
            "percentage": 50,
        });
        engine
            .validate_and_apply(&sign_envelope(&v2, "dao.delegate.set", 1, payload), 0)
            .expect("dao.delegate.set must succeed");

        let v1_power = engine.compute_voting_power(&v1.did, Some(ProposalType::Signal), 0).unwrap();
        assert_eq!(v1_power, 100, "a treasury-scoped delegation must not boost a signal proposal's power");
    }

    /// Accepting a task-market bid must create both the contract and the
    /// order in the same reducer step (§4.4), not the contract alone.
    #[test]
    fn bid_accept_creates_both_contract_and_order() {
        let mut engine = temp_engine("bid_accept_order");
        let seller = KeyPair::generate();
        let bidder = KeyPair::generate();
        register_identity(&mut engine, &seller);
        register_identity(&mut engine, &bidder);

        engine
            .db
            .put_listing(&Listing {
                id: "task-1".to_string(),
                seller: seller.did.clone(),
                market_type: MarketType::Task,
                market_data: clawnet_markets::types::MarketData::Task {
                    bidding_mode: clawnet_markets::types::BiddingMode::Open,
                    budget: 40,
                },
                pricing: 40,
                status: ListingStatus::Active,
                stats: ListingStats::default(),
                created_at: 0,
                updated_at: 0,
            })
            .expect("seed listing");
        engine
            .db
            .put_bid(&Bid {
                id: "bid-1".to_string(),
                listing_id: "task-1".to_string(),
                bidder: bidder.did.clone(),
                amount: 40,
                status: BidStatus::Open,
                created_at: 0,
            })
            .expect("seed bid");

        let payload = serde_json::json!({ "listingId": "task-1", "bidId": "bid-1" });
        let envelope = sign_envelope(&seller, "market.task.bid.accept", 1, payload);
        engine.validate_and_apply(&envelope, 0).expect("market.task.bid.accept must succeed");

        let hash_hex = envelope.hash.to_hex();
        let contract = engine.db.get_contract(&format!("contract-{hash_hex}")).unwrap();
        let order = engine.db.get_order(&format!("order-{hash_hex}")).unwrap();
        assert!(contract.is_some(), "bid acceptance must create the contract");
        let order = order.expect("bid acceptance must create the order alongside the contract");
        assert_eq!(order.buyer, seller.did);
        assert_eq!(order.seller, bidder.did);
        assert_eq!(order.amount, 40);
        assert_eq!(order.status, clawnet_markets::types::OrderStatus::Pending);
    }
}
