use clawnet_core::error::ClawNetError;
use clawnet_core::types::{Address, Did, Hash32, Nonce};
use clawnet_identity::document::DidDocument;
use clawnet_identity::store::IdentityStore;
use clawnet_wallet::store::WalletStore;
use clawnet_wallet::types::{Escrow, WalletAccount};
use clawnet_markets::store::MarketsStore;
use clawnet_markets::types::{Bid, Lease, Listing, Order};
use clawnet_contracts::store::ContractsStore;
use clawnet_contracts::types::Contract;
use clawnet_reputation::store::ReputationStore;
use clawnet_reputation::types::ReputationRecord;
use clawnet_dao::store::DaoStore;
use clawnet_dao::types::{Delegation, Proposal, Vote};
use std::path::Path;

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   identity_documents — DID utf8 bytes                 → bincode(DidDocument)
///   wallet_accounts     — Address utf8 bytes             → bincode(WalletAccount)
///   wallet_escrows      — escrow id utf8 bytes           → bincode(Escrow)
///   market_listings     — listing id utf8 bytes          → bincode(Listing)
///   market_orders       — order id utf8 bytes            → bincode(Order)
///   market_bids         — bid id utf8 bytes               → bincode(Bid)
///   market_leases       — lease id utf8 bytes             → bincode(Lease)
///   contracts           — contract id utf8 bytes         → bincode(Contract)
///   reputation_records  — target DID ‖ 0x00 ‖ counter    → bincode(ReputationRecord)
///   dao_proposals       — proposal id utf8 bytes         → bincode(Proposal)
///   dao_votes           — proposal id ‖ 0x00 ‖ voter DID → bincode(Vote) (membership only)
///   dao_delegations     — delegator DID utf8 bytes       → bincode(Delegation)
///   meta                — utf8 key bytes                 → raw bytes (treasury balance, etc.)
///   event_log           — envelope hash bytes             → bincode(Envelope) (dedup + replay)
///   nonce_heads         — issuer DID ‖ 0x00 ‖ family     → 8 little-endian bytes (last nonce seen)
///   resource_heads       — resource id utf8 bytes         → envelope hash bytes (causal chain tip)
///
/// Every field is a cheap `Arc`-backed handle (sled's own design), so
/// `StateDb` is `Clone` — the engine clones a read-only handle into a
/// closure rather than fight the borrow checker over `&self` vs `&mut self`
/// when a reducer needs to peek at other subsystems' state mid-apply.
#[derive(Clone)]
pub struct StateDb {
    _db: sled::Db,
    identity_documents: sled::Tree,
    wallet_accounts: sled::Tree,
    wallet_escrows: sled::Tree,
    market_listings: sled::Tree,
    market_orders: sled::Tree,
    market_bids: sled::Tree,
    market_leases: sled::Tree,
    contracts: sled::Tree,
    reputation_records: sled::Tree,
    dao_proposals: sled::Tree,
    dao_votes: sled::Tree,
    dao_delegations: sled::Tree,
    meta: sled::Tree,
    event_log: sled::Tree,
    nonce_heads: sled::Tree,
    resource_heads: sled::Tree,
}

const META_TREASURY_BALANCE: &str = "treasury_balance";

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClawNetError> {
        let db = sled::open(path).map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let identity_documents = db.open_tree("identity_documents").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let wallet_accounts     = db.open_tree("wallet_accounts").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let wallet_escrows      = db.open_tree("wallet_escrows").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let market_listings     = db.open_tree("market_listings").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let market_orders       = db.open_tree("market_orders").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let market_bids         = db.open_tree("market_bids").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let market_leases       = db.open_tree("market_leases").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let contracts           = db.open_tree("contracts").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let reputation_records  = db.open_tree("reputation_records").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let dao_proposals       = db.open_tree("dao_proposals").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let dao_votes           = db.open_tree("dao_votes").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let dao_delegations     = db.open_tree("dao_delegations").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let meta                = db.open_tree("meta").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let event_log           = db.open_tree("event_log").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let nonce_heads         = db.open_tree("nonce_heads").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        let resource_heads      = db.open_tree("resource_heads").map_err(|e| ClawNetError::Storage(e.to_string()))?;
        Ok(Self {
            _db: db,
            identity_documents, wallet_accounts, wallet_escrows,
            market_listings, market_orders, market_bids, market_leases,
            contracts, reputation_records,
            dao_proposals, dao_votes, dao_delegations,
            meta, event_log, nonce_heads, resource_heads,
        })
    }

    pub fn flush(&self) -> Result<(), ClawNetError> {
        self._db.flush().map_err(|e| ClawNetError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Identity documents ───────────────────────────────────────────────────

    pub fn get_identity_document(&self, did: &Did) -> Result<Option<DidDocument>, ClawNetError> {
        get_bincode(&self.identity_documents, did.as_str().as_bytes())
    }

    pub fn put_identity_document(&self, document: &DidDocument) -> Result<(), ClawNetError> {
        put_bincode(&self.identity_documents, document.did.as_str().as_bytes(), document)
    }

    /// Every registered DID document — used by the DAO reducer's voting
    /// power aggregation (§4.7), which has no reason to maintain a
    /// secondary index over what is expected to be a modest population.
    pub fn all_identity_documents(&self) -> Result<Vec<DidDocument>, ClawNetError> {
        let mut out = Vec::new();
        for item in self.identity_documents.iter() {
            let (_, bytes) = item.map_err(|e| ClawNetError::Storage(e.to_string()))?;
            let doc: DidDocument = bincode::deserialize(&bytes).map_err(|e| ClawNetError::Serialization(e.to_string()))?;
            out.push(doc);
        }
        Ok(out)
    }

    // ── Wallet accounts / escrows ────────────────────────────────────────────

    pub fn get_wallet_account(&self, address: &Address) -> Result<Option<WalletAccount>, ClawNetError> {
        get_bincode(&self.wallet_accounts, address.as_str().as_bytes())
    }

    pub fn put_wallet_account(&self, address: &Address, account: &WalletAccount) -> Result<(), ClawNetError> {
        put_bincode(&self.wallet_accounts, address.as_str().as_bytes(), account)
    }

    pub fn get_escrow(&self, escrow_id: &str) -> Result<Option<Escrow>, ClawNetError> {
        get_bincode(&self.wallet_escrows, escrow_id.as_bytes())
    }

    pub fn put_escrow(&self, escrow: &Escrow) -> Result<(), ClawNetError> {
        put_bincode(&self.wallet_escrows, escrow.id.as_bytes(), escrow)
    }

    // ── Markets ──────────────────────────────────────────────────────────────

    pub fn get_listing(&self, listing_id: &str) -> Result<Option<Listing>, ClawNetError> {
        get_bincode(&self.market_listings, listing_id.as_bytes())
    }

    pub fn put_listing(&self, listing: &Listing) -> Result<(), ClawNetError> {
        put_bincode(&self.market_listings, listing.id.as_bytes(), listing)
    }

    pub fn get_order(&self, order_id: &str) -> Result<Option<Order>, ClawNetError> {
        get_bincode(&self.market_orders, order_id.as_bytes())
    }

    pub fn put_order(&self, order: &Order) -> Result<(), ClawNetError> {
        put_bincode(&self.market_orders, order.id.as_bytes(), order)
    }

    pub fn get_bid(&self, bid_id: &str) -> Result<Option<Bid>, ClawNetError> {
        get_bincode(&self.market_bids, bid_id.as_bytes())
    }

    pub fn put_bid(&self, bid: &Bid) -> Result<(), ClawNetError> {
        put_bincode(&self.market_bids, bid.id.as_bytes(), bid)
    }

    /// Linear scan rather than a secondary index tree — bid volume per
    /// listing is small enough that a filtered full scan is simpler.
    pub fn bids_for_listing(&self, listing_id: &str) -> Result<Vec<Bid>, ClawNetError> {
        let mut out = Vec::new();
        for item in self.market_bids.iter() {
            let (_, bytes) = item.map_err(|e| ClawNetError::Storage(e.to_string()))?;
            let bid: Bid = bincode::deserialize(&bytes).map_err(|e| ClawNetError::Serialization(e.to_string()))?;
            if bid.listing_id == listing_id {
                out.push(bid);
            }
        }
        Ok(out)
    }

    pub fn get_lease(&self, lease_id: &str) -> Result<Option<Lease>, ClawNetError> {
        get_bincode(&self.market_leases, lease_id.as_bytes())
    }

    pub fn put_lease(&self, lease: &Lease) -> Result<(), ClawNetError> {
        put_bincode(&self.market_leases, lease.id.as_bytes(), lease)
    }

    // ── Contracts ────────────────────────────────────────────────────────────

    pub fn get_contract(&self, contract_id: &str) -> Result<Option<Contract>, ClawNetError> {
        get_bincode(&self.contracts, contract_id.as_bytes())
    }

    pub fn put_contract(&self, contract: &Contract) -> Result<(), ClawNetError> {
        put_bincode(&self.contracts, contract.id.as_bytes(), contract)
    }

    // ── Reputation ───────────────────────────────────────────────────────────

    /// Records are keyed by `target DID ‖ 0x00 ‖ recorded_at(be) ‖ counter(be)`
    /// so a prefix scan on the target's DID bytes yields every record for it
    /// in insertion order, without needing a separate index tree.
    pub fn append_reputation_record(&self, record: &ReputationRecord) -> Result<(), ClawNetError> {
        let mut key = record.target.as_str().as_bytes().to_vec();
        key.push(0);
        key.extend_from_slice(&record.recorded_at.to_be_bytes());
        key.extend_from_slice(&(self.reputation_records.len() as u64).to_be_bytes());
        put_bincode(&self.reputation_records, &key, record)
    }

    pub fn reputation_records_for(&self, target: &Did) -> Result<Vec<ReputationRecord>, ClawNetError> {
        let mut prefix = target.as_str().as_bytes().to_vec();
        prefix.push(0);
        let mut out = Vec::new();
        for item in self.reputation_records.scan_prefix(&prefix) {
            let (_, bytes) = item.map_err(|e| ClawNetError::Storage(e.to_string()))?;
            let record: ReputationRecord = bincode::deserialize(&bytes).map_err(|e| ClawNetError::Serialization(e.to_string()))?;
            out.push(record);
        }
        Ok(out)
    }

    // ── DAO ──────────────────────────────────────────────────────────────────

    pub fn get_proposal(&self, proposal_id: &str) -> Result<Option<Proposal>, ClawNetError> {
        get_bincode(&self.dao_proposals, proposal_id.as_bytes())
    }

    pub fn put_proposal(&self, proposal: &Proposal) -> Result<(), ClawNetError> {
        put_bincode(&self.dao_proposals, proposal.id.as_bytes(), proposal)
    }

    fn vote_key(proposal_id: &str, voter: &Did) -> Vec<u8> {
        let mut key = proposal_id.as_bytes().to_vec();
        key.push(0);
        key.extend_from_slice(voter.as_str().as_bytes());
        key
    }

    pub fn has_voted(&self, proposal_id: &str, voter: &Did) -> Result<bool, ClawNetError> {
        self.dao_votes
            .contains_key(Self::vote_key(proposal_id, voter))
            .map_err(|e| ClawNetError::Storage(e.to_string()))
    }

    pub fn record_vote(&self, vote: &Vote) -> Result<(), ClawNetError> {
        put_bincode(&self.dao_votes, &Self::vote_key(&vote.proposal_id, &vote.voter), vote)
    }

    pub fn get_delegation(&self, delegator: &Did) -> Result<Option<Delegation>, ClawNetError> {
        get_bincode(&self.dao_delegations, delegator.as_str().as_bytes())
    }

    pub fn put_delegation(&self, delegation: &Delegation) -> Result<(), ClawNetError> {
        put_bincode(&self.dao_delegations, delegation.delegator.as_str().as_bytes(), delegation)
    }

    pub fn treasury_balance(&self) -> Result<u128, ClawNetError> {
        match self.meta.get(META_TREASURY_BALANCE).map_err(|e| ClawNetError::Storage(e.to_string()))? {
            Some(bytes) => {
                let s = std::str::from_utf8(&bytes).map_err(|e| ClawNetError::Serialization(e.to_string()))?;
                s.parse::<u128>().map_err(|e| ClawNetError::Serialization(e.to_string()))
            }
            None => Ok(0),
        }
    }

    pub fn set_treasury_balance(&self, balance: u128) -> Result<(), ClawNetError> {
        self.meta
            .insert(META_TREASURY_BALANCE, balance.to_string().as_bytes())
            .map_err(|e| ClawNetError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Envelope log, nonce heads, resource chain heads ─────────────────────

    pub fn has_envelope(&self, hash: &Hash32) -> Result<bool, ClawNetError> {
        self.event_log
            .contains_key(hash.0)
            .map_err(|e| ClawNetError::Storage(e.to_string()))
    }

    pub fn mark_envelope_applied(&self, hash: &Hash32) -> Result<(), ClawNetError> {
        self.event_log
            .insert(hash.0, &[][..])
            .map_err(|e| ClawNetError::Storage(e.to_string()))?;
        Ok(())
    }

    fn nonce_key(issuer: &Did, family: &str) -> Vec<u8> {
        let mut key = issuer.as_str().as_bytes().to_vec();
        key.push(0);
        key.extend_from_slice(family.as_bytes());
        key
    }

    pub fn last_nonce(&self, issuer: &Did, family: &str) -> Result<Option<Nonce>, ClawNetError> {
        match self.nonce_heads.get(Self::nonce_key(issuer, family)).map_err(|e| ClawNetError::Storage(e.to_string()))? {
            Some(bytes) => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                Ok(Some(Nonce::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_last_nonce(&self, issuer: &Did, family: &str, nonce: Nonce) -> Result<(), ClawNetError> {
        self.nonce_heads
            .insert(Self::nonce_key(issuer, family), &nonce.to_be_bytes())
            .map_err(|e| ClawNetError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn resource_head(&self, resource_id: &str) -> Result<Option<Hash32>, ClawNetError> {
        match self.resource_heads.get(resource_id.as_bytes()).map_err(|e| ClawNetError::Storage(e.to_string()))? {
            Some(bytes) => {
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Some(Hash32::from_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_resource_head(&self, resource_id: &str, hash: Hash32) -> Result<(), ClawNetError> {
        self.resource_heads
            .insert(resource_id.as_bytes(), &hash.0)
            .map_err(|e| ClawNetError::Storage(e.to_string()))?;
        Ok(())
    }
}

fn get_bincode<T: serde::de::DeserializeOwned>(tree: &sled::Tree, key: &[u8]) -> Result<Option<T>, ClawNetError> {
    match tree.get(key).map_err(|e| ClawNetError::Storage(e.to_string()))? {
        Some(bytes) => {
            let value = bincode::deserialize(&bytes).map_err(|e| ClawNetError::Serialization(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn put_bincode<T: serde::Serialize>(tree: &sled::Tree, key: &[u8], value: &T) -> Result<(), ClawNetError> {
    let bytes = bincode::serialize(value).map_err(|e| ClawNetError::Serialization(e.to_string()))?;
    tree.insert(key, bytes).map_err(|e| ClawNetError::Storage(e.to_string()))?;
    Ok(())
}

// ── Store trait implementations ─────────────────────────────────────────────
//
// Each reducer crate defines its own storage seam against which it is a
// pure function; `StateDb` is the one concrete type that implements all six.
// Every reducer's `apply` only calls into these `put_*` methods after all of
// its own preconditions have passed, so a write through this impl is always
// the tail end of an already-validated step — there is no separate staging
// buffer to flush.

impl IdentityStore for StateDb {
    fn get_document(&self, did: &Did) -> Option<DidDocument> {
        self.get_identity_document(did).unwrap_or(None)
    }
    fn put_document(&mut self, document: DidDocument) {
        let _ = self.put_identity_document(&document);
    }
}

impl WalletStore for StateDb {
    fn get_account(&self, address: &Address) -> WalletAccount {
        self.get_wallet_account(address).unwrap_or(None).unwrap_or_default()
    }
    fn put_account(&mut self, address: &Address, account: WalletAccount) {
        let _ = self.put_wallet_account(address, &account);
    }
    fn get_escrow(&self, escrow_id: &str) -> Option<Escrow> {
        self.get_escrow(escrow_id).unwrap_or(None)
    }
    fn put_escrow(&mut self, escrow: Escrow) {
        let _ = self.put_escrow(&escrow);
    }
}

impl MarketsStore for StateDb {
    fn get_listing(&self, listing_id: &str) -> Option<Listing> {
        self.get_listing(listing_id).unwrap_or(None)
    }
    fn put_listing(&mut self, listing: Listing) {
        let _ = self.put_listing(&listing);
    }
    fn get_order(&self, order_id: &str) -> Option<Order> {
        self.get_order(order_id).unwrap_or(None)
    }
    fn put_order(&mut self, order: Order) {
        let _ = self.put_order(&order);
    }
    fn get_bid(&self, bid_id: &str) -> Option<Bid> {
        self.get_bid(bid_id).unwrap_or(None)
    }
    fn put_bid(&mut self, bid: Bid) {
        let _ = self.put_bid(&bid);
    }
    fn bids_for_listing(&self, listing_id: &str) -> Vec<Bid> {
        self.bids_for_listing(listing_id).unwrap_or_default()
    }
    fn get_lease(&self, lease_id: &str) -> Option<Lease> {
        self.get_lease(lease_id).unwrap_or(None)
    }
    fn put_lease(&mut self, lease: Lease) {
        let _ = self.put_lease(&lease);
    }
}

impl ContractsStore for StateDb {
    fn get_contract(&self, contract_id: &str) -> Option<Contract> {
        self.get_contract(contract_id).unwrap_or(None)
    }
    fn put_contract(&mut self, contract: Contract) {
        let _ = self.put_contract(&contract);
    }
}

impl ReputationStore for StateDb {
    fn records_for(&self, target: &Did) -> Vec<ReputationRecord> {
        self.reputation_records_for(target).unwrap_or_default()
    }
    fn append_record(&mut self, record: ReputationRecord) {
        let _ = self.append_reputation_record(&record);
    }
}

impl DaoStore for StateDb {
    fn get_proposal(&self, proposal_id: &str) -> Option<Proposal> {
        self.get_proposal(proposal_id).unwrap_or(None)
    }
    fn put_proposal(&mut self, proposal: Proposal) {
        let _ = self.put_proposal(&proposal);
    }
    fn has_voted(&self, proposal_id: &str, voter: &Did) -> bool {
        self.has_voted(proposal_id, voter).unwrap_or(false)
    }
    fn record_vote(&mut self, vote: Vote) {
        let _ = self.record_vote(&vote);
    }
    fn get_delegation(&self, delegator: &Did) -> Option<Delegation> {
        self.get_delegation(delegator).unwrap_or(None)
    }
    fn put_delegation(&mut self, delegation: Delegation) {
        let _ = self.put_delegation(&delegation);
    }
    fn treasury_balance(&self) -> u128 {
        self.treasury_balance().unwrap_or(0)
    }
    fn set_treasury_balance(&mut self, balance: u128) {
        let _ = self.set_treasury_balance(balance);
    }
}
