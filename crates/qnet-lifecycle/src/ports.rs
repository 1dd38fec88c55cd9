/// Outbound port: verification of an externally observed burn (Phase 1)
/// or pool transfer (Phase 2). The burn oracle / Solana RPC parsing is
/// an out-of-scope collaborator; this crate only consumes its verdict.
pub trait ProofOracle: Send + Sync {
    fn verify_phase1_burn(&self, proof_ref: &str, required_amount: u64) -> bool;
    fn verify_phase2_transfer(&self, proof_ref: &str, required_amount: u64) -> bool;
}

/// A `ProofOracle` that accepts every proof, used for tests and for
/// scenarios that supply `proof_payload` directly via a trusted caller.
pub struct AlwaysVerifyOracle;

impl ProofOracle for AlwaysVerifyOracle {
    fn verify_phase1_burn(&self, _proof_ref: &str, _required_amount: u64) -> bool {
        true
    }

    fn verify_phase2_transfer(&self, _proof_ref: &str, _required_amount: u64) -> bool {
        true
    }
}
