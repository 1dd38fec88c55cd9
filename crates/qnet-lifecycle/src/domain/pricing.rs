//! Activation pricing (`spec.md` §4.4.a). Phase 1 burns an external
//! token at a price that decays with cumulative supply burned; Phase 2
//! charges a native-token amount scaled by live network size.

use qnet_types::node::NodeTier;

/// Chain-level facts `domain::pricing` needs to price an activation
/// without re-deriving them from the full block log, carried from the
/// original `qnet-core/src/core/blockchain.py`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainMetadata {
    pub genesis_hash: [u8; 32],
    pub total_issued: u128,
    pub total_burned_phase1: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EconomicPhase {
    Phase1,
    Phase2,
}

/// Which economic phase the network is in and when Phase 2 began,
/// carried from `infrastructure/qnet-node/src/economics/transition_protection.py`.
/// `phase2_activated_at` is `None` until the first Phase-2 activation
/// flips `phase`.
#[derive(Debug, Clone, Copy)]
pub struct TransitionState {
    pub phase: EconomicPhase,
    pub phase2_activated_at: Option<u64>,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self { phase: EconomicPhase::Phase1, phase2_activated_at: None }
    }
}

pub const PHASE1_BASE_COST: u64 = 1500;
pub const PHASE1_STEP: u64 = 150;
pub const PHASE1_FLOOR: u64 = 150;
pub const TOTAL_SUPPLY: u128 = 1_000_000_000;

pub const PHASE2_BASE_LIGHT: u64 = 5_000;
pub const PHASE2_BASE_FULL: u64 = 7_500;
pub const PHASE2_BASE_SUPER: u64 = 10_000;

/// Universal across node types in Phase 1: base 1500, −150 per 10% of
/// the 1B supply burned, floored at 150.
pub fn phase1_price(total_burned: u128) -> u64 {
    let tenths_burned = (total_burned.saturating_mul(10) / TOTAL_SUPPLY) as u64;
    let reduction = tenths_burned.saturating_mul(PHASE1_STEP);
    PHASE1_BASE_COST.saturating_sub(reduction).max(PHASE1_FLOOR)
}

fn phase2_base(node_type: NodeTier) -> u64 {
    match node_type {
        NodeTier::Light => PHASE2_BASE_LIGHT,
        NodeTier::Full => PHASE2_BASE_FULL,
        NodeTier::Super => PHASE2_BASE_SUPER,
    }
}

fn network_multiplier(active_node_count: u64) -> f64 {
    if active_node_count < 100_000 {
        0.5
    } else if active_node_count < 1_000_000 {
        1.0
    } else if active_node_count < 10_000_000 {
        2.0
    } else {
        3.0
    }
}

/// Per `spec.md` §9's resolved open question: `active_node_count` is the
/// live count from the C4 registry, never an estimate from an external
/// burn count.
pub fn phase2_price(node_type: NodeTier, active_node_count: u64) -> u64 {
    let base = phase2_base(node_type) as f64;
    (base * network_multiplier(active_node_count)).round() as u64
}

pub mod transition {
    //! Supplemental: price-shock protection across the Phase-1→Phase-2
    //! boundary, grounded in the original `transition_protection.py`.
    //! Applies only within `SMOOTHING_WINDOW_DAYS` of Phase 2 activating;
    //! never touches Phase-1 pricing or steady-state Phase-2 pricing.

    pub const SMOOTHING_WINDOW_DAYS: u64 = 90;
    pub const MAX_DAILY_PRICE_CHANGE: f64 = 0.10;

    /// Caps the day-over-day move from `previous_price` to `target_price`
    /// at `MAX_DAILY_PRICE_CHANGE`, then blends toward the target with a
    /// smoothing factor that decays linearly from 100% (day 0) to 50%
    /// (end of window) as the transition matures.
    pub fn protected_price(target_price: u64, previous_price: u64, days_since_phase2: u64) -> u64 {
        if days_since_phase2 >= SMOOTHING_WINDOW_DAYS {
            return target_price;
        }
        let previous = previous_price as f64;
        let target = target_price as f64;

        let max_delta = previous * MAX_DAILY_PRICE_CHANGE;
        let capped = if target > previous { previous + max_delta.min(target - previous) } else { previous - max_delta.min(previous - target) };

        let progress = days_since_phase2 as f64 / SMOOTHING_WINDOW_DAYS as f64;
        let smoothing_factor = 1.0 - 0.5 * progress;
        let smoothed = previous + (capped - previous) * smoothing_factor;
        smoothed.round() as u64
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn smoothing_window_elapsed_returns_target_unchanged() {
            assert_eq!(protected_price(9000, 5000, SMOOTHING_WINDOW_DAYS), 9000);
        }

        #[test]
        fn day_zero_never_exceeds_daily_cap() {
            let protected = protected_price(10_000, 5_000, 0);
            assert!(protected <= 5_500);
        }

        #[test]
        fn decreasing_target_is_also_capped() {
            let protected = protected_price(1_000, 5_000, 0);
            assert!(protected >= 4_500);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase1_price_starts_at_base() {
        assert_eq!(phase1_price(0), 1500);
    }

    #[test]
    fn phase1_price_steps_down_per_decile_burned() {
        let ten_percent = TOTAL_SUPPLY / 10;
        assert_eq!(phase1_price(ten_percent), 1350);
        assert_eq!(phase1_price(ten_percent * 5), 750);
    }

    #[test]
    fn phase1_price_floors_at_150() {
        assert_eq!(phase1_price(TOTAL_SUPPLY), PHASE1_FLOOR);
        assert_eq!(phase1_price(TOTAL_SUPPLY * 2), PHASE1_FLOOR);
    }

    #[test]
    fn phase2_price_scales_by_network_size() {
        assert_eq!(phase2_price(NodeTier::Light, 50_000), 2_500);
        assert_eq!(phase2_price(NodeTier::Light, 500_000), 5_000);
        assert_eq!(phase2_price(NodeTier::Full, 2_000_000), 15_000);
        assert_eq!(phase2_price(NodeTier::Super, 20_000_000), 30_000);
    }
}
