use serde::{Deserialize, Serialize};

use crate::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: Address,
    pub balance: u128,
    pub nonce: u64,
}

impl AccountState {
    pub fn empty(address: Address) -> Self {
        Self { address, balance: 0, nonce: 0 }
    }
}
