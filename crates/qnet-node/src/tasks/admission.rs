//! T3, the mempool admission worker (`spec.md` §4.3, §5): drains
//! transactions the ingress demux accepted and runs them through the
//! pool's admission checks, off the demux's own hot path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use qnet_mempool::MempoolApi;
use qnet_types::Transaction;

use crate::container::CoreContext;

pub async fn run_admission_worker(ctx: Arc<CoreContext>, mut rx: mpsc::Receiver<Transaction>) {
    while let Some(tx) = rx.recv().await {
        match ctx.mempool.add_transaction(tx) {
            Ok(fingerprint) => debug!(fingerprint = %hex::encode(fingerprint), "transaction admitted"),
            Err(reason) => warn!(%reason, "transaction rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use qnet_types::transaction::TransactionKind;

    fn sample_tx(nonce: u64) -> Transaction {
        Transaction {
            sender: [1u8; 32],
            recipient: [2u8; 32],
            amount: 10,
            nonce,
            fee: 1,
            kind: TransactionKind::Transfer,
            proof_ref: None,
            sender_pubkey: vec![9, 9, 9],
            signature: vec![],
        }
    }

    #[tokio::test]
    async fn admitted_transaction_lands_in_the_pool() {
        let ctx = Arc::new(CoreContext::new(NodeConfig::default()));
        let (tx_sender, rx) = mpsc::channel(8);
        tx_sender.send(sample_tx(0)).await.unwrap();
        drop(tx_sender);

        run_admission_worker(ctx.clone(), rx).await;

        assert_eq!(ctx.mempool.size(), 1);
    }
}
