//! Microblock create+validate budget (`spec.md` §8 property 8): stays
//! under 800 ms per microblock.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qnet_consensus::domain::microblock::validate_microblock;
use qnet_crypto::envelope::{keygen, sign};
use qnet_crypto::hashing::tx_fingerprint;
use qnet_crypto::merkle::merkle_root;
use qnet_types::block::Microblock;
use qnet_types::transaction::{Transaction, TransactionKind};

fn sample_transactions(n: usize) -> Vec<Transaction> {
    (0..n)
        .map(|i| Transaction {
            sender: [1u8; 32],
            recipient: [2u8; 32],
            amount: 10,
            nonce: i as u64,
            fee: 1,
            kind: TransactionKind::Transfer,
            proof_ref: None,
            sender_pubkey: vec![9, 9, 9],
            signature: vec![],
        })
        .collect()
}

fn create_and_validate(c: &mut Criterion) {
    let (_public_key, secret_key) = keygen();
    let proposer = [7u8; 32];
    let prev_hash = [0u8; 32];
    let txs = sample_transactions(2000);
    let fingerprints: Vec<_> = txs.iter().map(tx_fingerprint).collect();
    let tx_merkle_root = merkle_root(&fingerprints);

    c.bench_function("microblock create+validate, 2000 txs", |b| {
        b.iter(|| {
            let mut mb = Microblock {
                round: 1,
                index: 0,
                proposer,
                prev_hash,
                transactions: txs.clone(),
                tx_merkle_root,
                timestamp: 1_700_000_000,
                signature: Vec::new(),
            };
            mb.signature = sign(&mb.signing_payload(), &secret_key).unwrap().as_bytes().to_vec();
            let result = validate_microblock(black_box(&mb), prev_hash, &proposer, 0, 1_700_000_000);
            black_box(result).unwrap();
        });
    });
}

criterion_group!(benches, create_and_validate);
criterion_main!(benches);
