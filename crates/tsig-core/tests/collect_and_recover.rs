mod common;

use std::time::Duration;

use bls12_381::G2Projective;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tokio::sync::mpsc;

use tsig_core::bls::{recover_from_shares, sign_share, verify_aggregate, Bls12381};
use tsig_core::collect::collect_shares;
use tsig_core::poly::joint_setup;
use tsig_core::{Error, ThresholdParams};

const MESSAGE: &[u8] = b"Hello Threshold Signature";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parties_sign_concurrently() {
    common::init_tracing();
    let mut rng = ChaCha20Rng::seed_from_u64(77);
    let params = ThresholdParams::new(3, 5).unwrap();
    let key = joint_setup::<G2Projective, _>(&params, &mut rng).unwrap();

    let (tx, mut rx) = mpsc::channel(params.n_parties);
    for share in key.shares.clone() {
        let tx = tx.clone();
        tokio::spawn(async move {
            let partial = sign_share::<Bls12381>(&share, MESSAGE).unwrap();
            let _ = tx.send(partial.to_bytes()).await;
        });
    }
    drop(tx);

    let collected = collect_shares(&mut rx, &params, Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(collected.len(), params.threshold);

    let wire: Vec<Vec<u8>> = collected.iter().map(|s| s.to_bytes()).collect();
    let signature =
        recover_from_shares::<Bls12381>(&key.commitment, MESSAGE, &wire, &params).unwrap();
    verify_aggregate::<Bls12381>(&key.public_key(), MESSAGE, &signature).unwrap();
}

#[tokio::test]
async fn test_silent_parties_time_out() {
    let mut rng = ChaCha20Rng::seed_from_u64(78);
    let params = ThresholdParams::new(3, 5).unwrap();
    let key = joint_setup::<G2Projective, _>(&params, &mut rng).unwrap();

    // Only two parties answer and the sender stays open
    let (tx, mut rx) = mpsc::channel(params.n_parties);
    for share in &key.shares[..2] {
        let partial = sign_share::<Bls12381>(share, MESSAGE).unwrap();
        tx.send(partial.to_bytes()).await.unwrap();
    }

    let result = collect_shares(&mut rx, &params, Duration::from_millis(100)).await;
    assert_eq!(
        result,
        Err(Error::InsufficientShares {
            required: 3,
            actual: 2
        })
    );
    drop(tx);
}
