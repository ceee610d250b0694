//! Property-based tests for closed-loop dispatch

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use proptest::prelude::*;

use kvbench::rpc::{Ack, RpcError, RpcResult};
use kvbench::{ClosedLoop, Transaction, TxEndpoint};

/// Records every payload it is handed
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl TxEndpoint for Recorder {
    async fn submit(&self, tx: &Transaction) -> RpcResult<Ack> {
        self.seen.lock().push(tx.to_string());
        tokio::task::yield_now().await;
        Ok(Ack {
            status: 200,
            body: Bytes::from_static(br#"{"code":0}"#),
        })
    }

    async fn query(&self, _key: &str) -> RpcResult<Bytes> {
        Err(RpcError::Query("no value".into()))
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every index in `0..total` is submitted exactly once
    #[test]
    fn test_each_index_once(total in 0u64..300, concurrency in 1usize..32) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let recorder = Arc::new(Recorder::default());

        let outcome = runtime
            .block_on(ClosedLoop::new(recorder.clone(), "p", total, concurrency).run())
            .unwrap();

        prop_assert_eq!(outcome.claimed, total);
        prop_assert_eq!(outcome.successes() as u64, total);
        prop_assert_eq!(outcome.errors, 0);

        let mut seen = recorder.seen.lock().clone();
        seen.sort();
        let mut expected: Vec<String> = (0..total).map(|i| format!("p_{}={}", i, i)).collect();
        expected.sort();
        prop_assert_eq!(seen, expected);
    }
}
