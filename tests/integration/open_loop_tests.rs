//! Open-loop dispatch and read-back verification

use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use kvbench::config::SeedAccount;
use kvbench::stats::Verdict;
use kvbench::{BenchConfig, OpenLoop, RunConfig, Workload};

#[tokio::test(start_paused = true)]
async fn test_rate_times_duration_ticks() {
    let store = Arc::new(AppendingStore::default());

    let report = OpenLoop::new(store.clone(), 10, Duration::from_secs(5), "acc2")
        .cooldown(Duration::from_secs(20))
        .run()
        .await;

    assert_eq!(report.sent, 50);
    assert_eq!(report.expected_min, 50);
    assert_eq!(report.counter_sum, (1..=50).sum::<u64>());
    assert_eq!(report.acknowledged, 50);
    assert_eq!(report.failed, 0);
    assert!(report.committed >= report.counter_sum);
    assert_eq!(report.verdict(), Verdict::Consistent);
}

#[tokio::test(start_paused = true)]
async fn test_counters_are_sequential_under_fixed_key() {
    let store = Arc::new(AppendingStore::default());

    OpenLoop::new(store.clone(), 4, Duration::from_secs(1), "ctr").run().await;

    let log = store.log();
    assert_eq!(log.len(), 4);
    for payload in &log {
        assert_eq!(&payload[..4], b"ctr=");
        assert_eq!(payload.len(), 4 + 8);
    }
    let mut values: Vec<u64> = log
        .iter()
        .map(|p| u64::from_le_bytes(p[4..].try_into().unwrap()))
        .collect();
    values.sort_unstable();
    assert_eq!(values, vec![1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_precedes_load() {
    let store = Arc::new(AppendingStore::default());

    OpenLoop::new(store.clone(), 2, Duration::from_secs(1), "acc2")
        .bootstrap(vec![SeedAccount::new("acc1", "10000000")])
        .run()
        .await;

    let log = store.log();
    assert_eq!(log[0], b"acc1=10000000".to_vec());
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn test_short_read_back() {
    let node = MockNode::start().await;
    node.accept_all().await;
    node.serve_value("acc2", &counters_value([1, 2])).await;

    let client = Arc::new(node.client(Duration::from_secs(5)));
    let report = OpenLoop::new(client, 20, Duration::from_millis(500), "acc2")
        .cooldown(Duration::from_millis(200))
        .run()
        .await;

    assert!(report.sent >= 1 && report.sent <= 10, "sent {}", report.sent);
    assert_eq!(report.committed, 3);
    assert!(report.query_error.is_none());
    if report.sent > 2 {
        assert_eq!(report.verdict(), Verdict::Short);
    }
}

#[tokio::test]
async fn test_run_config_against_mock_node() {
    let node = MockNode::start().await;
    node.accept_all().await;
    node.serve_value("acc2", &counters_value(1..=5)).await;

    let mut config = BenchConfig::default();
    config.target.addr = node.addr();
    config.rate.tps = 10;
    config.rate.duration = Duration::from_millis(500);
    config.rate.cooldown = Duration::from_millis(200);

    let run = RunConfig::new(&config, Workload::fixed_rate(&config)).unwrap();
    let client = Arc::new(kvbench::RpcClient::with_config(run.client_config()).unwrap());
    let report = OpenLoop::from_run(client, &run).unwrap().run().await;

    assert_eq!(report.expected_min, 5);
    assert!(report.sent <= 5, "sent {}", report.sent);
    assert_eq!(report.committed, 15);

    let payloads = node.submitted_payloads().await;
    assert!(payloads.contains(&b"acc1=10000000".to_vec()));
    assert!(payloads.contains(&b"acc2=0".to_vec()));
}

#[tokio::test]
async fn test_unreachable_read_back_degrades() {
    let node = MockNode::start().await;
    node.accept_all().await;

    let client = Arc::new(node.client(Duration::from_secs(5)));
    let report = OpenLoop::new(client, 10, Duration::from_millis(200), "missing")
        .run()
        .await;

    assert_eq!(report.committed, 0);
    assert!(report.query_error.is_some());
    assert_eq!(report.verdict(), Verdict::Unverified);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_do_not_wait_for_responses() {
    let node = Arc::new(SlowNode::new(Duration::from_secs(10)));

    let report = OpenLoop::new(node.clone(), 10, Duration::from_secs(5), "acc2")
        .cooldown(Duration::from_secs(20))
        .run()
        .await;

    assert_eq!(report.sent, 50);
    // Every submission is still pending when the last tick fires
    assert_eq!(node.peak_in_flight(), 50);
    assert_eq!(report.acknowledged, 50);
    assert_eq!(node.completed(), 50);
    assert_eq!(report.verdict(), Verdict::Unverified);
}
