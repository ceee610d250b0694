//! RPC client tests against a mocked node

use std::time::Duration;

use assert_matches::assert_matches;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use super::common::*;
use kvbench::rpc::{ClientConfig, RpcError};
use kvbench::{RpcClient, Transaction, TxEndpoint};

#[tokio::test]
async fn test_submit_wire_format() {
    let node = MockNode::start().await;

    Mock::given(method("POST"))
        .and(path("/broadcast_tx_commit"))
        .and(query_param("tx", "0x62656e63685f373d37"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMMIT_OK))
        .expect(1)
        .mount(&node.server)
        .await;

    let ack = node
        .client(Duration::from_secs(5))
        .submit(&Transaction::indexed("bench", 7))
        .await
        .unwrap();

    assert_eq!(ack.status, 200);
    assert!(!ack.body.is_empty());
}

#[tokio::test]
async fn test_submit_rejected_body_is_flattened() {
    let node = MockNode::start().await;
    node.reject_all().await;

    let err = node
        .client(Duration::from_secs(5))
        .submit(&Transaction::indexed("bench", 1))
        .await
        .unwrap_err();

    assert_matches!(&err, RpcError::Rejected(body) if body.contains("tx already exists in cache"));
    assert!(!err.to_string().contains('\n'));
}

#[tokio::test]
async fn test_submit_bad_status() {
    let node = MockNode::start().await;
    node.respond_to_submits(500, COMMIT_OK).await;

    let err = node
        .client(Duration::from_secs(5))
        .submit(&Transaction::indexed("bench", 1))
        .await
        .unwrap_err();

    assert_eq!(err, RpcError::Protocol("bad HTTP 500".to_string()));
}

#[tokio::test]
async fn test_submit_empty_body() {
    let node = MockNode::start().await;
    node.respond_to_submits(200, "").await;

    let err = node
        .client(Duration::from_secs(5))
        .submit(&Transaction::indexed("bench", 1))
        .await
        .unwrap_err();

    assert_matches!(err, RpcError::Protocol(_));
}

#[tokio::test]
async fn test_submit_timeout() {
    let node = MockNode::start().await;
    Mock::given(method("POST"))
        .and(path("/broadcast_tx_commit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(COMMIT_OK)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&node.server)
        .await;

    let err = node
        .client(Duration::from_millis(100))
        .submit(&Transaction::indexed("bench", 1))
        .await
        .unwrap_err();

    assert_eq!(err, RpcError::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_submit_connection_refused() {
    // Grab a free port, then close it again
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RpcClient::with_config(
        ClientConfig::new(addr.to_string()).timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let err = client.submit(&Transaction::indexed("bench", 1)).await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn test_query_decodes_value() {
    let node = MockNode::start().await;
    node.serve_value("acc2", &counters_value([1, 2, 3])).await;

    let value = node.client(Duration::from_secs(5)).query("acc2").await.unwrap();

    assert_eq!(value.len(), 24);
    assert_eq!(kvbench::encoder::sum_counters(&value), 6);
}

#[tokio::test]
async fn test_query_missing_key() {
    let node = MockNode::start().await;
    Mock::given(method("GET"))
        .and(path("/abci_query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"jsonrpc":"2.0","id":-1,"result":{"response":{"code":0,"log":"does not exist","key":"bm9wZQ==","value":null}}}"#,
        ))
        .mount(&node.server)
        .await;

    let err = node.client(Duration::from_secs(5)).query("nope").await.unwrap_err();
    assert_matches!(err, RpcError::Query(_));
}
