use deso_post_client::codec::signable_digest;
use deso_post_client::error::{Kind, Status};
use deso_post_client::keys::{self, KeyPair};
use deso_post_client::node::{SignedTransaction, SubmitPostRequest, UnsignedTransaction};
use deso_post_client::{Network, NodeClient, TransactionStatus};
use httpmock::prelude::*;
use reqwest::{Client, StatusCode};
use serde_json::json;
use url::Url;

const SEED_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const ADDRESS: &str = "4haaQAkmyAwUniNWLeKqKaPMNn1QZRr25NAv9fzjgE4qrCKd58Ds";

fn key_pair() -> KeyPair {
    keys::derive(SEED_HEX, "", 0, Network::Main).expect("scalar one is a valid key")
}

fn client(server: &MockServer) -> NodeClient {
    let host = Url::parse(&server.base_url()).expect("mock server url");
    NodeClient::from_key_pair(host, key_pair(), Client::new())
}

fn signature_hex(transaction_hex: &str) -> String {
    let digest = signable_digest(transaction_hex).expect("digest");
    key_pair().sign(&digest).expect("sign").to_hex()
}

#[tokio::test]
async fn submit_post_sends_node_payload() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/submit-post")
                .json_body(json!({
                    "UpdaterPublicKeyBase58Check": ADDRESS,
                    "PostHashHexToModify": "",
                    "ParentStakeID": "",
                    "RepostedPostHashHex": "",
                    "Title": "",
                    "BodyObj": {"Body": "IT WORKED!", "ImageURLs": [], "VideoURLs": []},
                    "PostExtraData": {"Node": "1"},
                    "Sub": "",
                    "IsHidden": false,
                    "MinFeeRateNanosPerKB": 1000,
                    "InTutorial": false,
                }));
            then.status(200)
                .json_body(json!({"TransactionHex": "01000000", "FeeNanos": 168}));
        })
        .await;

    let client = client(&server);
    assert_eq!(client.public_key_base58(), ADDRESS);

    let request = SubmitPostRequest::builder()
        .updater_public_key_base58_check(client.public_key_base58())
        .body("IT WORKED!")
        .build();
    let unsigned = client.submit_post(&request).await.expect("constructed");

    mock.assert_async().await;
    assert_eq!(
        unsigned,
        UnsignedTransaction::Simple {
            transaction_hex: "01000000".to_owned()
        }
    );
}

#[tokio::test]
async fn simple_transaction_is_signed_and_submitted() {
    let server = MockServer::start_async().await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/submit-transaction")
                .json_body(json!({
                    "UnsignedTransactionHex": "01000000",
                    "TransactionSignatureHex": signature_hex("01000000"),
                }));
            then.status(200)
                .json_body(json!({"TxnHashHex": "5a11", "PostEntryResponse": {"Body": "hi"}}));
        })
        .await;
    let atomic = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/submit-atomic-transaction");
            then.status(200).json_body(json!({"TxnHashHex": "wrong"}));
        })
        .await;

    let unsigned = UnsignedTransaction::from_node_parts("01000000".to_owned(), None);
    let submitted = client(&server)
        .sign_and_submit(&unsigned)
        .await
        .expect("submitted");

    submit.assert_async().await;
    atomic.assert_hits_async(0).await;
    assert_eq!(submitted.txn_hash_hex, "5a11");
    assert!(submitted.extra.contains_key("PostEntryResponse"), "extra fields kept");
}

#[tokio::test]
async fn atomic_transaction_signs_every_inner_transaction() {
    let server = MockServer::start_async().await;
    let inner = ["01000000", "deadbeef"];
    let atomic = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/submit-atomic-transaction")
                .json_body(json!({
                    "IncompleteAtomicTransactionHex": "aabb",
                    "UnsignedInnerTransactionsHex": inner,
                    "TransactionSignaturesHex": [signature_hex(inner[0]), signature_hex(inner[1])],
                }));
            then.status(200).json_body(json!({"TxnHashHex": "a70"}));
        })
        .await;
    let simple = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/submit-transaction");
            then.status(200).json_body(json!({"TxnHashHex": "wrong"}));
        })
        .await;

    let unsigned = UnsignedTransaction::from_node_parts(
        "aabb".to_owned(),
        Some(inner.iter().map(|hex| (*hex).to_owned()).collect()),
    );
    let client = client(&server);

    let SignedTransaction::Atomic(signed) = client.sign(&unsigned).expect("signed") else {
        panic!("inner transactions must produce an atomic signature set");
    };
    assert_eq!(signed.inner_hexes().len(), signed.signature_hexes().len());
    assert_ne!(signed.signature_hexes()[0], signed.signature_hexes()[1]);

    let submitted = client.sign_and_submit(&unsigned).await.expect("submitted");

    atomic.assert_async().await;
    simple.assert_hits_async(0).await;
    assert_eq!(submitted.txn_hash_hex, "a70");
}

#[tokio::test]
async fn rejected_submission_keeps_node_body_and_is_not_retried() {
    let server = MockServer::start_async().await;
    let body = r#"{"error":"RuleErrorTxnSigHasHighS"}"#;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/submit-transaction");
            then.status(400).body(body);
        })
        .await;

    let unsigned = UnsignedTransaction::from_node_parts("01000000".to_owned(), Some(Vec::new()));
    let err = client(&server)
        .sign_and_submit(&unsigned)
        .await
        .expect_err("node rejected");

    submit.assert_hits_async(1).await;
    assert_eq!(err.kind(), Kind::Status);
    let status = err.downcast_ref::<Status>().expect("status source");
    assert_eq!(status.status_code, StatusCode::BAD_REQUEST);
    assert_eq!(status.message, body);
    assert_eq!(status.path, "/api/v0/submit-transaction");
}

#[tokio::test]
async fn misaligned_atomic_submission_never_reaches_node() {
    let server = MockServer::start_async().await;
    let atomic = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/submit-atomic-transaction");
            then.status(200).json_body(json!({"TxnHashHex": "a70"}));
        })
        .await;

    let err = client(&server)
        .submit_atomic_transaction(
            "aabb",
            &["01".to_owned(), "02".to_owned()],
            &["3044".to_owned()],
        )
        .await
        .expect_err("counts differ");

    assert_eq!(err.kind(), Kind::InvariantViolation);
    atomic.assert_hits_async(0).await;
}

#[tokio::test]
async fn malformed_transaction_hex_is_rejected_before_submission() {
    let server = MockServer::start_async().await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/submit-transaction");
            then.status(200).json_body(json!({"TxnHashHex": "5a11"}));
        })
        .await;

    let unsigned = UnsignedTransaction::from_node_parts("not hex".to_owned(), None);
    let err = client(&server)
        .sign_and_submit(&unsigned)
        .await
        .expect_err("malformed hex");

    assert_eq!(err.kind(), Kind::MalformedHex);
    submit.assert_hits_async(0).await;
}

#[tokio::test]
async fn transaction_status_prefers_committed_index() {
    let server = MockServer::start_async().await;
    let committed = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/get-txn")
                .json_body(json!({"TxnHashHex": "c0ffee", "TxnStatus": "Committed"}));
            then.status(200).json_body(json!({"TxnFound": true}));
        })
        .await;
    let mempool = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/get-txn")
                .json_body(json!({"TxnHashHex": "c0ffee", "TxnStatus": "InMempool"}));
            then.status(200).json_body(json!({"TxnFound": true}));
        })
        .await;

    let status = client(&server)
        .transaction_status("c0ffee")
        .await
        .expect("status");

    assert_eq!(status, TransactionStatus::Committed);
    committed.assert_hits_async(1).await;
    mempool.assert_hits_async(0).await;
}

#[tokio::test]
async fn transaction_status_reports_mempool_and_missing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/get-txn")
                .json_body(json!({"TxnHashHex": "beef", "TxnStatus": "Committed"}));
            then.status(200).json_body(json!({"TxnFound": false}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/get-txn")
                .json_body(json!({"TxnHashHex": "beef", "TxnStatus": "InMempool"}));
            then.status(200).json_body(json!({"TxnFound": true}));
        })
        .await;
    let unknown_committed = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/get-txn")
                .json_body(json!({"TxnHashHex": "f00d", "TxnStatus": "Committed"}));
            then.status(200).json_body(json!({"TxnFound": false}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v0/get-txn")
                .json_body(json!({"TxnHashHex": "f00d", "TxnStatus": "InMempool"}));
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = client(&server);
    assert_eq!(
        client.transaction_status("beef").await.expect("status"),
        TransactionStatus::InMempool
    );
    assert_eq!(
        client.transaction_status("f00d").await.expect("status"),
        TransactionStatus::NotFound
    );
    unknown_committed.assert_hits_async(2).await;
}

#[tokio::test]
async fn wait_for_commitment_stops_on_node_rejection() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/get-txn");
            then.status(404).body("txn lookup disabled");
        })
        .await;

    let err = client(&server)
        .wait_for_commitment("c0ffee", std::time::Duration::from_secs(5))
        .await
        .expect_err("4xx is fatal");

    assert_eq!(err.kind(), Kind::Status);
    lookup.assert_hits_async(1).await;
}

#[tokio::test]
async fn wait_for_commitment_does_not_outlive_a_slow_node() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/get-txn");
            then.status(200)
                .delay(std::time::Duration::from_secs(3))
                .json_body(json!({"TxnFound": true}));
        })
        .await;

    let started = std::time::Instant::now();
    let err = client(&server)
        .wait_for_commitment("c0ffee", std::time::Duration::from_millis(300))
        .await
        .expect_err("node answers after the deadline");

    assert_eq!(err.kind(), Kind::Timeout);
    assert!(
        started.elapsed() < std::time::Duration::from_secs(1),
        "waited {:?} for a 300ms deadline",
        started.elapsed()
    );
}

#[tokio::test]
async fn unparseable_lookup_reply_ends_the_wait() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/get-txn");
            then.status(200)
                .header("content-type", "application/json")
                .body("<html>not json</html>");
        })
        .await;

    let err = client(&server)
        .wait_for_commitment("c0ffee", std::time::Duration::from_millis(300))
        .await
        .expect_err("garbage reply");

    assert_eq!(err.kind(), Kind::Internal);
    lookup.assert_hits_async(1).await;
}

#[tokio::test]
async fn unparseable_submission_reply_is_not_a_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v0/submit-post");
            then.status(200).body("upstream proxy error");
        })
        .await;

    let request = SubmitPostRequest::builder()
        .updater_public_key_base58_check(ADDRESS)
        .body("gm")
        .build();
    let err = client(&server)
        .submit_post(&request)
        .await
        .expect_err("garbage reply");

    assert_eq!(err.kind(), Kind::Internal);
    assert!(!err.is_transient(), "decode failures are never retried");
}
