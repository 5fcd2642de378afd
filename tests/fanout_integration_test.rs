use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use slicefan::{
    CollectSink, FanoutConfig, FanoutSession, SearchBackend, WorkDescriptor, WorkMessage,
    seed_index,
};

fn config_for(server: &mockito::ServerGuard) -> FanoutConfig {
    FanoutConfig::builder()
        .backend_url(server.url())
        .index("sample-records")
        .request_timeout_secs(5)
        .worker_count(4)
        .build()
        .unwrap()
}

fn search_page_body(docs: usize) -> String {
    let hits: Vec<_> = (0..docs)
        .map(|i| json!({ "_source": { "uuid": format!("doc-{i}"), "timestamp": "2026-01-01T00:00:00Z" } }))
        .collect();
    json!({ "_scroll_id": "cursor-1", "hits": { "hits": hits } }).to_string()
}

async fn drain_with_timeout(session: &FanoutSession) {
    timeout(Duration::from_secs(10), session.drain())
        .await
        .expect("run should settle");
}

#[tokio::test]
async fn end_to_end_five_slices() {
    let mut server = mockito::Server::new_async().await;
    let count_mock = server
        .mock("GET", "/sample-records/_count")
        .with_status(200)
        .with_body(r#"{"count":2500}"#)
        .create_async()
        .await;
    let search_mock = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::UrlEncoded("scroll".into(), "1m".into()))
        .with_status(200)
        .with_body(search_page_body(3))
        .expect(5)
        .create_async()
        .await;

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config_for(&server), sink.clone()).unwrap();

    let report = session.trigger().await.unwrap();
    assert_eq!(report.total, 2500);
    assert_eq!(report.slice_count, 5);
    assert_eq!(report.published, 5);
    assert_eq!(report.failed_sends, 0);

    drain_with_timeout(&session).await;

    let mut ids: Vec<u32> = sink.slices().iter().map(|slice| slice.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert!(sink.slices().iter().all(|slice| slice.max == 5));
    assert_eq!(sink.total_documents(), 15);

    let snapshot = session.metrics();
    assert_eq!(snapshot.messages_delivered, 5);
    assert_eq!(snapshot.messages_dead_lettered, 0);

    let dead_letters = session.shutdown().await;
    assert!(dead_letters.is_empty());

    count_mock.assert_async().await;
    search_mock.assert_async().await;
}

#[tokio::test]
async fn total_below_page_size_publishes_nothing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sample-records/_count")
        .with_status(200)
        .with_body(r#"{"count":10}"#)
        .create_async()
        .await;
    let search_mock = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config_for(&server), sink.clone()).unwrap();

    let report = session.trigger().await.unwrap();
    assert_eq!(report.total, 10);
    assert_eq!(report.slice_count, 0);
    assert_eq!(report.published, 0);

    drain_with_timeout(&session).await;
    assert!(sink.is_empty());
    session.shutdown().await;
    search_mock.assert_async().await;
}

#[tokio::test]
async fn out_of_range_descriptor_is_dead_lettered_without_a_backend_call() {
    let mut server = mockito::Server::new_async().await;
    let search_mock = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config_for(&server), sink.clone()).unwrap();

    let poison = WorkDescriptor::new(5, 4);
    session
        .channel()
        .try_send(WorkMessage::json(serde_json::to_vec(&poison).unwrap()))
        .unwrap();

    drain_with_timeout(&session).await;

    let dead_letters = session.dead_letters();
    assert_eq!(dead_letters.len(), 1);
    assert_eq!(dead_letters[0].descriptor, Some(poison));
    assert_eq!(dead_letters[0].attempts, 1);
    assert!(dead_letters[0].cause.contains("out of range"));
    assert!(sink.is_empty());

    let snapshot = session.metrics();
    assert_eq!(snapshot.messages_dead_lettered, 1);
    assert_eq!(snapshot.messages_redelivered, 0);

    session.shutdown().await;
    search_mock.assert_async().await;
}

#[tokio::test]
async fn undecodable_payload_is_poison() {
    let mut server = mockito::Server::new_async().await;
    let search_mock = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config_for(&server), sink).unwrap();

    session
        .channel()
        .try_send(WorkMessage::json(b"definitely not a descriptor".to_vec()))
        .unwrap();

    drain_with_timeout(&session).await;

    let dead_letters = session.dead_letters();
    assert_eq!(dead_letters.len(), 1);
    assert!(dead_letters[0].descriptor.is_none());
    assert!(dead_letters[0].cause.contains("undecodable"));

    session.shutdown().await;
    search_mock.assert_async().await;
}

#[tokio::test]
async fn processing_failure_is_retried_then_isolated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sample-records/_count")
        .with_status(200)
        .with_body(r#"{"count":2000}"#)
        .create_async()
        .await;

    // Slice 1 fails every attempt; its three siblings succeed.
    let failing_mock = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::UrlEncoded("scroll".into(), "1m".into()))
        .match_body(Matcher::Json(json!({
            "slice": { "id": 1, "max": 4 },
            "size": 10_000,
            "sort": [ { "timestamp": "asc" } ],
        })))
        .with_status(500)
        .with_body(r#"{"error":"shard failure"}"#)
        .expect(3)
        .create_async()
        .await;

    let mut healthy_mocks = Vec::new();
    for id in [0u32, 2, 3] {
        let mock = server
            .mock("GET", "/sample-records/_search")
            .match_query(Matcher::UrlEncoded("scroll".into(), "1m".into()))
            .match_body(Matcher::Json(json!({
                "slice": { "id": id, "max": 4 },
                "size": 10_000,
                "sort": [ { "timestamp": "asc" } ],
            })))
            .with_status(200)
            .with_body(search_page_body(2))
            .expect(1)
            .create_async()
            .await;
        healthy_mocks.push(mock);
    }

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config_for(&server), sink.clone()).unwrap();

    let report = session.trigger().await.unwrap();
    assert_eq!(report.slice_count, 4);

    drain_with_timeout(&session).await;

    // Siblings of the failing slice are unaffected.
    let mut ids: Vec<u32> = sink.slices().iter().map(|slice| slice.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 2, 3]);

    let dead_letters = session.dead_letters();
    assert_eq!(dead_letters.len(), 1);
    assert_eq!(dead_letters[0].descriptor, Some(WorkDescriptor::new(1, 4)));
    assert_eq!(dead_letters[0].attempts, 3);

    let snapshot = session.metrics();
    assert_eq!(snapshot.messages_delivered, 3);
    assert_eq!(snapshot.messages_redelivered, 2);
    assert_eq!(snapshot.messages_dead_lettered, 1);

    session.shutdown().await;
    failing_mock.assert_async().await;
    for mock in healthy_mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn reprocessing_a_descriptor_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let search_mock = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::UrlEncoded("scroll".into(), "1m".into()))
        .with_status(200)
        .with_body(search_page_body(4))
        .expect(2)
        .create_async()
        .await;

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config_for(&server), sink.clone()).unwrap();

    // At-least-once delivery: the same descriptor may arrive twice.
    let descriptor = WorkDescriptor::new(0, 2);
    let body = serde_json::to_vec(&descriptor).unwrap();
    session.channel().try_send(WorkMessage::json(body.clone())).unwrap();
    session.channel().try_send(WorkMessage::json(body)).unwrap();

    drain_with_timeout(&session).await;

    // Both deliveries succeed as pure reads; nothing dead-letters.
    assert_eq!(sink.len(), 2);
    assert!(session.dead_letters().is_empty());

    session.shutdown().await;
    search_mock.assert_async().await;
}

#[tokio::test]
async fn scroll_to_exhaustion_follows_the_cursor_and_clears_it() {
    let mut server = mockito::Server::new_async().await;

    let first_page = server
        .mock("GET", "/sample-records/_search")
        .match_query(Matcher::UrlEncoded("scroll".into(), "1m".into()))
        .match_body(Matcher::Json(json!({
            "slice": { "id": 0, "max": 1 },
            "size": 10_000,
            "sort": [ { "timestamp": "asc" } ],
        })))
        .with_status(200)
        .with_body(
            json!({
                "_scroll_id": "cursor-1",
                "hits": { "hits": [
                    { "_source": { "uuid": "a" } },
                    { "_source": { "uuid": "b" } },
                    { "_source": { "uuid": "c" } }
                ] }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let continuation = server
        .mock("POST", "/_search/scroll")
        .match_body(Matcher::Json(json!({
            "scroll": "1m",
            "scroll_id": "cursor-1",
        })))
        .with_status(200)
        .with_body(
            json!({
                "_scroll_id": "cursor-2",
                "hits": { "hits": [
                    { "_source": { "uuid": "d" } },
                    { "_source": { "uuid": "e" } }
                ] }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let exhausted = server
        .mock("POST", "/_search/scroll")
        .match_body(Matcher::Json(json!({
            "scroll": "1m",
            "scroll_id": "cursor-2",
        })))
        .with_status(200)
        .with_body(r#"{"_scroll_id":"cursor-2","hits":{"hits":[]}}"#)
        .expect(1)
        .create_async()
        .await;

    let clear = server
        .mock("DELETE", "/_search/scroll")
        .match_body(Matcher::Json(json!({ "scroll_id": ["cursor-2"] })))
        .with_status(200)
        .with_body(r#"{"succeeded":true}"#)
        .expect(1)
        .create_async()
        .await;

    let config = FanoutConfig::builder()
        .backend_url(server.url())
        .index("sample-records")
        .request_timeout_secs(5)
        .scroll_to_exhaustion(true)
        .build()
        .unwrap();

    let sink = Arc::new(CollectSink::new());
    let session = FanoutSession::start(config, sink.clone()).unwrap();

    let descriptor = WorkDescriptor::new(0, 1);
    session
        .channel()
        .try_send(WorkMessage::json(serde_json::to_vec(&descriptor).unwrap()))
        .unwrap();

    drain_with_timeout(&session).await;

    // First page plus one continuation page reach the sink; the empty
    // page only terminates the loop.
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.total_documents(), 5);
    assert!(sink.slices().iter().all(|slice| *slice == descriptor));
    assert!(session.dead_letters().is_empty());

    session.shutdown().await;
    first_page.assert_async().await;
    continuation.assert_async().await;
    exhausted.assert_async().await;
    clear.assert_async().await;
}

#[tokio::test]
async fn seed_inserts_the_requested_documents() {
    let mut server = mockito::Server::new_async().await;
    let doc_mock = server
        .mock("POST", "/sample-records/_doc")
        .with_status(201)
        .with_body(r#"{"result":"created"}"#)
        .expect(25)
        .create_async()
        .await;

    let config = config_for(&server);
    let backend = SearchBackend::new(&config).unwrap();
    let report = seed_index(&backend, 25, 8).await;

    assert_eq!(report.requested, 25);
    assert_eq!(report.indexed, 25);
    assert_eq!(report.failed, 0);
    doc_mock.assert_async().await;
}
