//! Batching integration tests
//!
//! Coalescing, chunking, wire shape and failure isolation.

#[cfg(test)]
mod tests {
    use crate::common::{ScriptedTransport, SequentialIds, echo_items, test_client, test_config};
    use async_trait::async_trait;
    use blest_batch::core::{BatchRequest, BatchResultItem, Transport};
    use blest_batch::{
        BlestClient, BlestError, OutcomeErrorKind, RequestOptions, RequestOutcome, Selector,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    // ==================== Coalescing ====================

    #[tokio::test(start_paused = true)]
    async fn test_single_request_round_trip() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 25);

        let mut hello = client.request("hello", None, RequestOptions::new());
        assert_eq!(hello.id().unwrap().as_str(), "r1");
        assert!(hello.current().loading);

        let outcome = hello.settled().await.unwrap();
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.data,
            Some(json!({"route": "hello", "params": null}))
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            serde_json::to_value(&requests[0].items).unwrap(),
            json!([["r1", "hello", null, null]])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_sent_as_one_batch() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 25);

        let mut handles: Vec<_> = (0..10)
            .map(|n| client.request("item", Some(json!({"n": n})), RequestOptions::new()))
            .collect();
        for handle in &mut handles {
            assert!(handle.settled().await.unwrap().is_ok());
        }

        assert_eq!(transport.batch_count(), 1);
        assert_eq!(transport.requests()[0].len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_in_separate_windows_use_separate_batches() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 25);

        let mut first = client.request("a", None, RequestOptions::new());
        first.settled().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut second = client.request("b", None, RequestOptions::new());
        second.settled().await;

        assert_eq!(transport.batches(), vec![vec!["r1"], vec!["r2"]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_is_sent_before_the_window_closes() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 25);

        let _handle = client.request("a", None, RequestOptions::new());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(transport.batch_count(), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.batch_count(), 1);
    }

    // ==================== Chunking ====================

    #[tokio::test(start_paused = true)]
    async fn test_queue_is_split_by_max_batch_size() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 2);

        let mut handles: Vec<_> = (0..5)
            .map(|_| client.request("r", None, RequestOptions::new()))
            .collect();
        for handle in &mut handles {
            assert!(handle.settled().await.unwrap().is_ok());
        }

        assert_eq!(
            transport.batches(),
            vec![vec!["r1", "r2"], vec!["r3", "r4"], vec!["r5"]]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chunk_does_not_affect_other_chunks() {
        let transport = ScriptedTransport::new(|request| {
            if request.ids().any(|id| id.as_str() == "r3") {
                Err(BlestError::status(503, "unavailable"))
            } else {
                Ok(echo_items(request))
            }
        });
        let client = test_client(&transport, 2);

        let mut handles: Vec<_> = (0..4)
            .map(|_| client.request("r", None, RequestOptions::new()))
            .collect();
        let mut outcomes = Vec::new();
        for handle in &mut handles {
            outcomes.push(handle.settled().await.unwrap());
        }

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
        for failed in &outcomes[2..] {
            let error = failed.error.as_ref().unwrap();
            assert_eq!(error.kind, OutcomeErrorKind::Status);
            assert_eq!(error.details, Some(json!({"status": 503})));
            assert_eq!(failed.data, None);
        }
        // Both requests of the failed chunk carry the same error
        assert_eq!(outcomes[2].error, outcomes[3].error);
    }

    /// Fails the chunk holding `r3` and holds every other chunk until released
    #[derive(Default)]
    struct HeldChunkTransport {
        release: Notify,
        sent: AtomicUsize,
    }

    #[async_trait]
    impl Transport for HeldChunkTransport {
        async fn send(&self, request: &BatchRequest) -> blest_batch::Result<Vec<BatchResultItem>> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if request.ids().any(|id| id.as_str() == "r3") {
                return Err(BlestError::status(502, "bad upstream"));
            }
            self.release.notified().await;
            Ok(echo_items(request))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chunk_leaves_in_flight_chunk_loading() {
        let transport = Arc::new(HeldChunkTransport::default());
        let client = BlestClient::builder(test_config(2))
            .transport(transport.clone())
            .id_generator(Arc::new(SequentialIds::default()))
            .build()
            .unwrap();

        let mut handles: Vec<_> = (0..4)
            .map(|_| client.request("r", None, RequestOptions::new()))
            .collect();

        let failed = handles[2].settled().await.unwrap();
        assert_eq!(failed.error.unwrap().kind, OutcomeErrorKind::Status);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(transport.sent.load(Ordering::SeqCst), 2);

        // The sibling chunk is still in flight and untouched by the failure
        assert!(handles[3].current().error.is_some());
        for held in &handles[..2] {
            assert_eq!(held.current(), RequestOutcome::pending());
        }

        transport.release.notify_one();
        for held in &mut handles[..2] {
            assert!(held.settled().await.unwrap().is_ok());
        }
        assert_eq!(
            handles[2].current().error.unwrap().kind,
            OutcomeErrorKind::Status
        );
    }

    // ==================== Per-request results ====================

    #[tokio::test(start_paused = true)]
    async fn test_application_error_is_per_request() {
        let transport = ScriptedTransport::new(|request| {
            Ok(request
                .items
                .iter()
                .map(|item| {
                    if item.route == "boom" {
                        BatchResultItem::failure(
                            item.id.clone(),
                            &item.route,
                            json!({"message": "nope", "code": 7}),
                        )
                    } else {
                        BatchResultItem::success(item.id.clone(), &item.route, json!(1))
                    }
                })
                .collect())
        });
        let client = test_client(&transport, 25);

        let mut ok = client.request("fine", None, RequestOptions::new());
        let mut boom = client.request("boom", None, RequestOptions::new());

        assert_eq!(ok.settled().await.unwrap().data, Some(json!(1)));
        let failed = boom.settled().await.unwrap();
        let error = failed.error.unwrap();
        assert_eq!(error.kind, OutcomeErrorKind::Application);
        assert_eq!(error.message, "nope");
        assert_eq!(error.details, Some(json!({"message": "nope", "code": 7})));
        assert_eq!(transport.batch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_result_settles_as_unacknowledged() {
        let transport = ScriptedTransport::new(|request| {
            Ok(echo_items(request)
                .into_iter()
                .filter(|item| item.id.as_str() != "r2")
                .collect())
        });
        let client = test_client(&transport, 25);

        let mut first = client.request("a", None, RequestOptions::new());
        let mut second = client.request("b", None, RequestOptions::new());

        assert!(first.settled().await.unwrap().is_ok());
        let missing = second.settled().await.unwrap();
        assert!(!missing.loading);
        assert_eq!(
            missing.error.unwrap().kind,
            OutcomeErrorKind::Unacknowledged
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_ids_in_response_are_ignored() {
        let transport = ScriptedTransport::new(|request| {
            let mut items = echo_items(request);
            items.push(BatchResultItem::success("someone-else", "x", json!(0)));
            Ok(items)
        });
        let client = test_client(&transport, 25);

        let mut handle = client.request("a", None, RequestOptions::new());
        assert!(handle.settled().await.unwrap().is_ok());
        assert!(!client.snapshot().contains(&"someone-else".into()));
    }

    // ==================== Wire shape ====================

    #[tokio::test(start_paused = true)]
    async fn test_selector_and_headers_travel_in_the_fourth_slot() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 25);

        let options = RequestOptions::new()
            .with_select(Selector::fields(["id", "name"]))
            .with_header("auth", json!("token"));
        let mut handle = client.request("user", Some(json!({"id": 7})), options);
        handle.settled().await;

        let request = &transport.requests()[0];
        assert_eq!(
            serde_json::to_value(&request.items).unwrap(),
            json!([["r1", "user", {"id": 7}, {"_s": ["id", "name"], "auth": "token"}]])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_null_parameters_are_sent_as_null() {
        let transport = ScriptedTransport::echo();
        let client = test_client(&transport, 25);

        let mut handle = client.request("a", Some(serde_json::Value::Null), RequestOptions::new());
        handle.settled().await;

        assert_eq!(transport.requests()[0].items[0].parameters, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_headers_are_merged_with_json_headers() {
        let transport = ScriptedTransport::echo();
        let config = test_config(25)
            .with_header("Authorization", "Bearer t")
            .with_header("content-type", "text/plain");
        let client = BlestClient::builder(config)
            .transport(transport.clone())
            .build()
            .unwrap();

        let mut handle = client.request("a", None, RequestOptions::new());
        handle.settled().await;

        let headers = &transport.requests()[0].headers;
        assert_eq!(headers["Authorization"], "Bearer t");
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["Accept"], "application/json");
        assert!(!headers.contains_key("content-type"));
    }
}
