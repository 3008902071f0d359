//! # Data Channel Over the Bus
//!
//! Fetch requests travel client → bus → channel adapter → producer, and
//! replies come back on the same listener id.
//!
//! ## Flows Tested
//!
//! 1. Correlated response keyed by listener id
//! 2. Suppressed fetch: no message at all, client times out
//! 3. Failures (unknown producer, producer error, producer timeout) reported out of band
//! 4. Many listeners fetching concurrently
//! 5. Concurrent registration of one listener id

#[cfg(test)]
mod tests {
    use crate::fixtures::{identity, standard_producers, ChannelHarness};
    use async_trait::async_trait;
    use gc_02_data_channel::{
        ChannelConfig, ClientError, DataProducer, EmptyResultPolicy, ListenerRegistry,
        ProducerError,
    };
    use grid_bus::{ChannelMessage, MessageFilter};
    use grid_types::{codes, DataRequest, ListenerId};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn listener(id: &str) -> ListenerId {
        ListenerId::new(id).unwrap()
    }

    struct SlowProducer {
        delay: Duration,
    }

    #[async_trait]
    impl DataProducer for SlowProducer {
        async fn fetch_data(&self, _request: &DataRequest) -> Result<Option<Value>, ProducerError> {
            tokio::time::sleep(self.delay).await;
            Ok(Some(json!(["late"])))
        }
    }

    // =============================================================================
    // CORRELATION
    // =============================================================================

    #[tokio::test]
    async fn test_response_keyed_by_listener() {
        let harness = ChannelHarness::start(ChannelConfig::default(), standard_producers());

        let response = harness
            .client
            .fetch(DataRequest::new(listener("grid-42")).with_producer(identity("rows")))
            .await
            .unwrap();

        assert_eq!(response.keyed(), json!({"grid-42": ["row1", "row2"]}));
        harness.stop();
    }

    #[tokio::test]
    async fn test_empty_result_sends_nothing() {
        let harness = ChannelHarness::start(ChannelConfig::default(), standard_producers());
        let mut observer = harness.bus.subscribe(MessageFilter::outbound());

        let result = harness
            .client
            .fetch_with_timeout(
                DataRequest::new(listener("grid-42")).with_producer(identity("empty")),
                Some(Duration::from_millis(150)),
            )
            .await;

        assert!(matches!(result, Err(ClientError::Timeout { .. })));
        assert!(matches!(observer.try_recv(), Ok(None)));
        assert_eq!(harness.channel.stats().suppressed, 1);
        harness.stop();
    }

    #[tokio::test]
    async fn test_acknowledge_policy_answers_empty_result() {
        let config = ChannelConfig::default().with_empty_result_policy(EmptyResultPolicy::Acknowledge);
        let harness = ChannelHarness::start(config, standard_producers());

        let response = harness
            .client
            .fetch(DataRequest::new(listener("grid-42")).with_producer(identity("empty")))
            .await
            .unwrap();

        assert_eq!(response.keyed(), json!({"grid-42": []}));
        harness.stop();
    }

    #[tokio::test]
    async fn test_opaque_fields_reach_producer() {
        let harness = ChannelHarness::start(ChannelConfig::default(), standard_producers());

        let response = harness
            .client
            .fetch(
                DataRequest::new(listener("grid-5"))
                    .with_producer(identity("echo"))
                    .with_field("value", json!({"sort": "name"})),
            )
            .await
            .unwrap();

        assert_eq!(response.payload, json!({"sort": "name"}));
        harness.stop();
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_unknown_producer_fails_out_of_band() {
        let harness = ChannelHarness::start(ChannelConfig::default(), standard_producers());
        let mut observer = harness.bus.subscribe(MessageFilter::outbound());

        let result = harness
            .client
            .fetch(DataRequest::new(listener("grid-1")).with_producer(identity("nobody")))
            .await;
        assert!(matches!(
            result,
            Err(ClientError::Failed { code, .. }) if code == codes::PRODUCER_NOT_FOUND
        ));

        let seen = timeout(Duration::from_secs(1), observer.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(seen, ChannelMessage::FetchFailed(_)));
        harness.stop();
    }

    #[tokio::test]
    async fn test_producer_error_reported() {
        let harness = ChannelHarness::start(ChannelConfig::default(), standard_producers());

        let result = harness
            .client
            .fetch(DataRequest::new(listener("grid-1")).with_producer(identity("broken")))
            .await;

        match result {
            Err(ClientError::Failed { code, message }) => {
                assert_eq!(code, codes::PRODUCER_FAILED);
                assert!(message.contains("database offline"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        harness.stop();
    }

    #[tokio::test]
    async fn test_slow_producer_times_out() {
        let producers = standard_producers();
        producers.register(
            identity("slow"),
            SlowProducer {
                delay: Duration::from_secs(5),
            },
        );
        let config = ChannelConfig::default().with_fetch_timeout(Duration::from_millis(50));
        let harness = ChannelHarness::start(config, producers);

        let result = harness
            .client
            .fetch(DataRequest::new(listener("grid-1")).with_producer(identity("slow")))
            .await;

        assert!(matches!(
            result,
            Err(ClientError::Failed { code, .. }) if code == codes::TIMEOUT
        ));
        assert_eq!(harness.channel.stats().timed_out, 1);
        harness.stop();
    }

    #[tokio::test]
    async fn test_unregistered_listener_rejected_when_required() {
        let config = ChannelConfig::default().with_require_registration(true);
        let harness = ChannelHarness::start(config, standard_producers());

        let request = DataRequest::new(listener("grid-1")).with_producer(identity("rows"));
        let rejected = harness.client.fetch(request.clone()).await;
        assert!(matches!(
            rejected,
            Err(ClientError::Failed { code, .. }) if code == codes::LISTENER_NOT_REGISTERED
        ));

        harness.listeners.register(&listener("grid-1"), None);
        assert!(harness.client.fetch(request).await.is_ok());
        harness.stop();
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_listeners_fetch_concurrently() {
        let harness = ChannelHarness::start(ChannelConfig::default(), standard_producers());

        let fetches: Vec<_> = (0..64)
            .map(|i| {
                let client = harness.client.clone();
                tokio::spawn(async move {
                    let id = format!("grid-{i}");
                    let response = client
                        .fetch(
                            DataRequest::new(listener(&id))
                                .with_producer(identity("echo"))
                                .with_field("value", i),
                        )
                        .await
                        .unwrap();
                    (id, response)
                })
            })
            .collect();

        for fetch in fetches {
            let (id, response) = fetch.await.unwrap();
            // Every reply lands on its own listener, never a neighbour's.
            assert_eq!(response.listener_id.as_str(), id);
            let expected: u64 = id.trim_start_matches("grid-").parse().unwrap();
            assert_eq!(response.payload, json!(expected));
        }
        assert_eq!(harness.channel.stats().responded, 64);
        harness.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_creates_one_entry() {
        let registry = Arc::new(ListenerRegistry::new());

        let racers: Vec<_> = (0..32)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.register_if_absent(&listener("grid-shared")) })
            })
            .collect();

        let mut created = 0;
        for racer in racers {
            if racer.await.unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert!(registry.is_registered(&listener("grid-shared")));
        assert_eq!(registry.len(), 1);
    }
}
