//! Event triggering integration tests.

#[cfg(test)]
mod tests {
    use pusher_client::Pusher;
    use pusher_core::PusherConfig;
    use serde_json::json;

    use crate::{live_client, test_channel_name};

    #[tokio::test]
    #[ignore = "requires Pusher credentials"]
    async fn test_should_trigger_event_on_single_channel() {
        let pusher = live_client();
        let channel = test_channel_name("single");

        let response = pusher
            .trigger(channel.as_str(), "test-event", &json!({"some": "data"}), None)
            .await
            .expect("trigger");

        assert!(response.is_success());
    }

    #[tokio::test]
    #[ignore = "requires Pusher credentials"]
    async fn test_should_trigger_event_on_multiple_channels() {
        let pusher = live_client();
        let channels = vec![test_channel_name("multi"), test_channel_name("multi")];

        let response = pusher
            .trigger(channels, "test-event", "plain text", Some("1234.1234"))
            .await
            .expect("trigger");

        assert!(response.is_success());
    }

    #[tokio::test]
    #[ignore = "requires Pusher credentials"]
    async fn test_should_reject_bad_signature() {
        let mut config = PusherConfig::from_env().expect("config");
        config.secret = "not-the-secret".to_owned();
        let pusher = Pusher::new(config).expect("client");

        let err = pusher
            .trigger_on_channel(&test_channel_name("bad"), "test-event", "x")
            .await
            .expect_err("wrong secret must be rejected");

        assert!(
            err.status().is_some_and(|s| s.is_client_error()),
            "expected a 4xx status, got {err}"
        );
    }
}
