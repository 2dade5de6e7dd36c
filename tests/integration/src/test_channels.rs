//! Channel query integration tests.

#[cfg(test)]
mod tests {
    use pusher_client::ParameterMap;
    use serde_json::Value;

    use crate::live_client;

    #[tokio::test]
    #[ignore = "requires Pusher credentials"]
    async fn test_should_list_channels() {
        let pusher = live_client();

        let response = pusher.get("/channels", None).await.expect("get channels");
        let body: Value = response.json().expect("json body");

        assert!(body.get("channels").is_some_and(Value::is_object));
    }

    #[tokio::test]
    #[ignore = "requires Pusher credentials"]
    async fn test_should_filter_channels_by_prefix() {
        let pusher = live_client();
        let params = ParameterMap::new().with("filter_by_prefix", "presence-");

        let response = pusher
            .get("/channels", Some(&params))
            .await
            .expect("get channels");
        let body: Value = response.json().expect("json body");

        let channels = body["channels"].as_object().expect("channels object");
        assert!(channels.keys().all(|name| name.starts_with("presence-")));
    }
}
