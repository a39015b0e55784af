use httpmock::prelude::*;
use tempfile::TempDir;
use vk_egonet::{CliConfig, CollectorEngine, EgoPipeline, LocalStorage, VkClient};

fn mock_vk_api(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/method/users.get")
            .query_param("user_ids", "ego_user");
        then.status(200).json_body(serde_json::json!({
            "response": [{"id": 1, "first_name": "Egor", "last_name": "Bronnikov"}]
        }));
    });

    for (id, first, last) in [(2, "Anna", "A"), (3, "Boris", "B"), (4, "Vera", "V")] {
        server.mock(|when, then| {
            when.method(GET)
                .path("/method/users.get")
                .query_param("user_ids", id.to_string());
            then.status(200).json_body(serde_json::json!({
                "response": [{"id": id, "first_name": first, "last_name": last}]
            }));
        });
    }

    server.mock(|when, then| {
        when.method(GET)
            .path("/method/friends.get")
            .query_param("user_id", "1");
        then.status(200).json_body(serde_json::json!({
            "response": {"count": 3, "items": [2, 3, 4]}
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/method/friends.get")
            .query_param("user_id", "2");
        then.status(200).json_body(serde_json::json!({
            "response": {"count": 3, "items": [1, 3, 99]}
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/method/friends.get")
            .query_param("user_id", "3");
        then.status(200).json_body(serde_json::json!({
            "response": {"count": 2, "items": [1, 2]}
        }));
    });
    // Friend 4 was deleted; the collector must keep going.
    server.mock(|when, then| {
        when.method(GET)
            .path("/method/friends.get")
            .query_param("user_id", "4");
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 18, "error_msg": "User was deleted or banned"}
        }));
    });
}

fn config_for(server: &MockServer, output_path: &str) -> CliConfig {
    CliConfig {
        user: "ego_user".to_string(),
        token: Some("test-token".to_string()),
        api_base: server.base_url(),
        api_version: "5.131".to_string(),
        output_path: output_path.to_string(),
        concurrent_requests: 4,
        requests_per_second: 100,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_collection() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_vk_api(&server);

    let config = config_for(&server, &output_path);
    let token = config.resolve_token().unwrap();
    let client = VkClient::new(
        config.api_base.clone(),
        token,
        config.api_version.clone(),
        config.requests_per_second,
    );
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = EgoPipeline::new(storage, config, client);

    let engine = CollectorEngine::new_with_monitoring(pipeline, false);
    let result = engine.run().await;

    assert!(result.is_ok(), "collection failed: {:?}", result.err());
    assert_eq!(result.unwrap(), output_path);

    // Adjacency list: the ego row plus one row per expanded friend, with
    // only mutual friendships kept (99 is not a friend of the ego).
    let adjacency_raw =
        std::fs::read_to_string(temp_dir.path().join("friends.json")).unwrap();
    let adjacency: serde_json::Value = serde_json::from_str(&adjacency_raw).unwrap();
    assert_eq!(adjacency["1"], serde_json::json!([2, 3, 4]));
    assert_eq!(adjacency["2"], serde_json::json!([3]));
    assert_eq!(adjacency["3"], serde_json::json!([2]));
    assert!(adjacency.get("4").is_none());
    assert!(adjacency.get("99").is_none());

    // Node table covers every friend, including the deleted one.
    let csv_text = std::fs::read_to_string(temp_dir.path().join("friends.csv")).unwrap();
    assert!(csv_text.starts_with("ID,Name"));
    assert!(csv_text.contains("1,Egor Bronnikov"));
    assert!(csv_text.contains("4,Vera V"));

    // GEXF export is ready for Gephi.
    let gexf = std::fs::read_to_string(temp_dir.path().join("graph.gexf")).unwrap();
    assert!(gexf.contains("defaultedgetype=\"undirected\""));
    assert!(gexf.contains("<node id=\"1\" label=\"Egor Bronnikov\" />"));
    assert!(gexf.contains("source=\"2\" target=\"3\""));
}

#[tokio::test]
async fn test_collection_fails_on_rejected_token() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/method/users.get");
        then.status(200).json_body(serde_json::json!({
            "error": {"error_code": 5, "error_msg": "User authorization failed"}
        }));
    });

    let config = config_for(&server, &output_path);
    let client = VkClient::new(
        config.api_base.clone(),
        "bad-token",
        config.api_version.clone(),
        config.requests_per_second,
    );
    let storage = LocalStorage::new(output_path);
    let pipeline = EgoPipeline::new(storage, config, client);

    let engine = CollectorEngine::new(pipeline);
    let err = engine.run().await.unwrap_err();

    match err {
        vk_egonet::EgonetError::VkApiError { code, .. } => assert_eq!(code, 5),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!temp_dir.path().join("friends.json").exists());
}

#[tokio::test]
async fn test_friendless_ego_still_produces_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/method/users.get")
            .query_param("user_ids", "ego_user");
        then.status(200).json_body(serde_json::json!({
            "response": [{"id": 1, "first_name": "Lone", "last_name": "Ego"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/method/friends.get")
            .query_param("user_id", "1");
        then.status(200).json_body(serde_json::json!({
            "response": {"count": 0, "items": []}
        }));
    });

    let config = config_for(&server, &output_path);
    let client = VkClient::new(
        config.api_base.clone(),
        "test-token",
        config.api_version.clone(),
        config.requests_per_second,
    );
    let storage = LocalStorage::new(output_path);
    let pipeline = EgoPipeline::new(storage, config, client);

    let engine = CollectorEngine::new(pipeline);
    engine.run().await.unwrap();

    let adjacency_raw =
        std::fs::read_to_string(temp_dir.path().join("friends.json")).unwrap();
    let adjacency: serde_json::Value = serde_json::from_str(&adjacency_raw).unwrap();
    assert_eq!(adjacency["1"], serde_json::json!([]));

    let gexf = std::fs::read_to_string(temp_dir.path().join("graph.gexf")).unwrap();
    assert!(gexf.contains("<node id=\"1\" label=\"Lone Ego\" />"));
}
