//! Integration tests for the Cortex client using wiremock
//!
//! These tests run the collections and resources against mocked endpoints,
//! checking the requests they send and how they interpret status codes.

use cortex_client::api::{Environment, Group};
use cortex_client::{
    Collection, CortexClient, Error, Lifecycle, Resource, ResourceFilter, Settings,
};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORG_UUID: &str = "1b4e28ba-2fa1-4d3b-9c1e-8f7a2b6c3d41";
const ENV_UUID: &str = "9a3c7d12-5e4f-4b6a-8c2d-0e1f2a3b4c5d";
const GROUP_UUID: &str = "3f2e1d0c-4b5a-4697-8887-766554433221";
const HOST_UUID: &str = "7c6b5a49-3827-4165-a4b3-c2d1e0f9a8b7";

fn client(server: &MockServer) -> CortexClient {
    let settings = Settings::new(&format!("{}/api", server.uri())).with_token(Some("test-token".into()));
    CortexClient::connect(&settings).expect("client should build")
}

/// Environment lifecycle against a mocked server
mod environment_tests {
    use super::*;

    /// Creating an environment adopts the server UUID and names it after its organization
    #[tokio::test]
    async fn test_create_environment_and_resolve_identifier() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/environments"))
            .and(bearer_token("test-token"))
            .and(body_json(json!({
                "name": "prod",
                "organization": ORG_UUID,
                "hosts": ["h1", "h2"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": ENV_UUID})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/api/organizations/{}", ORG_UUID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": ORG_UUID,
                "name": "acme"
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let mut env = Environment::new(&client.environments());
        env.set_name("prod").unwrap();
        env.set_organization(ORG_UUID.parse().unwrap()).unwrap();
        env.set_hosts(&["h1", "h2"]).unwrap();

        env.save().await.expect("save should succeed");

        assert_eq!(env.lifecycle(), Lifecycle::Persisted);
        assert_eq!(env.get_uuid().unwrap().unwrap().to_string(), ENV_UUID);
        assert_eq!(env.identifier().await.unwrap(), "acme/prod");
    }

    /// Updating sends exactly the dirty fields, and refresh reads back what was saved
    #[tokio::test]
    async fn test_update_sends_only_dirty_fields_then_refresh() {
        let server = MockServer::start().await;
        let env_path = format!("/api/environments/{}", ENV_UUID);

        Mock::given(method("GET"))
            .and(path(env_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": ENV_UUID,
                "name": "prod",
                "description": "Production",
                "organization": ORG_UUID,
                "hosts": ["h1"]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(env_path.as_str()))
            .and(body_json(json!({"description": "Main production"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(env_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": ENV_UUID,
                "name": "prod",
                "description": "Main production",
                "organization": ORG_UUID,
                "hosts": ["h1"]
            })))
            .mount(&server)
            .await;

        let environments = client(&server).environments();
        let mut env = environments.get(ENV_UUID).await.unwrap();
        env.set_description("Main production").unwrap();
        env.save().await.expect("update should succeed");

        env.refresh().await.unwrap();
        assert_eq!(env.description().unwrap().as_deref(), Some("Main production"));
        assert_eq!(env.hosts().unwrap(), vec!["h1"]);
    }

    /// Listing passes filters as query parameters and keeps server order
    #[tokio::test]
    async fn test_list_with_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/environments"))
            .and(query_param("organization", ORG_UUID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"uuid": ENV_UUID, "name": "prod", "organization": ORG_UUID},
                {"name": "dev", "organization": ORG_UUID}
            ])))
            .mount(&server)
            .await;

        let environments = client(&server).environments();
        let names: Vec<String> = environments
            .list(&[ResourceFilter::eq("organization", ORG_UUID)])
            .await
            .unwrap()
            .map(|env| env.name().unwrap().unwrap())
            .collect();

        assert_eq!(names, vec!["prod", "dev"]);
    }
}

/// Deletion semantics
mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let server = MockServer::start().await;
        let group_path = format!("/api/groups/{}", GROUP_UUID);

        Mock::given(method("GET"))
            .and(path(group_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": GROUP_UUID,
                "name": "ops",
                "users": ["alice"]
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path(group_path.as_str()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let groups = client(&server).groups();
        let mut group: Group = groups.get(GROUP_UUID).await.unwrap();
        group.delete().await.expect("delete should succeed");

        assert!(matches!(group.name(), Err(Error::UseAfterDelete)));
        assert!(matches!(group.users(), Err(Error::UseAfterDelete)));
        assert!(group.delete().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_identifier_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("/api/groups/{}", GROUP_UUID)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "No such group"
            })))
            .mount(&server)
            .await;

        let err = client(&server).groups().delete(GROUP_UUID).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

/// Host settings, keyed and versioned
mod settings_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_setting_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/api/hosts/{}/settings/timeout", HOST_UUID)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .settings(HOST_UUID)
            .get("timeout")
            .await
            .err()
            .expect("lookup should fail");
        assert!(err.is_not_found());
    }

    /// Two holders of version 4: the first update wins, the second is a conflict
    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let server = MockServer::start().await;
        let setting_path = format!("/api/hosts/{}/settings/timeout", HOST_UUID);

        Mock::given(method("GET"))
            .and(path(setting_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "timeout",
                "value": "30",
                "status": "APPLIED",
                "version": 4
            })))
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(setting_path.as_str()))
            .and(body_json(json!({"value": "60", "version": 4})))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(setting_path.as_str()))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "version 4 is stale"
            })))
            .mount(&server)
            .await;

        let settings = client(&server).settings(HOST_UUID);
        let mut first = settings.get("timeout").await.unwrap();
        let mut second = settings.get("timeout").await.unwrap();

        first.set_value("60").unwrap();
        first.save().await.expect("first update should win");

        second.set_value("90").unwrap();
        match second.save().await {
            Err(Error::Conflict { message, .. }) => assert_eq!(message, "version 4 is stale"),
            other => panic!("expected conflict, got {:?}", other),
        }
        // The rejected change is still pending locally
        assert_eq!(second.value().unwrap().as_deref(), Some("90"));
    }
}

/// Audit log listing
mod audit_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_audit_log() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/audit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let entries = client(&server).audit().list(&[]).await.unwrap();
        assert_eq!(entries.count(), 0);
    }

    #[tokio::test]
    async fn test_audit_entries_wrapped_in_items() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/audit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"timestamp": 1_709_287_200_000_i64, "message": "login", "initiatorUsername": "alice"}
                ]
            })))
            .mount(&server)
            .await;

        let entries: Vec<_> = client(&server).audit().list(&[]).await.unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message().unwrap().as_deref(), Some("login"));
        assert_eq!(
            entries[0].timestamp().unwrap().unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }
}

/// Status classes and transport failures
mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_failure_is_rejected_with_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/groups"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "Group name already exists"}
            })))
            .mount(&server)
            .await;

        let mut group = Group::new(&client(&server).groups());
        group.set_name("ops").unwrap();

        match group.save().await {
            Err(Error::RemoteRejected { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Group name already exists");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(group.lifecycle(), Lifecycle::New);
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = client(&server).users().list(&[]).await.err().unwrap();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_transport() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server).users().list(&[]).await.err().unwrap();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_error_object_with_success_status_is_transport() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/groups"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "oops", "count": 3})),
            )
            .mount(&server)
            .await;

        let err = client(&server).groups().list(&[]).await.err().unwrap();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_created_group_with_numeric_uuid_is_transport() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/groups"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let mut group = Group::new(&client(&server).groups());
        group.set_name("operators").unwrap();
        match group.save().await {
            Err(Error::Transport { message }) => assert!(message.contains("uuid")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport() {
        // Bind then release a port so nothing is listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = CortexClient::connect(&Settings::new(&format!("http://127.0.0.1:{}/api", port))).unwrap();
        let err = client.users().list(&[]).await.err().unwrap();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid token"})))
            .mount(&server)
            .await;

        let err = client(&server).users().list(&[]).await.err().unwrap();
        assert!(matches!(err, Error::RemoteRejected { status: 401, .. }));
    }
}
