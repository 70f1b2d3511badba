//! aXAPI 2.1 client against a mock appliance

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use a10bridge_appliance::v2::{
    HEALTH_MONITOR_NOT_FOUND, MEMBER_ALREADY_EXISTS, SERVER_NOT_FOUND, SERVICE_GROUP_NOT_FOUND,
};
use a10bridge_appliance::{ApplianceClient, ApplianceConnector, HttpApplianceConnector};
use a10bridge_common::config::{ApiVersion, ApplianceInstance};
use a10bridge_common::model::{HealthCheck, Member, Node, ServiceGroup};

const API_PATH: &str = "/services/rest/V2.1/";
const SESSION: &str = "f1e2d3c4";

fn instance(server: &MockServer) -> ApplianceInstance {
    ApplianceInstance {
        name: "lb-v2".to_string(),
        api_url: server.uri(),
        api_version: ApiVersion::V2,
        user_name: "admin".to_string(),
        password: "pwd".to_string(),
        insecure_skip_verify: true,
    }
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"response": {"status": "OK"}}))
}

fn fail(code: i64, msg: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"response": {"status": "fail", "err": {"code": code, "msg": msg}}}))
}

fn call(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(query_param("session_id", SESSION))
        .and(query_param("format", "json"))
        .and(query_param("method", name))
}

async fn connect(server: &MockServer) -> Box<dyn ApplianceClient> {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("method", "authenticate"))
        .and(query_param("username", "admin"))
        .and(query_param("password", "pwd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": SESSION})))
        .expect(1)
        .mount(server)
        .await;

    HttpApplianceConnector::default()
        .connect(&instance(server))
        .await
        .expect("login should succeed")
}

fn monitor() -> HealthCheck {
    HealthCheck {
        name: "dc1-nginx".to_string(),
        endpoint: "/healthz".to_string(),
        expect_code: "200".to_string(),
        port: 10254,
        interval: 10,
        timeout: 1,
        retry_count: 3,
        required_passes: 1,
    }
}

// ==========================================================================
// Session
// ==========================================================================

#[tokio::test]
async fn login_failure_carries_appliance_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(fail(520486915, "Invalid username or password"))
        .mount(&server)
        .await;

    let err = HttpApplianceConnector::default()
        .connect(&instance(&server))
        .await
        .err()
        .expect("login should fail");
    assert_eq!(err.code, 520486915);
}

#[tokio::test]
async fn close_ends_the_session() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("method", "session.close"))
        .and(query_param("session_id", SESSION))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client.close().await.unwrap();
}

// ==========================================================================
// Servers
// ==========================================================================

#[tokio::test]
async fn get_server_maps_fields() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.server.search")
        .and(body_json(json!({"name": "worker-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": {"name": "worker-1", "host": "10.0.0.1", "weight": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let node = client.get_server("worker-1").await.unwrap();
    assert_eq!(node.a10_server, "worker-1");
    assert_eq!(node.ip, "10.0.0.1");
    assert_eq!(node.weight, "3");
    assert_eq!(node.name, "");
}

#[tokio::test]
async fn missing_server_is_classified_as_not_found() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.server.search")
        .respond_with(fail(SERVER_NOT_FOUND, "No such Server"))
        .mount(&server)
        .await;

    let err = client.get_server("worker-9").await.unwrap_err();
    assert!(client.is_server_not_found(&err));
    assert!(!client.is_health_monitor_not_found(&err));
    assert!(!client.is_service_group_not_found(&err));
}

#[tokio::test]
async fn create_server_sends_numeric_weight() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.server.create")
        .and(body_json(json!({
            "server": {"name": "lb-worker-1", "host": "10.0.0.1", "weight": 2, "conn_limit_log": 1}
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let node = Node::new("worker-1", "10.0.0.1")
        .with_server_name("lb-worker-1")
        .with_weight("2");
    client.create_server(&node).await.unwrap();
}

#[tokio::test]
async fn update_server_failure_keeps_code() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.server.update")
        .respond_with(fail(1009, "Invalid session ID"))
        .mount(&server)
        .await;

    let err = client
        .update_server(&Node::new("worker-1", "10.0.0.1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, 1009);
}

#[tokio::test]
async fn server_errors_are_local() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.server.update")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client
        .update_server(&Node::new("worker-1", "10.0.0.1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, 0);
}

// ==========================================================================
// Health monitors
// ==========================================================================

#[tokio::test]
async fn get_health_monitor_strips_method_prefix() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.hm.search")
        .and(body_json(json!({"name": "dc1-nginx"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "health_monitor": {
                "name": "dc1-nginx",
                "retry": 3,
                "consec_pass_reqd": 1,
                "interval": 10,
                "timeout": 1,
                "http": {"port": 10254, "url": "GET /healthz", "expect_code": "200"}
            }
        })))
        .mount(&server)
        .await;

    let health = client.get_health_monitor("dc1-nginx").await.unwrap();
    assert_eq!(health, monitor());
}

#[tokio::test]
async fn update_health_monitor_sends_full_definition() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.hm.update")
        .and(body_json(json!({
            "health_monitor": {
                "name": "dc1-nginx",
                "retry": 3,
                "consec_pass_reqd": 1,
                "interval": 10,
                "timeout": 1,
                "override_port": 10254,
                "type": 3,
                "http": {
                    "port": 10254,
                    "url": "GET /healthz",
                    "expect_code": "200",
                    "passive": {
                        "status": 0,
                        "status_code_2xx": 0,
                        "threshold": 75,
                        "sample_threshold": 50,
                        "interval": 10
                    }
                }
            }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client.update_health_monitor(&monitor()).await.unwrap();
}

#[tokio::test]
async fn missing_health_monitor_is_classified_as_not_found() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.hm.search")
        .respond_with(fail(HEALTH_MONITOR_NOT_FOUND, "Can not find the health monitor"))
        .mount(&server)
        .await;

    let err = client.get_health_monitor("dc1-nginx").await.unwrap_err();
    assert!(client.is_health_monitor_not_found(&err));
}

// ==========================================================================
// Service groups and members
// ==========================================================================

#[tokio::test]
async fn get_service_group_returns_members() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.service_group.search")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service_group": {
                "name": "dc1-nginx",
                "health_monitor": "dc1-nginx",
                "member_list": [
                    {"server": "worker-1", "port": 80, "status": 1},
                    {"server": "worker-2", "port": 80, "status": 1}
                ]
            }
        })))
        .mount(&server)
        .await;

    let group = client.get_service_group("dc1-nginx").await.unwrap();
    assert_eq!(group.health.name, "dc1-nginx");
    assert_eq!(
        group.members,
        vec![
            Member::new("dc1-nginx", "worker-1", 80),
            Member::new("dc1-nginx", "worker-2", 80)
        ]
    );
    assert!(group.members.iter().all(|m| m.service_group == "dc1-nginx"));
}

#[tokio::test]
async fn create_service_group_sends_member_list() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.service_group.create")
        .and(body_json(json!({
            "service_group": {
                "name": "dc1-nginx",
                "protocol": 2,
                "health_monitor": "dc1-nginx",
                "member_list": [{"server": "worker-1", "port": 80}]
            }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let group = ServiceGroup {
        name: "dc1-nginx".to_string(),
        health: monitor(),
        members: vec![Member::new("dc1-nginx", "worker-1", 80)],
        ..Default::default()
    };
    client.create_service_group(&group).await.unwrap();
}

#[tokio::test]
async fn missing_service_group_is_classified_as_not_found() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    call("slb.service_group.search")
        .respond_with(fail(SERVICE_GROUP_NOT_FOUND, "No such service group"))
        .mount(&server)
        .await;

    let err = client.get_service_group("dc1-nginx").await.unwrap_err();
    assert!(client.is_service_group_not_found(&err));
}

#[tokio::test]
async fn member_calls_name_the_group() {
    let server = MockServer::start().await;
    let client = connect(&server).await;

    let body = json!({"member": {"server": "worker-1", "port": 80}, "name": "dc1-nginx"});
    call("slb.service_group.member.create")
        .and(body_json(body.clone()))
        .respond_with(fail(MEMBER_ALREADY_EXISTS, "member already exists"))
        .expect(1)
        .mount(&server)
        .await;
    call("slb.service_group.member.delete")
        .and(body_json(body))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let member = Member::new("dc1-nginx", "worker-1", 80);
    let err = client.create_member(&member).await.unwrap_err();
    assert!(client.is_member_already_exists(&err));
    client.delete_member(&member).await.unwrap();
}
