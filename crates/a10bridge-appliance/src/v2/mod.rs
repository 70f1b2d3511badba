//! aXAPI 2.1 client
//!
//! Every call goes to `/services/rest/V2.1/` with the operation named by the
//! `method` query parameter and the session id passed as `session_id`.

mod dto;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::debug;

use a10bridge_common::model::{HealthCheck, Member, Node, ServiceGroup};
use a10bridge_common::ApplianceError;

use crate::http::Transport;
use crate::{wire_weight, ApplianceClient};
use dto::*;

/// Error code for an unknown server
pub const SERVER_NOT_FOUND: i64 = 67174402;

/// Error code for an unknown health monitor
pub const HEALTH_MONITOR_NOT_FOUND: i64 = 33619968;

/// Error code for an unknown service group
pub const SERVICE_GROUP_NOT_FOUND: i64 = 67305473;

/// Error code for adding a member that is already in the group
pub const MEMBER_ALREADY_EXISTS: i64 = 67239937;

/// Health monitor type for HTTP probes
const MONITOR_TYPE_HTTP: u8 = 3;

/// Service group protocol for TCP
const PROTOCOL_TCP: u8 = 2;

/// Prefix the appliance puts in front of monitor URLs
const URL_METHOD_PREFIX: &str = "GET ";

/// Session bound aXAPI 2.1 client
pub struct V2Client {
    transport: Transport,
    session_id: String,
}

impl V2Client {
    /// Authenticate and open a session
    pub(crate) async fn connect(
        transport: Transport,
        user_name: &str,
        password: &str,
    ) -> Result<Self, ApplianceError> {
        let mut url = api_url(&transport)?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("method", "authenticate")
            .append_pair("username", user_name)
            .append_pair("password", password);

        let login: LoginResponse = transport.send(Method::GET, url, None).await?;
        Ok(Self {
            transport,
            session_id: login.session_id,
        })
    }

    fn method_url(&self, method: &str) -> Result<Url, ApplianceError> {
        let mut url = api_url(&self.transport)?;
        url.query_pairs_mut()
            .append_pair("session_id", &self.session_id)
            .append_pair("format", "json")
            .append_pair("method", method);
        Ok(url)
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, ApplianceError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!(method, "aXAPI v2 call");
        let url = self.method_url(method)?;
        self.transport.send_json(Method::POST, url, None, body).await
    }

    async fn write<B>(&self, method: &str, body: &B) -> Result<(), ApplianceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.call::<B, IgnoredAny>(method, body).await.map(|_| ())
    }
}

fn api_url(transport: &Transport) -> Result<Url, ApplianceError> {
    transport.url(&["services", "rest", "V2.1", ""])
}

fn server_request(node: &Node) -> Result<ServerRequest<'_>, ApplianceError> {
    Ok(ServerRequest {
        server: ServerBody {
            name: &node.a10_server,
            host: &node.ip,
            weight: wire_weight(node)?,
            conn_limit_log: 1,
        },
    })
}

fn monitor_request(health: &HealthCheck) -> MonitorRequest<'_> {
    MonitorRequest {
        health_monitor: MonitorBody {
            name: &health.name,
            retry: health.retry_count,
            consec_pass_reqd: health.required_passes,
            interval: health.interval,
            timeout: health.timeout,
            override_port: health.port,
            kind: MONITOR_TYPE_HTTP,
            http: HttpMethodBody {
                port: health.port,
                url: format!("{URL_METHOD_PREFIX}{}", health.endpoint),
                expect_code: &health.expect_code,
                passive: PassiveBody::default(),
            },
        },
    }
}

fn service_group_request(group: &ServiceGroup) -> ServiceGroupRequest<'_> {
    ServiceGroupRequest {
        service_group: ServiceGroupBody {
            name: &group.name,
            protocol: PROTOCOL_TCP,
            health_monitor: &group.health.name,
            member_list: group
                .members
                .iter()
                .map(|m| MemberBody {
                    server: &m.server_name,
                    port: m.port,
                })
                .collect(),
        },
    }
}

fn member_request(member: &Member) -> MemberRequest<'_> {
    MemberRequest {
        member: MemberBody {
            server: &member.server_name,
            port: member.port,
        },
        name: &member.service_group,
    }
}

#[async_trait]
impl ApplianceClient for V2Client {
    async fn get_server(&self, server_name: &str) -> Result<Node, ApplianceError> {
        let response: ServerResponse = self
            .call("slb.server.search", &NameRequest { name: server_name })
            .await?;
        let server = response.server;
        Ok(Node {
            a10_server: server.name,
            ip: server.host,
            weight: server.weight.to_string(),
            ..Default::default()
        })
    }

    async fn create_server(&self, node: &Node) -> Result<(), ApplianceError> {
        self.write("slb.server.create", &server_request(node)?).await
    }

    async fn update_server(&self, node: &Node) -> Result<(), ApplianceError> {
        self.write("slb.server.update", &server_request(node)?).await
    }

    async fn get_health_monitor(&self, name: &str) -> Result<HealthCheck, ApplianceError> {
        let response: MonitorResponse = self.call("slb.hm.search", &NameRequest { name }).await?;
        let monitor = response.health_monitor;
        let endpoint = monitor
            .http
            .url
            .strip_prefix(URL_METHOD_PREFIX)
            .unwrap_or(&monitor.http.url)
            .to_string();
        Ok(HealthCheck {
            name: monitor.name,
            endpoint,
            expect_code: monitor.http.expect_code,
            port: monitor.http.port,
            interval: monitor.interval,
            timeout: monitor.timeout,
            retry_count: monitor.retry,
            required_passes: monitor.consec_pass_reqd,
        })
    }

    async fn create_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError> {
        self.write("slb.hm.create", &monitor_request(health)).await
    }

    async fn update_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError> {
        self.write("slb.hm.update", &monitor_request(health)).await
    }

    async fn get_service_group(&self, name: &str) -> Result<ServiceGroup, ApplianceError> {
        let response: ServiceGroupResponse = self
            .call("slb.service_group.search", &NameRequest { name })
            .await?;
        let group = response.service_group;
        let members = group
            .member_list
            .into_iter()
            .map(|m| Member::new(group.name.clone(), m.server, m.port))
            .collect();
        Ok(ServiceGroup {
            health: HealthCheck {
                name: group.health_monitor,
                ..Default::default()
            },
            name: group.name,
            ingress_controllers: Vec::new(),
            members,
        })
    }

    async fn create_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError> {
        self.write("slb.service_group.create", &service_group_request(group))
            .await
    }

    async fn update_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError> {
        self.write("slb.service_group.update", &service_group_request(group))
            .await
    }

    async fn create_member(&self, member: &Member) -> Result<(), ApplianceError> {
        self.write("slb.service_group.member.create", &member_request(member))
            .await
    }

    async fn delete_member(&self, member: &Member) -> Result<(), ApplianceError> {
        self.write("slb.service_group.member.delete", &member_request(member))
            .await
    }

    async fn close(&self) -> Result<(), ApplianceError> {
        let mut url = api_url(&self.transport)?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("method", "session.close")
            .append_pair("session_id", &self.session_id);
        self.transport
            .send::<IgnoredAny>(Method::GET, url, None)
            .await
            .map(|_| ())
    }

    fn is_server_not_found(&self, err: &ApplianceError) -> bool {
        err.code == SERVER_NOT_FOUND
    }

    fn is_health_monitor_not_found(&self, err: &ApplianceError) -> bool {
        err.code == HEALTH_MONITOR_NOT_FOUND
    }

    fn is_service_group_not_found(&self, err: &ApplianceError) -> bool {
        err.code == SERVICE_GROUP_NOT_FOUND
    }

    fn is_member_already_exists(&self, err: &ApplianceError) -> bool {
        err.code == MEMBER_ALREADY_EXISTS
    }
}
