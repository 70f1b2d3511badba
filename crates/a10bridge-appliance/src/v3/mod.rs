//! aXAPI v3 client
//!
//! Resources live under `/axapi/v3/`. The session signature returned by
//! `/axapi/v3/auth` is sent as `Authorization: A10 <signature>`.

mod dto;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;

use a10bridge_common::model::{HealthCheck, Member, Node, ServiceGroup};
use a10bridge_common::ApplianceError;

use crate::http::Transport;
use crate::{wire_weight, ApplianceClient};
use dto::*;

/// Error code for an unknown server, health monitor or service group
pub const OBJECT_NOT_FOUND: i64 = 1023460352;

/// Error code for adding a member that is already in the group
pub const MEMBER_ALREADY_EXISTS: i64 = 1405;

/// Connection limit configured on every server
const SERVER_CONN_LIMIT: u32 = 8_000_000;

const SERVER_PATH: &[&str] = &["axapi", "v3", "slb", "server"];
const MONITOR_PATH: &[&str] = &["axapi", "v3", "health", "monitor"];
const SERVICE_GROUP_PATH: &[&str] = &["axapi", "v3", "slb", "service-group"];

/// Session bound aXAPI v3 client
pub struct V3Client {
    transport: Transport,
    authorization: String,
}

impl V3Client {
    /// Authenticate and open a session
    pub(crate) async fn connect(
        transport: Transport,
        user_name: &str,
        password: &str,
    ) -> Result<Self, ApplianceError> {
        let url = transport.url(&["axapi", "v3", "auth"])?;
        let request = AuthRequest {
            credentials: Credentials {
                username: user_name,
                password,
            },
        };
        let auth: AuthResponse = transport
            .send_json(Method::POST, url, None, &request)
            .await?;
        Ok(Self {
            transport,
            authorization: format!("A10 {}", auth.authresponse.signature),
        })
    }

    /// URL of `base` extended with `extra` segments
    fn url(&self, base: &[&str], extra: &[&str]) -> Result<Url, ApplianceError> {
        let segments: Vec<&str> = base.iter().chain(extra).copied().collect();
        self.transport.url(&segments)
    }

    async fn fetch<R: DeserializeOwned>(&self, url: Url) -> Result<R, ApplianceError> {
        self.transport
            .send(Method::GET, url, Some(&self.authorization))
            .await
    }

    async fn write<B>(&self, method: Method, url: Url, body: &B) -> Result<(), ApplianceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.transport
            .send_json::<B, IgnoredAny>(method, url, Some(&self.authorization), body)
            .await
            .map(|_| ())
    }
}

fn server_request(node: &Node) -> Result<ServerRequest<'_>, ApplianceError> {
    Ok(ServerRequest {
        server: ServerBody {
            name: &node.a10_server,
            host: &node.ip,
            action: "enable",
            weight: wire_weight(node)?,
            conn_limit: SERVER_CONN_LIMIT,
        },
    })
}

fn monitor_request(health: &HealthCheck) -> MonitorRequest<'_> {
    MonitorRequest {
        monitor: MonitorBody {
            name: &health.name,
            retry: health.retry_count,
            up_retry: health.required_passes,
            interval: health.interval,
            timeout: health.timeout,
            override_port: health.port,
            passive: 0,
            strict_retry_on_server_err_resp: 1,
            disable_after_down: 0,
            method: MonitorMethodBody {
                http: HttpMethodBody {
                    http: 1,
                    http_port: health.port,
                    http_url: 1,
                    http_expect: 1,
                    http_response_code: &health.expect_code,
                    url_type: "GET",
                    url_path: &health.endpoint,
                    http_kerberos_auth: 0,
                },
            },
        },
    }
}

fn service_group_request(group: &ServiceGroup) -> ServiceGroupRequest<'_> {
    ServiceGroupRequest {
        service_group: ServiceGroupBody {
            name: &group.name,
            protocol: "tcp",
            health_check: &group.health.name,
            member_list: group
                .members
                .iter()
                .map(|m| GroupMemberBody {
                    name: &m.server_name,
                    port: m.port,
                })
                .collect(),
        },
    }
}

#[async_trait]
impl ApplianceClient for V3Client {
    async fn get_server(&self, server_name: &str) -> Result<Node, ApplianceError> {
        let response: ServerResponse = self.fetch(self.url(SERVER_PATH, &[server_name])?).await?;
        let server = response.server;
        Ok(Node {
            a10_server: server.name,
            ip: server.host,
            weight: server.weight.to_string(),
            ..Default::default()
        })
    }

    async fn create_server(&self, node: &Node) -> Result<(), ApplianceError> {
        let url = self.url(SERVER_PATH, &[""])?;
        self.write(Method::POST, url, &server_request(node)?).await
    }

    async fn update_server(&self, node: &Node) -> Result<(), ApplianceError> {
        let url = self.url(SERVER_PATH, &[node.a10_server.as_str()])?;
        self.write(Method::PUT, url, &server_request(node)?).await
    }

    async fn get_health_monitor(&self, name: &str) -> Result<HealthCheck, ApplianceError> {
        let response: MonitorResponse = self.fetch(self.url(MONITOR_PATH, &[name])?).await?;
        let monitor = response.monitor;
        let http = monitor.method.http;
        Ok(HealthCheck {
            name: monitor.name,
            endpoint: http.url_path,
            expect_code: http.http_response_code,
            port: http.http_port,
            interval: monitor.interval,
            timeout: monitor.timeout,
            retry_count: monitor.retry,
            required_passes: monitor.up_retry,
        })
    }

    async fn create_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError> {
        let url = self.url(MONITOR_PATH, &[""])?;
        self.write(Method::POST, url, &monitor_request(health)).await
    }

    async fn update_health_monitor(&self, health: &HealthCheck) -> Result<(), ApplianceError> {
        let url = self.url(MONITOR_PATH, &[health.name.as_str()])?;
        self.write(Method::PUT, url, &monitor_request(health)).await
    }

    async fn get_service_group(&self, name: &str) -> Result<ServiceGroup, ApplianceError> {
        let response: ServiceGroupResponse =
            self.fetch(self.url(SERVICE_GROUP_PATH, &[name])?).await?;
        let group = response.service_group;
        let members = group
            .member_list
            .into_iter()
            .map(|m| Member::new(group.name.clone(), m.name, m.port))
            .collect();
        Ok(ServiceGroup {
            health: HealthCheck {
                name: group.health_check,
                ..Default::default()
            },
            name: group.name,
            ingress_controllers: Vec::new(),
            members,
        })
    }

    async fn create_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError> {
        let url = self.url(SERVICE_GROUP_PATH, &[""])?;
        self.write(Method::POST, url, &service_group_request(group))
            .await
    }

    async fn update_service_group(&self, group: &ServiceGroup) -> Result<(), ApplianceError> {
        let url = self.url(SERVICE_GROUP_PATH, &[group.name.as_str()])?;
        self.write(Method::PUT, url, &service_group_request(group))
            .await
    }

    async fn create_member(&self, member: &Member) -> Result<(), ApplianceError> {
        let url = self.url(SERVICE_GROUP_PATH, &[member.service_group.as_str(), "member", ""])?;
        let request = MemberRequest {
            member: MemberBody {
                name: &member.server_name,
                port: member.port,
                member_state: "enable",
                member_stats_data_disable: 0,
                member_priority: 1,
            },
        };
        self.write(Method::POST, url, &request).await
    }

    async fn delete_member(&self, member: &Member) -> Result<(), ApplianceError> {
        let id = format!("{}+{}", member.server_name, member.port);
        let url = self.url(
            SERVICE_GROUP_PATH,
            &[member.service_group.as_str(), "member", id.as_str()],
        )?;
        self.transport
            .send::<IgnoredAny>(Method::DELETE, url, Some(&self.authorization))
            .await
            .map(|_| ())
    }

    async fn close(&self) -> Result<(), ApplianceError> {
        let url = self.transport.url(&["axapi", "v3", "logoff"])?;
        self.transport
            .send::<IgnoredAny>(Method::POST, url, Some(&self.authorization))
            .await
            .map(|_| ())
    }

    fn is_server_not_found(&self, err: &ApplianceError) -> bool {
        err.code == OBJECT_NOT_FOUND
    }

    fn is_health_monitor_not_found(&self, err: &ApplianceError) -> bool {
        err.code == OBJECT_NOT_FOUND
    }

    fn is_service_group_not_found(&self, err: &ApplianceError) -> bool {
        err.code == OBJECT_NOT_FOUND
    }

    fn is_member_already_exists(&self, err: &ApplianceError) -> bool {
        err.code == MEMBER_ALREADY_EXISTS
    }
}
