//! aXAPI v3 request and response bodies

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct AuthRequest<'a> {
    pub credentials: Credentials<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthResponse {
    pub authresponse: AuthSignature,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthSignature {
    pub signature: String,
}

// ==========================================================================
// Servers
// ==========================================================================

#[derive(Debug, Serialize)]
pub(super) struct ServerRequest<'a> {
    pub server: ServerBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct ServerBody<'a> {
    pub name: &'a str,
    pub host: &'a str,
    pub action: &'static str,
    pub weight: i64,
    pub conn_limit: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServerResponse {
    pub server: ServerDetails,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServerDetails {
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub weight: i64,
}

// ==========================================================================
// Health monitors
// ==========================================================================

#[derive(Debug, Serialize)]
pub(super) struct MonitorRequest<'a> {
    pub monitor: MonitorBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct MonitorBody<'a> {
    pub name: &'a str,
    pub retry: u32,
    pub up_retry: u32,
    pub interval: u32,
    pub timeout: u32,
    pub override_port: u16,
    pub passive: u8,
    pub strict_retry_on_server_err_resp: u8,
    pub disable_after_down: u8,
    pub method: MonitorMethodBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MonitorMethodBody<'a> {
    pub http: HttpMethodBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct HttpMethodBody<'a> {
    pub http: u8,
    pub http_port: u16,
    pub http_url: u8,
    pub http_expect: u8,
    pub http_response_code: &'a str,
    pub url_type: &'static str,
    pub url_path: &'a str,
    pub http_kerberos_auth: u8,
}

#[derive(Debug, Deserialize)]
pub(super) struct MonitorResponse {
    pub monitor: MonitorDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct MonitorDetails {
    pub name: String,
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub up_retry: u32,
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub method: MonitorMethodDetails,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MonitorMethodDetails {
    #[serde(default)]
    pub http: MonitorHttpDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct MonitorHttpDetails {
    #[serde(default)]
    pub http_port: u16,
    #[serde(default)]
    pub url_path: String,
    #[serde(default)]
    pub http_response_code: String,
}

// ==========================================================================
// Service groups and members
// ==========================================================================

#[derive(Debug, Serialize)]
pub(super) struct ServiceGroupRequest<'a> {
    #[serde(rename = "service-group")]
    pub service_group: ServiceGroupBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct ServiceGroupBody<'a> {
    pub name: &'a str,
    pub protocol: &'static str,
    pub health_check: &'a str,
    pub member_list: Vec<GroupMemberBody<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct GroupMemberBody<'a> {
    pub name: &'a str,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub(super) struct MemberRequest<'a> {
    pub member: MemberBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct MemberBody<'a> {
    pub name: &'a str,
    pub port: u16,
    pub member_state: &'static str,
    pub member_stats_data_disable: u8,
    pub member_priority: u8,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServiceGroupResponse {
    #[serde(rename = "service-group")]
    pub service_group: ServiceGroupDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct ServiceGroupDetails {
    pub name: String,
    #[serde(default)]
    pub health_check: String,
    #[serde(default)]
    pub member_list: Vec<MemberDetails>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MemberDetails {
    pub name: String,
    pub port: u16,
}
