//! aXAPI 2.1 request and response bodies

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct NameRequest<'a> {
    pub name: &'a str,
}

// ==========================================================================
// Servers
// ==========================================================================

#[derive(Debug, Serialize)]
pub(super) struct ServerRequest<'a> {
    pub server: ServerBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct ServerBody<'a> {
    pub name: &'a str,
    pub host: &'a str,
    pub weight: i64,
    pub conn_limit_log: u8,
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
    pub health_monitor: MonitorBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MonitorBody<'a> {
    pub name: &'a str,
    pub retry: u32,
    pub consec_pass_reqd: u32,
    pub interval: u32,
    pub timeout: u32,
    pub override_port: u16,
    #[serde(rename = "type")]
    pub kind: u8,
    pub http: HttpMethodBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct HttpMethodBody<'a> {
    pub port: u16,
    pub url: String,
    pub expect_code: &'a str,
    pub passive: PassiveBody,
}

#[derive(Debug, Serialize)]
pub(super) struct PassiveBody {
    pub status: u8,
    pub status_code_2xx: u8,
    pub threshold: u8,
    pub sample_threshold: u8,
    pub interval: u8,
}

impl Default for PassiveBody {
    fn default() -> Self {
        Self {
            status: 0,
            status_code_2xx: 0,
            threshold: 75,
            sample_threshold: 50,
            interval: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MonitorResponse {
    pub health_monitor: MonitorDetails,
}

#[derive(Debug, Deserialize)]
pub(super) struct MonitorDetails {
    pub name: String,
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub consec_pass_reqd: u32,
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub http: MonitorHttpDetails,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct MonitorHttpDetails {
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub expect_code: String,
}

// ==========================================================================
// Service groups and members
// ==========================================================================

#[derive(Debug, Serialize)]
pub(super) struct ServiceGroupRequest<'a> {
    pub service_group: ServiceGroupBody<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct ServiceGroupBody<'a> {
    pub name: &'a str,
    pub protocol: u8,
    pub health_monitor: &'a str,
    pub member_list: Vec<MemberBody<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct MemberBody<'a> {
    pub server: &'a str,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub(super) struct MemberRequest<'a> {
    pub member: MemberBody<'a>,
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServiceGroupResponse {
    pub service_group: ServiceGroupDetails,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServiceGroupDetails {
    pub name: String,
    #[serde(default)]
    pub health_monitor: String,
    #[serde(default)]
    pub member_list: Vec<MemberDetails>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MemberDetails {
    pub server: String,
    pub port: u16,
}
