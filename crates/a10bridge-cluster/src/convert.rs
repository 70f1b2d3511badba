//! Conversion of Kubernetes objects into the reconciliation model

use k8s_openapi::api::apps::v1::DaemonSet;
use k8s_openapi::api::core::v1::{Container, Node as K8sNode};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;
use tracing::{debug, warn};

use a10bridge_common::model::{HealthCheck, IngressController, Node};
use a10bridge_common::{
    Error, Result, DEFAULT_EXPECT_CODE, DEFAULT_SERVER_WEIGHT, HEALTH_ENDPOINT_ANNOTATION,
    HEALTH_PORT_ANNOTATION, HTTP_PORT_SUFFIX, INGRESS_CONTROLLER_SUFFIX, SERVER_NAME_ANNOTATION,
    SERVER_WEIGHT_ANNOTATION, SERVICE_GROUP_ANNOTATION,
};

// Kubernetes defaults for unset probe fields
const DEFAULT_PERIOD_SECONDS: i32 = 10;
const DEFAULT_FAILURE_THRESHOLD: i32 = 3;
const DEFAULT_SUCCESS_THRESHOLD: i32 = 1;
const DEFAULT_TIMEOUT_SECONDS: i32 = 1;

/// Whether a daemon set name marks an ingress controller
///
/// Accepts names ending in the controller suffix, optionally followed by a
/// numeric qualifier such as `traefik-ingress-controller-80`.
pub(crate) fn is_ingress_controller_name(name: &str) -> bool {
    if name.ends_with(INGRESS_CONTROLLER_SUFFIX) {
        return true;
    }
    match name.rsplit_once('-') {
        Some((head, qualifier)) => {
            head.ends_with(INGRESS_CONTROLLER_SUFFIX)
                && !qualifier.is_empty()
                && qualifier.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Build a model node from a Kubernetes node and its resolved address
pub(crate) fn node_from_k8s(node: &K8sNode, ip: String) -> Node {
    let name = node.name_any();
    let annotations = node.annotations();
    Node {
        a10_server: annotations
            .get(SERVER_NAME_ANNOTATION)
            .cloned()
            .unwrap_or_else(|| name.clone()),
        weight: annotations
            .get(SERVER_WEIGHT_ANNOTATION)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVER_WEIGHT.to_string()),
        labels: node.labels().clone(),
        ip,
        name,
    }
}

/// Build an ingress controller from its daemon set
///
/// Returns `Ok(None)` when the daemon set has no service group annotation
/// and is not meant to be exposed on the appliance.
pub(crate) fn ingress_controller_from_daemon_set(
    daemon_set: &DaemonSet,
) -> Result<Option<IngressController>> {
    let name = daemon_set.name_any();
    let Some(template) = daemon_set.annotations().get(SERVICE_GROUP_ANNOTATION) else {
        warn!(controller = %name, "missing service group annotation, skipping ingress controller");
        return Ok(None);
    };

    let pod_spec = daemon_set
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .ok_or_else(|| discovery_error(&name, "daemon set has no pod template"))?;

    let (container, host_port) = find_main_container(&pod_spec.containers)
        .ok_or_else(|| discovery_error(&name, "no container exposes an http port"))?;
    let port = u16::try_from(host_port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| {
            discovery_error(&name, format!("http port has invalid host port {host_port}"))
        })?;

    let health = health_check_from(daemon_set, container)?;

    Ok(Some(IngressController {
        node_selector: pod_spec.node_selector.clone().unwrap_or_default(),
        port,
        health,
        service_group_template: template.clone(),
        nodes: Vec::new(),
        name,
    }))
}

/// First container exposing a port whose name ends in the http suffix, with that port's host port
fn find_main_container(containers: &[Container]) -> Option<(&Container, i32)> {
    containers.iter().find_map(|container| {
        container
            .ports
            .iter()
            .flatten()
            .find(|port| {
                port.name
                    .as_deref()
                    .is_some_and(|name| name.ends_with(HTTP_PORT_SUFFIX))
            })
            .map(|port| (container, port.host_port.unwrap_or_default()))
    })
}

/// Health check from the container's liveness probe, with annotation overrides
fn health_check_from(daemon_set: &DaemonSet, container: &Container) -> Result<HealthCheck> {
    let name = daemon_set.name_any();
    let annotations = daemon_set.annotations();

    let probe = container.liveness_probe.as_ref().ok_or_else(|| {
        discovery_error(
            &name,
            format!("container {} has no liveness probe", container.name),
        )
    })?;
    let http_get = probe.http_get.as_ref().ok_or_else(|| {
        discovery_error(
            &name,
            format!("liveness probe of container {} is not an http probe", container.name),
        )
    })?;

    let endpoint = match annotations.get(HEALTH_ENDPOINT_ANNOTATION) {
        Some(endpoint) => endpoint.clone(),
        None => {
            debug!(controller = %name, "no health endpoint annotation, using liveness probe");
            http_get.path.clone().unwrap_or_else(|| "/".to_string())
        }
    };

    let annotated_port = annotations.get(HEALTH_PORT_ANNOTATION).and_then(|value| {
        match value.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(e) => {
                warn!(
                    controller = %name,
                    value = %value,
                    error = %e,
                    "invalid health port annotation, using liveness probe"
                );
                None
            }
        }
    });
    let port = match annotated_port {
        Some(port) => port,
        None => probe_port(&http_get.port, container)
            .ok_or_else(|| discovery_error(&name, "liveness probe port cannot be resolved"))?,
    };

    Ok(HealthCheck {
        name: String::new(),
        endpoint,
        expect_code: DEFAULT_EXPECT_CODE.to_string(),
        port,
        interval: probe_value(
            &name,
            "periodSeconds",
            probe.period_seconds,
            DEFAULT_PERIOD_SECONDS,
        )?,
        timeout: probe_value(
            &name,
            "timeoutSeconds",
            probe.timeout_seconds,
            DEFAULT_TIMEOUT_SECONDS,
        )?,
        retry_count: probe_value(
            &name,
            "failureThreshold",
            probe.failure_threshold,
            DEFAULT_FAILURE_THRESHOLD,
        )?,
        required_passes: probe_value(
            &name,
            "successThreshold",
            probe.success_threshold,
            DEFAULT_SUCCESS_THRESHOLD,
        )?,
    })
}

/// Numeric probe port, or a named port looked up among the container's ports
fn probe_port(port: &IntOrString, container: &Container) -> Option<u16> {
    match port {
        IntOrString::Int(value) => u16::try_from(*value).ok(),
        IntOrString::String(name) => container
            .ports
            .iter()
            .flatten()
            .find(|p| p.name.as_deref() == Some(name.as_str()))
            .and_then(|p| u16::try_from(p.container_port).ok()),
    }
}

/// Probe field, or its Kubernetes default when unset; must be at least 1
fn probe_value(controller: &str, field: &str, value: Option<i32>, default: i32) -> Result<u32> {
    let value = value.unwrap_or(default);
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| {
            discovery_error(controller, format!("liveness probe {field} is invalid: {value}"))
        })
}

fn discovery_error(controller: &str, msg: impl Into<String>) -> Error {
    Error::discovery_with_context(format!("ingress-controller/{controller}"), msg)
}
