//! Record schema of the emitted resource kinds.
//!
//! Every record serializes with a fixed key order (declaration order), and
//! label maps are `BTreeMap`s, so the same record always produces the same
//! bytes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::container::{Container, Protocol};

pub type Labels = BTreeMap<String, String>;
pub type Annotations = BTreeMap<String, String>;

/// `apiVersion` and `kind` of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
	pub api_version: &'static str,
	pub kind: &'static str,
}

impl TypeMeta {
	pub const NAMESPACE: Self = Self::core("Namespace");
	pub const SERVICE: Self = Self::core("Service");
	pub const PERSISTENT_VOLUME: Self = Self::core("PersistentVolume");
	pub const PERSISTENT_VOLUME_CLAIM: Self = Self::core("PersistentVolumeClaim");
	pub const LIST: Self = Self::core("List");
	pub const DEPLOYMENT: Self = Self {
		api_version: "apps/v1",
		kind: "Deployment",
	};

	const fn core(kind: &'static str) -> Self {
		Self {
			api_version: "v1",
			kind,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub labels: Labels,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
	#[serde(flatten)]
	pub type_meta: TypeMeta,
	pub metadata: ObjectMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UpdateStrategy {
	/// Kubernetes default, left implicit in the output.
	#[default]
	RollingUpdate,
	/// Old pods are stopped before new ones start; used by everything owning a volume.
	Recreate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeploymentStrategy {
	#[serde(rename = "type")]
	pub kind: UpdateStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
	pub match_labels: Labels,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodMeta {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub labels: Labels,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSource {
	pub claim_name: String,
}

/// Pod-level volume backed by a persistent volume claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
	pub name: String,
	pub persistent_volume_claim: ClaimSource,
}

impl Volume {
	pub fn claim(name: impl Into<String>, claim_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			persistent_volume_claim: ClaimSource {
				claim_name: claim_name.into(),
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_name: Option<String>,
	pub containers: Vec<Container>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
	pub restart_policy: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub enable_service_links: Option<bool>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodTemplateSpec {
	pub metadata: PodMeta,
	pub spec: PodSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSpec {
	pub replicas: u32,
	pub selector: LabelSelector,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub strategy: Option<DeploymentStrategy>,
	pub template: PodTemplateSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
	#[serde(flatten)]
	pub type_meta: TypeMeta,
	pub metadata: ObjectMeta,
	pub spec: DeploymentSpec,
}

impl Deployment {
	/// Labels the pod template carries, which is what services select on.
	pub fn pod_labels(&self) -> &Labels {
		&self.spec.template.metadata.labels
	}

	pub fn update_strategy(&self) -> UpdateStrategy {
		self.spec.strategy.map(|s| s.kind).unwrap_or_default()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ServiceKind {
	/// Reachable only inside the cluster. Kubernetes default, left implicit.
	#[default]
	#[serde(rename = "ClusterIP")]
	ClusterIp,
	/// Additionally exposed on every node.
	NodePort,
}

/// One port of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub port: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target_port: Option<u16>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_port: Option<u16>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub protocol: Option<Protocol>,
}

impl ServicePort {
	/// Port forwarded to the same container port.
	pub fn new(port: u16) -> Self {
		Self {
			name: None,
			port,
			target_port: None,
			node_port: None,
			protocol: None,
		}
	}

	/// Port forwarded to an explicitly listed container port.
	pub fn mapped(port: u16, target_port: u16) -> Self {
		Self {
			target_port: Some(target_port),
			..Self::new(port)
		}
	}

	#[must_use]
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Fixed port on every node. Only honoured by node-exposed services.
	#[must_use]
	pub fn node_port(mut self, node_port: u16) -> Self {
		self.node_port = Some(node_port);
		self
	}

	#[must_use]
	pub fn protocol(mut self, protocol: Protocol) -> Self {
		self.protocol = protocol.explicit();
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<ServiceKind>,
	pub ports: Vec<ServicePort>,
	pub selector: Labels,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
	#[serde(flatten)]
	pub type_meta: TypeMeta,
	pub metadata: ObjectMeta,
	pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
	ReadWriteOnce,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageRequest {
	pub storage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostPathSource {
	pub path: String,
	#[serde(rename = "type")]
	pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeSpec {
	pub volume_mode: &'static str,
	pub access_modes: Vec<AccessMode>,
	pub capacity: StorageRequest,
	pub storage_class_name: String,
	pub host_path: HostPathSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistentVolume {
	#[serde(flatten)]
	pub type_meta: TypeMeta,
	pub metadata: ObjectMeta,
	pub spec: PersistentVolumeSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRequirements {
	pub requests: StorageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimSpec {
	pub access_modes: Vec<AccessMode>,
	pub storage_class_name: String,
	pub resources: ResourceRequirements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistentVolumeClaim {
	#[serde(flatten)]
	pub type_meta: TypeMeta,
	pub metadata: ObjectMeta,
	pub spec: PersistentVolumeClaimSpec,
}

/// Any record that can be placed into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resource {
	Namespace(Namespace),
	Deployment(Deployment),
	Service(Service),
	PersistentVolume(PersistentVolume),
	PersistentVolumeClaim(PersistentVolumeClaim),
}

impl Resource {
	pub fn type_meta(&self) -> TypeMeta {
		match self {
			Resource::Namespace(r) => r.type_meta,
			Resource::Deployment(r) => r.type_meta,
			Resource::Service(r) => r.type_meta,
			Resource::PersistentVolume(r) => r.type_meta,
			Resource::PersistentVolumeClaim(r) => r.type_meta,
		}
	}

	pub fn metadata(&self) -> &ObjectMeta {
		match self {
			Resource::Namespace(r) => &r.metadata,
			Resource::Deployment(r) => &r.metadata,
			Resource::Service(r) => &r.metadata,
			Resource::PersistentVolume(r) => &r.metadata,
			Resource::PersistentVolumeClaim(r) => &r.metadata,
		}
	}

	pub fn kind(&self) -> &'static str {
		self.type_meta().kind
	}

	pub fn name(&self) -> &str {
		&self.metadata().name
	}
}

macro_rules! impl_from_record {
	($($kind:ident),* $(,)?) => {$(
		impl From<$kind> for Resource {
			fn from(record: $kind) -> Self {
				Resource::$kind(record)
			}
		}
	)*};
}

impl_from_record!(
	Namespace,
	Deployment,
	Service,
	PersistentVolume,
	PersistentVolumeClaim,
);
