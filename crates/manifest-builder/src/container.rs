//! Container-level records: images, ports, environment, probes and mounts.

use std::{fmt, str::FromStr};

use bon::Builder;
use serde::{Serialize, Serializer};

use crate::error::{BuildError, Result};

/// Container image pinned to a content digest, e.g.
/// `mongo:4.4.6@sha256:6efa05...`.
///
/// Tags are kept only as a hint for readers; the digest is what the
/// cluster pulls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
	repository: String,
	digest: String,
}

impl ImageRef {
	pub fn parse(reference: &str) -> Result<Self> {
		let unpinned = || BuildError::UnpinnedImage(reference.to_owned());

		let (repository, digest) = reference.rsplit_once('@').ok_or_else(unpinned)?;
		let (algorithm, hex) = digest.split_once(':').ok_or_else(unpinned)?;
		if repository.is_empty()
			|| algorithm.is_empty()
			|| !algorithm.chars().all(|c| c.is_ascii_alphanumeric())
			|| hex.is_empty()
			|| !hex.chars().all(|c| c.is_ascii_hexdigit())
		{
			return Err(unpinned());
		}

		Ok(Self {
			repository: repository.to_owned(),
			digest: digest.to_owned(),
		})
	}

	/// Repository with the optional tag, without the digest.
	pub fn repository(&self) -> &str {
		&self.repository
	}

	/// `<algorithm>:<hex>`
	pub fn digest(&self) -> &str {
		&self.digest
	}
}

impl FromStr for ImageRef {
	type Err = BuildError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl fmt::Display for ImageRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.repository, self.digest)
	}
}

impl Serialize for ImageRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Transport protocol of a port. TCP is the Kubernetes default and is never
/// written out explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
	#[default]
	Tcp,
	Udp,
}

impl Protocol {
	pub(crate) fn explicit(self) -> Option<Self> {
		match self {
			Protocol::Tcp => None,
			Protocol::Udp => Some(Protocol::Udp),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PullPolicy {
	Always,
	IfNotPresent,
	Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
	pub container_port: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub protocol: Option<Protocol>,
}

impl ContainerPort {
	pub fn tcp(port: u16) -> Self {
		Self {
			container_port: port,
			protocol: None,
		}
	}

	pub fn udp(port: u16) -> Self {
		Self {
			container_port: port,
			protocol: Protocol::Udp.explicit(),
		}
	}
}

/// Environment variable, either a literal or a reference to a pod field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value_from: Option<EnvVarSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
	pub field_ref: FieldSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSelector {
	pub field_path: String,
}

impl EnvVar {
	pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: Some(value.into()),
			value_from: None,
		}
	}

	/// Variable filled from the pod itself, e.g. `status.hostIP`.
	pub fn field_ref(name: impl Into<String>, field_path: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: None,
			value_from: Some(EnvVarSource {
				field_ref: FieldSelector {
					field_path: field_path.into(),
				},
			}),
		}
	}
}

/// Builds an ordered env list from literal `(name, value)` pairs.
pub fn env<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<EnvVar> {
	pairs
		.into_iter()
		.map(|(name, value)| EnvVar::value(name, value))
		.collect()
}

/// Owned argv from string literals.
pub fn argv<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
	items.into_iter().map(str::to_owned).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TcpSocketAction {
	pub port: u16,
}

/// TCP readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
	pub tcp_socket: TcpSocketAction,
	pub initial_delay_seconds: u32,
	pub period_seconds: u32,
	pub timeout_seconds: u32,
}

impl Probe {
	pub fn tcp(
		port: u16,
		initial_delay_seconds: u32,
		period_seconds: u32,
		timeout_seconds: u32,
	) -> Self {
		Self {
			tcp_socket: TcpSocketAction { port },
			initial_delay_seconds,
			period_seconds,
			timeout_seconds,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
	pub mount_path: String,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Container {
	#[builder(into)]
	pub name: String,
	pub image: ImageRef,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_pull_policy: Option<PullPolicy>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	#[builder(default)]
	pub command: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	#[builder(default)]
	pub args: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	#[builder(default)]
	pub env: Vec<EnvVar>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	#[builder(default)]
	pub ports: Vec<ContainerPort>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	#[builder(default)]
	pub volume_mounts: Vec<VolumeMount>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub readiness_probe: Option<Probe>,
}
