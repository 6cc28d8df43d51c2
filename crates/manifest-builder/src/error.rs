use thiserror::Error;

/// A description that can't be turned into a valid manifest.
///
/// Raised by the constructor building the offending record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
	#[error("deployment `{0}` has no containers")]
	NoContainers(String),

	#[error("service `{0}` exposes no ports")]
	NoServicePorts(String),

	#[error("service `{service}` exposes several ports, but port {port} has no name")]
	UnnamedServicePort { service: String, port: u16 },

	#[error("service `{service}` uses port name `{name}` more than once")]
	DuplicatePortName { service: String, name: String },

	#[error("service `{service}` is cluster-internal, but port {port} asks for a node port")]
	NodePortNotExposed { service: String, port: u16 },

	#[error("stateful service `{0}` must be pinned to a node")]
	MissingPlacement(String),

	#[error("replicated service `{0}` has no placements")]
	NoReplicas(String),

	#[error("image `{0}` is not pinned to a digest (expected `<repository>@<algorithm>:<hex>`)")]
	UnpinnedImage(String),
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
