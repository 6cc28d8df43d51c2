//! Constructors turning small descriptions into consistent records.

use std::{collections::HashSet, vec};

use bon::Builder;

use crate::{
	container::{Container, ContainerPort, ImageRef, VolumeMount},
	error::{BuildError, Result},
	resource::{
		AccessMode, Annotations, Deployment, DeploymentSpec, DeploymentStrategy, HostPathSource,
		LabelSelector, Labels, Namespace, ObjectMeta, PersistentVolume, PersistentVolumeClaim,
		PersistentVolumeClaimSpec, PersistentVolumeSpec, PodMeta, PodSpec, PodTemplateSpec,
		Resource, ResourceRequirements, Service, ServiceKind, ServicePort, ServiceSpec,
		StorageRequest, TypeMeta, UpdateStrategy, Volume,
	},
};

/// Every deployment runs exactly one pod.
pub const REPLICAS: u32 = 1;
pub const DEFAULT_VOLUME_CAPACITY: &str = "1Gi";
/// Host directory under which stateful services keep their data.
pub const VOLUME_ROOT: &str = "/data/volumes";
/// Extra pod label distinguishing the replicas of a replicated service.
pub const REPLICA_ID_LABEL: &str = "replicaId";
const RESTART_POLICY: &str = "Always";

/// Node a workload is pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
	/// Left to the scheduler.
	#[default]
	Anywhere,
	Node(String),
}

impl Placement {
	pub fn node(name: impl Into<String>) -> Self {
		Placement::Node(name.into())
	}

	pub fn node_name(&self) -> Option<&str> {
		match self {
			Placement::Anywhere => None,
			Placement::Node(name) => Some(name),
		}
	}
}

impl From<&str> for Placement {
	fn from(name: &str) -> Self {
		Placement::node(name)
	}
}

impl From<&String> for Placement {
	fn from(name: &String) -> Self {
		Placement::node(name.as_str())
	}
}

/// What a deployment runs and where.
#[derive(Debug, Clone, Builder)]
pub struct Workload {
	#[builder(default, into)]
	pub placement: Placement,
	#[builder(default)]
	pub strategy: UpdateStrategy,
	pub containers: Vec<Container>,
	/// Pod hostname, for software that identifies itself by it.
	#[builder(into)]
	pub hostname: Option<String>,
	#[builder(default)]
	pub volumes: Vec<Volume>,
}

/// How a service exposes the pods behind it.
#[derive(Debug, Clone, Builder)]
pub struct Exposure {
	#[builder(default)]
	pub kind: ServiceKind,
	pub ports: Vec<ServicePort>,
	/// Defaults to the labels derived from the service name.
	pub selector: Option<Labels>,
}

impl Exposure {
	/// Cluster-internal service selecting pods by name.
	pub fn cluster(ports: Vec<ServicePort>) -> Self {
		Self {
			kind: ServiceKind::ClusterIp,
			ports,
			selector: None,
		}
	}

	/// Service reachable on every node, selecting pods by name.
	pub fn node_port(ports: Vec<ServicePort>) -> Self {
		Self {
			kind: ServiceKind::NodePort,
			ports,
			selector: None,
		}
	}
}

/// Database engine persisted by a stateful service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
	pub image: ImageRef,
	pub port: u16,
	/// Where the engine keeps its files inside the container.
	pub data_dir: String,
}

impl DataStore {
	pub fn new(image: ImageRef, port: u16, data_dir: impl Into<String>) -> Self {
		Self {
			image,
			port,
			data_dir: data_dir.into(),
		}
	}
}

macro_rules! bundle {
	($(#[$attr:meta])* $name:ident { $($field:ident: $ty:ty),* $(,)? }) => {
		$(#[$attr])*
		#[derive(Debug, Clone, PartialEq, Eq)]
		pub struct $name {
			$(pub $field: $ty,)*
		}

		impl IntoIterator for $name {
			type Item = Resource;
			type IntoIter = vec::IntoIter<Resource>;

			fn into_iter(self) -> Self::IntoIter {
				vec![$(Resource::from(self.$field)),*].into_iter()
			}
		}
	};
}

bundle!(
	/// A deployment together with the service routing to it.
	DeploymentAndService {
		deployment: Deployment,
		service: Service,
	}
);

bundle!(
	/// Durable storage of one stateful dependency.
	VolumePair {
		volume: PersistentVolume,
		claim: PersistentVolumeClaim,
	}
);

bundle!(
	/// A single-instance database with its own volume.
	StatefulService {
		deployment: Deployment,
		service: Service,
		volume: PersistentVolume,
		claim: PersistentVolumeClaim,
	}
);

/// Several pinned replicas behind one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatedService {
	pub deployments: Vec<Deployment>,
	pub service: Service,
}

impl IntoIterator for ReplicatedService {
	type Item = Resource;
	type IntoIter = vec::IntoIter<Resource>;

	fn into_iter(self) -> Self::IntoIter {
		let mut records: Vec<Resource> = self.deployments.into_iter().map(Resource::from).collect();
		records.push(self.service.into());
		records.into_iter()
	}
}

/// Record factory of one application.
///
/// Holds the per-application shaping (namespace, label key, annotations, ...)
/// so that every record of the application is built the same way.
#[derive(Debug, Clone, Builder)]
pub struct ManifestBuilder {
	#[builder(into)]
	namespace: String,
	/// Key of the label identifying a workload, e.g. `app`.
	#[builder(into)]
	label_key: String,
	/// Put the identifying label on deployments, services and the namespace
	/// themselves, not only on pods.
	#[builder(default)]
	label_objects: bool,
	/// Annotations of deployments and services.
	#[builder(default)]
	annotations: Annotations,
	/// Annotations of pod templates.
	#[builder(default)]
	template_annotations: Annotations,
	enable_service_links: Option<bool>,
	/// Give pod templates the deployment name.
	#[builder(default)]
	name_pod_templates: bool,
	#[builder(into, default = DEFAULT_VOLUME_CAPACITY.to_owned())]
	volume_capacity: String,
}

impl ManifestBuilder {
	pub fn namespace_name(&self) -> &str {
		&self.namespace
	}

	/// The single label set identifying `name`.
	///
	/// Deployment selectors, pod template labels and default service selectors
	/// all come from here.
	pub fn labels(&self, name: &str) -> Labels {
		Labels::from([(self.label_key.clone(), name.to_owned())])
	}

	pub fn namespace(&self) -> Namespace {
		Namespace {
			type_meta: TypeMeta::NAMESPACE,
			metadata: ObjectMeta {
				name: self.namespace.clone(),
				namespace: None,
				labels: self.object_labels(&self.namespace),
				annotations: Annotations::new(),
			},
		}
	}

	pub fn deployment(&self, name: &str, workload: Workload) -> Result<Deployment> {
		self.deployment_with_pod_labels(name, self.labels(name), workload)
	}

	pub fn service(&self, name: &str, exposure: Exposure) -> Result<Service> {
		check_ports(name, exposure.kind, &exposure.ports)?;

		Ok(Service {
			type_meta: TypeMeta::SERVICE,
			metadata: self.object_meta(name),
			spec: ServiceSpec {
				kind: match exposure.kind {
					ServiceKind::ClusterIp => None,
					kind => Some(kind),
				},
				ports: exposure.ports,
				selector: exposure.selector.unwrap_or_else(|| self.labels(name)),
			},
		})
	}

	pub fn deployment_and_service(
		&self,
		name: &str,
		workload: Workload,
		exposure: Exposure,
	) -> Result<DeploymentAndService> {
		Ok(DeploymentAndService {
			deployment: self.deployment(name, workload)?,
			service: self.service(name, exposure)?,
		})
	}

	/// Host-backed volume `<logical>-pv` and the claim `<logical>-pvc` binding it.
	pub fn volume_pair(
		&self,
		logical_name: &str,
		storage_class: &str,
		host_path_prefix: &str,
	) -> VolumePair {
		let volume_name = format!("{logical_name}-pv");
		let host_path = format!("{}/{volume_name}", host_path_prefix.trim_end_matches('/'));

		VolumePair {
			volume: PersistentVolume {
				type_meta: TypeMeta::PERSISTENT_VOLUME,
				metadata: self.storage_meta(volume_name),
				spec: PersistentVolumeSpec {
					volume_mode: "Filesystem",
					access_modes: vec![AccessMode::ReadWriteOnce],
					capacity: self.storage_request(),
					storage_class_name: storage_class.to_owned(),
					host_path: HostPathSource {
						path: host_path,
						kind: "DirectoryOrCreate",
					},
				},
			},
			claim: PersistentVolumeClaim {
				type_meta: TypeMeta::PERSISTENT_VOLUME_CLAIM,
				metadata: self.storage_meta(claim_name(logical_name)),
				spec: PersistentVolumeClaimSpec {
					access_modes: vec![AccessMode::ReadWriteOnce],
					storage_class_name: storage_class.to_owned(),
					resources: ResourceRequirements {
						requests: self.storage_request(),
					},
				},
			},
		}
	}

	/// Database `name` owning the volume pair of `logical_name`.
	///
	/// Uses the `Recreate` strategy: two pods must never share the data
	/// directory, so the old one is stopped before the new one starts.
	pub fn stateful_service(
		&self,
		name: &str,
		logical_name: &str,
		placement: Placement,
		store: &DataStore,
	) -> Result<StatefulService> {
		if placement == Placement::Anywhere {
			return Err(BuildError::MissingPlacement(name.to_owned()));
		}

		let pair = self.volume_pair(
			logical_name,
			&format!("{logical_name}-storage"),
			VOLUME_ROOT,
		);

		let container = Container::builder()
			.name(name)
			.image(store.image.clone())
			.ports(vec![ContainerPort::tcp(store.port)])
			.volume_mounts(vec![VolumeMount {
				mount_path: store.data_dir.clone(),
				name: logical_name.to_owned(),
			}])
			.build();

		let workload = Workload::builder()
			.placement(placement)
			.strategy(UpdateStrategy::Recreate)
			.containers(vec![container])
			.hostname(format!("{logical_name}-db"))
			.volumes(vec![Volume::claim(
				logical_name,
				&pair.claim.metadata.name,
			)])
			.build();

		let DeploymentAndService {
			deployment,
			service,
		} = self.deployment_and_service(
			name,
			workload,
			Exposure::cluster(vec![
				ServicePort::mapped(store.port, store.port).named(name)
			]),
		)?;

		Ok(StatefulService {
			deployment,
			service,
			volume: pair.volume,
			claim: pair.claim,
		})
	}

	/// One deployment `<name>-<n>` per placement, all behind service `name`.
	///
	/// Replicas share the identifying label of `name` and add their ordinal
	/// as [`REPLICA_ID_LABEL`], so each deployment selects only its own pod
	/// while the service selects all of them.
	pub fn replicated_service(
		&self,
		name: &str,
		placements: impl IntoIterator<Item = Placement>,
		containers: Vec<Container>,
		exposure: Exposure,
	) -> Result<ReplicatedService> {
		let deployments = placements
			.into_iter()
			.enumerate()
			.map(|(index, placement)| {
				let ordinal = (index + 1).to_string();
				let mut pod_labels = self.labels(name);
				pod_labels.insert(REPLICA_ID_LABEL.to_owned(), ordinal.clone());

				let workload = Workload::builder()
					.placement(placement)
					.containers(containers.clone())
					.build();
				self.deployment_with_pod_labels(&format!("{name}-{ordinal}"), pod_labels, workload)
			})
			.collect::<Result<Vec<_>>>()?;

		if deployments.is_empty() {
			return Err(BuildError::NoReplicas(name.to_owned()));
		}

		Ok(ReplicatedService {
			deployments,
			service: self.service(name, exposure)?,
		})
	}

	fn deployment_with_pod_labels(
		&self,
		name: &str,
		pod_labels: Labels,
		workload: Workload,
	) -> Result<Deployment> {
		if workload.containers.is_empty() {
			return Err(BuildError::NoContainers(name.to_owned()));
		}

		Ok(Deployment {
			type_meta: TypeMeta::DEPLOYMENT,
			metadata: self.object_meta(name),
			spec: DeploymentSpec {
				replicas: REPLICAS,
				selector: LabelSelector {
					match_labels: pod_labels.clone(),
				},
				strategy: match workload.strategy {
					UpdateStrategy::RollingUpdate => None,
					kind => Some(DeploymentStrategy { kind }),
				},
				template: PodTemplateSpec {
					metadata: PodMeta {
						name: self.name_pod_templates.then(|| name.to_owned()),
						labels: pod_labels,
						annotations: self.template_annotations.clone(),
					},
					spec: PodSpec {
						node_name: workload.placement.node_name().map(str::to_owned),
						containers: workload.containers,
						hostname: workload.hostname,
						restart_policy: RESTART_POLICY,
						enable_service_links: self.enable_service_links,
						volumes: workload.volumes,
					},
				},
			},
		})
	}

	fn object_labels(&self, name: &str) -> Labels {
		if self.label_objects {
			self.labels(name)
		} else {
			Labels::new()
		}
	}

	fn object_meta(&self, name: &str) -> ObjectMeta {
		ObjectMeta {
			name: name.to_owned(),
			namespace: Some(self.namespace.clone()),
			labels: self.object_labels(name),
			annotations: self.annotations.clone(),
		}
	}

	fn storage_meta(&self, name: String) -> ObjectMeta {
		ObjectMeta {
			name,
			namespace: Some(self.namespace.clone()),
			labels: Labels::new(),
			annotations: Annotations::new(),
		}
	}

	fn storage_request(&self) -> StorageRequest {
		StorageRequest {
			storage: self.volume_capacity.clone(),
		}
	}
}

/// Name of the claim created by [`ManifestBuilder::volume_pair`].
pub fn claim_name(logical_name: &str) -> String {
	format!("{logical_name}-pvc")
}

fn check_ports(service: &str, kind: ServiceKind, ports: &[ServicePort]) -> Result<()> {
	if ports.is_empty() {
		return Err(BuildError::NoServicePorts(service.to_owned()));
	}

	if kind != ServiceKind::NodePort {
		if let Some(port) = ports.iter().find(|p| p.node_port.is_some()) {
			return Err(BuildError::NodePortNotExposed {
				service: service.to_owned(),
				port: port.port,
			});
		}
	}

	if ports.len() > 1 && ports.iter().any(|p| p.name.is_some()) {
		let mut seen = HashSet::new();
		for port in ports {
			let Some(name) = &port.name else {
				return Err(BuildError::UnnamedServicePort {
					service: service.to_owned(),
					port: port.port,
				});
			};
			if !seen.insert(name) {
				return Err(BuildError::DuplicatePortName {
					service: service.to_owned(),
					name: name.clone(),
				});
			}
		}
	}

	Ok(())
}
