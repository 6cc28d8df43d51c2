//! Typed constructors for static Kubernetes manifests.
//!
//! A [`ManifestBuilder`] carries the shaping rules of one application and
//! turns small descriptions ([`Workload`], [`Exposure`], [`DataStore`]) into
//! records. Records are collected into a [`Document`], which serializes to
//! the same bytes every time.

pub mod builder;
pub mod container;
pub mod document;
pub mod error;
pub mod resource;

pub use builder::{
	claim_name, DataStore, DeploymentAndService, Exposure, ManifestBuilder, Placement,
	ReplicatedService, StatefulService, VolumePair, Workload,
};
pub use container::{
	argv, env, Container, ContainerPort, EnvVar, ImageRef, Probe, Protocol, PullPolicy,
	VolumeMount,
};
pub use document::Document;
pub use error::{BuildError, Result};
pub use resource::{
	Annotations, Deployment, Labels, Namespace, PersistentVolume, PersistentVolumeClaim,
	Resource, Service, ServiceKind, ServicePort, UpdateStrategy, Volume,
};
