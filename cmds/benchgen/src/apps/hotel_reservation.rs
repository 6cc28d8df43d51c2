//! Hotel reservation: Go services backed by memcached and MongoDB, with
//! consul for discovery. Shaped like `kompose convert` output.

use anyhow::Result;
use manifest_builder::{
	argv, env, Annotations, Container, ContainerPort, DataStore, Document, Exposure, ImageRef,
	ManifestBuilder, Protocol, Resource, ServicePort, Workload,
};

use super::{numbered_port, App, Target};
use crate::config::{Cluster, Worker};

pub const NAMESPACE: &str = "hotel-reservation";

const IMAGE_GO: &str = "igorrudyk1/hotelreservation:latest@sha256:cb64678950a01728551701f5782e34eef049e422f73eae7dcb69d7549682008c";
const IMAGE_CONSUL: &str = "consul:1.15.4@sha256:362519540425cf077229da3851f3b80d622742dd81f1b2014863c044c2124ef3";
const IMAGE_JAEGER: &str = "jaegertracing/all-in-one:latest@sha256:30238ffd383f266651cd4e0c36be67b6b0d3d882d0bbb67304c39af9ee61a4ef";
const IMAGE_MONGO: &str = "mongo:4.4.6@sha256:6efa052039903e731e4a5550c68a13c4869ddc93742c716332883fd9c77eb79b";
const IMAGE_MEMCACHED: &str = "memcached:latest@sha256:8f8117a71c39d10d0ae0e1daf88d57619c99306fd4bd06e5270d962be0d607f9";

const KOMPOSE_CMD: (&str, &str) = ("kompose.cmd", "kompose convert");
const KOMPOSE_VERSION: (&str, &str) = ("kompose.version", "1.22.0 (955b78124)");
const ISTIO_STATS_PREFIXES: (&str, &str) = (
	"sidecar.istio.io/statsInclusionPrefixes",
	"cluster.outbound,cluster_manager,listener_manager,http_mixer_filter,tcp_mixer_filter,server,cluster.xds-grp,listener,connection_manager",
);
const ISTIO_STATS_REGEXPS: (&str, &str) = ("sidecar.istio.io/statsInclusionRegexps", "http.*");

const MONGO_PORT: u16 = 27017;
const MEMCACHED_PORT: u16 = 11211;

/// Go service entry point: placement, name (also the binary) and port.
const GO_SERVICES: &[(Worker, &str, u16)] = &[
	(Worker::W3, "geo", 8083),
	(Worker::W4, "profile", 8081),
	(Worker::W4, "rate", 8084),
	(Worker::W2, "recommendation", 8085),
	(Worker::W2, "reservation", 8087),
	(Worker::W3, "search", 8082),
	(Worker::W3, "user", 8086),
];

/// Memcached instance fronting a Go service.
const CACHES: &[(&str, &str)] = &[
	("profile", "memcached-profile"),
	("rate", "memcached-rate"),
	("reservation", "memcached-reserve"),
];

/// Go services owning a MongoDB database.
const DATABASES: &[&str] = &["geo", "profile", "rate", "recommendation", "reservation", "user"];

fn annotations(pairs: &[(&str, &str)]) -> Annotations {
	pairs
		.iter()
		.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
		.collect()
}

fn builder() -> ManifestBuilder {
	ManifestBuilder::builder()
		.namespace(NAMESPACE)
		.label_key("io.kompose.service")
		.label_objects(true)
		.annotations(annotations(&[KOMPOSE_CMD, KOMPOSE_VERSION]))
		.template_annotations(annotations(&[
			KOMPOSE_CMD,
			KOMPOSE_VERSION,
			ISTIO_STATS_PREFIXES,
			ISTIO_STATS_REGEXPS,
		]))
		.build()
}

pub fn render(cluster: &Cluster) -> Result<Vec<Target>> {
	let b = builder();
	let mut records: Vec<Resource> = Vec::new();

	records.extend(consul(&b, cluster)?);
	records.extend(jaeger(&b, cluster)?);
	records.extend(frontend(&b, cluster)?);

	let mongo = DataStore::new(ImageRef::parse(IMAGE_MONGO)?, MONGO_PORT, "/data/db");
	for &(worker, name, port) in GO_SERVICES {
		let node = cluster.node(worker);
		records.extend(go(&b, node, name, port)?);
		if let Some((_, cache)) = CACHES.iter().find(|(owner, _)| *owner == name) {
			records.extend(memcached(&b, node, cache)?);
		}
		if DATABASES.contains(&name) {
			records.extend(b.stateful_service(&format!("mongodb-{name}"), name, node.into(), &mongo)?);
		}
	}

	Ok(vec![Target::numbered(
		App::HotelReservation,
		1,
		Document::assemble(Some(b.namespace()), records),
	)])
}

fn consul(b: &ManifestBuilder, cluster: &Cluster) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name("consul")
		.image(ImageRef::parse(IMAGE_CONSUL)?)
		.ports(vec![
			ContainerPort::tcp(8300),
			ContainerPort::tcp(8400),
			ContainerPort::tcp(8500),
			ContainerPort::udp(53),
		])
		.build();
	Ok(b.deployment_and_service(
		"consul",
		Workload::builder()
			.placement(cluster.node(Worker::W1))
			.containers(vec![container])
			.build(),
		Exposure::cluster(vec![
			numbered_port(8300),
			numbered_port(8400),
			numbered_port(8500),
			ServicePort::mapped(8600, 53)
				.named("8600")
				.protocol(Protocol::Udp),
		]),
	)?)
}

fn jaeger(b: &ManifestBuilder, cluster: &Cluster) -> Result<impl IntoIterator<Item = Resource>> {
	const TCP: [u16; 5] = [14269, 5778, 14268, 14267, 16686];
	const UDP: [u16; 3] = [5775, 6831, 6832];

	let container = Container::builder()
		.name("jaeger")
		.image(ImageRef::parse(IMAGE_JAEGER)?)
		.ports(
			TCP.into_iter()
				.map(ContainerPort::tcp)
				.chain(UDP.into_iter().map(ContainerPort::udp))
				.collect(),
		)
		.build();

	let ports = TCP
		.into_iter()
		.map(|port| match port {
			16686 => numbered_port(port).node_port(30005),
			_ => numbered_port(port),
		})
		.chain(
			UDP.into_iter()
				.map(|port| numbered_port(port).protocol(Protocol::Udp)),
		)
		.collect();

	Ok(b.deployment_and_service(
		"jaeger",
		Workload::builder()
			.placement(cluster.node(Worker::W1))
			.containers(vec![container])
			.build(),
		Exposure::node_port(ports),
	)?)
}

fn frontend(b: &ManifestBuilder, cluster: &Cluster) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name("frontend")
		.image(ImageRef::parse(IMAGE_GO)?)
		.command(argv(["frontend"]))
		.ports(vec![ContainerPort::tcp(5000)])
		.build();
	Ok(b.deployment_and_service(
		"frontend",
		Workload::builder()
			.placement(cluster.node(Worker::W1))
			.containers(vec![container])
			.build(),
		Exposure::node_port(vec![numbered_port(5000).node_port(30001)]),
	)?)
}

fn go(
	b: &ManifestBuilder,
	node: &str,
	name: &str,
	port: u16,
) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name(name)
		.image(ImageRef::parse(IMAGE_GO)?)
		.command(argv([name]))
		.ports(vec![ContainerPort::tcp(port)])
		.build();
	Ok(b.deployment_and_service(
		name,
		Workload::builder()
			.placement(node)
			.containers(vec![container])
			.build(),
		Exposure::cluster(vec![numbered_port(port)]),
	)?)
}

fn memcached(
	b: &ManifestBuilder,
	node: &str,
	name: &str,
) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name(name)
		.image(ImageRef::parse(IMAGE_MEMCACHED)?)
		.env(env([("MEMCACHED_CACHE_SIZE", "128"), ("MEMCACHED_THREADS", "2")]))
		.ports(vec![ContainerPort::tcp(MEMCACHED_PORT)])
		.build();
	Ok(b.deployment_and_service(
		name,
		Workload::builder()
			.placement(node)
			.containers(vec![container])
			.build(),
		Exposure::cluster(vec![
			ServicePort::mapped(MEMCACHED_PORT, MEMCACHED_PORT).named(name)
		]),
	)?)
}

#[cfg(test)]
mod tests {
	use manifest_builder::{ServiceKind, UpdateStrategy};
	use serde_json::json;

	use super::*;

	fn document() -> Document {
		let mut targets = render(&Cluster::default()).unwrap();
		assert_eq!(targets.len(), 1);
		targets.remove(0).document
	}

	#[test]
	fn test_record_order() {
		let document = document();
		let names: Vec<_> = document
			.items()
			.iter()
			.map(|r| format!("{}/{}", r.kind(), r.name()))
			.collect();
		assert_eq!(
			&names[..12],
			[
				"Namespace/hotel-reservation",
				"Deployment/consul",
				"Service/consul",
				"Deployment/jaeger",
				"Service/jaeger",
				"Deployment/frontend",
				"Service/frontend",
				"Deployment/geo",
				"Service/geo",
				"Deployment/mongodb-geo",
				"Service/mongodb-geo",
				"PersistentVolume/geo-pv",
			]
		);
		assert_eq!(
			&names[names.len() - 6..],
			[
				"Deployment/user",
				"Service/user",
				"Deployment/mongodb-user",
				"Service/mongodb-user",
				"PersistentVolume/user-pv",
				"PersistentVolumeClaim/user-pvc",
			]
		);
		// namespace + 3 infra pairs + 7 go pairs + 3 cache pairs + 6 databases of four records
		assert_eq!(document.len(), 1 + 6 + 14 + 6 + 24);
	}

	#[test]
	fn test_memcached_follows_its_service() {
		let document = document();
		let names: Vec<_> = document.items().iter().map(Resource::name).collect();
		let rate = names.iter().position(|n| *n == "rate").unwrap();
		assert_eq!(names[rate + 2], "memcached-rate");
		assert_eq!(names[rate + 4], "mongodb-rate");
	}

	#[test]
	fn test_consul_dns_port_maps_to_udp_53() {
		let document = document();
		let Resource::Service(consul) = &document.items()[2] else {
			panic!("expected consul service");
		};
		assert_eq!(
			serde_json::to_value(&consul.spec.ports[3]).unwrap(),
			json!({ "name": "8600", "port": 8600, "targetPort": 53, "protocol": "UDP" })
		);
	}

	#[test]
	fn test_node_ports() {
		let document = document();
		let node_ports: Vec<_> = document
			.items()
			.iter()
			.filter_map(|r| match r {
				Resource::Service(s) if s.spec.kind == Some(ServiceKind::NodePort) => Some((
					s.metadata.name.as_str(),
					s.spec.ports.iter().filter_map(|p| p.node_port).collect::<Vec<_>>(),
				)),
				_ => None,
			})
			.collect();
		assert_eq!(node_ports, [("jaeger", vec![30005]), ("frontend", vec![30001])]);
	}

	#[test]
	fn test_kompose_shaping() {
		let document = document();
		let Resource::Deployment(geo) = &document.items()[7] else {
			panic!("expected geo deployment");
		};
		assert_eq!(geo.metadata.labels["io.kompose.service"], "geo");
		assert_eq!(geo.metadata.annotations["kompose.version"], "1.22.0 (955b78124)");
		assert_eq!(
			geo.spec.template.metadata.annotations["sidecar.istio.io/statsInclusionRegexps"],
			"http.*"
		);
		assert_eq!(geo.spec.template.spec.node_name.as_deref(), Some("autothrottle-4"));
		assert_eq!(geo.spec.template.spec.containers[0].command, ["geo"]);
	}

	#[test]
	fn test_databases_are_recreated() {
		let document = document();
		for resource in document.items() {
			if let Resource::Deployment(d) = resource {
				let expected = if d.metadata.name.starts_with("mongodb-") {
					UpdateStrategy::Recreate
				} else {
					UpdateStrategy::RollingUpdate
				};
				assert_eq!(d.update_strategy(), expected, "{}", d.metadata.name);
			}
		}
	}
}
