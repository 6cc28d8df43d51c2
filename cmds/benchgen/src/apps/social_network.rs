//! Social network: C++ thrift services with redis, memcached, MongoDB and
//! RabbitMQ, fronted by nginx, plus the ML media and text filters.

use anyhow::Result;
use manifest_builder::{
	argv, env, Container, Document, Exposure, ImageRef, ManifestBuilder, Placement,
	Resource, ServicePort, Workload,
};

use super::{App, Target};
use crate::config::{Cluster, Worker};

pub const NAMESPACE: &str = "social-network";

const IMAGE_CPP: &str = "hypercube/social-network-ml-microservices:latest@sha256:1b8d25acb3137df320b80d7f9ccd55eb3bc8a1141fc57d78d57a978ce3e0d605";
const IMAGE_NGINX: &str = "hypercube/social-network-ml-nginx:latest@sha256:6ac95749cb7aff055735ce490c7e702d1dabf8b6262c87d52d49b8ef4377833a";
const IMAGE_MEDIA_FILTER: &str = "hypercube/social-network-ml-media-filter:latest@sha256:ece820ae1156eab2c6b41eae07ecac524960d47bcdd4e063e9d3520399dcac05";
const IMAGE_TEXT_FILTER: &str = "hypercube/social-network-ml-text-filter:latest@sha256:6f541847637a92e331f1088b78dcdf77acbe6242960994aabf1ced51dc308117";
const IMAGE_DNSMASQ: &str = "janeczku/go-dnsmasq:release-1.0.7@sha256:3a99ad92353b55e97863812470e4f7403b47180f06845fdd06060773fe04184f";
const IMAGE_JAEGER: &str = "jaegertracing/all-in-one:latest@sha256:30238ffd383f266651cd4e0c36be67b6b0d3d882d0bbb67304c39af9ee61a4ef";
const IMAGE_MEMCACHED: &str = "memcached:1.6.0@sha256:95b8ef0e16a1f0b99d2d9c933afcc6caf395c4e33b281444b38d6951f4c2e3e8";
const IMAGE_MONGO: &str = "mongo:4@sha256:90e9402437d0fafc818fde2cc108ccb445e02b0c85b230bcf3a55def0f0029ec";
const IMAGE_REDIS: &str = "redis:latest@sha256:ae51486efeea8a9b3f85542e408f79a5012d5b7fa35ae19733104ecc6992a248";
const IMAGE_RABBITMQ: &str = "rabbitmq:latest@sha256:d96c58d1e2e55a32a03fa9ba01d00c6383d1aca26fb2790f14ac411fd6e45152";

const THRIFT_PORT: u16 = 9090;
const FILTER_PORT: u16 = 40000;

/// Backing store of a C++ service.
#[derive(Debug, Clone, Copy)]
enum Store {
	Redis,
	Memcached,
	Mongo,
	RabbitMq { cookie: &'static str },
}

/// A C++ service (placement, name, binary) followed by the stores that
/// belong to it, in output order.
struct Tier {
	worker: Worker,
	name: &'static str,
	command: &'static str,
	stores: &'static [(Worker, &'static str, Store)],
}

const TIERS: &[Tier] = &[
	Tier {
		worker: Worker::W3,
		name: "compose-post-service",
		command: "ComposePostService",
		stores: &[(Worker::W3, "compose-post-redis", Store::Redis)],
	},
	Tier {
		worker: Worker::W1,
		name: "home-timeline-service",
		command: "HomeTimelineService",
		stores: &[(Worker::W3, "home-timeline-redis", Store::Redis)],
	},
	Tier {
		worker: Worker::W3,
		name: "media-service",
		command: "MediaService",
		stores: &[],
	},
	Tier {
		worker: Worker::W2,
		name: "post-storage-service",
		command: "PostStorageService",
		stores: &[
			(Worker::W3, "post-storage-memcached", Store::Memcached),
			(Worker::W3, "post-storage-mongodb", Store::Mongo),
		],
	},
	Tier {
		worker: Worker::W3,
		name: "social-graph-service",
		command: "SocialGraphService",
		stores: &[
			(Worker::W3, "social-graph-mongodb", Store::Mongo),
			(Worker::W3, "social-graph-redis", Store::Redis),
		],
	},
	Tier {
		worker: Worker::W3,
		name: "text-service",
		command: "TextService",
		stores: &[],
	},
	Tier {
		worker: Worker::W3,
		name: "unique-id-service",
		command: "UniqueIdService",
		stores: &[],
	},
	Tier {
		worker: Worker::W3,
		name: "url-shorten-service",
		command: "UrlShortenService",
		stores: &[],
	},
	Tier {
		worker: Worker::W3,
		name: "user-mention-service",
		command: "UserMentionService",
		stores: &[],
	},
	Tier {
		worker: Worker::W3,
		name: "user-service",
		command: "UserService",
		stores: &[
			(Worker::W3, "user-memcached", Store::Memcached),
			(Worker::W3, "user-mongodb", Store::Mongo),
		],
	},
	Tier {
		worker: Worker::W3,
		name: "user-timeline-service",
		command: "UserTimelineService",
		stores: &[
			(Worker::W3, "user-timeline-mongodb", Store::Mongo),
			(Worker::W3, "user-timeline-redis", Store::Redis),
		],
	},
];

/// Message queues not owned by a single C++ service.
const QUEUES: &[(Worker, &str, Store)] = &[
	(
		Worker::W3,
		"write-home-timeline-rabbitmq",
		Store::RabbitMq {
			cookie: "WRITE-HOME-TIMELINE-RABBITMQ",
		},
	),
	(
		Worker::W3,
		"write-user-timeline-rabbitmq",
		Store::RabbitMq {
			cookie: "WRITE-USER-TIMELINE-RABBITMQ",
		},
	),
];

/// Consumers of the queues, deployed from the second document.
const WRITERS: &[(Worker, &str, &str)] = &[
	(
		Worker::W3,
		"write-home-timeline-service",
		"WriteHomeTimelineService",
	),
	(
		Worker::W3,
		"write-user-timeline-service",
		"WriteUserTimelineService",
	),
];

const MEDIA_FILTER_REPLICAS: [Worker; 3] = [Worker::W1, Worker::W2, Worker::W3];

fn builder() -> ManifestBuilder {
	ManifestBuilder::builder()
		.namespace(NAMESPACE)
		.label_key("name")
		.enable_service_links(false)
		.name_pod_templates(true)
		.build()
}

pub fn render(cluster: &Cluster) -> Result<Vec<Target>> {
	let b = builder();

	let mut records: Vec<Resource> = Vec::new();
	records.extend(jaeger(&b, cluster)?);
	records.extend(nginx(&b, cluster)?);
	for tier in TIERS {
		records.extend(cpp(&b, cluster.node(tier.worker), tier.name, tier.command)?);
		for &(worker, name, store) in tier.stores {
			records.extend(store_service(&b, cluster.node(worker), name, store)?);
		}
	}
	for &(worker, name, store) in QUEUES {
		records.extend(store_service(&b, cluster.node(worker), name, store)?);
	}
	records.extend(media_filter(&b, cluster)?);
	records.extend(single(
		&b,
		cluster.node(Worker::W3),
		"text-filter-service",
		Container::builder()
			.name("text-filter-service")
			.image(ImageRef::parse(IMAGE_TEXT_FILTER)?)
			.build(),
		FILTER_PORT,
	)?);

	let mut writers: Vec<Resource> = Vec::new();
	for &(worker, name, command) in WRITERS {
		writers.extend(cpp(&b, cluster.node(worker), name, command)?);
	}

	Ok(vec![
		Target::numbered(
			App::SocialNetwork,
			1,
			Document::assemble(Some(b.namespace()), records),
		),
		Target::numbered(App::SocialNetwork, 2, Document::assemble(None, writers)),
	])
}

/// Deployment with one container behind a service on a single port.
fn single(
	b: &ManifestBuilder,
	node: &str,
	name: &str,
	container: Container,
	port: u16,
) -> Result<impl IntoIterator<Item = Resource>> {
	Ok(b.deployment_and_service(
		name,
		Workload::builder()
			.placement(node)
			.containers(vec![container])
			.build(),
		Exposure::cluster(vec![ServicePort::new(port)]),
	)?)
}

fn cpp(
	b: &ManifestBuilder,
	node: &str,
	name: &str,
	command: &str,
) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name(name)
		.image(ImageRef::parse(IMAGE_CPP)?)
		.command(argv([command]))
		.build();
	single(b, node, name, container, THRIFT_PORT)
}

fn store_service(
	b: &ManifestBuilder,
	node: &str,
	name: &str,
	store: Store,
) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder().name(name);
	let (container, port) = match store {
		Store::Redis => (
			container
				.image(ImageRef::parse(IMAGE_REDIS)?)
				.command(argv([
					"sh",
					"-c",
					"rm -f /data/dump.rdb && redis-server --save \"\" --appendonly no",
				]))
				.build(),
			6379,
		),
		Store::Memcached => (
			container
				.image(ImageRef::parse(IMAGE_MEMCACHED)?)
				.env(env([
					("MEMCACHED_CACHE_SIZE", "4096"),
					("MEMCACHED_THREADS", "8"),
				]))
				.build(),
			11211,
		),
		Store::Mongo => (
			container
				.image(ImageRef::parse(IMAGE_MONGO)?)
				.args(argv(["--nojournal", "--quiet"]))
				.build(),
			27017,
		),
		Store::RabbitMq { cookie } => (
			container
				.image(ImageRef::parse(IMAGE_RABBITMQ)?)
				.env(env([
					("RABBITMQ_ERLANG_COOKIE", cookie),
					("RABBITMQ_DEFAULT_VHOST", "/"),
				]))
				.build(),
			5672,
		),
	};
	single(b, node, name, container, port)
}

fn jaeger(b: &ManifestBuilder, cluster: &Cluster) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name("jaeger")
		.image(ImageRef::parse(IMAGE_JAEGER)?)
		.env(env([("COLLECTOR_ZIPKIN_HTTP_PORT", "9411")]))
		.build();
	Ok(b.deployment_and_service(
		"jaeger",
		Workload::builder()
			.placement(cluster.node(Worker::W3))
			.containers(vec![container])
			.build(),
		Exposure::node_port(vec![
			ServicePort::new(16686).named("16686").node_port(30005),
			ServicePort::new(9411).named("9411"),
		]),
	)?)
}

fn nginx(b: &ManifestBuilder, cluster: &Cluster) -> Result<impl IntoIterator<Item = Resource>> {
	let nginx = Container::builder()
		.name("nginx-thrift")
		.image(ImageRef::parse(IMAGE_NGINX)?)
		.build();
	let dnsmasq = Container::builder()
		.name("dnsmasq")
		.image(ImageRef::parse(IMAGE_DNSMASQ)?)
		.args(argv([
			"--listen",
			"127.0.0.1:53",
			"--default-resolver",
			"--append-search-domains",
		]))
		.build();
	Ok(b.deployment_and_service(
		"nginx-thrift",
		Workload::builder()
			.placement(cluster.node(Worker::W4))
			.containers(vec![nginx, dnsmasq])
			.build(),
		Exposure::node_port(vec![ServicePort::new(8080).node_port(30001)]),
	)?)
}

fn media_filter(
	b: &ManifestBuilder,
	cluster: &Cluster,
) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name("media-filter-service")
		.image(ImageRef::parse(IMAGE_MEDIA_FILTER)?)
		.build();
	Ok(b.replicated_service(
		"media-filter-service",
		MEDIA_FILTER_REPLICAS.map(|worker| Placement::node(cluster.node(worker))),
		vec![container],
		Exposure::cluster(vec![ServicePort::new(FILTER_PORT)]),
	)?)
}
