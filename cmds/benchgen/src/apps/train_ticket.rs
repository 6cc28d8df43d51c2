//! Train ticket: Spring Boot services, each with its own MongoDB, plus
//! MySQL for vouchers and RabbitMQ for asynchronous orders.

use anyhow::{Context, Result};
use manifest_builder::{
	Container, ContainerPort, Document, EnvVar, Exposure, ImageRef, ManifestBuilder, Probe,
	PullPolicy, Resource, ServicePort, Workload,
};

use super::{App, Target};
use crate::config::{Cluster, Worker};

pub const NAMESPACE: &str = "train-ticket";

const IMAGE_MONGO: &str = "mongo:5.0.2-focal@sha256:3938ddf3039cc291ce26ef63fddfb36441f8fae9909a5e5ec521453d850de812";
const IMAGE_MYSQL: &str = "mysql:5.6.35@sha256:c2f3286842500ac9e4f81b638f6c488314d7a81784bc7fd1ba806816d70abb55";
const IMAGE_RABBITMQ: &str = "rabbitmq:3@sha256:50282e8cbf22ac261efd13fb881da900c09367ceb166c3ec5d23089986464df6";
const IMAGE_AVATAR: &str = "codewisdom/ts-avatar-service:0.2.1@sha256:ab1ecb1a3165c625981aae045801107e45a5b6be2d6088de534ed5bba8aae2f5";
const IMAGE_DASHBOARD: &str = "codewisdom/ts-ui-dashboard:0.2.1@sha256:d98b6bf0c99d2d7467d322740e9e54bf322c8f77ca3077d80c295ebd6619e338";

const MONGO_PORT: u16 = 27017;
const MYSQL_PORT: u16 = 3306;
const RABBITMQ_PORT: u16 = 5672;
const AVATAR_PORT: u16 = 17001;
const DASHBOARD_PORT: u16 = 8080;
const AUTH_NODE_PORT: u16 = 30000;
const DASHBOARD_NODE_PORT: u16 = 30001;

/// Spring Boot services take a while to come up.
const JAVA_READINESS: (u32, u32, u32) = (60, 10, 5);
const AVATAR_READINESS: (u32, u32, u32) = (160, 10, 5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
	Mongo,
	MySql,
}

struct Store {
	worker: Worker,
	name: &'static str,
	engine: Engine,
	/// Service placed right after the deployment instead of with the others.
	inline_service: bool,
}

const fn store(worker: Worker, name: &'static str) -> Store {
	Store {
		worker,
		name,
		engine: Engine::Mongo,
		inline_service: false,
	}
}

const STORES: &[Store] = &[
	store(Worker::W2, "ts-user-mongo"),
	store(Worker::W2, "ts-auth-mongo"),
	store(Worker::W4, "ts-route-mongo"),
	store(Worker::W3, "ts-contacts-mongo"),
	store(Worker::W1, "ts-order-mongo"),
	store(Worker::W3, "ts-order-other-mongo"),
	store(Worker::W2, "ts-config-mongo"),
	store(Worker::W3, "ts-station-mongo"),
	store(Worker::W4, "ts-train-mongo"),
	store(Worker::W1, "ts-travel-mongo"),
	store(Worker::W1, "ts-travel2-mongo"),
	store(Worker::W4, "ts-price-mongo"),
	store(Worker::W3, "ts-security-mongo"),
	store(Worker::W2, "ts-inside-payment-mongo"),
	store(Worker::W2, "ts-payment-mongo"),
	store(Worker::W3, "ts-assurance-mongo"),
	store(Worker::W3, "ts-ticket-office-mongo"),
	Store {
		engine: Engine::MySql,
		..store(Worker::W3, "ts-voucher-mysql")
	},
	store(Worker::W3, "ts-food-map-mongo"),
	store(Worker::W3, "ts-consign-mongo"),
	store(Worker::W3, "ts-consign-price-mongo"),
	store(Worker::W3, "ts-food-mongo"),
	Store {
		inline_service: true,
		..store(Worker::W3, "ts-notification-mongo")
	},
	Store {
		inline_service: true,
		..store(Worker::W3, "ts-delivery-mongo")
	},
];

struct JavaService {
	worker: Worker,
	name: &'static str,
	port: u16,
	image: &'static str,
	/// Consumes or produces RabbitMQ messages.
	rabbitmq: bool,
	/// Started with `java -jar /app/<name>-1.0.jar`; otherwise the image entrypoint runs.
	jar: bool,
}

impl JavaService {
	const fn new(worker: Worker, name: &'static str, port: u16, image: &'static str) -> Self {
		Self {
			worker,
			name,
			port,
			image,
			rabbitmq: false,
			jar: true,
		}
	}

	const fn with_rabbitmq(self) -> Self {
		Self {
			rabbitmq: true,
			..self
		}
	}

	const fn with_entrypoint(self) -> Self {
		Self { jar: false, ..self }
	}
}

#[rustfmt::skip]
const JAVA_SERVICES: &[JavaService] = &[
	JavaService::new(Worker::W4, "ts-admin-basic-info-service", 18767, "codewisdom/ts-admin-basic-info-service:0.2.1@sha256:601f3095bd8da5a4f3ab7e29f14afcbef00187682db976772f975810cbce8004"),
	JavaService::new(Worker::W3, "ts-admin-order-service", 16112, "codewisdom/ts-admin-order-service:0.2.1@sha256:3459fa7f1bc0b4724c1496e8ba8fec60181b6559dec0168b87da3b5bedfe8a0d"),
	JavaService::new(Worker::W4, "ts-admin-route-service", 16113, "codewisdom/ts-admin-route-service:0.2.1@sha256:c6fe3cfb82817d972b5c32fae2a14b99e4d9e52b8790367db03659b4c6a58b43"),
	JavaService::new(Worker::W1, "ts-admin-travel-service", 16114, "codewisdom/ts-admin-travel-service:0.2.1@sha256:617c3f709b8e0089d22f62a0fc37d8eaf7a2a8d83027a3193202224c8dc076eb"),
	JavaService::new(Worker::W2, "ts-admin-user-service", 16115, "codewisdom/ts-admin-user-service:0.2.1@sha256:fa4cc3a5d72138688d15421b6d8e42fb86e143ae3e45de2025895aa0c2af1801"),
	JavaService::new(Worker::W3, "ts-assurance-service", 18888, "codewisdom/ts-assurance-service:0.2.1@sha256:3b5f1c735b2c79cc8179f2339a19e02806f777e65e83e2e023c922a72337af3c"),
	JavaService::new(Worker::W4, "ts-basic-service", 15680, "codewisdom/ts-basic-service:0.2.1@sha256:93598bd07e0c703788f67cda122394620410bb140e44e6a2422e6bec84145c4e"),
	JavaService::new(Worker::W3, "ts-cancel-service", 18885, "codewisdom/ts-cancel-service:0.2.1@sha256:0812ed7c3281bf75eba703ccbd79abb6587e3ca38507b74f37527ce8ad12f427"),
	JavaService::new(Worker::W2, "ts-config-service", 15679, "codewisdom/ts-config-service:0.2.1@sha256:a94813d69464525be2fb86a535f5b1799225a936921c214f18b95acb99985466"),
	JavaService::new(Worker::W3, "ts-consign-price-service", 16110, "codewisdom/ts-consign-price-service:0.2.1@sha256:90c740e21fc77d657a20c13a3a1a4d518d6a4ca0c121a6184475938bdc272c3b"),
	JavaService::new(Worker::W3, "ts-consign-service", 16111, "codewisdom/ts-consign-service:0.2.1@sha256:8fe341338a7b4d244ec12e5b35c90bee2eec8c1c901896e5037b78ce3505c882"),
	JavaService::new(Worker::W3, "ts-contacts-service", 12347, "codewisdom/ts-contacts-service:0.2.1@sha256:725be6a0bda6674f1a71d30e658dbaef772c7fb384164a36c4489845e7738657"),
	JavaService::new(Worker::W3, "ts-execute-service", 12386, "codewisdom/ts-execute-service:0.2.1@sha256:637f66e0338682807ee7e77d773540c33f0b2f8d0143178687028b660f7348c7"),
	JavaService::new(Worker::W3, "ts-food-map-service", 18855, "codewisdom/ts-food-map-service:0.2.1@sha256:6ad2077df52547f1ef3b0fbafc77c202ae7d140d59bde00d494e3a1ae2090c36"),
	JavaService::new(Worker::W3, "ts-food-service", 18856, "codewisdom/ts-food-service:0.2.1@sha256:07ff7ddc36fc5dbd0371569df7517d699674e7ffa51594c12518428749f9c669").with_rabbitmq(),
	JavaService::new(Worker::W2, "ts-inside-payment-service", 18673, "codewisdom/ts-inside-payment-service:0.2.1@sha256:4df0f48b6110f151b76150624d1b9ed57250e28dafc6b5309c1b089261123390"),
	JavaService::new(Worker::W2, "ts-auth-service", 12340, "codewisdom/ts-auth-service:0.2.1@sha256:d635f47365721ae8ed37206f246cb96f935d4f54da9474d871ca13c25c41c231"),
	JavaService::new(Worker::W1, "ts-news-service", 12862, "codewisdom/ts-news-service:0.2.1@sha256:0f8ae8b5f09239f14f8b50ac02e3bc08e2f05fb011c48e65c174aaa3dd6c5326").with_entrypoint(),
	JavaService::new(Worker::W3, "ts-notification-service", 17853, "codewisdom/ts-notification-service:0.2.1@sha256:e6cecc7fa562d6b3f61d1bfc7f1319d27394406b5b262235e032292979d8cef4").with_rabbitmq(),
	JavaService::new(Worker::W3, "ts-order-other-service", 12032, "codewisdom/ts-order-other-service:0.2.1@sha256:9fb33c018ae66eb308432bd2409254ad733f93d850498a0076e9e311a87e5f56"),
	JavaService::new(Worker::W1, "ts-order-service", 12031, "codewisdom/ts-order-service:0.2.1@sha256:85d9dccfeed752462feab73877174daa8a0436ddabc6fbb65cecb608e69a4f9c"),
	JavaService::new(Worker::W2, "ts-payment-service", 19001, "codewisdom/ts-payment-service:0.2.1@sha256:7e315dc43ddca64d38274bb4bcc04baaf3cb14cfbe4b83c85bd7ae604e047f14"),
	JavaService::new(Worker::W3, "ts-preserve-other-service", 14569, "codewisdom/ts-preserve-other-service:0.2.1@sha256:0db786c18d96df72f7c40a32c5a62e8d126392296ad9f0a3ba9e3edd79226ef8").with_rabbitmq(),
	JavaService::new(Worker::W3, "ts-preserve-service", 14568, "codewisdom/ts-preserve-service:0.2.1@sha256:bb1b7f1e9caddf9ae819f365e4329c26fb042e89a7d61eff0dd31c54eafd12eb").with_rabbitmq(),
	JavaService::new(Worker::W4, "ts-price-service", 16579, "codewisdom/ts-price-service:0.2.1@sha256:06778da3b5c9d4af5de7320cabced0b2ac5e9f3981de3f20a32c9686add2d27e"),
	JavaService::new(Worker::W2, "ts-rebook-service", 18886, "codewisdom/ts-rebook-service:0.2.1@sha256:8115f0ddefd912289a8c058fd969ae0f42d514d5a53ef8c6b0bed60dbd2d6362"),
	JavaService::new(Worker::W3, "ts-route-plan-service", 14578, "codewisdom/ts-route-plan-service:0.2.1@sha256:c384d943f1a670570252e706e0770b09f0f716574e81d7ec6b54788eff025507"),
	JavaService::new(Worker::W4, "ts-route-service", 11178, "codewisdom/ts-route-service:0.2.1@sha256:825c997b808254de467755efcec0fd3140a0769bf385fcef81f7ad625a8189ff"),
	JavaService::new(Worker::W1, "ts-seat-service", 18898, "codewisdom/ts-seat-service:0.2.1@sha256:c28cee5df11120633f790e7e34282a3cd4dd3a43f1edbb68f86d32cdc9a92389"),
	JavaService::new(Worker::W3, "ts-security-service", 11188, "codewisdom/ts-security-service:0.2.1@sha256:eecaa520cf3a33a9ffce66688777ff61549931b8013c3dcae901544c41563432"),
	JavaService::new(Worker::W2, "ts-user-service", 12342, "codewisdom/ts-user-service:0.2.1@sha256:0b240607b7bec3dd9b7e4f4b4c0361d9281a25648ccb36c427330f9cf918e407"),
	JavaService::new(Worker::W3, "ts-station-service", 12345, "codewisdom/ts-station-service:0.2.1@sha256:ae1f66358a59ba1eea9079498e08b6a1fa8713ab3fd2760c500d21254d2985b0"),
	JavaService::new(Worker::W3, "ts-ticket-office-service", 16108, "codewisdom/ts-ticket-office-service:0.2.1@sha256:6d6f01686c4001b33d168fdf0a0a45c2851e46c11f0064e1e563a366d662b334").with_entrypoint(),
	JavaService::new(Worker::W2, "ts-ticketinfo-service", 15681, "codewisdom/ts-ticketinfo-service:0.2.1@sha256:b01122cfbf386cde4cb006989534b7edbb0fc2a5873b607f3d1b5d3b8de45427"),
	JavaService::new(Worker::W4, "ts-train-service", 14567, "codewisdom/ts-train-service:0.2.1@sha256:c2321c822bc7d6d6afb5bda65105f6222611621e196f0b752aa0152b80373124"),
	JavaService::new(Worker::W1, "ts-travel2-service", 16346, "codewisdom/ts-travel2-service:0.2.1@sha256:48b33c1309c6a7b576b38ab6bbeb0ff89cf98473270593df14ea56709f3c3601"),
	JavaService::new(Worker::W3, "ts-travel-plan-service", 14322, "codewisdom/ts-travel-plan-service:0.2.1@sha256:c9bd904a84cea8fc1e479eb83ba5d79edcc979277ea13658b8bf48d9a8f7ac68"),
	JavaService::new(Worker::W1, "ts-travel-service", 12346, "codewisdom/ts-travel-service:0.2.1@sha256:0c8a669cfc68be7149a05856f1c60201a0a6db6612b3f81f370caae452f85a82"),
	JavaService::new(Worker::W3, "ts-delivery-service", 18808, "codewisdom/ts-delivery-service:0.2.1@sha256:fa9fd1cbe73207a07c2ac6cf268d288545692a9a64430a0b4e1a5127908802cf").with_rabbitmq(),
	JavaService::new(Worker::W2, "ts-verification-code-service", 15678, "codewisdom/ts-verification-code-service:0.2.1@sha256:8fba43bf35a60ac3bbebcec8914f1b1de990ad0a5c21e18d35860e9b336e6922"),
	JavaService::new(Worker::W3, "ts-voucher-service", 16101, "codewisdom/ts-voucher-service:0.2.1@sha256:2635aefb54f22f32faff08fa4bb702593ec8e4b8e9760ed835df507d53242457").with_entrypoint(),
];

/// Order in which the `http` services of [`JAVA_SERVICES`] are listed.
const JAVA_SERVICE_ORDER: &[&str] = &[
	"ts-admin-basic-info-service",
	"ts-delivery-service",
	"ts-admin-order-service",
	"ts-admin-route-service",
	"ts-admin-travel-service",
	"ts-admin-user-service",
	"ts-assurance-service",
	"ts-basic-service",
	"ts-cancel-service",
	"ts-config-service",
	"ts-consign-price-service",
	"ts-consign-service",
	"ts-contacts-service",
	"ts-execute-service",
	"ts-food-map-service",
	"ts-food-service",
	"ts-inside-payment-service",
	"ts-user-service",
	"ts-notification-service",
	"ts-news-service",
	"ts-order-other-service",
	"ts-order-service",
	"ts-payment-service",
	"ts-preserve-other-service",
	"ts-preserve-service",
	"ts-price-service",
	"ts-rebook-service",
	"ts-route-plan-service",
	"ts-route-service",
	"ts-seat-service",
	"ts-security-service",
	"ts-auth-service",
	"ts-station-service",
	"ts-ticket-office-service",
	"ts-ticketinfo-service",
	"ts-train-service",
	"ts-travel2-service",
	"ts-travel-plan-service",
	"ts-travel-service",
	"ts-verification-code-service",
	"ts-voucher-service",
];

/// The entry point of the UI, reachable from outside the cluster.
const AUTH_SERVICE: &str = "ts-auth-service";

fn builder() -> ManifestBuilder {
	ManifestBuilder::builder()
		.namespace(NAMESPACE)
		.label_key("app")
		.enable_service_links(false)
		.build()
}

pub fn render(cluster: &Cluster) -> Result<Vec<Target>> {
	let b = builder();
	let mut records: Vec<Resource> = Vec::new();

	for store in STORES {
		records.push(store_deployment(&b, cluster, store)?.into());
		if store.inline_service {
			records.push(store_service(&b, store)?.into());
		}
	}
	records.push(rabbitmq(&b, cluster)?.into());
	records.push(
		b.service(
			"rabbitmq",
			Exposure::cluster(vec![ServicePort::new(RABBITMQ_PORT)]),
		)?
		.into(),
	);
	for store in STORES.iter().filter(|s| !s.inline_service) {
		records.push(store_service(&b, store)?.into());
	}

	for service in JAVA_SERVICES {
		records.push(java_deployment(&b, cluster, service)?.into());
	}
	for name in JAVA_SERVICE_ORDER {
		let service = JAVA_SERVICES
			.iter()
			.find(|s| s.name == *name)
			.with_context(|| format!("no java service named {name}"))?;
		let http = ServicePort::new(service.port).named("http");
		let exposure = if service.name == AUTH_SERVICE {
			Exposure::node_port(vec![http.node_port(AUTH_NODE_PORT)])
		} else {
			Exposure::cluster(vec![http])
		};
		records.push(b.service(service.name, exposure)?.into());
	}

	records.extend(avatar(&b, cluster)?);
	records.extend(dashboard(&b, cluster)?);

	Ok(vec![Target::numbered(
		App::TrainTicket,
		1,
		Document::assemble(Some(b.namespace()), records),
	)])
}

fn pinned(node: &str, container: Container) -> Workload {
	Workload::builder()
		.placement(node)
		.containers(vec![container])
		.build()
}

fn readiness(port: u16, (delay, period, timeout): (u32, u32, u32)) -> Probe {
	Probe::tcp(port, delay, period, timeout)
}

fn store_port(store: &Store) -> u16 {
	match store.engine {
		Engine::Mongo => MONGO_PORT,
		Engine::MySql => MYSQL_PORT,
	}
}

fn store_deployment(
	b: &ManifestBuilder,
	cluster: &Cluster,
	store: &Store,
) -> Result<manifest_builder::Deployment> {
	let container = Container::builder()
		.name(store.name)
		.image_pull_policy(PullPolicy::IfNotPresent)
		.ports(vec![ContainerPort::tcp(store_port(store))]);
	let container = match store.engine {
		Engine::Mongo => container.image(ImageRef::parse(IMAGE_MONGO)?).build(),
		Engine::MySql => container
			.image(ImageRef::parse(IMAGE_MYSQL)?)
			.env(vec![EnvVar::value("MYSQL_ROOT_PASSWORD", "root")])
			.build(),
	};
	Ok(b.deployment(store.name, pinned(cluster.node(store.worker), container))?)
}

fn store_service(b: &ManifestBuilder, store: &Store) -> Result<manifest_builder::Service> {
	Ok(b.service(
		store.name,
		Exposure::cluster(vec![ServicePort::new(store_port(store))]),
	)?)
}

fn rabbitmq(b: &ManifestBuilder, cluster: &Cluster) -> Result<manifest_builder::Deployment> {
	let container = Container::builder()
		.name("rabbitmq")
		.image(ImageRef::parse(IMAGE_RABBITMQ)?)
		.image_pull_policy(PullPolicy::IfNotPresent)
		.ports(vec![ContainerPort::tcp(RABBITMQ_PORT)])
		.build();
	Ok(b.deployment("rabbitmq", pinned(cluster.node(Worker::W3), container))?)
}

fn java_env(service: &JavaService) -> Vec<EnvVar> {
	let mut env = vec![EnvVar::field_ref("NODE_IP", "status.hostIP")];
	if service.rabbitmq {
		env.push(EnvVar::value("rabbitmq_host", "rabbitmq"));
		env.push(EnvVar::value("rabbitmq_port", RABBITMQ_PORT.to_string()));
	}
	env
}

fn java_deployment(
	b: &ManifestBuilder,
	cluster: &Cluster,
	service: &JavaService,
) -> Result<manifest_builder::Deployment> {
	let command = if service.jar {
		vec![
			"java".to_owned(),
			"-jar".to_owned(),
			format!("/app/{}-1.0.jar", service.name),
		]
	} else {
		Vec::new()
	};
	let container = Container::builder()
		.name(service.name)
		.image(ImageRef::parse(service.image)?)
		.image_pull_policy(PullPolicy::IfNotPresent)
		.command(command)
		.env(java_env(service))
		.ports(vec![ContainerPort::tcp(service.port)])
		.readiness_probe(readiness(service.port, JAVA_READINESS))
		.build();
	Ok(b.deployment(service.name, pinned(cluster.node(service.worker), container))?)
}

fn avatar(b: &ManifestBuilder, cluster: &Cluster) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name("ts-avatar-service")
		.image(ImageRef::parse(IMAGE_AVATAR)?)
		.image_pull_policy(PullPolicy::IfNotPresent)
		.ports(vec![ContainerPort::tcp(AVATAR_PORT)])
		.readiness_probe(readiness(AVATAR_PORT, AVATAR_READINESS))
		.build();
	Ok(b.deployment_and_service(
		"ts-avatar-service",
		pinned(cluster.node(Worker::W2), container),
		Exposure::cluster(vec![ServicePort::new(AVATAR_PORT).named("http")]),
	)?)
}

fn dashboard(
	b: &ManifestBuilder,
	cluster: &Cluster,
) -> Result<impl IntoIterator<Item = Resource>> {
	let container = Container::builder()
		.name("ts-ui-dashboard")
		.image(ImageRef::parse(IMAGE_DASHBOARD)?)
		.image_pull_policy(PullPolicy::IfNotPresent)
		.ports(vec![ContainerPort::tcp(DASHBOARD_PORT)])
		.build();
	Ok(b.deployment_and_service(
		"ts-ui-dashboard",
		pinned(cluster.node(Worker::W3), container),
		Exposure::node_port(vec![ServicePort::new(DASHBOARD_PORT)
			.named("http")
			.node_port(DASHBOARD_NODE_PORT)]),
	)?)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use manifest_builder::{Deployment, ServiceKind};
	use serde_json::json;

	use super::*;

	fn document() -> Document {
		let mut targets = render(&Cluster::default()).unwrap();
		assert_eq!(targets.len(), 1);
		targets.remove(0).document
	}

	fn deployment<'a>(document: &'a Document, name: &str) -> &'a Deployment {
		document
			.items()
			.iter()
			.find_map(|r| match r {
				Resource::Deployment(d) if d.metadata.name == name => Some(d),
				_ => None,
			})
			.unwrap()
	}

	#[test]
	fn test_service_order_is_a_permutation() {
		let names: HashSet<_> = JAVA_SERVICES.iter().map(|s| s.name).collect();
		let ordered: HashSet<_> = JAVA_SERVICE_ORDER.iter().copied().collect();
		assert_eq!(names.len(), JAVA_SERVICES.len());
		assert_eq!(ordered.len(), JAVA_SERVICE_ORDER.len());
		assert_eq!(names, ordered);
	}

	#[test]
	fn test_record_order() {
		let document = document();
		let names: Vec<_> = document
			.items()
			.iter()
			.map(|r| format!("{}/{}", r.kind(), r.name()))
			.collect();

		assert_eq!(names[0], "Namespace/train-ticket");
		assert_eq!(names[1], "Deployment/ts-user-mongo");
		assert_eq!(names[18], "Deployment/ts-voucher-mysql");
		assert_eq!(
			&names[23..29],
			[
				"Deployment/ts-notification-mongo",
				"Service/ts-notification-mongo",
				"Deployment/ts-delivery-mongo",
				"Service/ts-delivery-mongo",
				"Deployment/rabbitmq",
				"Service/rabbitmq",
			]
		);
		assert_eq!(names[29], "Service/ts-user-mongo");
		assert_eq!(names[51], "Deployment/ts-admin-basic-info-service");
		assert_eq!(names[92], "Service/ts-admin-basic-info-service");
		assert_eq!(names[93], "Service/ts-delivery-service");
		assert_eq!(
			&names[names.len() - 4..],
			[
				"Deployment/ts-avatar-service",
				"Service/ts-avatar-service",
				"Deployment/ts-ui-dashboard",
				"Service/ts-ui-dashboard",
			]
		);
		assert_eq!(names.len(), 1 + 24 * 2 + 2 + 41 * 2 + 4);
	}

	#[test]
	fn test_java_container() {
		let document = document();
		let food = deployment(&document, "ts-food-service");
		assert_eq!(
			serde_json::to_value(&food.spec.template.spec.containers[0]).unwrap(),
			json!({
				"name": "ts-food-service",
				"image": "codewisdom/ts-food-service:0.2.1@sha256:07ff7ddc36fc5dbd0371569df7517d699674e7ffa51594c12518428749f9c669",
				"imagePullPolicy": "IfNotPresent",
				"command": ["java", "-jar", "/app/ts-food-service-1.0.jar"],
				"env": [
					{ "name": "NODE_IP", "valueFrom": { "fieldRef": { "fieldPath": "status.hostIP" } } },
					{ "name": "rabbitmq_host", "value": "rabbitmq" },
					{ "name": "rabbitmq_port", "value": "5672" },
				],
				"ports": [{ "containerPort": 18856 }],
				"readinessProbe": {
					"tcpSocket": { "port": 18856 },
					"initialDelaySeconds": 60,
					"periodSeconds": 10,
					"timeoutSeconds": 5,
				},
			})
		);
		assert_eq!(food.pod_labels()["app"], "ts-food-service");
		assert_eq!(food.spec.template.metadata.name, None);
	}

	#[test]
	fn test_entrypoint_services_have_no_command() {
		let document = document();
		for name in ["ts-news-service", "ts-ticket-office-service", "ts-voucher-service"] {
			let container = &deployment(&document, name).spec.template.spec.containers[0];
			assert!(container.command.is_empty(), "{name}");
			assert_eq!(container.env.len(), 1);
		}
	}

	#[test]
	fn test_avatar_waits_longer() {
		let document = document();
		let avatar = deployment(&document, "ts-avatar-service");
		let probe = avatar.spec.template.spec.containers[0]
			.readiness_probe
			.unwrap();
		assert_eq!(probe, Probe::tcp(17001, 160, 10, 5));
	}

	#[test]
	fn test_node_ports() {
		let document = document();
		let exposed: Vec<_> = document
			.items()
			.iter()
			.filter_map(|r| match r {
				Resource::Service(s) if s.spec.kind == Some(ServiceKind::NodePort) => {
					Some((s.metadata.name.as_str(), s.spec.ports[0].node_port))
				}
				_ => None,
			})
			.collect();
		assert_eq!(
			exposed,
			[
				("ts-auth-service", Some(30000)),
				("ts-ui-dashboard", Some(30001)),
			]
		);
	}
}
