//! The benchmark applications and the files each of them produces.

use std::{fmt, path::PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use manifest_builder::{Document, ServicePort};

use crate::config::Cluster;

pub mod hotel_reservation;
pub mod social_network;
pub mod train_ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum App {
	HotelReservation,
	SocialNetwork,
	TrainTicket,
}

impl App {
	pub const ALL: [App; 3] = [App::HotelReservation, App::SocialNetwork, App::TrainTicket];

	/// Namespace and output folder of the application.
	pub fn name(self) -> &'static str {
		match self {
			App::HotelReservation => hotel_reservation::NAMESPACE,
			App::SocialNetwork => social_network::NAMESPACE,
			App::TrainTicket => train_ticket::NAMESPACE,
		}
	}

	/// Build every document of the application.
	pub fn render(self, cluster: &Cluster) -> Result<Vec<Target>> {
		match self {
			App::HotelReservation => hotel_reservation::render(cluster),
			App::SocialNetwork => social_network::render(cluster),
			App::TrainTicket => train_ticket::render(cluster),
		}
		.with_context(|| format!("rendering {self}"))
	}
}

impl fmt::Display for App {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// One output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	/// Relative to the output directory
	pub path: PathBuf,
	pub document: Document,
}

impl Target {
	/// The `index`-th document of `app`, stored as `<app>/<index>.json`.
	pub fn numbered(app: App, index: usize, document: Document) -> Self {
		Self {
			path: PathBuf::from(app.name()).join(format!("{index}.json")),
			document,
		}
	}
}

/// Port published under its own number, as kompose names them.
pub(crate) fn numbered_port(port: u16) -> ServicePort {
	ServicePort::mapped(port, port).named(port.to_string())
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use manifest_builder::{Labels, Resource};
	use rstest::rstest;

	use super::*;

	fn render(app: App) -> Vec<Target> {
		app.render(&Cluster::default()).unwrap()
	}

	#[test]
	fn test_target_paths() {
		let paths: Vec<_> = App::ALL
			.into_iter()
			.flat_map(render)
			.map(|t| t.path)
			.collect();
		assert_eq!(
			paths,
			[
				PathBuf::from("hotel-reservation/1.json"),
				PathBuf::from("social-network/1.json"),
				PathBuf::from("social-network/2.json"),
				PathBuf::from("train-ticket/1.json"),
			]
		);
	}

	#[rstest]
	#[case(App::HotelReservation)]
	#[case(App::SocialNetwork)]
	#[case(App::TrainTicket)]
	fn test_render_is_deterministic(#[case] app: App) {
		let first = render(app);
		let second = render(app);
		assert_eq!(first, second);
		for (a, b) in first.iter().zip(&second) {
			assert_eq!(a.document.to_json().unwrap(), b.document.to_json().unwrap());
		}
	}

	#[rstest]
	#[case(App::HotelReservation)]
	#[case(App::SocialNetwork)]
	#[case(App::TrainTicket)]
	fn test_every_service_selects_a_pod(#[case] app: App) {
		for target in render(app) {
			let pod_labels: Vec<&Labels> = target
				.document
				.items()
				.iter()
				.filter_map(|r| match r {
					Resource::Deployment(d) => Some(d.pod_labels()),
					_ => None,
				})
				.collect();

			for resource in target.document.items() {
				let Resource::Service(service) = resource else {
					continue;
				};
				let selector = &service.spec.selector;
				assert!(
					pod_labels
						.iter()
						.any(|labels| selector.iter().all(|(k, v)| labels.get(k) == Some(v))),
					"service {} in {} selects no pod",
					service.metadata.name,
					target.path.display()
				);
			}
		}
	}

	#[rstest]
	#[case(App::HotelReservation)]
	#[case(App::SocialNetwork)]
	#[case(App::TrainTicket)]
	fn test_every_claim_is_bindable(#[case] app: App) {
		for target in render(app) {
			let items = target.document.items();
			for resource in items {
				let Resource::PersistentVolumeClaim(claim) = resource else {
					continue;
				};
				let bound = items.iter().any(|r| {
					matches!(r, Resource::PersistentVolume(volume)
						if volume.spec.storage_class_name == claim.spec.storage_class_name
							&& volume.spec.capacity == claim.spec.resources.requests)
				});
				assert!(bound, "claim {} has no volume", claim.metadata.name);
			}
		}
	}

	#[rstest]
	#[case(App::HotelReservation)]
	#[case(App::SocialNetwork)]
	#[case(App::TrainTicket)]
	fn test_names_are_unique_per_kind(#[case] app: App) {
		for target in render(app) {
			let mut seen = HashSet::new();
			for resource in target.document.items() {
				assert!(
					seen.insert((resource.kind(), resource.name().to_owned())),
					"duplicate {} {}",
					resource.kind(),
					resource.name()
				);
			}
		}
	}

	#[rstest]
	#[case(App::HotelReservation)]
	#[case(App::SocialNetwork)]
	#[case(App::TrainTicket)]
	fn test_namespace_is_consistent(#[case] app: App) {
		for target in render(app) {
			for resource in target.document.items() {
				if resource.kind() == "Namespace" {
					assert_eq!(resource.name(), app.name());
				} else {
					assert_eq!(resource.metadata().namespace.as_deref(), Some(app.name()));
				}
			}
		}
	}

	#[test]
	fn test_workers_come_from_config() {
		let cluster = Cluster {
			worker3: "custom-node".to_string(),
			..Cluster::default()
		};
		let targets = App::SocialNetwork.render(&cluster).unwrap();
		let pinned = targets[0].document.items().iter().any(|r| {
			matches!(r, Resource::Deployment(d)
				if d.spec.template.spec.node_name.as_deref() == Some("custom-node"))
		});
		assert!(pinned);
	}
}
