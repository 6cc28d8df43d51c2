use std::{fs, path::Path};

use benchgen::{
	apps::App,
	commands::{
		check::{self, CheckArgs},
		generate::{self, GenerateArgs},
		show::{self, ShowArgs},
		AppSelection, CommonArgs,
	},
};
use indoc::formatdoc;
use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

/// A workspace with its own config, so the tests never pick up a
/// `.benchgen.yaml` from the surrounding checkout.
struct Workspace {
	dir: TempDir,
}

impl Workspace {
	fn root(&self) -> &Path {
		self.dir.path()
	}

	fn common(&self) -> CommonArgs {
		CommonArgs {
			log_level: None,
			config: Some(self.root().join("benchgen.yaml")),
		}
	}

	fn generate(&self, apps: Vec<App>) -> String {
		let mut out = Vec::new();
		generate::run(
			GenerateArgs {
				selection: AppSelection { apps },
				output_dir: None,
				common: self.common(),
			},
			&mut out,
		)
		.unwrap();
		String::from_utf8(out).unwrap()
	}

	fn check(&self, apps: Vec<App>) -> (anyhow::Result<()>, String) {
		let mut out = Vec::new();
		let result = check::run(
			CheckArgs {
				selection: AppSelection { apps },
				output_dir: None,
				common: self.common(),
			},
			&mut out,
		);
		(result, String::from_utf8(out).unwrap())
	}

	fn read(&self, path: &str) -> String {
		fs::read_to_string(self.root().join("manifests").join(path)).unwrap()
	}
}

#[fixture]
fn workspace() -> Workspace {
	let dir = TempDir::new().unwrap();
	let config = formatdoc! {"
		outputDir: {}
		workers:
		  worker1: node-1
		  worker2: node-2
		  worker3: node-3
		  worker4: node-4
		",
		dir.path().join("manifests").display()
	};
	fs::write(dir.path().join("benchgen.yaml"), config).unwrap();
	Workspace { dir }
}

#[rstest]
fn test_generate_writes_every_file(workspace: Workspace) {
	let out = workspace.generate(Vec::new());
	assert_eq!(out.lines().count(), 4);

	for path in [
		"hotel-reservation/1.json",
		"social-network/1.json",
		"social-network/2.json",
		"train-ticket/1.json",
	] {
		let content = workspace.read(path);
		assert!(content.ends_with("}\n"), "{path}");
		let document: Value = serde_json::from_str(&content).unwrap();
		assert_eq!(document["kind"], "List");
	}
}

#[rstest]
fn test_generate_then_check_passes(workspace: Workspace) {
	workspace.generate(Vec::new());
	let (result, diff) = workspace.check(Vec::new());
	result.unwrap();
	assert!(diff.is_empty());
}

#[rstest]
fn test_second_generate_is_a_no_op(workspace: Workspace) {
	workspace.generate(Vec::new());
	let before = workspace.read("train-ticket/1.json");

	let out = workspace.generate(Vec::new());
	assert!(out.is_empty(), "rewrote unchanged files: {out}");
	assert_eq!(workspace.read("train-ticket/1.json"), before);
}

#[rstest]
fn test_edited_file_fails_check(workspace: Workspace) {
	workspace.generate(vec![App::SocialNetwork]);
	let path = workspace.root().join("manifests/social-network/2.json");
	let edited = fs::read_to_string(&path)
		.unwrap()
		.replace("WriteHomeTimelineService", "Tampered");
	fs::write(&path, edited).unwrap();

	let (result, diff) = workspace.check(vec![App::SocialNetwork]);
	let err = result.unwrap_err();
	assert!(err.to_string().contains("1 of 2 file(s) out of date"), "{err}");
	assert!(diff.contains("--- a/social-network/2.json"));
	assert!(diff
		.lines()
		.any(|l| l.starts_with('-') && l.contains("\"Tampered\"")));
	assert!(diff
		.lines()
		.any(|l| l.starts_with('+') && l.contains("\"WriteHomeTimelineService\"")));
}

#[rstest]
fn test_missing_file_fails_check(workspace: Workspace) {
	let (result, diff) = workspace.check(vec![App::HotelReservation]);
	assert!(result.is_err());
	assert!(diff.contains("--- /dev/null"));
	assert!(diff.contains("+++ b/hotel-reservation/1.json"));
}

#[rstest]
fn test_workers_from_config_reach_the_output(workspace: Workspace) {
	workspace.generate(vec![App::HotelReservation]);
	let document: Value =
		serde_json::from_str(&workspace.read("hotel-reservation/1.json")).unwrap();
	let consul = &document["items"][1];
	assert_eq!(consul["metadata"]["name"], "consul");
	assert_eq!(consul["spec"]["template"]["spec"]["nodeName"], "node-1");
	assert!(!workspace.read("hotel-reservation/1.json").contains("autothrottle"));
}

#[rstest]
fn test_show_matches_generated_files(workspace: Workspace) {
	workspace.generate(vec![App::SocialNetwork]);

	let mut out = Vec::new();
	show::run(
		ShowArgs {
			app: App::SocialNetwork,
			common: workspace.common(),
		},
		&mut out,
	)
	.unwrap();

	let expected = workspace.read("social-network/1.json") + &workspace.read("social-network/2.json");
	assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[rstest]
fn test_every_claim_has_a_volume(workspace: Workspace) {
	workspace.generate(vec![App::HotelReservation]);
	let document: Value =
		serde_json::from_str(&workspace.read("hotel-reservation/1.json")).unwrap();
	let items = document["items"].as_array().unwrap();

	let claims: Vec<_> = items
		.iter()
		.filter(|item| item["kind"] == "PersistentVolumeClaim")
		.collect();
	assert_eq!(claims.len(), 6);
	for claim in claims {
		let class = &claim["spec"]["storageClassName"];
		assert!(
			items.iter().any(|item| item["kind"] == "PersistentVolume"
				&& item["spec"]["storageClassName"] == *class
				&& item["spec"]["capacity"] == claim["spec"]["resources"]["requests"]),
			"{}",
			claim["metadata"]["name"]
		);
	}
}
