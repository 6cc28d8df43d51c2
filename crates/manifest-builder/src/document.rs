use serde::Serialize;

use crate::resource::{Namespace, Resource, TypeMeta};

/// A `v1/List` of records, applied by Kubernetes in item order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
	#[serde(flatten)]
	type_meta: TypeMeta,
	items: Vec<Resource>,
}

impl Document {
	/// Namespace first (if any), then `records` exactly in the given order.
	pub fn assemble(
		namespace: Option<Namespace>,
		records: impl IntoIterator<Item = Resource>,
	) -> Self {
		let items = namespace
			.map(Resource::from)
			.into_iter()
			.chain(records)
			.collect();
		Self {
			type_meta: TypeMeta::LIST,
			items,
		}
	}

	pub fn items(&self) -> &[Resource] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Pretty JSON with two-space indentation and a trailing newline.
	pub fn to_json(&self) -> serde_json::Result<String> {
		let mut out = serde_json::to_string_pretty(self)?;
		out.push('\n');
		Ok(out)
	}
}
