//! Relative import resolution.
//!
//! Only specifiers starting with `.` are resolved; everything else is a package import
//! and stays external. There is no alias or package-manager resolution.

use super::path_segments;

/// Outcome of resolving one import specifier against the importing file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
	/// A normalized candidate path inside the upload.
	Local(String),
	/// A package import, returned unchanged. Never becomes an edge.
	External(&'a str),
	/// A relative specifier that names nothing, such as `.` from a root-level file.
	Unresolvable,
}

/// Resolves relative import specifiers, trying a fixed list of extensions.
#[derive(Clone, Debug)]
pub struct PathResolver {
	extensions: Vec<String>,
}

impl PathResolver {
	/// A resolver probing `extensions` (each with its leading dot) in order.
	pub fn new(extensions: Vec<String>) -> Self {
		Self { extensions }
	}

	/// Resolves `specifier` as written in `current_file`.
	///
	/// When the last segment has no extension, each configured extension is tried in
	/// order and the first candidate accepted by `is_known` wins. If none is known the
	/// first candidate is returned anyway, so the caller's lookup decides.
	pub fn resolve<'a>(
		&self,
		current_file: &str,
		specifier: &'a str,
		is_known: impl Fn(&str) -> bool,
	) -> Resolution<'a> {
		if !specifier.starts_with('.') {
			return Resolution::External(specifier);
		}

		let mut parts = path_segments(current_file);
		parts.pop();
		// `..` at the upload root stays at the root.
		for segment in specifier.split('/') {
			match segment {
				"" | "." => {}
				".." => {
					parts.pop();
				}
				other => parts.push(other),
			}
		}

		let Some(last) = parts.last() else {
			return Resolution::Unresolvable;
		};
		let base = parts.join("/");
		if last.contains('.') || self.extensions.is_empty() {
			return Resolution::Local(base);
		}

		let mut candidates = self.extensions.iter().map(|ext| format!("{base}{ext}"));
		let first = candidates.next().unwrap_or_else(|| base.clone());
		if is_known(first.as_str()) {
			return Resolution::Local(first);
		}
		candidates
			.find(|candidate| is_known(candidate.as_str()))
			.map(Resolution::Local)
			.unwrap_or(Resolution::Local(first))
	}
}

impl Default for PathResolver {
	fn default() -> Self {
		Self::new(super::IngestConfig::default().resolve_extensions)
	}
}
