//! Lexical import extraction.
//!
//! Matching is purely pattern based: statements inside comments or string literals
//! that look like imports are reported too.

use std::sync::LazyLock;

use regex::Regex;

/// `import x from '...'`, `import '...'` and `export ... from '...'`, either quote style.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\b(?:import|export)\s+(?:[^'";]*?\s*\bfrom\s*)?['"]([^'"\n]+)['"]"#)
		.unwrap_or_else(|e| panic!("import pattern: {e}"))
});

/// Extracts raw import specifiers from source text.
///
/// Implementations yield specifiers lazily and in source order.
pub trait ImportScanner {
	/// Every import specifier in `content`.
	fn scan<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

/// Regex scanner for JavaScript/TypeScript module syntax.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternScanner;

impl ImportScanner for PatternScanner {
	fn scan<'a>(&self, content: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
		Box::new(
			IMPORT_RE
				.captures_iter(content)
				.filter_map(|caps| caps.get(1))
				.map(|m| m.as_str()),
		)
	}
}
