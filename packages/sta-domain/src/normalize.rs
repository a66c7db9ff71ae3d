//! Text normalization shared by every facet comparison.
//!
//! Source rows are not guaranteed to be canonically cased or trimmed, so two spellings such as
//! `"MIT "` and `"mit"` must compare equal everywhere: when filtering rows for the next facet
//! level, when grouping distinct values, and when resolving a complete tuple to one record.

use unicode_normalization::UnicodeNormalization;

/// Canonical comparison key: NFKC, trimmed, internal whitespace collapsed, lowercased.
pub fn normalize_facet(raw: &str) -> String {
	let folded: String = raw.nfkc().collect();
	let mut out = String::with_capacity(folded.len());

	for word in folded.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.extend(word.chars().flat_map(char::to_lowercase));
	}

	out
}

/// Spelling shown to users: trimmed with internal whitespace collapsed, case preserved.
pub fn display_facet(raw: &str) -> String {
	raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn facet_eq(left: &str, right: &str) -> bool {
	normalize_facet(left) == normalize_facet(right)
}
