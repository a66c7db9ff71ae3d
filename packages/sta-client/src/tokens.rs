use std::sync::atomic::{AtomicU64, Ordering};

/// Issues monotonically increasing request tokens.
///
/// Only the most recently issued token is current. A response carrying any other token is stale
/// and must be dropped on arrival.
#[derive(Debug, Default)]
pub struct RequestTokens {
	latest: AtomicU64,
}
impl RequestTokens {
	pub fn new() -> Self {
		Self::default()
	}

	/// Hands out a new token, superseding every earlier one.
	pub fn issue(&self) -> u64 {
		self.latest.fetch_add(1, Ordering::AcqRel) + 1
	}

	pub fn is_current(&self, token: u64) -> bool {
		token != 0 && self.latest.load(Ordering::Acquire) == token
	}

	/// Makes every outstanding token stale without issuing a usable one.
	pub fn invalidate(&self) {
		self.latest.fetch_add(1, Ordering::AcqRel);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newest_token_wins() {
		let tokens = RequestTokens::new();
		let first = tokens.issue();
		let second = tokens.issue();

		assert!(second > first);
		assert!(!tokens.is_current(first));
		assert!(tokens.is_current(second));
	}

	#[test]
	fn invalidate_retires_everything() {
		let tokens = RequestTokens::new();
		let token = tokens.issue();

		tokens.invalidate();

		assert!(!tokens.is_current(token));
		assert!(!tokens.is_current(0));
		assert!(tokens.is_current(tokens.issue()));
	}
}
