use serde::Deserialize;

pub const DEFAULT_AUTOCOMPLETE_LIMIT: u32 = 10;
pub const DEFAULT_TEST_LIST_LIMIT: u32 = 500;
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	pub client: Option<Client>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Maximum number of subjects returned for one autocomplete query.
	#[serde(default = "default_autocomplete_limit")]
	pub autocomplete_limit: u32,
	/// Maximum number of records returned by the test listing.
	#[serde(default = "default_test_list_limit")]
	pub test_list_limit: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			autocomplete_limit: DEFAULT_AUTOCOMPLETE_LIMIT,
			test_list_limit: DEFAULT_TEST_LIST_LIMIT,
		}
	}
}

/// Settings for embedders of the client core. The server ignores this section.
#[derive(Debug, Deserialize, Clone)]
pub struct Client {
	pub api_base: String,
	#[serde(default = "default_debounce_ms")]
	pub debounce_ms: u64,
	pub timeout_ms: u64,
}

fn default_autocomplete_limit() -> u32 {
	DEFAULT_AUTOCOMPLETE_LIMIT
}

fn default_test_list_limit() -> u32 {
	DEFAULT_TEST_LIST_LIMIT
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE_MS
}
