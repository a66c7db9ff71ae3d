mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Client, Config, DEFAULT_AUTOCOMPLETE_LIMIT, DEFAULT_DEBOUNCE_MS, DEFAULT_TEST_LIST_LIMIT,
	Postgres, Search, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if !(1..=100).contains(&cfg.search.autocomplete_limit) {
		return Err(Error::Validation {
			message: "search.autocomplete_limit must be in the range 1-100.".to_string(),
		});
	}
	if cfg.search.test_list_limit == 0 {
		return Err(Error::Validation {
			message: "search.test_list_limit must be greater than zero.".to_string(),
		});
	}

	if let Some(client) = cfg.client.as_ref() {
		if client.api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: "client.api_base must be non-empty.".to_string(),
			});
		}
		if !client.api_base.starts_with("http://") && !client.api_base.starts_with("https://") {
			return Err(Error::Validation {
				message: "client.api_base must start with http:// or https://.".to_string(),
			});
		}
		if client.debounce_ms == 0 || client.debounce_ms > 2_000 {
			return Err(Error::Validation {
				message: "client.debounce_ms must be in the range 1-2000.".to_string(),
			});
		}
		if client.timeout_ms == 0 {
			return Err(Error::Validation {
				message: "client.timeout_ms must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
	if let Some(client) = cfg.client.as_mut() {
		let trimmed = client.api_base.trim().trim_end_matches('/');

		client.api_base = trimmed.to_string();
	}
}
