use std::sync::Arc;

use sta_service::ArchiveService;
use sta_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ArchiveService>,
}
impl AppState {
	pub async fn new(config: sta_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(ArchiveService::new(config, db)))
	}

	pub fn from_service(service: ArchiveService) -> Self {
		Self { service: Arc::new(service) }
	}
}
