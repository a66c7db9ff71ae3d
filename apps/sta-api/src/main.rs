use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sta_api::Args::parse();

	sta_api::run(args).await
}
