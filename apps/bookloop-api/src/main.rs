use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = bookloop_api::Args::parse();

	bookloop_api::run(args).await
}
