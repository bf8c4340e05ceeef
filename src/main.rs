use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    leafwatch_lib::run(leafwatch_lib::cli::Cli::parse()).await
}
