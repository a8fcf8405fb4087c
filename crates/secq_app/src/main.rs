use clap::Parser;

mod cli;
mod platform;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    platform::run_app(cli)
}
