use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = reelsmith::cli::Cli::parse();
    reelsmith::run(cli)
}
