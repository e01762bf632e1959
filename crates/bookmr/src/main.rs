use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = bookmr::cli::Cli::parse();
    bookmr::init(cli.verbose);
    bookmr::cli::run(cli)
}
