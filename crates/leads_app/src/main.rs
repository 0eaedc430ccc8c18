mod cli;
mod platform;

fn main() -> anyhow::Result<()> {
    let args = cli::parse_cli();
    platform::run_app(args)
}
