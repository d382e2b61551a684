use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Convert proxy subscriptions to Clash config files", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "Config output path, defaults to stdout")]
    pub output: Option<String>,

    #[arg(short, long, help = "Emit debug log")]
    pub verbose: bool,
}
