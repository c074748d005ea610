use detect_scenes::args::{Command, USAGE};
use detect_scenes::processor::Processor;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse command line arguments
    let config = match Command::parse()? {
        Command::Run(config) => config,
        Command::Usage => {
            println!("{}", USAGE);
            return Ok(());
        }
    };

    // Process every matching file, stopping at the first fatal error
    let mut processor = Processor::new(&config);
    processor.process_pattern()
}
