use osmget_core::logging::{self, LogSink};

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse_args();

    let sink = if cli.log_file {
        LogSink::state_file()
    } else {
        Ok(LogSink::Stderr)
    };
    if let Err(err) = sink.and_then(|s| logging::init_logging(&s)) {
        logging::init_logging(&LogSink::Stderr).expect("failed to initialize logging");
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    match cli.run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("osmget error: {:#}", err);
            std::process::exit(1);
        }
    }
}
