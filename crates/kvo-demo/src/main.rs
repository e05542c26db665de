#![forbid(unsafe_code)]

//! Birthday demo binary entry point.

use kvo_demo::{cli, logging, scenario};
use kvo_runtime::StdoutSink;

fn main() {
    let opts = cli::Opts::parse();
    logging::init();

    if let Err(e) = scenario::run(&opts, StdoutSink) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
