#[macro_use]
extern crate hiro_system_kit;

use clap::Parser;
use nextflow_lsp::server::{run_lsp, ServerOptions};
use nextflow_lsp::Context;
use std::path::PathBuf;
use std::process;

/// Language server for Nextflow pipelines and Groovy sources
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Workspace root; defaults to the root sent by the client
    #[clap(long = "root")]
    root: Option<PathBuf>,
    /// Base directory for disposable compiler output
    #[clap(long = "output-dir")]
    output_dir: Option<PathBuf>,
}

fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    let ctx = Context::new(logger);

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let options = ServerOptions { root: opts.root, output_dir: opts.output_dir };
    if let Err(e) = run_lsp(options, &ctx) {
        ctx.try_log(|logger| error!(logger, "{e}"));
        std::thread::sleep(std::time::Duration::from_millis(500));
        process::exit(1);
    }
}
