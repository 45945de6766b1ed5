use clap::{Parser, Subcommand};
use likeligrid::cancel::CancelToken;
use likeligrid::search::SearchOutcome;
use std::process;
use tracing::{error, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Worker threads for point evaluation
    #[arg(global = true, short = 'j', long, default_value_t = 1)]
    jobs: usize,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Coarse-to-fine grid search with resumable stage files
    Grid(cmd::grid::GridArgs),
    /// Stochastic hill climb on a fine lattice
    Climb(cmd::climb::ClimbArgs),
    /// Log-likelihood of one coefficient vector
    Eval(cmd::eval::EvalArgs),
    /// Time repeated likelihood evaluations
    Bench(cmd::bench::BenchArgs),
}

#[cfg(unix)]
mod interrupt {
    use likeligrid::cancel::CancelToken;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};

    static FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    extern "C" fn on_sigint(_: libc::c_int) {
        if let Some(flag) = FLAG.get() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn install(cancel: &CancelToken) {
        if FLAG.set(cancel.flag()).is_ok() {
            unsafe {
                libc::signal(libc::SIGINT, on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t);
            }
        }
    }
}

#[cfg(not(unix))]
mod interrupt {
    pub fn install(_cancel: &likeligrid::cancel::CancelToken) {}
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancelToken::new();
    interrupt::install(&cancel);

    let result = match cli.command {
        Commands::Grid(args) => cmd::grid::run(args, cli.jobs, &cancel),
        Commands::Climb(args) => cmd::climb::run(args, cli.jobs, &cancel),
        Commands::Eval(args) => cmd::eval::run(args).map(|_| SearchOutcome::Completed),
        Commands::Bench(args) => cmd::bench::run(args).map(|_| SearchOutcome::Completed),
    };

    match result {
        Ok(SearchOutcome::Completed) => {}
        Ok(SearchOutcome::Interrupted) => warn!("⚠️  Stopped early; progress has been saved."),
        Err(e) => {
            error!("❌ {}", e);
            process::exit(1);
        }
    }
}
