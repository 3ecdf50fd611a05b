mod progress;

use loopfetch_lib::cancellation::Cancellation;
use loopfetch_lib::cli::{
    Command, ResolvedCommand, parse_args, resolve_command, run_fetch, run_list,
};
use loopfetch_lib::download::{ProgressReporter, TracingProgress};
use loopfetch_lib::error::LoopFetchError;
use progress::ConsoleProgress;
use std::io::IsTerminal;

async fn run(command: Command, cancellation: Cancellation) -> Result<(), LoopFetchError> {
    match resolve_command(command)? {
        ResolvedCommand::Fetch(params) => {
            let progress: Box<dyn ProgressReporter> = if std::io::stderr().is_terminal() {
                Box::new(ConsoleProgress::new())
            } else {
                Box::new(TracingProgress)
            };
            run_fetch(params, progress.as_ref(), cancellation).await
        }
        ResolvedCommand::List(params) => run_list(params, cancellation).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = parse_args();
    let cancellation = Cancellation::new();
    cancellation.cancel_on_ctrl_c();

    if let Err(err) = run(args.command, cancellation).await {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }

    Ok(())
}
