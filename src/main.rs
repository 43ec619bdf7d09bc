mod cli;
mod commands;
mod formatting;
mod logging;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_invoke, run_render, run_serve};
use formatting::render_error;
use settings::{load_config, log_effective_settings, resolve_settings};

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    logging::init_logging(args.verbose);

    let config = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err),
    };
    let settings = resolve_settings(&args, &config, |name| std::env::var(name).ok());
    log_effective_settings(args.config.as_deref(), &settings);

    match args.command {
        Commands::Invoke { event } => run_invoke(&settings, &event).await,
        Commands::Render {
            html,
            url,
            pdf_config,
            output,
        } => run_render(&settings, html, url, pdf_config, output).await,
        Commands::Serve { bind } => {
            run_serve(&settings, bind.unwrap_or(config.server.bind)).await
        }
    }
}
