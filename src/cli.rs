use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfgen")]
#[command(
    version,
    about = "Render HTML or URLs to PDF in a headless browser",
    long_about = "pdfgen\n\nModes:\n- invoke: run the handler once on a platform event (JSON) and print the response envelope.\n- render: render HTML or a URL straight to a PDF file.\n- serve: expose the handler over HTTP (POST body or GET ?pdf=<json>).\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for browser, timeouts and server defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "chromium",
        help = "Browser engine (stub renders a placeholder PDF without a browser)"
    )]
    pub engine: EngineKind,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Browser executable; overrides PDFGEN_EXECUTABLE_PATH and the config file"
    )]
    pub executable: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "SECONDS",
        help = "Navigation + network-idle timeout for URL targets"
    )]
    pub nav_timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the handler once on a platform event and print the response envelope
    Invoke {
        #[arg(
            long,
            default_value = "-",
            value_name = "FILE",
            help = "Event JSON file ('-' reads stdin)"
        )]
        event: String,
    },
    /// Render HTML or a URL to a PDF file
    Render {
        #[arg(
            long,
            conflicts_with = "url",
            required_unless_present = "url",
            help = "HTML content to render"
        )]
        html: Option<String>,

        #[arg(long, help = "URL to navigate to and render")]
        url: Option<String>,

        #[arg(
            long,
            value_name = "JSON",
            help = "PDF options as a JSON object, e.g. '{\"margin\":{\"top\":\"1in\"}}'"
        )]
        pdf_config: Option<String>,

        #[arg(long, short, help = "Output PDF path")]
        output: PathBuf,
    },
    /// Serve the handler over HTTP
    Serve {
        #[arg(long, help = "Bind address (default from config: 127.0.0.1:8080)")]
        bind: Option<SocketAddr>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum EngineKind {
    #[default]
    Chromium,
    Stub,
}

pub fn parse() -> Cli {
    Cli::parse()
}
