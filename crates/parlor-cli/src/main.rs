//! Parlor terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Offline, against an in-process server
//! parlor --name alice
//!
//! # Against a verbose server
//! parlor --server ws://chat.example:8765 --schema verbose
//! ```

use std::io;

use clap::{Parser, ValueEnum};
use parlor_app::{Intent, Runtime, SessionConfig, View};
use parlor_cli::{ConnectionMode, SIMULATED_ADDR, TerminalDriver, TerminalView};
use parlor_harness::create_shared_server;
use parlor_proto::Schema;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Wire vocabulary spoken by the server.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WireSchema {
    /// `type`-tagged frames with English field names
    Terse,
    /// `tipo`-tagged frames with Spanish field names
    Verbose,
}

impl From<WireSchema> for Schema {
    fn from(schema: WireSchema) -> Self {
        match schema {
            WireSchema::Terse => Schema::Terse,
            WireSchema::Verbose => Schema::Verbose,
        }
    }
}

/// Parlor chat client
#[derive(Parser, Debug)]
#[command(name = "parlor")]
#[command(about = "Line-oriented client for Parlor chat servers")]
#[command(version)]
struct Args {
    /// WebSocket URL of the server
    ///
    /// If not provided, runs in simulation mode with an in-process server.
    #[arg(short, long)]
    server: Option<String>,

    /// Wire schema spoken by the server
    #[arg(long, value_enum, default_value_t = WireSchema::Terse)]
    schema: WireSchema,

    /// Switch rooms as soon as a join is requested
    #[arg(long)]
    optimistic_join: bool,

    /// Connect right away with this display name
    #[arg(short, long)]
    name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // The chat owns stdout
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let schema = Schema::from(args.schema);
    let (mode, server_addr) = match args.server {
        Some(addr) => (ConnectionMode::Remote, addr),
        None => {
            tracing::info!(%schema, "no server given, using the in-process server");
            (ConnectionMode::Simulation(create_shared_server(schema)), SIMULATED_ADDR.to_string())
        },
    };

    let config = SessionConfig { server_addr, schema, optimistic_join: args.optimistic_join };

    let mut driver = TerminalDriver::new(mode);
    if let Some(name) = args.name {
        driver = driver.with_initial(Intent::Connect { name });
    }

    let mut view = TerminalView::new(io::stdout());
    view.show_system_line("type /help for commands");

    let mut runtime = Runtime::new(driver, view, config);
    runtime.run().await?;

    Ok(())
}
