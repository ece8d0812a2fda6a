use clap::{Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(about, version, name = "rdf-sink")]
/// Dataset-platform to SPARQL triple store sink
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the sink HTTP server
    Serve {
        /// Host and port to listen to
        ///
        /// Defaults to 0.0.0.0 with the port from SERVICE_PORT.
        #[arg(short, long, value_hint = ValueHint::Hostname)]
        bind: Option<String>,
    },
}
