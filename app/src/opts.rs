use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Parser)]
#[command(about = "A real-time connection hub over a Unix socket")]
pub struct Opts {
    /// Print debug logs
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Run the hub daemon
    #[command(name = "daemon", alias = "d")]
    Daemon,

    #[command(flatten)]
    Command(ServerCommand),

    #[command(flatten)]
    Client(ClientOpts),
}

/// Operator commands. Serialized as-is onto the socket as the first frame.
#[derive(Debug, Deserialize, PartialEq, Serialize, Subcommand)]
pub enum ServerCommand {
    #[command(name = "ping", about = "Check if the daemon is alive")]
    Ping,

    #[command(name = "kill", alias = "k", about = "Stop the daemon")]
    Kill,

    #[command(name = "status", alias = "s", about = "Report the live connection count")]
    Status,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum ClientOpts {
    /// Connect to the hub and print everything it sends
    #[command(name = "listen", alias = "l")]
    Listen,

    /// Ask the hub for the n-th Fibonacci number
    #[command(name = "fib")]
    Fib { n: i64 },
}

impl Opts {
    pub fn from_env() -> Self {
        Opts::parse()
    }
}

impl Display for ServerCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerCommand::Ping => write!(f, "Ping"),
            ServerCommand::Kill => write!(f, "Kill"),
            ServerCommand::Status => write!(f, "Status"),
        }
    }
}
