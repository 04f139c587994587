//! EmberKV CLI Client
//!
//! Command-line interface for interacting with EmberKV.

use clap::{Parser, Subcommand};
use emberkv::network::Client;
use emberkv::protocol::Reply;

/// EmberKV CLI
#[derive(Parser, Debug)]
#[command(name = "emberkv-cli")]
#[command(about = "CLI for the EmberKV key-value server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server, optionally with a message
    Ping {
        message: Option<String>,
    },

    /// Echo a message back
    Echo {
        message: String,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Extra options: NX | XX, GET, EX <s> | PX <ms> | EXAT <s> | PXAT <ms> | KEEPTTL
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
}

impl Commands {
    fn into_tokens(self) -> Vec<String> {
        match self {
            Commands::Ping { message } => std::iter::once("PING".to_string())
                .chain(message)
                .collect(),
            Commands::Echo { message } => vec!["ECHO".to_string(), message],
            Commands::Get { key } => vec!["GET".to_string(), key],
            Commands::Set {
                key,
                value,
                options,
            } => ["SET".to_string(), key, value]
                .into_iter()
                .chain(options)
                .collect(),
        }
    }
}

/// Print a reply the way redis-cli does
fn render(reply: &Reply) -> String {
    match reply {
        Reply::Simple(text) => text.clone(),
        Reply::Bulk(Some(text)) => format!("\"{text}\""),
        Reply::Bulk(None) | Reply::Null => "(nil)".to_string(),
        Reply::Error(message) => format!("(error) ERR {message}"),
    }
}

fn main() {
    let args = Args::parse();
    let tokens = args.command.into_tokens();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.command(&tokens) {
        Ok(reply) => {
            println!("{}", render(&reply));
            if reply.is_error() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}
