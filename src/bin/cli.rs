//! PackDeque CLI Client
//!
//! Command-line interface for interacting with PackDeque.

use clap::{Parser, Subcommand};
use packdeque::network::Client;

/// PackDeque CLI
#[derive(Parser, Debug)]
#[command(name = "packdeque-cli")]
#[command(about = "CLI for the PackDeque store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push values onto the front of a deque
    Lpush {
        /// The deque key
        key: String,

        /// Values, pushed one at a time in order
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Push values onto the back of a deque
    Rpush {
        /// The deque key
        key: String,

        /// Values, appended in order
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Pop the front value
    Lpop {
        /// The deque key
        key: String,
    },

    /// Pop the back value
    Rpop {
        /// The deque key
        key: String,
    },

    /// Print a deque's length
    Llen {
        /// The deque key
        key: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("(error) {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> packdeque::Result<()> {
    let mut client = Client::connect(args.server.as_str())?;

    match args.command {
        Commands::Lpush { key, values } => print_integer(client.lpush(key.as_bytes(), &values)?),
        Commands::Rpush { key, values } => print_integer(client.rpush(key.as_bytes(), &values)?),
        Commands::Lpop { key } => print_value(client.lpop(key.as_bytes())?),
        Commands::Rpop { key } => print_value(client.rpop(key.as_bytes())?),
        Commands::Llen { key } => print_integer(client.llen(key.as_bytes())?),
        Commands::Del { key } => print_integer(client.del(key.as_bytes())? as i64),
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn print_integer(n: i64) {
    println!("(integer) {}", n);
}

fn print_value(value: Option<bytes::Bytes>) {
    match value {
        Some(v) => println!("\"{}\"", String::from_utf8_lossy(&v)),
        None => println!("(nil)"),
    }
}
