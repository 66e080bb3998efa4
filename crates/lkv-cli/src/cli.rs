use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "levelkv",
    about = "LevelKV: a single-node Riak-compatible key/value store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./levelkv.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List buckets in the database
    Buckets(DataArgs),
    /// List the keys of a bucket
    Keys(KeysArgs),
    /// Destroy a bucket and its indexes
    Destroy(DestroyArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Args)]
pub struct DataArgs {
    /// Database directory, overriding the config file
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(Args)]
pub struct KeysArgs {
    pub bucket: String,
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Args)]
pub struct DestroyArgs {
    pub bucket: String,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
    #[command(flatten)]
    pub data: DataArgs,
}
