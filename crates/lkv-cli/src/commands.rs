use std::io::{self, BufRead, Write};

use anyhow::Context;
use colored::Colorize;
use lkv_db::Database;
use lkv_server::{LevelKvServer, ServerConfig};

use crate::cli::*;
use crate::logging;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::resolve(cli.config.as_deref())?;
    logging::init(config.logging, cli.verbose);

    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Buckets(args) => cmd_buckets(config, args),
        Command::Keys(args) => cmd_keys(config, args),
        Command::Destroy(args) => cmd_destroy(config, args),
    }
}

fn apply_data(mut config: ServerConfig, args: &DataArgs) -> ServerConfig {
    if let Some(data) = &args.data {
        config.database_location = data.clone();
    }
    config
}

fn open_database(config: &ServerConfig) -> anyhow::Result<Database> {
    Database::open(&config.database_location).with_context(|| {
        format!(
            "cannot open database at {}",
            config.database_location.display()
        )
    })
}

fn cmd_serve(config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = apply_data(config, &args.data);
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    let server = LevelKvServer::open(config).context("server startup failed")?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_buckets(config: ServerConfig, args: DataArgs) -> anyhow::Result<()> {
    let db = open_database(&apply_data(config, &args))?;
    let buckets = db.list_buckets()?;
    if buckets.is_empty() {
        println!("No buckets.");
    }
    for bucket in buckets {
        println!("{}", bucket.bold());
    }
    Ok(())
}

fn cmd_keys(config: ServerConfig, args: KeysArgs) -> anyhow::Result<()> {
    let db = open_database(&apply_data(config, &args.data))?;
    let mut count = 0usize;
    for key in db.stream_keys(&args.bucket)? {
        println!("{}", key?);
        count += 1;
    }
    println!("{} {} keys in {}", "✓".green(), count, args.bucket.yellow());
    Ok(())
}

fn cmd_destroy(config: ServerConfig, args: DestroyArgs) -> anyhow::Result<()> {
    let db = open_database(&apply_data(config, &args.data))?;
    if !args.yes && !confirm(&format!("Destroy bucket {}?", args.bucket))? {
        println!("Aborted.");
        return Ok(());
    }
    if db.destroy_bucket(&args.bucket)? {
        tracing::info!(bucket = %args.bucket, "bucket destroyed");
        println!("{} Destroyed {}.", "✓".green().bold(), args.bucket.yellow());
    } else {
        println!("No bucket named {}.", args.bucket.yellow());
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
