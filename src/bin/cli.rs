use std::process::ExitCode;
use std::time::Duration;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use ssdb_cluster::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
use ssdb_cluster::{shard, Argument, ClientConfig, Cluster, KvPair, MultiResult};
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(about = "Talk to a sharded set of SSDB instances")]
struct Args {
    /// Shard address as host:port; repeat once per shard, order matters
    #[arg(short, long = "shard", env = "SSDB_SHARDS", value_delimiter = ',', required = true)]
    shards: Vec<String>,

    /// Seconds allowed for connecting, writing a request and each read
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Attempts per request before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Get {
        key: String,
    },
    Set {
        key: String,
        value: String,
        /// Expire the key after this many seconds
        #[arg(long)]
        ttl: Option<i64>,
    },
    Del {
        key: String,
    },
    Mget {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Pairs as key=value
    Mset {
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },
    Mdel {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print the shard owning each key, without connecting
    Locate {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Send an arbitrary command to the shard owning `key`
    Raw {
        key: String,
        command: String,
        args: Vec<String>,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> ssdb_cluster::Result<ExitCode> {
    if let Command::Locate { keys } = &args.command {
        for key in keys {
            println!("{key}\t{}", shard::locate(key.as_bytes(), args.shards.len()));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = ClientConfig::default()
        .with_timeout(Duration::from_secs(args.timeout))
        .with_max_attempts(args.max_attempts);
    let addrs = args.shards.iter().map(String::as_str);
    let cluster = Cluster::connect_with_config(addrs, config).await?;

    let code = match args.command {
        Command::Get { key } => {
            match cluster.get(&key).await? {
                Some(value) => println!("{}", display(&value)),
                None => println!("(not found)"),
            }
            ExitCode::SUCCESS
        }
        Command::Set { key, value, ttl } => {
            match ttl {
                Some(ttl) => cluster.setx(&key, value, ttl).await?,
                None => cluster.set(&key, value).await?,
            };
            println!("ok");
            ExitCode::SUCCESS
        }
        Command::Del { key } => {
            cluster.del(&key).await?;
            println!("ok");
            ExitCode::SUCCESS
        }
        Command::Mget { keys } => {
            let result = cluster.multi_get(&keys).await;
            for pair in &result.values {
                println!("{}\t{}", pair.key, display(&pair.value));
            }
            report(&result)
        }
        Command::Mset { pairs } => {
            let pairs = pairs
                .into_iter()
                .map(|(key, value)| KvPair::new(key, Argument::from(value)))
                .collect();
            let result = cluster.multi_set(pairs).await;
            for key in &result.values {
                println!("{key}");
            }
            report(&result)
        }
        Command::Mdel { keys } => {
            let result = cluster.multi_del(&keys).await;
            for key in &result.values {
                println!("{key}");
            }
            report(&result)
        }
        Command::Raw { key, command, args } => {
            let args: Vec<Argument> = args.into_iter().map(Argument::from).collect();
            let frame = cluster.execute(&key, &command, &args).await?;
            for field in frame.fields() {
                println!("{}", display(field));
            }
            ExitCode::SUCCESS
        }
        Command::Locate { .. } => ExitCode::SUCCESS,
    };

    cluster.close().await?;
    Ok(code)
}

fn display(value: &Bytes) -> String {
    String::from_utf8_lossy(value).into_owned()
}

fn report<T>(result: &MultiResult<T>) -> ExitCode {
    for failure in &result.failures {
        eprintln!("shard {} failed: {}", failure.shard, failure.error);
    }
    if result.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
