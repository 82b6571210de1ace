use clap::Parser;
use std::net::{IpAddr, SocketAddr};

use linekv::store::Store;
use linekv::{server, Error};

const PORT: u16 = 8080;
const SHARDS: usize = 16;

#[derive(Parser, Debug)]
struct Args {
    /// The address to listen on
    #[arg(long, env = "LINEKV_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to listen on
    #[arg(short, long, env = "LINEKV_PORT", default_value_t = PORT)]
    port: u16,

    /// Number of store shards
    #[arg(long, default_value_t = SHARDS)]
    shards: usize,

    /// Approximate maximum number of resident keys; the capacity is split
    /// between store shards, and a full shard evicts its least recently
    /// used key. Unlimited when omitted.
    #[arg(long, env = "LINEKV_MAX_KEYS")]
    max_keys: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let store = match args.max_keys {
        Some(max_keys) => Store::bounded(args.shards, max_keys),
        None => Store::with_shards(args.shards),
    };

    server::run(SocketAddr::new(args.host, args.port), store).await
}
