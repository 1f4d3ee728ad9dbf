use peercache::group::{new_group, LoaderFn};
use peercache::transport::pool::DEFAULT_PEER_TIMEOUT;
use peercache::transport::{router, HttpPool};

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --bind <addr:port> [--peer <base-url>]... [--cache-bytes <n>]",
            args[0]
        );
        eprintln!("Example: {} --bind 127.0.0.1:7000", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:7001 --peer http://127.0.0.1:7000/_peercache/",
            args[0]
        );
        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut peers: Vec<String> = vec![];
    let mut cache_bytes: usize = 1 << 20;
    let mut peer_timeout = DEFAULT_PEER_TIMEOUT;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--peer" => {
                peers.push(args[i + 1].clone());
                i += 2;
            }
            "--cache-bytes" => {
                cache_bytes = args[i + 1].parse()?;
                i += 2;
            }
            "--peer-timeout-ms" => {
                peer_timeout = Duration::from_millis(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.expect("--bind is required");

    tracing::info!("Starting cache node on {}", bind_addr);
    if peers.is_empty() {
        tracing::info!("No peers configured; this node owns every key");
    } else {
        tracing::info!("Peers: {:?}", peers);
    }

    // 1. Peer pool (consistent-hash routing + HTTP fetch):
    let pool = HttpPool::with_timeout(&bind_addr.to_string(), peer_timeout);

    // 2. Demo group backed by an in-process slow store. Real deployments
    //    plug their own loader in here.
    let slow_store: Arc<HashMap<String, String>> = Arc::new(HashMap::from([
        ("Tom".to_string(), "630".to_string()),
        ("Jack".to_string(), "589".to_string()),
        ("Sam".to_string(), "567".to_string()),
    ]));

    let store = slow_store.clone();
    let loader = LoaderFn::new(move |key| {
        let store = store.clone();
        async move {
            tracing::info!(%key, "loading from slow store");
            store
                .get(&key)
                .map(|value| value.clone().into_bytes())
                .ok_or_else(|| anyhow::anyhow!("{key} does not exist in the slow store"))
        }
    });

    let group = new_group("scores", cache_bytes, Arc::new(loader));
    group.register_peers(pool.clone())?;
    if !peers.is_empty() {
        group.add_peers(&peers)?;
    }

    // 3. HTTP server:
    let app = router(pool);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app).await?;

    Ok(())
}
