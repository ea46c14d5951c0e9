//! demos/fake_frontend.rs
//! Stand-in for the web front-end so the status page has something to probe.
//! Run: cargo run --example fake_frontend -- [port]
//!
//! Env: BASE_DELAY_MS / JITTER_MS slow every answer down (push it past
//! status.probe_timeout_ms to see a timeout), FAIL_PCT answers 503 for that
//! share of requests, FLIP_SECS toggles the whole server between up and 503.

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use rand::Rng;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

#[derive(Clone)]
struct FrontendState {
    hits: Arc<AtomicU64>,
    serving: Arc<AtomicBool>,
    base_delay: u64,
    jitter_ms: u64,
    fail_pct: f64,
}

async fn handle(req: Request<Body>, state: FrontendState) -> Result<Response<Body>, Infallible> {
    let n = state.hits.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = state.base_delay + rand::thread_rng().gen_range(0..=state.jitter_ms);
    if delay > 0 {
        sleep(Duration::from_millis(delay)).await;
    }

    let failing = !state.serving.load(Ordering::SeqCst)
        || (state.fail_pct > 0.0 && rand::thread_rng().gen_bool(state.fail_pct / 100.0));
    let (status, body) = if failing {
        (StatusCode::SERVICE_UNAVAILABLE, "front-end unavailable".to_string())
    } else {
        (
            StatusCode::OK,
            format!("<html><body>fake front-end, hit {} on {}</body></html>", n, req.uri().path()),
        )
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    Ok(response)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "3000".into())
        .parse()?;

    let state = FrontendState {
        hits: Arc::new(AtomicU64::new(0)),
        serving: Arc::new(AtomicBool::new(true)),
        base_delay: env_or("BASE_DELAY_MS", 0),
        jitter_ms: env_or("JITTER_MS", 0),
        fail_pct: env_or("FAIL_PCT", 0.0),
    };

    let flip_secs: u64 = env_or("FLIP_SECS", 0);
    if flip_secs > 0 {
        let st = state.clone();
        tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(flip_secs)).await;
                let was = st.serving.fetch_xor(true, Ordering::SeqCst);
                println!("fake front-end now {}", if was { "down" } else { "up" });
            }
        });
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let make_svc = make_service_fn(move |_conn| {
        let st = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, st.clone()))) }
    });

    println!("Fake front-end on http://{}", addr);
    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}
