// tests/probe_tests.rs
mod common;

use common::{FakeGraph, FakeRelational};
use cocoon_api::error::ProbeError;
use cocoon_api::status::{
    bounded, short_version, FrontendProbe, GraphProbe, Probe, RelationalProbe, SelfProbe,
    ServiceState, API_SERVICE, FRONTEND_SERVICE, GRAPH_SERVICE,
};
use std::time::{Duration, Instant};
use url::Url;

const LIMIT: Duration = Duration::from_millis(300);

/// A loopback URL nothing is listening on.
async fn closed_port_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap()
}

#[tokio::test]
async fn test_self_probe_always_up() {
    let result = SelfProbe::new(8000).probe().await;
    assert_eq!(result.name, API_SERVICE);
    assert_eq!(result.status, ServiceState::Up);
    assert_eq!(result.port, 8000);
    assert_eq!(result.detail, "Serving requests");
}

#[tokio::test]
async fn test_graph_probe_up() {
    let result = GraphProbe::new(FakeGraph::up(), 7687, LIMIT).probe().await;
    assert_eq!(result.name, GRAPH_SERVICE);
    assert_eq!(result.status, ServiceState::Up);
    assert_eq!(result.detail, "Bolt connection active");
}

#[tokio::test]
async fn test_graph_probe_down_keeps_first_line_only() {
    let store = FakeGraph::down("Couldn't connect to localhost:7687\n  at driver.rs:12\n  at main.rs:4");
    let result = GraphProbe::new(store, 7687, LIMIT).probe().await;

    assert_eq!(result.status, ServiceState::Down);
    assert!(!result.detail.contains('\n'));
    assert!(result.detail.contains("Couldn't connect to localhost:7687"));
    assert!(result.detail.chars().count() <= 80);
}

#[tokio::test]
async fn test_graph_probe_times_out() {
    let store = FakeGraph::slow(Duration::from_secs(10));
    let started = Instant::now();
    let result = GraphProbe::new(store, 7687, LIMIT).probe().await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(result.status, ServiceState::Down);
    assert_eq!(result.detail, "timed out after 300ms");
}

#[tokio::test]
async fn test_relational_probe_reports_short_version() {
    let store = FakeRelational::up("PostgreSQL 16.2 (Debian 16.2-1.pgdg120+2) on x86_64-pc-linux-gnu, compiled by gcc");
    let result = RelationalProbe::new(store, 5432, LIMIT).probe().await;

    assert_eq!(result.status, ServiceState::Up);
    assert_eq!(result.detail, "PostgreSQL 16.2 (Debian 16.2-1.pgdg120+2) on x86_64-pc-linux-gnu");
}

#[tokio::test]
async fn test_relational_probe_down() {
    let result = RelationalProbe::new(FakeRelational::down(), 5432, LIMIT)
        .probe()
        .await;
    assert_eq!(result.status, ServiceState::Down);
    assert!(result.detail.starts_with("database error"));
}

#[tokio::test]
async fn test_relational_probe_times_out() {
    let store = FakeRelational::slow(Duration::from_secs(10));
    let result = RelationalProbe::new(store, 5432, LIMIT).probe().await;
    assert_eq!(result.status, ServiceState::Down);
    assert!(result.detail.contains("timed out"));
}

#[test]
fn test_short_version() {
    assert_eq!(short_version("PostgreSQL 15.4, compiled by x"), "PostgreSQL 15.4");
    assert_eq!(short_version("no comma here"), "no comma here");
    assert_eq!(short_version(""), "Connected");
    assert_eq!(short_version(", trailing"), "Connected");
}

#[tokio::test]
async fn test_bounded_maps_errors_to_down() {
    let result = bounded("thing", 9, LIMIT, async {
        Err::<String, _>(ProbeError::UnexpectedStatus(502))
    })
    .await;
    assert_eq!(result.status, ServiceState::Down);
    assert_eq!(result.detail, "HTTP 502");
}

#[tokio::test]
async fn test_frontend_probe_first_candidate_up() {
    let mut server = mockito::Server::new_async().await;
    let hit = server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let probe = FrontendProbe::new(vec![Url::parse(&server.url()).unwrap()], 3000, LIMIT).unwrap();
    let result = probe.probe().await;

    hit.assert_async().await;
    assert_eq!(result.name, FRONTEND_SERVICE);
    assert_eq!(result.status, ServiceState::Up);
    assert_eq!(result.port, 3000);
    assert_eq!(result.detail, "Dev server running");
}

#[tokio::test]
async fn test_frontend_probe_stops_at_first_answering_candidate() {
    let mut first = mockito::Server::new_async().await;
    let first_hit = first
        .mock("GET", "/")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let mut second = mockito::Server::new_async().await;
    let second_hit = second
        .mock("GET", "/")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let probe = FrontendProbe::new(
        vec![
            Url::parse(&first.url()).unwrap(),
            Url::parse(&second.url()).unwrap(),
        ],
        3000,
        LIMIT,
    )
    .unwrap();
    assert_eq!(probe.probe().await.status, ServiceState::Up);

    first_hit.assert_async().await;
    second_hit.assert_async().await;
}

#[tokio::test]
async fn test_frontend_probe_falls_back_to_second_candidate() {
    let first = closed_port_url().await;
    let mut second = mockito::Server::new_async().await;
    second
        .mock("GET", "/")
        .with_status(200)
        .create_async()
        .await;

    let probe = FrontendProbe::new(
        vec![first, Url::parse(&second.url()).unwrap()],
        3000,
        LIMIT,
    )
    .unwrap();
    assert_eq!(probe.probe().await.status, ServiceState::Up);
}

#[tokio::test]
async fn test_frontend_probe_accepts_not_modified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(304)
        .create_async()
        .await;

    let probe = FrontendProbe::new(vec![Url::parse(&server.url()).unwrap()], 3000, LIMIT).unwrap();
    assert_eq!(probe.probe().await.status, ServiceState::Up);
}

#[tokio::test]
async fn test_frontend_probe_all_candidates_fail() {
    let mut erroring = mockito::Server::new_async().await;
    erroring
        .mock("GET", "/")
        .with_status(500)
        .create_async()
        .await;

    let probe = FrontendProbe::new(
        vec![Url::parse(&erroring.url()).unwrap(), closed_port_url().await],
        3000,
        LIMIT,
    )
    .unwrap();
    let result = probe.probe().await;

    assert_eq!(result.status, ServiceState::Down);
    assert_eq!(result.detail, "Not started");
}

#[tokio::test]
async fn test_frontend_time_bound_covers_every_candidate() {
    let urls = vec![
        Url::parse("http://frontend:3000").unwrap(),
        Url::parse("http://localhost:3000").unwrap(),
    ];
    let probe = FrontendProbe::new(urls, 3000, LIMIT).unwrap();
    assert_eq!(probe.time_bound(), LIMIT * 2);
}
