use crate::client::Clients;
use crate::room::Rooms;
use clap::Parser;
use hashbrown::HashMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use warp::{
    http::{header, Method},
    Filter, Rejection, Reply,
};

mod client;
mod handler;
mod room;
mod util;
mod ws;

/// Pairs waiting players into rooms and forwards game events between them
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Directory for the daily rolling log file
    #[arg(long, default_value = "./logs")]
    log_dir: String,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
    let rooms: Rooms = Arc::new(RwLock::new(HashMap::new()));
    info!("created clients and rooms maps");

    let addr = SocketAddr::new(args.host, args.port);
    info!("relay listening on {}", addr);
    warp::serve(routes(clients, rooms, addr)).run(addr).await;
}

fn routes(
    clients: Clients,
    rooms: Rooms,
    addr: SocketAddr,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health_route = warp::path!("health").and_then(handler::health_handler);

    let register = warp::path("register");
    let register_routes = register
        .and(warp::post())
        .and(warp::body::json())
        .and(with_clients(clients.clone()))
        .and(with_addr(addr))
        .and_then(handler::register_handler)
        .or(register
            .and(warp::delete())
            .and(warp::path::param())
            .and(with_clients(clients.clone()))
            .and_then(handler::unregister_handler));

    let ws_route = warp::path("ws")
        .and(warp::ws())
        .and(warp::path::param())
        .and(with_clients(clients.clone()))
        .and(with_rooms(rooms))
        .and_then(handler::ws_handler);

    health_route
        .or(register_routes)
        .or(ws_route)
        .with(
            warp::cors()
                .allow_credentials(true)
                .allow_methods(&[
                    Method::OPTIONS,
                    Method::GET,
                    Method::POST,
                    Method::DELETE,
                    Method::PUT,
                ])
                .allow_headers(vec![
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                ])
                .expose_headers(vec![header::LINK])
                .max_age(300)
                .allow_any_origin(),
        )
}

fn with_clients(clients: Clients) -> impl Filter<Extract = (Clients,), Error = Infallible> + Clone {
    warp::any().map(move || clients.clone())
}

fn with_rooms(rooms: Rooms) -> impl Filter<Extract = (Rooms,), Error = Infallible> + Clone {
    warp::any().map(move || rooms.clone())
}

fn with_addr(addr: SocketAddr) -> impl Filter<Extract = (SocketAddr,), Error = Infallible> + Clone {
    warp::any().map(move || addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Status;
    use serde_json::{json, Value};

    fn test_routes() -> (Clients, impl Filter<Extract = impl Reply, Error = Rejection> + Clone) {
        let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
        let rooms: Rooms = Arc::new(RwLock::new(HashMap::new()));
        let addr = SocketAddr::from(([127, 0, 0, 1], 9000));
        (clients.clone(), routes(clients, rooms, addr))
    }

    #[tokio::test]
    async fn test_health() {
        let (_, routes) = test_routes();
        let resp = warp::test::request().path("/health").reply(&routes).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        let (clients, routes) = test_routes();
        let resp = warp::test::request()
            .method("POST")
            .path("/register")
            .json(&json!({ "userId": 7 }))
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 200);

        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["url"], format!("ws://127.0.0.1:9000/ws/{}", id));
        {
            let clients_map = clients.read().await;
            let client = clients_map.get(&id).unwrap();
            assert_eq!(client.user_id, 7);
            assert_eq!(client.status, Status::Idle);
            assert!(client.sender.is_none());
        }

        let resp = warp::test::request()
            .method("DELETE")
            .path(&format!("/register/{}", id))
            .reply(&routes)
            .await;
        assert_eq!(resp.status(), 200);
        assert!(clients.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_ws_rejects_unregistered_client() {
        let (_, routes) = test_routes();
        let result = warp::test::ws().path("/ws/unknown").handshake(routes).await;
        assert!(result.is_err());
    }
}
