#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::net::TcpListener;

use ssdb_cluster::config::ClientConfig;
use ssdb_cluster::connection::Connection;
use ssdb_cluster::frame::Frame;

/// What the stub does with a request.
pub enum Reply {
    Fields(Vec<String>),
    /// Bytes written as they are, framed or not.
    Raw(Vec<u8>),
    /// Wait, then answer with the inner reply.
    Delayed(Duration, Box<Reply>),
    /// Hang up without answering.
    Drop,
}

impl Reply {
    pub fn of(fields: &[&str]) -> Reply {
        Reply::Fields(fields.iter().map(|f| f.to_string()).collect())
    }
}

type Handler = Arc<dyn Fn(&[String]) -> Reply + Send + Sync>;

/// An in-process server speaking the line-framed protocol, answering through `handler`.
pub struct StubServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
    connections: Arc<AtomicUsize>,
}

impl StubServer {
    pub async fn start<H>(handler: H) -> StubServer
    where
        H: Fn(&[String]) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let handler: Handler = Arc::new(handler);

        let server = StubServer {
            addr,
            requests: requests.clone(),
            connections: connections.clone(),
        };

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                connections.fetch_add(1, Ordering::SeqCst);
                let requests = requests.clone();
                let handler = handler.clone();

                tokio::spawn(async move {
                    let config = ClientConfig::default().with_timeout(Duration::from_secs(60));
                    let mut conn = Connection::new(socket, &config);

                    while let Ok(request) = conn.read_frame().await {
                        let args: Vec<String> = request
                            .fields()
                            .iter()
                            .map(|f| String::from_utf8_lossy(f).into_owned())
                            .collect();
                        requests.lock().unwrap().push(args.clone());

                        let mut reply = handler(&args);
                        let bytes = loop {
                            match reply {
                                Reply::Delayed(delay, next) => {
                                    tokio::time::sleep(delay).await;
                                    reply = *next;
                                }
                                Reply::Fields(fields) => {
                                    let frame =
                                        Frame::new(fields.into_iter().map(Bytes::from).collect());
                                    break Some(frame.serialize());
                                }
                                Reply::Raw(bytes) => break Some(bytes),
                                Reply::Drop => break None,
                            }
                        };

                        let Some(bytes) = bytes else { break };
                        if conn.send(&bytes).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        server
    }

    /// A stub backed by an in-memory map, understanding the plain key/value commands.
    pub async fn kv() -> StubServer {
        let store = Arc::new(Mutex::new(HashMap::new()));
        StubServer::start(move |args| kv_handler(&store, args)).await
    }

    /// Every request received so far, command first.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose command is `command`, without the command itself.
    pub fn requests_for(&self, command: &str) -> Vec<Vec<String>> {
        self.requests()
            .into_iter()
            .filter(|args| args.first().map(String::as_str) == Some(command))
            .map(|args| args[1..].to_vec())
            .collect()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub fn kv_handler(store: &Mutex<HashMap<String, String>>, args: &[String]) -> Reply {
    let mut store = store.lock().unwrap();

    match args {
        [cmd, key, value] if cmd == "set" => {
            store.insert(key.clone(), value.clone());
            Reply::of(&["ok", "1"])
        }
        [cmd, key] if cmd == "get" => match store.get(key) {
            Some(value) => Reply::Fields(vec!["ok".to_string(), value.clone()]),
            None => Reply::of(&["not_found"]),
        },
        [cmd, key] if cmd == "del" => {
            store.remove(key);
            Reply::of(&["ok", "1"])
        }
        [cmd, key, by] if cmd == "incr" => {
            let current: i64 = store.get(key).and_then(|v| v.parse().ok()).unwrap_or(0);
            let next = current + by.parse::<i64>().unwrap();
            store.insert(key.clone(), next.to_string());
            Reply::Fields(vec!["ok".to_string(), next.to_string()])
        }
        [cmd, keys @ ..] if cmd == "multi_get" => {
            let mut reply = vec!["ok".to_string()];
            for key in keys {
                if let Some(value) = store.get(key) {
                    reply.push(key.clone());
                    reply.push(value.clone());
                }
            }
            Reply::Fields(reply)
        }
        [cmd, pairs @ ..] if cmd == "multi_set" => {
            for pair in pairs.chunks(2) {
                store.insert(pair[0].clone(), pair[1].clone());
            }
            Reply::Fields(vec!["ok".to_string(), (pairs.len() / 2).to_string()])
        }
        [cmd, keys @ ..] if cmd == "multi_del" => {
            let removed = keys.iter().filter(|key| store.remove(*key).is_some()).count();
            Reply::Fields(vec!["ok".to_string(), removed.to_string()])
        }
        [cmd, ..] => Reply::Fields(vec![
            "client_error".to_string(),
            format!("Unknown Command: {cmd}"),
        ]),
        [] => Reply::of(&["client_error", "empty request"]),
    }
}

/// Settings that make failing tests fail fast.
pub fn fast_config() -> ClientConfig {
    ClientConfig::default().with_timeout(Duration::from_millis(500))
}
