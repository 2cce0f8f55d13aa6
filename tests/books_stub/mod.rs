use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum StubReply {
    Json(String),
    Status(u16, String),
}

/// Stand-in for the volumes endpoint. Every GET to `/books/v1/volumes`
/// gets the same reply; request URLs are recorded in arrival order.
pub struct BooksStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
impl BooksStub {
    pub fn spawn(reply: StubReply) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start books stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/books/v1/volumes");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let path = url.split('?').next().unwrap_or(&url);
                if request.method() != &tiny_http::Method::Get || path != "/books/v1/volumes" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }
                recorded.lock().expect("lock recorded requests").push(url);

                let (status, body) = match &reply {
                    StubReply::Json(body) => (200, body.clone()),
                    StubReply::Status(status, body) => (*status, body.clone()),
                };
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let _ = request.respond(
                    tiny_http::Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header),
                );
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn json(body: serde_json::Value) -> Self {
        Self::spawn(StubReply::Json(body.to_string()))
    }

    pub fn status(status: u16) -> Self {
        Self::spawn(StubReply::Status(
            status,
            r#"{"error":{"code":0,"message":"stub"}}"#.to_owned(),
        ))
    }

    /// Path and query of every accepted request.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock recorded requests").clone()
    }
}

impl Drop for BooksStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[allow(dead_code)]
pub fn dune_response() -> serde_json::Value {
    serde_json::json!({
        "kind": "books#volumes",
        "totalItems": 1,
        "items": [
            {
                "id": "B1hSG45JCX4C",
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"]
                }
            }
        ]
    })
}
