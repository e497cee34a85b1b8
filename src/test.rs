//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::aggregate::CategoryTotals;
use crate::error::{Failure, FailureKind};
use crate::model::{Amount, Category, Expense, ExpenseId, NewExpense};
use crate::view::{EditForm, Renderer};
use crate::Config;
use bytes::Bytes;
use chrono::NaiveDate;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Test environment that sets up an expenses home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expenses");
        let config = Config::create(&root, "http://127.0.0.1:9/").await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

/// An expense with `id` and the description `expense {id}`.
pub fn expense(id: u64, amount: &str, category: Category, day: Option<&str>) -> Expense {
    Expense::from_new(
        ExpenseId::from(id),
        NewExpense::new(
            Amount::from_str(amount).unwrap(),
            category,
            format!("expense {id}"),
            day.map(date),
        )
        .unwrap(),
    )
}

/// Something a `RecordingRenderer` was asked to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    List {
        ids: Vec<String>,
        editing: Option<String>,
    },
    Chart(CategoryTotals),
    Notice(FailureKind),
}

/// A `Renderer` that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Vec<Event>,
}

impl RecordingRenderer {
    /// Returns the events so far and forgets them.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl Renderer for RecordingRenderer {
    fn render_list(&mut self, view: &[Expense], editing: Option<&EditForm>) {
        self.events.push(Event::List {
            ids: view.iter().map(|e| e.id().to_string()).collect(),
            editing: editing.map(|form| form.id().to_string()),
        });
    }

    fn render_chart(&mut self, totals: &CategoryTotals) {
        self.events.push(Event::Chart(totals.clone()));
    }

    fn notify(&mut self, failure: &Failure) {
        self.events.push(Event::Notice(failure.kind()));
    }
}

/// A request received by a `TestServer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Req {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A local HTTP server that answers each request with the next canned `(status, body)` pair, or
/// with 404 once they run out. It stops listening when dropped.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Req>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responses = Arc::new(Mutex::new(VecDeque::from(responses)));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let responses = responses.clone();
                let service = service_fn(move |request: Request<Incoming>| {
                    let recorded = recorded.clone();
                    let responses = responses.clone();
                    async move {
                        let method = request.method().to_string();
                        let path = request.uri().path().to_string();
                        let body = request.into_body().collect().await?.to_bytes();
                        recorded.lock().unwrap().push(Req {
                            method,
                            path,
                            body: String::from_utf8_lossy(&body).into_owned(),
                        });
                        let (status, body) = responses
                            .lock()
                            .unwrap()
                            .pop_front()
                            .unwrap_or((404, String::new()));
                        let response = Response::builder()
                            .status(status)
                            .header("content-type", "application/json")
                            .body(Full::new(Bytes::from(body)))
                            .unwrap();
                        Ok::<_, hyper::Error>(response)
                    }
                });
                tokio::spawn(async move {
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    pub fn requests(&self) -> Vec<Req> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
