// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use phip_core::{DailyReport, ReportPayload, ReportStore};
use serde_json::{Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;

use super::client::{Ack, ReportSubmitter, SubmitError, SubmitResult};
use super::coordinator::SyncCoordinator;
use super::credential::{Credential, StaticToken};

/// A report payload for the given day of June 2026, with `fever` cases.
pub fn make_payload(day: u32, fever: u32) -> ReportPayload {
    let mut report = DailyReport::new(NaiveDate::from_ymd_opt(2026, 6, day).unwrap());
    report.fever_cases = fever;
    report.into_payload().unwrap()
}

/// The `report_date` key used by [`MockSubmitter`] failure scripts.
pub fn date_key(day: u32) -> String {
    format!("2026-06-{:02}", day)
}

#[derive(Default)]
struct MockState {
    sent: Vec<Map<String, Value>>,
    tokens: Vec<String>,
    calls: usize,
    always: HashMap<String, SubmitError>,
    once: HashMap<String, VecDeque<SubmitError>>,
    everything: Option<SubmitError>,
}

/// Mock submitter with scripted failures keyed by `report_date`.
#[derive(Clone, Default)]
pub struct MockSubmitter {
    state: Arc<Mutex<MockState>>,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Notify>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call blocks until a permit is added to the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let submitter = MockSubmitter {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (submitter, gate)
    }

    /// Resolves once a call has started (including a gated one).
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn fail_date(&self, date: &str, err: SubmitError) {
        self.state
            .lock()
            .unwrap()
            .always
            .insert(date.to_string(), err);
    }

    pub fn fail_once(&self, date: &str, err: SubmitError) {
        self.state
            .lock()
            .unwrap()
            .once
            .entry(date.to_string())
            .or_default()
            .push_back(err);
    }

    pub fn fail_everything(&self, err: Option<SubmitError>) {
        self.state.lock().unwrap().everything = err;
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.always.clear();
        state.once.clear();
        state.everything = None;
    }

    /// Bodies that were accepted, in order.
    pub fn sent(&self) -> Vec<Map<String, Value>> {
        self.state.lock().unwrap().sent.clone()
    }

    /// `report_date` of each accepted body, in order.
    pub fn sent_dates(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|b| b["report_date"].as_str().unwrap().to_string())
            .collect()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens.clone()
    }

    /// Total attempts, including failed ones.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

impl ReportSubmitter for MockSubmitter {
    fn submit<'a>(
        &'a self,
        body: &'a Map<String, Value>,
        credential: &'a Credential,
    ) -> Pin<Box<dyn Future<Output = SubmitResult<Ack>> + Send + 'a>> {
        Box::pin(async move {
            self.entered.notify_one();
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }

            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.tokens.push(credential.expose().to_string());

            let date = body
                .get("report_date")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Some(err) = state.once.get_mut(&date).and_then(VecDeque::pop_front) {
                return Err(err);
            }
            if let Some(err) = state.always.get(&date) {
                return Err(err.clone());
            }
            if let Some(err) = &state.everything {
                return Err(err.clone());
            }
            state.sent.push(body.clone());
            Ok(Ack { status: 201 })
        })
    }
}

/// Coordinator over an in-memory store with a static token.
pub fn make_coordinator(submitter: MockSubmitter) -> Arc<SyncCoordinator<MockSubmitter>> {
    let store = Arc::new(ReportStore::open_in_memory().unwrap());
    Arc::new(SyncCoordinator::new(
        store,
        submitter,
        Arc::new(StaticToken::new("tok-1")),
    ))
}

pub fn network_error() -> SubmitError {
    SubmitError::Network("connection refused".to_string())
}

pub fn validation_error() -> SubmitError {
    SubmitError::Validation {
        status: 422,
        detail: "fever_cases: must be a number".to_string(),
    }
}

/// Probe whose answer is set by the test.
#[derive(Clone, Default)]
pub struct MockProbe {
    online: Arc<AtomicBool>,
}

impl MockProbe {
    pub fn new(online: bool) -> Self {
        MockProbe {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl super::monitor::Probe for MockProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        let online = self.online.load(Ordering::SeqCst);
        Box::pin(async move { online })
    }
}

/// What the test server answers.
#[derive(Clone)]
pub enum Reply {
    Status(u16, String),
    /// Read the request, then never answer.
    Hang,
}

/// A request as received by [`TestServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request line and headers, lowercased.
    pub head: String,
    pub body: String,
}

/// Minimal HTTP/1.1 responder on a loopback port.
pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let reply = reply.clone();
                let captured = Arc::clone(&captured);
                tokio::spawn(async move { serve(socket, reply, captured).await });
            }
        });

        TestServer {
            base_url: format!("http://{}", addr),
            requests,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A loopback URL nothing listens on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve(mut socket: TcpStream, reply: Reply, captured: Arc<Mutex<Vec<CapturedRequest>>>) {
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    captured.lock().unwrap().push(request);

    match reply {
        Reply::Status(status, body) => {
            let response = format!(
                "HTTP/1.1 {} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Reply::Hang => tokio::time::sleep(Duration::from_secs(60)).await,
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (body_start + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[body_start..body_end]).to_string();

    Some(CapturedRequest { head, body })
}
