#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use vodfeed::catalog::Catalog;
use vodfeed::config::Config;
use vodfeed::error::{FetchError, FetchResult};
use vodfeed::http::{HttpClient, RawResponse, Transport};

pub const BASE: &str = "http://vod.test/v3";

#[derive(Clone)]
struct Route {
    status: u16,
    body: Bytes,
    delay: Duration,
}

/// In-memory transport: canned responses per URL, unknown URLs fail at the transport layer.
/// Tracks how many requests are in flight at once.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

fn key(url: &str) -> String {
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: u16, body: impl Into<Bytes>, delay: Duration) {
        let route = Route { status, body: body.into(), delay };
        self.routes.lock().unwrap().insert(key(url), route);
    }

    pub fn json(&self, url: &str, value: Value) {
        self.respond(url, 200, value.to_string(), Duration::ZERO);
    }

    pub fn json_after(&self, url: &str, value: Value, delay: Duration) {
        self.respond(url, 200, value.to_string(), delay);
    }

    pub fn png(&self, url: &str, width: u32) {
        self.respond(url, 200, png_bytes(width, 1), Duration::ZERO);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, url: &str) -> usize {
        let k = key(url);
        self.calls.lock().unwrap().iter().filter(|c| **c == k).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &Url, _accept: &str) -> FetchResult<RawResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let route = self.routes.lock().unwrap().get(url.as_str()).cloned();
        let Some(route) = route else {
            return Err(FetchError::Transport(format!("connection refused: {url}")));
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(RawResponse { status: route.status, body: route.body })
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([4, 34, 63, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn config() -> Config {
    Config { base_url: BASE.to_string(), max_in_flight: 16, ..Config::default() }
}

pub fn http(transport: &Arc<FakeTransport>) -> HttpClient {
    HttpClient::new(transport.clone(), 16)
}

pub fn catalog(transport: &Arc<FakeTransport>) -> Catalog {
    Catalog::new(http(transport), &config())
}

pub fn page_url(n: u32) -> String {
    format!("{BASE}/vod?page={n}&pagesize=10")
}

pub fn school_url(id: u64) -> String {
    format!("{BASE}/schools/{id}")
}

pub fn sport_url(id: u64) -> String {
    format!("{BASE}/sports/{id}")
}

pub fn program(title: &str, thumb: &str, schools: &[u64], sports: &[u64]) -> Value {
    json!({
        "title": title,
        "duration": 125_000,
        "images": { "medium": thumb, "small": "ignored" },
        "schools": schools.iter().map(|id| json!({"id": id, "name": "stale"})).collect::<Vec<_>>(),
        "sports": sports.iter().map(|id| json!({"id": id, "name": "stale"})).collect::<Vec<_>>(),
    })
}

/// Register a school with a crest whose width equals its id, so order is visible in the bitmaps.
pub fn school(transport: &FakeTransport, id: u64, name: &str) {
    let crest = format!("http://img.test/crest/{id}.png");
    transport.json(&school_url(id), json!({"name": name, "images": {"tiny": crest}}));
    transport.png(&crest, id as u32);
}

pub fn sport(transport: &FakeTransport, id: u64, name: &str) {
    let icon = format!("http://img.test/icon/{id}.png");
    transport.json(&sport_url(id), json!({"name": name, "icon": {"tiny": icon}}));
    transport.png(&icon, id as u32);
}
