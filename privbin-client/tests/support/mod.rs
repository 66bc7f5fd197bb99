//! Shared helpers for client integration tests against a mocked paste service.
#![allow(dead_code)]

use async_trait::async_trait;
use privbin_client::{ClientConfig, LifecycleController, PasswordPrompt, RecordingSink};
use privbin_crypto::{CipherCodec, EntropyGate, OsRandom};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::{MockServer, Request};

/// Keeps PBKDF2 cheap in tests; envelopes record their own count.
pub const TEST_ITERATIONS: u32 = 1_000;

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: format!("{}/", server.uri()),
        request_timeout_secs: 5,
        pbkdf2_iterations: TEST_ITERATIONS,
        ..ClientConfig::default()
    }
}

pub fn seeded_codec() -> CipherCodec {
    CipherCodec::new(EntropyGate::seeded(OsRandom)).with_iterations(TEST_ITERATIONS)
}

/// Prompt that replays scripted answers and counts how often it was asked.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    calls: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(answers: &[Option<&str>]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().map(|a| a.map(str::to_owned)).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordPrompt for ScriptedPrompt {
    async fn request_password(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

pub fn controller(
    server: &MockServer,
    prompt: Arc<ScriptedPrompt>,
) -> (LifecycleController, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let controller = LifecycleController::new(
        config_for(server),
        EntropyGate::seeded(OsRandom),
        prompt,
    )
    .unwrap()
    .with_sink(sink.clone());
    (controller, sink)
}

/// Encrypted comment as the server would store it.
pub fn comment_json(
    codec: &CipherCodec,
    key: &str,
    password: &str,
    id: &str,
    text: &str,
    nickname: Option<&str>,
) -> serde_json::Value {
    let data = codec.cipher(key, password, text).unwrap().to_json().unwrap();
    let mut meta = serde_json::json!({ "postdate": 1_500_000_000, "vizhash": "data:image/png;base64,AAAA" });
    if let Some(nickname) = nickname {
        meta["nickname"] = codec.cipher(key, password, nickname).unwrap().to_json().unwrap().into();
    }
    serde_json::json!({ "id": id, "parentid": "abc123", "data": data, "meta": meta })
}

/// Encrypted paste as the server would return it for a read request.
pub fn paste_json(codec: &CipherCodec, key: &str, password: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "status": 0,
        "id": "abc123",
        "data": codec.cipher(key, password, text).unwrap().to_json().unwrap(),
        "meta": {
            "formatter": "plaintext",
            "postdate": 1_500_000_000,
            "opendiscussion": false,
            "burnafterreading": false
        },
        "comments": []
    })
}

/// Decoded form fields of a captured request.
pub fn form_fields(request: &Request) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

/// Matches requests whose raw query string equals `query`.
pub fn query_is(query: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |req: &Request| req.url.query() == Some(query)
}

/// Matches requests without a query string.
pub fn no_query(req: &Request) -> bool {
    req.url.query().is_none()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
