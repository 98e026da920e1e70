//! Shared fixtures for the integration suites: an in-process mock gateway,
//! an in-process mock validator, and a test family codec.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use sawtooth_kit::transport::messages::{Envelope, MessageKind, decode_frame, encode_frame};
use sawtooth_kit::{
    Batch, BatchHeader, Error, InMemorySigner, PayloadCodec, Signer, Transaction,
    TransactionHeader, hex_digest,
};

pub const TEST_KEY_HEX: &str = "2f1e7b7a098d9d7e8195e5fb0b36a132cb1b1e58a3eeb44e1d412f24e5bd4ebb";

// ============================================================================
// Test family codec
// ============================================================================

/// An intkey-shaped payload for the test family.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TestPayload {
    pub verb: String,
    pub name: String,
    pub value: u32,
}

/// JSON codec for the test family.
pub struct TestCodec;

impl PayloadCodec for TestCodec {
    type Payload = TestPayload;
    type StateValue = BTreeMap<String, u32>;

    fn family_name(&self) -> &str {
        "intkey"
    }

    fn family_version(&self) -> &str {
        "1.0"
    }

    fn encode_payload(&self, payload: &TestPayload) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(payload).map_err(|e| Error::Codec(e.to_string()))
    }

    fn decode_payload(&self, bytes: &[u8]) -> Result<TestPayload, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
    }

    fn input_addresses(&self, payload: &TestPayload) -> Vec<String> {
        vec![test_address(&payload.name)]
    }

    fn output_addresses(&self, payload: &TestPayload) -> Vec<String> {
        vec![test_address(&payload.name)]
    }

    fn encode_state(&self, value: &Self::StateValue) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(value).map_err(|e| Error::Codec(e.to_string()))
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Self::StateValue, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Codec(e.to_string()))
    }
}

/// The six-character namespace prefix of the test family.
pub fn test_prefix() -> String {
    hex_digest(b"intkey")[..6].to_string()
}

/// The state address of a named test value.
pub fn test_address(name: &str) -> String {
    format!("{}{}", test_prefix(), &hex_digest(name.as_bytes())[64..])
}

/// Apply an intkey payload to a name->value map.
pub fn apply_payload(values: &mut BTreeMap<String, u32>, payload: &TestPayload) {
    match payload.verb.as_str() {
        "set" => {
            values.insert(payload.name.clone(), payload.value);
        }
        "inc" => {
            *values.entry(payload.name.clone()).or_insert(0) += payload.value;
        }
        "dec" => {
            let entry = values.entry(payload.name.clone()).or_insert(0);
            *entry = entry.saturating_sub(payload.value);
        }
        _ => {}
    }
}

// ============================================================================
// Hand-built signed entities
// ============================================================================

/// Build a signed wire transaction for one payload, outside the client.
pub fn signed_transaction(signer: &InMemorySigner, payload: &TestPayload) -> Transaction {
    let payload_bytes = serde_json::to_vec(payload).unwrap();
    let header = TransactionHeader {
        batcher_public_key: signer.public_key().to_string(),
        dependencies: vec![],
        family_name: "intkey".to_string(),
        family_version: "1.0".to_string(),
        inputs: vec![test_address(&payload.name)],
        nonce: format!("{:032x}", rand::random::<u128>()),
        outputs: vec![test_address(&payload.name)],
        payload_sha512: hex_digest(&payload_bytes),
        signer_public_key: signer.public_key().to_string(),
    };
    let header_bytes = borsh::to_vec(&header).unwrap();
    let header_signature = signer.sign(&header_bytes).unwrap();
    Transaction {
        header: header_bytes,
        header_signature,
        payload: payload_bytes,
    }
}

/// Build a signed wire batch around the given payloads.
pub fn signed_batch(signer: &InMemorySigner, payloads: &[TestPayload]) -> Batch {
    let transactions: Vec<Transaction> = payloads
        .iter()
        .map(|payload| signed_transaction(signer, payload))
        .collect();
    let header = BatchHeader {
        signer_public_key: signer.public_key().to_string(),
        transaction_ids: transactions
            .iter()
            .map(|t| t.header_signature.clone())
            .collect(),
    };
    let header_bytes = borsh::to_vec(&header).unwrap();
    let header_signature = signer.sign(&header_bytes).unwrap();
    Batch {
        header: header_bytes,
        header_signature,
        transactions,
        trace: false,
    }
}

pub fn test_signer() -> InMemorySigner {
    InMemorySigner::from_hex(TEST_KEY_HEX).unwrap()
}

// ============================================================================
// Mock HTTP gateway
// ============================================================================

pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.target.split_once('?')?.1;
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == name {
                return Some(value.to_string());
            }
        }
        None
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        HttpResponse {
            status,
            body: serde_json::to_vec(&value).unwrap(),
        }
    }

    /// The gateway's standard error envelope.
    pub fn error(status: u16, code: u32, title: &str, message: &str) -> Self {
        Self::json(
            status,
            serde_json::json!({
                "error": {"code": code, "title": title, "message": message}
            }),
        )
    }
}

/// Spawn a one-thread-per-connection HTTP responder; returns its base URL.
///
/// The server lives until the test process exits.
pub fn spawn_gateway<H>(handler: H) -> String
where
    H: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let handler = Arc::clone(&handler);
            thread::spawn(move || handle_http(stream, handler.as_ref()));
        }
    });

    format!("http://{}", address)
}

fn handle_http<H>(mut stream: TcpStream, handler: &H)
where
    H: Fn(&HttpRequest) -> HttpResponse,
{
    // Read the request head byte-by-byte; fine for a test double.
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => return,
        }
    }

    let head = String::from_utf8_lossy(&head).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 && stream.read_exact(&mut body).is_err() {
        return;
    }

    let response = handler(&HttpRequest {
        method,
        target,
        headers,
        body,
    });

    let reason = match response.status {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let mut out = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason,
        response.body.len()
    )
    .into_bytes();
    out.extend_from_slice(&response.body);
    let _ = stream.write_all(&out);
}

// ============================================================================
// Mock validator
// ============================================================================

/// Spawn a framed-protocol responder; returns its `tcp://` endpoint and a
/// counter of accepted connections.
pub fn spawn_validator<H>(handler: H) -> (String, Arc<AtomicUsize>)
where
    H: Fn(&Envelope) -> Envelope + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let connections = Arc::new(AtomicUsize::new(0));
    let connections_counter = Arc::clone(&connections);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            connections_counter.fetch_add(1, Ordering::SeqCst);
            let handler = Arc::clone(&handler);
            thread::spawn(move || handle_validator(stream, handler.as_ref()));
        }
    });

    (format!("tcp://{}", address), connections)
}

fn handle_validator<H>(mut stream: TcpStream, handler: &H)
where
    H: Fn(&Envelope) -> Envelope,
{
    loop {
        let mut length_prefix = [0u8; 4];
        if stream.read_exact(&mut length_prefix).is_err() {
            return;
        }
        let length = u32::from_be_bytes(length_prefix) as usize;
        let mut body = vec![0u8; length];
        if stream.read_exact(&mut body).is_err() {
            return;
        }
        let Ok(request) = decode_frame(&body) else {
            return;
        };
        let response = handler(&request);
        if stream.write_all(&encode_frame(&response)).is_err() {
            return;
        }
    }
}

/// Build a response envelope echoing the request's correlation id.
pub fn reply<M: borsh::BorshSerialize>(request: &Envelope, kind: MessageKind, body: &M) -> Envelope {
    Envelope::new(kind, request.correlation_id, body)
}
