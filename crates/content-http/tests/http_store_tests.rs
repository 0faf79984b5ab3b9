//! HttpStore against a local canned-response server

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use content_core::{
    Action, ClientConfig, ContentStore, DocumentId, DocumentService, DocumentSource, StoreError,
};
use content_http::HttpStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// A request as seen by the test server
#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_lowercase());
        self.headers
            .iter()
            .find(|h| h.to_lowercase().starts_with(&prefix))
            .map(|h| h[prefix.len()..].trim().to_string())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Serve each canned `(status, body)` response to one connection, in order.
fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = recorded.clone();

    thread::spawn(move || {
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                headers.push(line);
            }

            let mut buf = vec![0u8; content_length];
            reader.read_exact(&mut buf).unwrap();

            log.lock().unwrap().push(Recorded {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(buf).unwrap(),
            });

            let mut stream = stream;
            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });

    (format!("http://{}", addr), recorded)
}

fn store_for(host: String) -> HttpStore {
    let mut config = ClientConfig::new("p1", "production").with_token("secret-token");
    config.api_host = Some(host);
    HttpStore::new(Arc::new(config))
}

fn id(raw: &str) -> DocumentId {
    DocumentId::parse(raw).unwrap()
}

#[tokio::test]
async fn test_fetch_document_found() {
    let (host, recorded) = serve(vec![(
        200,
        json!({ "documents": [{ "_id": "drafts.abc", "_rev": "rev-1", "title": "Hi" }] })
            .to_string(),
    )]);
    let store = store_for(host);

    let doc = store.fetch_document(&id("drafts.abc")).await.unwrap().unwrap();

    assert_eq!(doc.id, "drafts.abc");
    assert_eq!(doc.rev, "rev-1");
    let request = recorded.lock().unwrap()[0].clone();
    assert_eq!(
        request.request_line,
        "GET /v2025-02-19/data/doc/production/drafts.abc HTTP/1.1"
    );
    assert_eq!(request.header("authorization").as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn test_fetch_document_missing() {
    let (host, _recorded) = serve(vec![(200, json!({ "documents": [] }).to_string())]);
    let store = store_for(host);

    assert!(store.fetch_document(&id("abc")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_perform_action_posts_wire_format() {
    let (host, recorded) = serve(vec![(200, json!({ "transactionId": "tx-9" }).to_string())]);
    let store = store_for(host);

    let result = store
        .perform_action(&Action::version_discard(&id("versions.r1.abc")).unwrap())
        .await
        .unwrap();

    assert_eq!(result.transaction_id, "tx-9");
    let request = recorded.lock().unwrap()[0].clone();
    assert_eq!(
        request.request_line,
        "POST /v2025-02-19/data/actions/production HTTP/1.1"
    );
    assert_eq!(
        request.json(),
        json!({
            "actions": [{
                "actionType": "sanity.action.document.version.discard",
                "versionId": "versions.r1.abc"
            }]
        })
    );
}

#[tokio::test]
async fn test_rejected_action_carries_store_message() {
    let (host, _recorded) = serve(vec![(
        409,
        json!({ "error": { "description": "Document is not a draft" } }).to_string(),
    )]);
    let store = store_for(host);

    let err = store
        .perform_action(&Action::publish(&id("abc")))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::Rejected {
            status: 409,
            message: "Document is not a draft".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let store = store_for(format!("http://{}", addr));

    let err = store.fetch_document(&id("abc")).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_publish_through_service_checkpoints_before_dispatch() {
    let (host, recorded) = serve(vec![
        (
            200,
            json!({ "documents": [{ "_id": "drafts.abc", "_rev": "rev-3" }] }).to_string(),
        ),
        (200, json!({ "transactionId": "tx-1" }).to_string()),
    ]);
    let store = store_for(host);
    let config = store.config().clone();
    let service = DocumentService::new(Arc::new(store), config);

    let payload = service.publish(&["abc".to_string()]).await.unwrap();

    assert_eq!(payload.checkpoints[0].revision(), Some("rev-3"));
    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].request_line.starts_with("GET "));
    assert!(requests[1].request_line.starts_with("POST "));
    assert_eq!(requests[1].json()["actions"][0]["publishedId"], "abc");
}
