//! JSON-lines dispatcher.
//!
//! One request per line:
//!
//! ```json
//! {"method": "install", "appid": 730}
//! {"method": "status", "appid": "730"}
//! {"method": "log", "message": "front end loaded"}
//! ```
//!
//! One reply per line, in the [`Reply`](super::Reply) envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Backend, Reply};
use crate::app_id::AppId;

/// A decoded request line.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub appid: Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// Handle one request line and return the reply line (without newline).
pub fn handle_line(backend: &Backend, line: &str) -> String {
    let reply = match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(backend, &request),
        Err(e) => {
            warn!(error = %e, "Malformed request");
            encode(Reply::<()>::err(format!("malformed request: {}", e)))
        }
    };
    debug!(reply = %reply, "RPC reply");
    reply
}

/// Run a decoded request.
pub fn dispatch(backend: &Backend, request: &Request) -> String {
    debug!(method = %request.method, appid = %request.appid, "RPC request");

    match request.method.as_str() {
        "install" => with_app_id(request, |id| encode(backend.install(id))),
        "status" => with_app_id(request, |id| encode(backend.status(id))),
        "remove" => with_app_id(request, |id| encode(backend.remove(id))),
        "has_installed" => with_app_id(request, |id| encode(backend.has_installed(id))),
        "list_installed" => encode(backend.list_installed()),
        "restart_host" => encode(backend.restart_host()),
        "log" => encode(backend.log(request.message.as_deref().unwrap_or_default())),
        other => encode(Reply::<()>::err(format!("unknown method: {}", other))),
    }
}

/// Validate the request's id; invalid ids are answered without side effects.
fn with_app_id(request: &Request, op: impl FnOnce(AppId) -> String) -> String {
    match AppId::from_json(&request.appid) {
        Ok(id) => op(id),
        Err(e) => encode(Reply::<()>::err(e)),
    }
}

fn encode<T: Serialize>(reply: Reply<T>) -> String {
    serde_json::to_string(&reply).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"error":{}}}"#,
            Value::String(format!("failed to encode reply: {}", e))
        )
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::backend;
    use super::*;
    use crate::testing::MemoryRepository;
    use tempfile::TempDir;

    fn call(backend: &Backend, line: &str) -> Value {
        serde_json::from_str(&handle_line(backend, line)).unwrap()
    }

    #[test]
    fn test_malformed_and_unknown() {
        let temp = TempDir::new().unwrap();
        let backend = backend(&temp, MemoryRepository::new());

        let reply = call(&backend, "not json");
        assert_eq!(reply["success"], false);
        assert!(reply["error"].as_str().unwrap().starts_with("malformed request"));

        let reply = call(&backend, r#"{"method": "frobnicate"}"#);
        assert_eq!(reply["error"], "unknown method: frobnicate");
    }

    #[test]
    fn test_invalid_appid_is_rejected_without_record() {
        let temp = TempDir::new().unwrap();
        let backend = backend(&temp, MemoryRepository::new());

        for line in [
            r#"{"method": "install", "appid": "abc"}"#,
            r#"{"method": "install", "appid": -1}"#,
            r#"{"method": "install", "appid": 1.5}"#,
            r#"{"method": "install"}"#,
        ] {
            let reply = call(&backend, line);
            assert_eq!(reply["success"], false, "{}", line);
            assert!(reply["error"].as_str().unwrap().starts_with("Invalid appid"));
        }
        assert!(backend.coordinator().progress().is_empty());
    }

    #[test]
    fn test_install_acknowledges_with_queued_record() {
        let temp = TempDir::new().unwrap();
        let backend = backend(&temp, MemoryRepository::new());

        let reply = call(&backend, r#"{"method": "install", "appid": "440"}"#);
        assert_eq!(reply["success"], true);
        assert_eq!(reply["accepted"], true);
        assert_eq!(reply["appid"], 440);
        assert!(backend.coordinator().progress().contains(AppId::new(440)));
    }

    #[test]
    fn test_list_and_log() {
        let temp = TempDir::new().unwrap();
        let backend = backend(&temp, MemoryRepository::new());

        let reply = call(&backend, r#"{"method": "list_installed"}"#);
        assert_eq!(reply, serde_json::json!({"success": true, "apps": []}));

        let reply = call(&backend, r#"{"method": "log", "message": "hello"}"#);
        assert_eq!(reply["success"], true);
    }
}
