use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

const MASK: &str = "***";

/// Connection metadata with secrets redacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Redact secrets from a connection string while extracting non-sensitive metadata.
///
/// Unparseable input is never echoed back, since it may still hold a password.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Ok(mut url) = Url::parse(conn) else {
        return RedactedConnection {
            engine: None,
            user: None,
            host: None,
            port: None,
            database: None,
            redacted: "<unparseable connection string>".to_string(),
        };
    };

    if url.password().is_some() {
        let _ = url.set_password(Some(MASK));
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            if is_sensitive_key(&key) {
                (key.into_owned(), MASK.to_string())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let user = Some(url.username())
        .filter(|user| !user.is_empty())
        .map(decode_component);
    let database = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .map(decode_component);

    RedactedConnection {
        engine: Some(url.scheme().to_string()),
        user,
        host: url.host_str().map(str::to_string),
        port: url.port(),
        database,
        redacted: url.to_string(),
    }
}

/// URL components arrive percent-encoded (`my%20db`).
fn decode_component(component: &str) -> String {
    percent_decode_str(component).decode_utf8_lossy().into_owned()
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pass" | "token" | "api_key" | "apikey"
    )
}
