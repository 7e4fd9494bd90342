//! Blocking WebDAV client
//!
//! Thin wrapper over `reqwest::blocking` with HTTP basic auth. Each
//! operation maps the server's status codes into domain results:
//! a missing sync file is `Ok(None)`, an existing container is not an
//! error, and everything unexpected carries method, path, and status.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};

use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn propfind() -> Method {
    Method::from_bytes(b"PROPFIND").expect("valid extension method")
}

fn mkcol() -> Method {
    Method::from_bytes(b"MKCOL").expect("valid extension method")
}

/// A WebDAV endpoint with credentials.
pub struct WebDavClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl WebDavClient {
    /// Build a client for `base_url` (trailing slashes are trimmed).
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url_for(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Verify the endpoint speaks WebDAV: a PROPFIND on the base URL
    /// must answer 207 Multi-Status.
    pub fn selfcheck(&self) -> Result<()> {
        let method = propfind();
        let response = self
            .request(method.clone(), "")
            .header("Depth", "0")
            .send()?;
        let status = response.status();
        if status == StatusCode::MULTI_STATUS {
            tracing::debug!("WebDAV selfcheck against {} passed", self.base_url);
            Ok(())
        } else {
            Err(Error::status(&method, "/", status))
        }
    }

    /// Create a collection. An already existing collection (405) is
    /// fine; a missing parent (409) is not.
    pub fn mkdir(&self, path: &str) -> Result<()> {
        let method = mkcol();
        let status = self.request(method.clone(), path).send()?.status();
        match status {
            StatusCode::CREATED => {
                tracing::info!("Created remote collection {}", path);
                Ok(())
            }
            StatusCode::METHOD_NOT_ALLOWED => {
                tracing::debug!("Remote collection {} already exists", path);
                Ok(())
            }
            _ => Err(Error::status(&method, path, status)),
        }
    }

    /// Fetch a file's body, or `None` if the server has no such file.
    pub fn download(&self, path: &str) -> Result<Option<String>> {
        let response = self.request(Method::GET, path).send()?;
        let status = response.status();
        match status {
            StatusCode::OK => Ok(Some(response.text()?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Error::status(&Method::GET, path, status)),
        }
    }

    /// Write a file. Servers answer 201 for a new file and 204 when an
    /// existing one was replaced; both are success.
    pub fn upload(&self, path: &str, body: &str) -> Result<()> {
        let status = self
            .request(Method::PUT, path)
            .body(body.to_string())
            .send()?
            .status();
        match status {
            StatusCode::CREATED | StatusCode::NO_CONTENT => {
                tracing::debug!("Uploaded {} ({} bytes)", path, body.len());
                Ok(())
            }
            _ => Err(Error::status(&Method::PUT, path, status)),
        }
    }

    /// Delete a file. A file that is already gone (404) is fine.
    pub fn delete(&self, path: &str) -> Result<()> {
        let status = self.request(Method::DELETE, path).send()?.status();
        match status {
            StatusCode::NO_CONTENT | StatusCode::OK | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Error::status(&Method::DELETE, path, status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    /// One-shot HTTP server answering a canned response. Returns the
    /// base URL and a channel carrying the raw request it saw.
    fn canned_server(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let header_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break buf.len();
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            tx.send(String::from_utf8_lossy(&buf).to_string()).unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        (format!("http://{addr}"), rx)
    }

    fn client(url: &str) -> WebDavClient {
        WebDavClient::new(url, "user", "secret").unwrap()
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let client = WebDavClient::new("http://dav.example/base/", "u", "p").unwrap();
        assert_eq!(client.base_url(), "http://dav.example/base");
        assert_eq!(
            client.url_for("/dir/file.json"),
            "http://dav.example/base/dir/file.json"
        );
        assert_eq!(client.url_for(""), "http://dav.example/base");
    }

    #[test]
    fn test_selfcheck_accepts_multi_status() {
        let (url, rx) = canned_server("207 Multi-Status", "");
        client(&url).selfcheck().unwrap();
        let request = rx.recv().unwrap();
        assert!(request.starts_with("PROPFIND"));
        assert!(request.to_lowercase().contains("authorization: basic"));
    }

    #[test]
    fn test_selfcheck_rejects_plain_http_server() {
        let (url, _rx) = canned_server("200 OK", "");
        let err = client(&url).selfcheck().unwrap_err();
        assert!(matches!(err, Error::Status { ref method, .. } if method == "PROPFIND"));
    }

    #[test]
    fn test_download_returns_body() {
        let (url, rx) = canned_server("200 OK", "{\"hello\":1}");
        let body = client(&url).download("/dir/sync.json").unwrap();
        assert_eq!(body.as_deref(), Some("{\"hello\":1}"));
        assert!(rx.recv().unwrap().starts_with("GET /dir/sync.json"));
    }

    #[test]
    fn test_download_maps_missing_file_to_none() {
        let (url, _rx) = canned_server("404 Not Found", "");
        let body = client(&url).download("/dir/sync.json").unwrap();
        assert!(body.is_none());
    }

    #[test]
    fn test_download_surfaces_other_statuses() {
        let (url, _rx) = canned_server("500 Internal Server Error", "");
        let err = client(&url).download("/dir/sync.json").unwrap_err();
        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 500));
    }

    #[test]
    fn test_upload_accepts_created() {
        let (url, rx) = canned_server("201 Created", "");
        client(&url).upload("/dir/sync.json", "payload").unwrap();
        let request = rx.recv().unwrap();
        assert!(request.starts_with("PUT /dir/sync.json"));
        assert!(request.ends_with("payload"));
    }

    #[test]
    fn test_upload_accepts_replaced() {
        let (url, _rx) = canned_server("204 No Content", "");
        client(&url).upload("/dir/sync.json", "payload").unwrap();
    }

    #[test]
    fn test_upload_rejects_forbidden() {
        let (url, _rx) = canned_server("403 Forbidden", "");
        let err = client(&url).upload("/dir/sync.json", "payload").unwrap_err();
        assert!(matches!(err, Error::Status { ref method, .. } if method == "PUT"));
    }

    #[test]
    fn test_mkdir_accepts_created_and_existing() {
        let (url, rx) = canned_server("201 Created", "");
        client(&url).mkdir("/dir").unwrap();
        assert!(rx.recv().unwrap().starts_with("MKCOL /dir"));

        let (url, _rx) = canned_server("405 Method Not Allowed", "");
        client(&url).mkdir("/dir").unwrap();
    }

    #[test]
    fn test_mkdir_rejects_missing_parent() {
        let (url, _rx) = canned_server("409 Conflict", "");
        let err = client(&url).mkdir("/missing/dir").unwrap_err();
        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 409));
    }

    #[test]
    fn test_delete_tolerates_already_gone() {
        let (url, _rx) = canned_server("404 Not Found", "");
        client(&url).delete("/dir/old.json").unwrap();

        let (url, _rx) = canned_server("204 No Content", "");
        client(&url).delete("/dir/old.json").unwrap();

        let (url, _rx) = canned_server("423 Locked", "");
        assert!(client(&url).delete("/dir/old.json").is_err());
    }
}
