// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{RepoCacheError, Result};
use crate::user_agent;
use attohttpc::{Response, Session};
use std::io::{self, Read};
use std::time::Duration;

/// Blocking GET transport. One request per call; no retries.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>>;
}

pub trait HttpResponse: Read + Send {
    fn status(&self) -> u16;

    fn header(&self, name: &str) -> Option<&str>;

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Read the whole body as UTF-8 text.
    fn text(&mut self) -> io::Result<String> {
        let mut body = String::new();
        self.read_to_string(&mut body)?;
        Ok(body)
    }
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct AttohttpcClient {
    timeout: Duration,
    user_agent: String,
}

impl AttohttpcClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: user_agent::registry_client(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

impl Default for AttohttpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for AttohttpcClient {
    fn get(&self, url: &str) -> Result<Box<dyn HttpResponse>> {
        let mut session = Session::new();
        session.proxy_settings(attohttpc::ProxySettings::from_env());

        log::debug!("GET {url}");
        let response = session
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json, */*")
            .follow_redirects(true)
            .send()
            .map_err(|e| RepoCacheError::network(url, e))?;

        log::trace!("GET {url} -> {}", response.status().as_u16());
        Ok(Box::new(AttohttpcResponse { response }))
    }
}

struct AttohttpcResponse {
    response: Response,
}

impl Read for AttohttpcResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.response.read(buf)
    }
}

impl HttpResponse for AttohttpcResponse {
    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.response.headers().get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_get_returns_status_and_body() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/hello")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("world")
            .create();

        let client = AttohttpcClient::new();
        let mut response = client.get(&format!("{}/hello", server.url())).unwrap();

        assert!(response.is_success());
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.text().unwrap(), "world");
    }

    #[test]
    fn test_non_success_status_is_returned_not_raised() {
        let mut server = Server::new();
        let _m = server.mock("GET", "/missing").with_status(404).create();

        let client = AttohttpcClient::new();
        let response = client.get(&format!("{}/missing", server.url())).unwrap();

        assert_eq!(response.status(), 404);
        assert!(!response.is_success());
    }

    #[test]
    fn test_user_agent_is_sent() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/ua")
            .match_header("user-agent", "repocache/test/1")
            .with_status(204)
            .create();

        let client = AttohttpcClient::new().with_user_agent("repocache/test/1".to_string());
        let response = client.get(&format!("{}/ua", server.url())).unwrap();
        assert_eq!(response.status(), 204);
    }

    #[test]
    fn test_transport_failure_is_network_error() {
        let client = AttohttpcClient::new().with_timeout(Duration::from_secs(2));
        let result = client.get("http://127.0.0.1:9/unreachable");

        match result {
            Err(RepoCacheError::Network { url, .. }) => {
                assert_eq!(url, "http://127.0.0.1:9/unreachable")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected connection failure"),
        }
    }
}
