use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::browser::selectors::Locator;
use crate::error::{AppError, Result};

/// W3C key under which element references are returned.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f713c5c1d0b";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A single WebDriver session attached to an already-running Chrome.
pub struct WebDriver {
    client: Client,
    base_url: String,
    session_id: String,
}

/// Opaque element handle scoped to the session that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl WebDriver {
    /// Open a session that drives the Chrome listening on `debugger_address`.
    pub async fn attach(client: Client, base_url: &str, debugger_address: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "debuggerAddress": debugger_address }
                }
            }
        });

        let created: NewSession =
            send(&client, Method::POST, &format!("{base_url}/session"), Some(body)).await?;

        tracing::info!(session = %created.session_id, debugger_address, "Attached to Chrome");

        Ok(Self {
            client,
            base_url,
            session_id: created.session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        let _: Value = self
            .command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    pub async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        self.locate("elements", locator).await
    }

    /// Elements matching `locator` searched from `parent` rather than the document root.
    pub async fn find_elements_from(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> Result<Vec<ElementRef>> {
        self.locate(&format!("element/{}/elements", parent.0), locator)
            .await
    }

    /// Poll until at least one element matches or `timeout` elapses.
    pub async fn wait_for_all(&self, locator: &Locator, timeout: Duration) -> Result<Vec<ElementRef>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let found = self.find_elements(locator).await?;
            if !found.is_empty() || tokio::time::Instant::now() >= deadline {
                return Ok(found);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn wait_for_first(&self, locator: &Locator, timeout: Duration) -> Result<Option<ElementRef>> {
        Ok(self.wait_for_all(locator, timeout).await?.into_iter().next())
    }

    pub async fn text(&self, element: &ElementRef) -> Result<String> {
        self.command(Method::GET, &format!("element/{}/text", element.0), None)
            .await
    }

    pub async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        self.command(
            Method::GET,
            &format!("element/{}/attribute/{name}", element.0),
            None,
        )
        .await
    }

    /// End the session. Chrome itself keeps running since it was only attached to.
    pub async fn quit(self) -> Result<()> {
        let _: Value = self.command(Method::DELETE, "", None).await?;
        tracing::info!(session = %self.session_id, "WebDriver session closed");
        Ok(())
    }

    async fn locate(&self, path: &str, locator: &Locator) -> Result<Vec<ElementRef>> {
        let found: Vec<Value> = self
            .command(
                Method::POST,
                path,
                Some(json!({ "using": locator.strategy(), "value": locator.value() })),
            )
            .await?;

        found
            .iter()
            .map(|v| {
                v.get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .map(|id| ElementRef(id.to_string()))
                    .ok_or_else(|| AppError::Browser(format!("Unexpected element reference: {v}")))
            })
            .collect()
    }

    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{path}", self.base_url, self.session_id)
        };
        send(&self.client, method, &url, body).await
    }
}

/// Whether a driver is up and accepting new sessions.
pub async fn is_ready(client: &Client, base_url: &str) -> bool {
    let url = format!("{}/status", base_url.trim_end_matches('/'));
    match send::<DriverStatus>(client, Method::GET, &url, None).await {
        Ok(status) => status.ready,
        Err(_) => false,
    }
}

async fn send<T: DeserializeOwned>(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<T> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Envelope>(&body)
            .ok()
            .and_then(|envelope| serde_json::from_value::<DriverError>(envelope.value).ok())
            .map(|e| format!("{}: {}", e.error, e.message))
            .unwrap_or(body);
        return Err(AppError::Browser(format!("WebDriver returned {status}: {detail}")));
    }

    let envelope = response.json::<Envelope>().await?;
    Ok(serde_json::from_value(envelope.value)?)
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct DriverError {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DriverStatus {
    #[serde(default)]
    ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn attached(server: &MockServer) -> WebDriver {
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": { "sessionId": "abc", "capabilities": {} }
            })))
            .mount(server)
            .await;

        WebDriver::attach(Client::new(), &server.uri(), "127.0.0.1:9222")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_attach_sends_debugger_address() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_json(json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": "chrome",
                        "goog:chromeOptions": { "debuggerAddress": "localhost:9333" }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": { "sessionId": "s-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let driver = WebDriver::attach(Client::new(), &server.uri(), "localhost:9333")
            .await
            .unwrap();
        assert_eq!(driver.session_id(), "s-1");
    }

    #[tokio::test]
    async fn test_find_elements_and_read_attribute() {
        let server = MockServer::start().await;
        let driver = attached(&server).await;

        Mock::given(method("POST"))
            .and(path("/session/abc/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [ { "element-6066-11e4-a52e-4f713c5c1d0b": "e1" }, { "element-6066-11e4-a52e-4f713c5c1d0b": "e2" } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/session/abc/element/e2/attribute/href"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": "https://www.linkedin.com/in/b"
            })))
            .mount(&server)
            .await;

        let found = driver
            .find_elements(&Locator::XPath("//a"))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);

        let href = driver.attribute(&found[1], "href").await.unwrap();
        assert_eq!(href.as_deref(), Some("https://www.linkedin.com/in/b"));
    }

    #[tokio::test]
    async fn test_driver_error_is_surfaced() {
        let server = MockServer::start().await;
        let driver = attached(&server).await;

        Mock::given(method("POST"))
            .and(path("/session/abc/url"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "value": { "error": "unknown error", "message": "cannot reach page" }
            })))
            .mount(&server)
            .await;

        let err = driver.navigate("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Browser(_)));
        assert!(err.to_string().contains("cannot reach page"));
    }

    #[tokio::test]
    async fn test_non_json_error_body_keeps_status() {
        let server = MockServer::start().await;
        let driver = attached(&server).await;

        Mock::given(method("POST"))
            .and(path("/session/abc/url"))
            .respond_with(
                ResponseTemplate::new(502).set_body_string("<html><body>Bad Gateway</body></html>"),
            )
            .mount(&server)
            .await;

        let err = driver.navigate("https://example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Browser(_)));
        let message = err.to_string();
        assert!(message.contains("502"));
        assert!(message.contains("Bad Gateway"));
    }

    #[tokio::test]
    async fn test_find_elements_from_parent_element() {
        let server = MockServer::start().await;
        let driver = attached(&server).await;

        Mock::given(method("POST"))
            .and(path("/session/abc/element/card/elements"))
            .and(body_json(json!({ "using": "xpath", "value": "./span" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [ { "element-6066-11e4-a52e-4f713c5c1d0b": "inner" } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let parent = ElementRef("card".to_string());
        let found = driver
            .find_elements_from(&parent, &Locator::XPath("./span"))
            .await
            .unwrap();
        assert_eq!(found, vec![ElementRef("inner".to_string())]);
    }

    #[tokio::test]
    async fn test_wait_for_first_times_out_empty() {
        let server = MockServer::start().await;
        let driver = attached(&server).await;

        Mock::given(method("POST"))
            .and(path("/session/abc/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .mount(&server)
            .await;

        let found = driver
            .wait_for_first(&Locator::Css("h1"), Duration::ZERO)
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
