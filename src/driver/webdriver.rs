use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::config::DriverSettings;

use super::{Authenticator, PortfolioUiDriver};

/// Key under which W3C WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecc";

/// Per-request timeout for WebDriver HTTP calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
enum Interaction {
    Click,
    Clear,
    SendKeys(String),
}

/// A browser session driven over the W3C WebDriver HTTP protocol.
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
    settings: DriverSettings,
}

impl WebDriverSession {
    /// Start a new browser session on the configured WebDriver endpoint.
    pub async fn connect(settings: DriverSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = settings.webdriver_url.trim_end_matches('/').to_string();

        let payload = new_session_payload(&settings);
        let resp = client
            .post(format!("{}/session", base_url))
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        let body: Value = resp.json().await?;
        if !status.is_success() {
            return Err(AppError::Driver(format!(
                "Could not start browser session: {}",
                error_message(&body)
            )));
        }
        let session_id = body["value"]["sessionId"]
            .as_str()
            .ok_or_else(|| AppError::Driver("WebDriver response missing sessionId".into()))?
            .to_string();

        info!("Started {} session {} at {}", settings.browser_name, session_id, base_url);
        Ok(WebDriverSession {
            client,
            base_url,
            session_id,
            settings,
        })
    }

    /// End the browser session.
    pub async fn close(self) -> Result<(), AppError> {
        self.command(Method::DELETE, "", None).await?;
        info!("Closed session {}", self.session_id);
        Ok(())
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AppError> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let mut req = self.client.request(method.clone(), url);
        if method == Method::POST {
            req = req.json(&body.unwrap_or_else(|| json!({})));
        }
        let resp = req.send().await?;
        let status = resp.status();
        let mut payload: Value = resp.json().await?;
        if !status.is_success() {
            return Err(AppError::Driver(error_message(&payload)));
        }
        Ok(payload.get_mut("value").map(Value::take).unwrap_or(Value::Null))
    }

    async fn find_element(&self, selector: &str) -> Result<String, AppError> {
        let value = self
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;
        value[ELEMENT_KEY]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::Driver(format!("No element reference for '{}'", selector)))
    }

    async fn element_command(
        &self,
        element: &str,
        action: &str,
        body: Option<Value>,
    ) -> Result<(), AppError> {
        let path = format!("/element/{}/{}", element, action);
        self.command(Method::POST, &path, body).await.map(|_| ())
    }

    /// Locate `selector` and perform `action` on it, retrying until the
    /// element wait budget runs out. A retried send-keys clears the field
    /// first so partially typed text is not doubled.
    async fn interact(&self, selector: &str, action: Interaction) -> Result<(), AppError> {
        let budget = Duration::from_millis(self.settings.element_wait_ms);
        let poll = Duration::from_millis(self.settings.poll_interval_ms.max(1));
        let started = Instant::now();
        let mut retrying = false;

        loop {
            let clear_first = retrying;
            let attempt = async {
                let element = self.find_element(selector).await?;
                match &action {
                    Interaction::Click => self.element_command(&element, "click", None).await,
                    Interaction::Clear => self.element_command(&element, "clear", None).await,
                    Interaction::SendKeys(text) => {
                        if clear_first {
                            self.element_command(&element, "clear", None).await?;
                        }
                        let keys = json!({ "text": text });
                        self.element_command(&element, "value", Some(keys)).await
                    }
                }
            };

            match attempt.await {
                Ok(()) => return Ok(()),
                Err(e) if started.elapsed() + poll < budget => {
                    debug!("'{}' not ready ({}), retrying", selector, e);
                    retrying = true;
                    tokio::time::sleep(poll).await;
                }
                Err(e) => {
                    debug!("Giving up on '{}': {}", selector, e);
                    return Err(AppError::ElementTimeout {
                        selector: selector.to_string(),
                        waited_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
        }
    }

    async fn click(&self, selector: &str) -> Result<(), AppError> {
        self.interact(selector, Interaction::Click).await
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), AppError> {
        self.interact(selector, Interaction::SendKeys(text.to_string()))
            .await
    }

    async fn replace_text(&self, selector: &str, text: &str) -> Result<(), AppError> {
        self.interact(selector, Interaction::Clear).await?;
        self.type_into(selector, text).await
    }
}

impl PortfolioUiDriver for WebDriverSession {
    async fn navigate(&mut self, target: &str) -> Result<(), AppError> {
        debug!("Navigating to {}", target);
        self.command(Method::POST, "/url", Some(json!({ "url": target })))
            .await
            .map(|_| ())
    }

    async fn begin_purchase_entry(&mut self) -> Result<(), AppError> {
        self.click(&self.settings.selectors.add_investment).await
    }

    async fn enter_symbol(&mut self, symbol: &str) -> Result<(), AppError> {
        let selectors = &self.settings.selectors;
        self.type_into(&selectors.symbol_input, symbol).await?;
        if !selectors.symbol_suggestion.is_empty() {
            self.click(&selectors.symbol_suggestion).await?;
        }
        Ok(())
    }

    async fn enter_quantity(&mut self, quantity: &str) -> Result<(), AppError> {
        self.type_into(&self.settings.selectors.quantity_input, quantity).await
    }

    async fn enter_date(&mut self, date: &str) -> Result<(), AppError> {
        self.replace_text(&self.settings.selectors.date_input, date).await
    }

    async fn enter_price(&mut self, price: &str) -> Result<(), AppError> {
        self.replace_text(&self.settings.selectors.price_input, price).await
    }

    async fn save(&mut self) -> Result<(), AppError> {
        self.click(&self.settings.selectors.save_button).await
    }
}

impl Authenticator for WebDriverSession {
    async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        mfa_wait: bool,
    ) -> Result<(), AppError> {
        let sign_in_url = self.settings.sign_in_url.clone();
        let selectors = self.settings.selectors.clone();
        info!("Signing in as {}", email);

        let steps = async {
            self.navigate(&sign_in_url).await?;
            self.type_into(&selectors.email_input, email).await?;
            self.click(&selectors.email_next).await?;
            self.type_into(&selectors.password_input, password).await?;
            self.click(&selectors.password_next).await
        };
        steps
            .await
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if mfa_wait {
            let wait = self.settings.mfa_wait_secs;
            info!("Waiting {}s for second-factor confirmation", wait);
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }
        Ok(())
    }
}

/// Capabilities body for `POST /session`.
fn new_session_payload(settings: &DriverSettings) -> Value {
    let mut always_match = json!({ "browserName": settings.browser_name });
    if settings.headless {
        match settings.browser_name.as_str() {
            "chrome" | "chromium" => {
                always_match["goog:chromeOptions"] = json!({ "args": ["--headless=new"] });
            }
            "firefox" => {
                always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
            }
            _ => {}
        }
    }
    json!({ "capabilities": { "alwaysMatch": always_match } })
}

/// Pull `error: message` out of a WebDriver error body.
fn error_message(body: &Value) -> String {
    let value = &body["value"];
    match (value["error"].as_str(), value["message"].as_str()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_payload_headless_chrome() {
        let settings = DriverSettings {
            headless: true,
            ..Default::default()
        };
        let payload = new_session_payload(&settings);
        let caps = &payload["capabilities"]["alwaysMatch"];
        assert_eq!(caps["browserName"], "chrome");
        assert_eq!(caps["goog:chromeOptions"]["args"][0], "--headless=new");
    }

    #[test]
    fn test_session_payload_headed_has_no_options() {
        let payload = new_session_payload(&DriverSettings::default());
        assert!(payload["capabilities"]["alwaysMatch"]["goog:chromeOptions"].is_null());
    }

    #[test]
    fn test_error_message_from_webdriver_body() {
        let body = json!({
            "value": { "error": "no such element", "message": "Unable to locate element" }
        });
        assert_eq!(error_message(&body), "no such element: Unable to locate element");
    }

    /// Minimal WebDriver endpoint serving a single element.
    mod stub {
        use std::sync::{Arc, Mutex};

        use axum::extract::State;
        use axum::http::StatusCode;
        use axum::routing::post;
        use axum::{Json, Router};
        use serde_json::{json, Value};

        use crate::driver::webdriver::ELEMENT_KEY;

        #[derive(Debug, Default)]
        pub struct Page {
            /// Element lookups answered with "no such element" before it appears.
            pub missing_lookups: usize,
            /// Send-keys calls that take half the text and then fail.
            pub partial_sends: usize,
            pub lookups: usize,
            pub clicks: usize,
            pub clears: usize,
            pub field: String,
        }

        pub type Shared = Arc<Mutex<Page>>;

        type Reply = (StatusCode, Json<Value>);

        fn ok() -> Reply {
            (StatusCode::OK, Json(json!({ "value": null })))
        }

        fn error(status: StatusCode, code: &str) -> Reply {
            (status, Json(json!({ "value": { "error": code, "message": code } })))
        }

        async fn find(State(page): State<Shared>) -> Reply {
            let mut page = page.lock().unwrap();
            page.lookups += 1;
            if page.lookups <= page.missing_lookups {
                return error(StatusCode::NOT_FOUND, "no such element");
            }
            (StatusCode::OK, Json(json!({ "value": { ELEMENT_KEY: "field-1" } })))
        }

        async fn click(State(page): State<Shared>) -> Reply {
            page.lock().unwrap().clicks += 1;
            ok()
        }

        async fn clear(State(page): State<Shared>) -> Reply {
            let mut page = page.lock().unwrap();
            page.clears += 1;
            page.field.clear();
            ok()
        }

        async fn send_keys(State(page): State<Shared>, Json(body): Json<Value>) -> Reply {
            let text = body["text"].as_str().unwrap_or_default().to_string();
            let mut page = page.lock().unwrap();
            if page.partial_sends > 0 {
                page.partial_sends -= 1;
                let half: String = text.chars().take(text.len() / 2).collect();
                page.field.push_str(&half);
                return error(StatusCode::BAD_REQUEST, "element not interactable");
            }
            page.field.push_str(&text);
            ok()
        }

        /// Serve `page` on an ephemeral port. Returns the base URL and the shared page.
        pub async fn serve(page: Page) -> (String, Shared) {
            let shared = Arc::new(Mutex::new(page));
            let app = Router::new()
                .route("/session/:session/element", post(find))
                .route("/session/:session/element/:id/click", post(click))
                .route("/session/:session/element/:id/clear", post(clear))
                .route("/session/:session/element/:id/value", post(send_keys))
                .with_state(shared.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            (format!("http://{}", addr), shared)
        }
    }

    fn session(base_url: String, element_wait_ms: u64) -> WebDriverSession {
        WebDriverSession {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            base_url,
            session_id: "s-1".into(),
            settings: DriverSettings {
                element_wait_ms,
                poll_interval_ms: 10,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_interact_polls_until_element_appears() {
        let (url, page) = stub::serve(stub::Page {
            missing_lookups: 3,
            ..Default::default()
        })
        .await;
        let driver = session(url, 5_000);

        driver.click("#save").await.unwrap();

        let page = page.lock().unwrap();
        assert_eq!(page.lookups, 4);
        assert_eq!(page.clicks, 1);
    }

    #[tokio::test]
    async fn test_interact_gives_up_after_wait_budget() {
        let (url, page) = stub::serve(stub::Page {
            missing_lookups: usize::MAX,
            ..Default::default()
        })
        .await;
        let driver = session(url, 100);

        match driver.click("#save").await {
            Err(AppError::ElementTimeout { selector, waited_ms }) => {
                assert_eq!(selector, "#save");
                assert!(waited_ms < 5_000);
            }
            other => panic!("expected ElementTimeout, got {:?}", other),
        }
        let page = page.lock().unwrap();
        assert!(page.lookups > 1);
        assert_eq!(page.clicks, 0);
    }

    #[tokio::test]
    async fn test_retried_send_keys_clears_partial_text() {
        let (url, page) = stub::serve(stub::Page {
            partial_sends: 1,
            ..Default::default()
        })
        .await;
        let driver = session(url, 5_000);

        driver.type_into("input", "1450.25").await.unwrap();

        let page = page.lock().unwrap();
        assert_eq!(page.field, "1450.25");
        assert_eq!(page.clears, 1);
    }

    #[tokio::test]
    async fn test_first_send_keys_does_not_clear() {
        let (url, page) = stub::serve(stub::Page::default()).await;
        let mut driver = session(url, 5_000);

        driver.enter_quantity("12").await.unwrap();

        let page = page.lock().unwrap();
        assert_eq!(page.field, "12");
        assert_eq!(page.clears, 0);
    }
}
