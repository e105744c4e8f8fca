use crate::domain::ports::Notifier;
use crate::utils::error::{Result, ToolError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("cli-toolbox/", env!("CARGO_PKG_VERSION"));

/// reqwest 用戶端包裝，附帶預設標頭
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_headers(HeaderMap::new())
    }

    pub fn with_headers(headers: HeaderMap) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    pub async fn head(&self, url: &str, timeout: Duration) -> Result<Response> {
        tracing::debug!("HEAD {}", url);
        Ok(self.client.head(url).timeout(timeout).send().await?)
    }

    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response> {
        tracing::debug!("GET {}", url);
        Ok(self.client.get(url).timeout(timeout).send().await?)
    }

    /// GET 並回傳去除空白的文字內容，非 2xx 視為錯誤
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.get(url, timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?.trim().to_string())
    }

    /// POST JSON，回傳 HTTP 狀態碼
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> Result<u16> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// 以 `{"text": message}` 格式 POST 到 webhook (Slack、Discord 等)
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: HttpClient,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let payload = serde_json::json!({ "text": message });
        let status = self.client.post_json(&self.url, &payload, WEBHOOK_TIMEOUT).await?;
        if !(200..300).contains(&status) {
            return Err(ToolError::HttpStatus {
                url: self.url.clone(),
                status,
            });
        }
        Ok(())
    }
}

pub fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ToolError::invalid_value("headers", name, e.to_string()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ToolError::invalid_value("headers", value, e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map() {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer abc".to_string());
        let map = header_map(&headers).unwrap();
        assert_eq!(map.get("authorization").unwrap(), "Bearer abc");
    }

    #[test]
    fn test_header_map_rejects_bad_names() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        assert!(header_map(&headers).is_err());
    }
}
