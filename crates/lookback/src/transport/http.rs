//! reqwest-backed transport against the archive backend.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use tracing::debug;

use super::{SourceHandle, StreamTransport};
use crate::error::PlayerError;
use lookconf::BackendConfig;
use lookproto::{Camera, CameraList, ErrorBody, StreamQuery, CAMERAS_PATH, STOP_PATH};

/// HTTP client for the archive backend.
pub struct HttpTransport {
    base_url: String,
    client: Client,
    stop_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &BackendConfig) -> Result<Self, PlayerError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| PlayerError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            stop_timeout: Duration::from_secs(config.stop_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a failed response to `Server` when the body carries a usable
    /// message, `Network` otherwise.
    async fn response_error(response: reqwest::Response) -> PlayerError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message);
        match message {
            Some(message) => PlayerError::Server(message),
            None => PlayerError::Network(format!("backend returned {status}")),
        }
    }

    fn request_error(e: reqwest::Error) -> PlayerError {
        PlayerError::Network(e.to_string())
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn open_stream(&self, query: &StreamQuery) -> Result<SourceHandle, PlayerError> {
        let url = query.url(&self.base_url);
        debug!(%url, "opening archive stream");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::request_error)?;

        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let stream = response
            .bytes_stream()
            .map_err(|e| PlayerError::Network(e.to_string()));

        Ok(SourceHandle::new(url, content_type, Box::pin(stream)))
    }

    async fn stop_stream(&self) -> Result<(), PlayerError> {
        let response = self
            .client
            .post(self.endpoint(STOP_PATH))
            .json(&serde_json::json!({}))
            .timeout(self.stop_timeout)
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        debug!(%status, "stream stop acknowledged");
        if !status.is_success() {
            return Err(PlayerError::Network(format!("stop returned {status}")));
        }
        Ok(())
    }

    async fn list_cameras(&self) -> Result<Vec<Camera>, PlayerError> {
        let response = self
            .client
            .get(self.endpoint(CAMERAS_PATH))
            .send()
            .await
            .map_err(Self::request_error)?;

        if !response.status().is_success() {
            return Err(Self::response_error(response).await);
        }

        let list: CameraList = response
            .json()
            .await
            .map_err(|e| PlayerError::Network(format!("invalid camera listing: {e}")))?;
        Ok(list.cameras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use lookproto::PlaybackRate;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> HttpTransport {
        HttpTransport::new(&BackendConfig {
            base_url: server.uri(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    fn t(s: &str) -> chrono::NaiveDateTime {
        lookproto::timefmt::parse_wire(s).unwrap()
    }

    #[tokio::test]
    async fn open_stream_hands_back_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/video/stream"))
            .and(query_param("start_time", "2024-01-01 09:00:00"))
            .and(query_param("video_dir", "/data/cam1"))
            .and(query_param("playback_rate", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(vec![7u8; 2048]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let query = StreamQuery::new("/data/cam1", t("2024-01-01 09:00:00"), PlaybackRate::Normal);
        let source = transport.open_stream(&query).await.unwrap();
        assert_eq!(source.content_type(), Some("video/mp4"));

        let mut stream = source.into_stream();
        let mut total = 0;
        while let Some(chunk) = stream.next().await {
            total += chunk.unwrap().len();
        }
        assert_eq!(total, 2048);
    }

    #[tokio::test]
    async fn failure_body_message_becomes_a_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/video/stream"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "NO_VIDEO",
                "message": "no footage for that window",
            })))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let query = StreamQuery::new("/data/cam1", t("2024-01-01 09:00:00"), PlaybackRate::Normal);
        let err = transport.open_stream(&query).await.unwrap_err();
        assert_eq!(
            err,
            PlayerError::Server("no footage for that window".to_string())
        );
    }

    #[tokio::test]
    async fn bare_failures_become_network_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/video/stream"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let query = StreamQuery::new("/data/cam1", t("2024-01-01 09:00:00"), PlaybackRate::Normal);
        match transport.open_stream(&query).await.unwrap_err() {
            PlayerError::Network(detail) => assert!(detail.contains("502")),
            other => panic!("expected a network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stop_posts_an_empty_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/video/stop"))
            .and(body_json(serde_json::json!({})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        transport.stop_stream().await.unwrap();
    }

    #[tokio::test]
    async fn lists_cameras() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cameras"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cameras": [
                    {"id": 1, "name": "front door", "video_dir": "/CCTV/cam_a"},
                    {"id": 2, "name": "garage", "video_dir": "/CCTV/cam_b"},
                ]
            })))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let cameras = transport.list_cameras().await.unwrap();
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[1].name, "garage");
    }
}
