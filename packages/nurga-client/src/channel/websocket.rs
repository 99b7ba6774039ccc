// WebSocket real-time transport
//
// Connects to {ws|wss}://<base>/ws/<task_id>?api_key=<credential> and yields
// every text frame as-is. Expected frame format:
// {
//   "state": "PROGRESS",        // PROGRESS | SUCCESS | FAILURE | PENDING | CONNECTED | ERROR
//   "progress": 40,             // optional
//   "step": "Transcribing...",  // optional
//   "result": { ... },          // SUCCESS only
//   "error": "..."              // FAILURE only
// }

use super::transport::{FrameStream, RealtimeConnector};
use super::types::TaskHandle;
use crate::config::{redact, ClientConfig};
use crate::error::{ChannelError, ChannelResult};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Url;
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub struct WebSocketConnector {
    config: ClientConfig,
}

impl WebSocketConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn url_for(&self, handle: &TaskHandle) -> ChannelResult<Url> {
        let mut url = self.config.websocket_url(&["ws", handle.task_id()])?;
        url.query_pairs_mut()
            .append_pair("api_key", handle.credential());
        Ok(url)
    }
}

#[async_trait]
impl RealtimeConnector for WebSocketConnector {
    async fn connect(&self, handle: &TaskHandle) -> ChannelResult<FrameStream> {
        let url = self.url_for(handle)?;
        log::info!("Connecting to WebSocket: {}", redact(&url));

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ChannelError::WebSocket(format!("Connection failed: {}", e)))?;

        log::info!("WebSocket connected successfully");

        let frames = ws_stream.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => Some(Ok(text)),
                    Err(_) => {
                        log::warn!("Received non UTF-8 binary WebSocket message, ignoring");
                        None
                    }
                },
                Ok(Message::Close(frame)) => {
                    log::info!("WebSocket closed by server: {:?}", frame);
                    None
                }
                // Ping/Pong are answered by the library
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => None,
                Err(e) => Some(Err(ChannelError::WebSocket(e.to_string()))),
            }
        });

        Ok(frames.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_carries_task_and_credential() {
        let connector = WebSocketConnector::new(ClientConfig::new("https://api.example.com", ""));
        let handle = TaskHandle::new("4f1c-9a", "key with spaces&more");
        let url = connector.url_for(&handle).unwrap();

        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/ws/4f1c-9a");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("api_key".to_string(), "key with spaces&more".to_string())]
        );
    }

    #[tokio::test]
    async fn test_connect_refused_is_an_error() {
        // Port 9 (discard) on localhost is essentially never listening
        let connector = WebSocketConnector::new(ClientConfig::new("http://127.0.0.1:9", "k"));
        let result = connector.connect(&TaskHandle::new("t1", "k")).await;
        assert!(matches!(result, Err(ChannelError::WebSocket(_))));
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_config_error() {
        let connector = WebSocketConnector::new(ClientConfig::new("", "k"));
        let result = connector.connect(&TaskHandle::new("t1", "k")).await;
        assert!(matches!(result, Err(ChannelError::Config(_))));
    }
}
