//! TCP protocol for coach-server ↔ presentation-client communication.
//!
//! Frames are length-delimited JSON so that web, desktop and overlay
//! clients consume the same AnalysisResult shape.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::analyzer::AnalysisResult;

// --- Message types ---

/// Server → Client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Per-tick analysis update
    Update {
        timestamp_ms: u64,
        result: AnalysisResult,
    },
    /// Sent when the session ends
    SessionSummary {
        exercise: String,
        total_reps: u32,
    },
}

/// Client → Server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Hello,
    /// Reset the rep counter without restarting the process
    RestartSession,
}

// --- TCP codec helpers ---

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(64 * 1024) // 64KB
        .new_codec();
    Framed::new(stream, codec)
}

/// Send a serializable message (JSON + length prefix).
pub async fn send_message<T: Serialize>(stream: &mut MessageStream, msg: &T) -> anyhow::Result<()> {
    let data = serde_json::to_vec(msg)?;
    stream.send(Bytes::from(data)).await?;
    Ok(())
}

/// Receive and deserialize a message.
pub async fn recv_message<T: DeserializeOwned>(stream: &mut MessageStream) -> anyhow::Result<T> {
    match stream.next().await {
        Some(Ok(bytes)) => Ok(serde_json::from_slice(&bytes)?),
        Some(Err(e)) => Err(e.into()),
        None => Err(anyhow::anyhow!("connection closed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_json_shape() {
        let msg = ServerMessage::Update {
            timestamp_ms: 1234,
            result: AnalysisResult {
                exercise: "Jumping Jacks".to_string(),
                feedback: vec!["Good rep!".to_string()],
                rep_count: 5,
                new_rep: true,
            },
        };

        let json = serde_json::to_string(&msg).unwrap();
        // プレゼンテーション層が期待するcamelCaseのキー
        assert!(json.contains("\"repCount\":5"));
        assert!(json.contains("\"newRep\":true"));
        assert!(json.contains("\"feedback\":[\"Good rep!\"]"));
    }

    #[test]
    fn test_client_message_roundtrip() {
        let json = serde_json::to_string(&ClientMessage::RestartSession).unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClientMessage::RestartSession);
    }
}
