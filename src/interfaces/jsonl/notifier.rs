use crate::domain::chat::Outbound;
use crate::domain::ports::Notifier;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Hands outbound actions to the transport as JSON lines.
///
/// Each action is written and flushed as one line, so a relay reading the
/// other end never sees a partial message.
pub struct JsonLinesNotifier<W> {
    sink: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesNotifier<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Notifier for JsonLinesNotifier<W> {
    async fn deliver(&self, message: Outbound) -> Result<()> {
        let mut line = serde_json::to_vec(&message)
            .map_err(|e| BotError::TransportError(format!("cannot encode message: {e}")))?;
        line.push(b'\n');

        let mut sink = self.sink.lock().await;
        sink.write_all(&line)
            .await
            .map_err(|e| BotError::TransportError(e.to_string()))?;
        sink.flush()
            .await
            .map_err(|e| BotError::TransportError(e.to_string()))
    }
}
