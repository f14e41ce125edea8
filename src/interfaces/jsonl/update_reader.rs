use crate::domain::chat::Update;
use crate::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Reads updates from a JSON-lines source, one update per line.
///
/// Blank lines are skipped. A line that does not decode yields an error for
/// that line only; the next call continues with the following line.
pub struct UpdateReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> UpdateReader<R> {
    /// Creates a new `UpdateReader` from any buffered async source (e.g. stdin, a file).
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
        }
    }

    /// Returns the next update, or `None` once the source is exhausted.
    pub async fn next_update(&mut self) -> Option<Result<Update>> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => return Some(Err(e.into())),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(Into::into));
        }
    }
}
