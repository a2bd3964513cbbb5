use futures_core::Stream;
use futures_lite::{StreamExt, pin};
use reqwest::{RequestBuilder, header};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::{AuthMode, GeminiConfig, USER_AGENT},
    error::GeminiError,
    types::{GenerateContentRequest, GenerateContentResponse},
};

const MAX_CONNECT_ATTEMPTS: u32 = 3;

pub async fn call_generate(
    cfg: &GeminiConfig,
    model: &str,
    request: &GenerateContentRequest,
) -> Result<GenerateContentResponse, GeminiError> {
    post_json(cfg, cfg.model_endpoint(model, "generateContent"), request).await
}

/// Issues a `streamGenerateContent` call and yields every SSE payload as it arrives.
pub fn stream_generate(
    cfg: &GeminiConfig,
    model: &str,
    request: GenerateContentRequest,
) -> impl Stream<Item = Result<GenerateContentResponse, GeminiError>> + Send + 'static + use<>
{
    let endpoint = cfg.model_endpoint(model, "streamGenerateContent?alt=sse");
    let builder = authorize(cfg, cfg.http.post(endpoint))
        .header(header::ACCEPT, "text/event-stream")
        .json(&request);

    async_stream::stream! {
        let response = match send(builder).await {
            Ok(response) => response,
            Err(error) => {
                yield Err(error);
                return;
            }
        };

        let bytes = response.bytes_stream();
        pin!(bytes);
        let mut decoder = SseDecoder::default();
        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    yield Err(GeminiError::from(error));
                    return;
                }
            };
            for data in decoder.feed(&chunk) {
                yield parse_event(&data);
            }
        }
        if let Some(data) = decoder.finish() {
            yield parse_event(&data);
        }
    }
}

fn parse_event(data: &str) -> Result<GenerateContentResponse, GeminiError> {
    serde_json::from_str(data)
        .map_err(|err| GeminiError::Parse(format!("malformed stream event: {err}")))
}

fn authorize(cfg: &GeminiConfig, builder: RequestBuilder) -> RequestBuilder {
    let builder = builder.header(header::USER_AGENT, USER_AGENT);
    if cfg.auth == AuthMode::Header {
        builder.header("x-goog-api-key", cfg.api_key.as_str())
    } else {
        builder
    }
}

async fn send(builder: RequestBuilder) -> Result<reqwest::Response, GeminiError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(GeminiError::from_status(status.as_u16(), body))
    }
}

async fn post_json<S: Serialize + Sync>(
    cfg: &GeminiConfig,
    endpoint: String,
    body: &S,
) -> Result<GenerateContentResponse, GeminiError> {
    if tracing::enabled!(tracing::Level::TRACE) {
        if let Ok(json) = serde_json::to_string_pretty(body) {
            tracing::trace!(target: "gemsh_gemini::wire", "request body:\n{json}");
        }
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        let builder = authorize(cfg, cfg.http.post(endpoint.as_str())).json(body);

        match send(builder).await {
            Ok(response) => {
                let text = response.text().await?;
                tracing::trace!(target: "gemsh_gemini::wire", "response body:\n{text}");
                return Ok(serde_json::from_str(&text)?);
            }
            Err(GeminiError::Http(error))
                if error.is_connect() && attempt < MAX_CONNECT_ATTEMPTS =>
            {
                debug!("Gemini connect error, retrying attempt {attempt}: {error}");
                async_io::Timer::after(Duration::from_millis(200 * u64::from(attempt))).await;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Incremental decoder for `text/event-stream` bodies.
///
/// Only `data:` fields matter here; multi-line data is joined with `\n` and an event is
/// emitted at each blank line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feeds raw bytes, returning the payload of every event completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flushes a trailing event that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).into_owned();
            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.data.take()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take();
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
        // comments (":...") and other fields (event:, id:, retry:) are ignored
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"data: {\"a\"").is_empty());
        assert!(decoder.feed(b":1}\r\n").is_empty());
        assert_eq!(decoder.feed(b"\r\ndata: {\"a\":2}\n\n"), vec![
            "{\"a\":1}".to_string(),
            "{\"a\":2}".to_string()
        ]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn joins_multi_line_data_and_skips_comments() {
        let mut decoder = SseDecoder::default();
        let events =
            decoder.feed(b": keep-alive\nevent: message\ndata: line one\ndata: line two\n\n");
        assert_eq!(events, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
    }

    #[test]
    fn parse_event_reports_malformed_payloads() {
        assert!(matches!(parse_event("not json"), Err(GeminiError::Parse(_))));
        let parsed = parse_event(r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#)
            .unwrap();
        assert_eq!(parsed.text_chunks(), vec!["hi"]);
    }
}
