use futures_core::Stream;
use futures_lite::{StreamExt, pin};
use gemsh_core::{
    LanguageModel,
    llm::{LLMRequest, LLMResponse, Message, Profile, Role, TextStream, model::Parameters},
};
use tracing::debug;

use crate::{
    client::{call_generate, stream_generate},
    config::GeminiBackend,
    error::GeminiError,
    types::{GeminiContent, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part},
};

impl LanguageModel for GeminiBackend {
    type Error = GeminiError;

    fn respond(&self, request: LLMRequest) -> impl LLMResponse<Error = Self::Error> {
        let cfg = self.config();
        let model = cfg.model_for(request.has_images()).to_string();
        let request = build_request(request);
        debug!(%model, "streaming Gemini request");

        let stream = stream_fragments(stream_generate(&cfg, &model, request));
        TextStream::new(stream)
    }

    fn complete(
        &self,
        request: LLMRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        let cfg = self.config();
        async move {
            let model = cfg.model_for(request.has_images()).to_string();
            let request = build_request(request);
            debug!(%model, "blocking Gemini request");
            let response = call_generate(&cfg, &model, &request).await?;
            response_text(&response)
        }
    }

    fn profile(&self) -> impl Future<Output = Profile> + Send {
        let name = self.text_model().to_string();
        async move { Profile::new(name, "google", "Gemini Developer API model") }
    }
}

/// Extracts visible text from one response, turning a blocked prompt into an error.
fn response_fragments(response: &GenerateContentResponse) -> Result<Vec<String>, GeminiError> {
    if let Some(reason) = response.block_reason() {
        return Err(GeminiError::Api(format!("prompt blocked by Gemini: {reason}")));
    }
    if let Some(candidate) = response.primary_candidate() {
        if let Some(reason) = &candidate.finish_reason {
            debug!(finish_reason = %reason, "Gemini candidate finished");
        }
    }
    Ok(response.text_chunks())
}

/// Full answer of a `generateContent` response. A response without a candidate or content
/// is an error, never an empty answer.
fn response_text(response: &GenerateContentResponse) -> Result<String, GeminiError> {
    let fragments = response_fragments(response)?;
    let Some(candidate) = response.primary_candidate() else {
        return Err(missing_candidate());
    };
    if candidate.content.is_none() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(GeminiError::Api(format!(
            "Gemini response missing content (finish reason: {reason})"
        )));
    }
    Ok(fragments.concat())
}

/// Flattens SSE events into text fragments. The stream stops at the first error and fails
/// when it ends without any text.
fn stream_fragments<S>(events: S) -> impl Stream<Item = Result<String, GeminiError>> + Send
where
    S: Stream<Item = Result<GenerateContentResponse, GeminiError>> + Send,
{
    async_stream::stream! {
        pin!(events);
        let mut produced = false;
        while let Some(event) = events.next().await {
            match event.and_then(|response| response_fragments(&response)) {
                Ok(texts) => {
                    for text in texts.into_iter().filter(|text| !text.is_empty()) {
                        produced = true;
                        yield Ok(text);
                    }
                }
                Err(error) => {
                    yield Err(error);
                    return;
                }
            }
        }
        if !produced {
            yield Err(missing_candidate());
        }
    }
}

fn missing_candidate() -> GeminiError {
    GeminiError::Api("Gemini response missing candidate".into())
}

fn build_request(request: LLMRequest) -> GenerateContentRequest {
    let (messages, parameters) = request.into_parts();
    let (system_instruction, contents) = messages_to_gemini(&messages);
    GenerateContentRequest {
        system_instruction,
        contents,
        generation_config: build_generation_config(&parameters),
    }
}

fn messages_to_gemini(messages: &[Message]) -> (Option<GeminiContent>, Vec<GeminiContent>) {
    let mut system = String::new();
    let mut contents = Vec::new();
    for message in messages {
        match message.role() {
            Role::System => {
                if !system.is_empty() {
                    system.push_str("\n\n");
                }
                system.push_str(message.content());
            }
            Role::User => {
                let mut parts = vec![Part::text(message.content())];
                for image in message.images() {
                    parts.push(Part::inline_media(image.mime_type(), image.data()));
                }
                contents.push(GeminiContent::with_parts("user", parts));
            }
            Role::Assistant => contents.push(GeminiContent::text("model", message.content())),
        }
    }

    let system_instruction = if system.is_empty() {
        None
    } else {
        Some(GeminiContent::text("user", system))
    };
    (system_instruction, contents)
}

fn build_generation_config(parameters: &Parameters) -> Option<GenerationConfig> {
    let config = GenerationConfig {
        temperature: parameters.temperature,
        top_p: parameters.top_p,
        top_k: parameters.top_k,
        max_output_tokens: parameters.max_tokens,
    };
    if config.is_meaningful() {
        Some(config)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use gemsh_core::{Image, llm::oneshot};
    use serde_json::json;

    use super::*;

    #[test]
    fn system_messages_become_system_instruction() {
        let request = oneshot("be terse", "what is ls").with_parameters(
            Parameters::default().temperature(0.7).max_tokens(256),
        );
        let value = serde_json::to_value(build_request(request)).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "what is ls");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 256);
        assert!(value["generationConfig"]["temperature"].as_f64().is_some());
    }

    #[test]
    fn images_become_inline_data_parts() {
        let request = LLMRequest::new(vec![
            Message::user("describe").with_image(Image::new("image/webp", b"hi".to_vec())),
        ]);
        let value = serde_json::to_value(build_request(request)).unwrap();
        assert_eq!(
            value["contents"][0]["parts"][1],
            json!({"inlineData": {"mimeType": "image/webp", "data": "aGk="}})
        );
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn blocked_prompts_are_errors() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        let err = response_fragments(&response).unwrap_err();
        assert_eq!(err.to_string(), "prompt blocked by Gemini: SAFETY");
    }

    #[test]
    fn responses_without_candidates_are_errors() {
        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        let err = response_text(&empty).unwrap_err();
        assert_eq!(err.to_string(), "Gemini response missing candidate");

        let filtered: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        let err = response_text(&filtered).unwrap_err();
        assert_eq!(err.to_string(), "Gemini response missing content (finish reason: SAFETY)");

        let answered: GenerateContentResponse = serde_json::from_value(
            json!({"candidates": [{"content": {"parts": [{"text": "ls "}, {"text": "-la"}]}}]}),
        )
        .unwrap();
        assert_eq!(response_text(&answered).unwrap(), "ls -la");
    }

    fn event(value: serde_json::Value) -> Result<GenerateContentResponse, GeminiError> {
        Ok(serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn stream_without_text_ends_with_an_error() {
        let events = futures_lite::stream::iter(vec![
            event(json!({"candidates": []})),
            event(json!({"candidates": [{"finishReason": "SAFETY"}]})),
        ]);
        let stream = stream_fragments(events);
        pin!(stream);

        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Gemini response missing candidate");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_with_text_ends_cleanly() {
        let events = futures_lite::stream::iter(vec![
            event(json!({"candidates": [{"content": {"parts": [{"text": "hello "}]}}]})),
            event(json!({"candidates": [{"content": {"parts": [{"text": "world"}]},
                "finishReason": "STOP"}]})),
        ]);
        let stream = stream_fragments(events);
        pin!(stream);

        let mut fragments = Vec::new();
        while let Some(fragment) = stream.next().await {
            fragments.push(fragment.unwrap());
        }
        assert_eq!(fragments, vec!["hello ", "world"]);
    }

    #[tokio::test]
    async fn profile_reports_text_model() {
        let backend = GeminiBackend::new("key").with_text_model("gemini-2.5-flash");
        let profile = backend.profile().await;
        assert_eq!(profile.name, "gemini-2.5-flash");
        assert_eq!(profile.author, "google");
    }
}
