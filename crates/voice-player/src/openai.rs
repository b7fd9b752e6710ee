//! OpenAI client for the two remote steps of move recognition: speech to
//! text (Whisper) and move extraction from that text (chat completion).

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAiSettings;
use crate::error::GameError;

/// Hint passed to Whisper so it keeps chess coordinates verbatim.
const TRANSCRIPTION_PROMPT: &str =
    "В этом аудио может быть текст с шахматным ходом. Сохрани как есть.";

/// Instructions for pulling a single coordinate move out of free text.
const EXTRACTION_PROMPT: &str = "Ты — ассистент, который умеет извлекать из текста только шахматный ход. \
При этом учитывай русские буквы и их соответствие английским в ходах: \
А = a, Э = a, Б = b, С = c, Ц = c, Д = d, И = e, Е = e, Ф = f, Ж = g, Ш = h, Ч = h, Щ = h. \
Ответ должен быть строго в формате хода, например e2e4. \
Никакого другого текста, только сам ход с правильно преобразованными буквами. \
Если нет хода, то ответ пустой. То есть строго формат e2e4, или пустой ответ.";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    client: Client,
    settings: OpenAiSettings,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> Result<Self, GameError> {
        let client = Client::builder()
            .user_agent("VoicePlayer/1.0")
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Transcribe a WAV recording to text.
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String, GameError> {
        let file = Part::bytes(wav)
            .file_name("move.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .text("model", self.settings.transcription_model.clone())
            .text("prompt", TRANSCRIPTION_PROMPT)
            .part("file", file);

        let resp = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.settings.api_key)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: TranscriptionResponse = resp.json().await?;
        debug!(text = %body.text, "Transcribed");
        Ok(body.text)
    }

    /// Ask the chat model for the move contained in `text`. Returns the
    /// reply lowercased and trimmed; empty when the model found no move.
    pub async fn extract_move(&self, text: &str) -> Result<String, GameError> {
        let request = ChatRequest {
            model: &self.settings.extraction_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: EXTRACTION_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let resp = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = resp.json().await?;
        Ok(first_reply(body))
    }
}

fn first_reply(body: ChatResponse) -> String {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default()
}
