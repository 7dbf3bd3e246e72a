//! Meeting analysis through an OpenAI-compatible chat completions API.
//!
//! All meetings of a run go into a single prompt together with the last
//! week's feedback, and the model answers with one coaching report. A
//! failed call still produces an [`AnalysisResult`] whose feedback carries
//! the error, so every run leaves a report behind.

use std::path::Path;

use chrono::NaiveDate;
use meetcoach_core::{Document, rule};
use meetcoach_notes::{HttpRequest, HttpTransport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Coaching brief used when no custom prompt file exists.
pub const DEFAULT_PROMPT: &str = "\
You are an executive coach reviewing how effective and productive a day of meetings was.

Focus on these key areas:
1. **Meeting Effectiveness** - Was each meeting necessary? Did it reach its goals?
2. **Cost & Time** - Given who attended, was this a good use of everyone's time?
3. **Strategic Thinking** - Long-term planning, risk assessment, and business impact
4. **Action Items** - Clear outcomes, decisions, and next steps
5. **Communication** - Clarity, influence, and stakeholder management
6. **Areas for Improvement** - Specific, actionable suggestions";

const SYSTEM_PROMPT: &str =
    "You are an expert executive coach specializing in engineering leadership development.";

const GUIDELINES: &str = "\
Guidelines:
- Exclude non-professional meetings (doctor's appointments, personal calls, etc.)
- Skip meetings without useful content
- Be specific and quote examples
- Focus on actionable improvements
- Don't force insights when there is not enough information";

const RESPONSE_SECTIONS: &str = "\
Provide comprehensive feedback with:
- STRENGTHS (what went well)
- AREAS FOR IMPROVEMENT (specific suggestions)
- ACTION ITEMS (what to do next)
- OVERALL ASSESSMENT (summary)";

/// Feedback recorded when a run has nothing to analyze.
pub const NO_MEETINGS_FEEDBACK: &str = "No meetings to analyze.";

/// Resolved analysis settings.
#[derive(Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// How the person being coached is addressed.
    pub name: String,
    /// Who usually attends, free text. May be empty.
    pub people: String,
}

impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("name", &self.name)
            .field("people", &self.people)
            .finish()
    }
}

/// Outcome of one analysis, also written to the JSON report log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One-line description of what was analyzed.
    pub summary: String,
    /// The coaching feedback, or the failure message.
    pub feedback: String,
    /// Day of the analysis, `YYYY-MM-DD`.
    pub date: String,
    /// Number of meetings in the prompt.
    #[serde(default)]
    pub num_meetings: usize,
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
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Turns meeting transcripts into coaching feedback.
pub struct MeetingAnalyzer<T: HttpTransport> {
    transport: T,
    config: AnalyzerConfig,
    custom_prompt: Option<String>,
}

impl<T: HttpTransport> MeetingAnalyzer<T> {
    /// Creates an analyzer that uses [`DEFAULT_PROMPT`].
    pub fn new(transport: T, config: AnalyzerConfig) -> Self {
        Self {
            transport,
            config,
            custom_prompt: None,
        }
    }

    /// Builder method to replace the default coaching brief.
    #[must_use]
    pub fn with_custom_prompt(mut self, prompt: Option<String>) -> Self {
        self.custom_prompt = prompt;
        self
    }

    /// Returns the coaching brief in use.
    pub fn base_prompt(&self) -> &str {
        self.custom_prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
    }

    /// Builds the full prompt for `meetings`.
    pub fn build_prompt(&self, meetings: &[Document], previous_feedback: Option<&str>) -> String {
        let mut context = Vec::new();
        if !self.config.people.is_empty() {
            context.push(format!("People involved: {}", self.config.people));
        }
        if let Some(previous) = previous_feedback {
            context.push(format!("Previous feedback for context:\n{}", previous));
        }

        let banner = rule('=');
        let mut meetings_text = String::new();
        for meeting in meetings {
            meetings_text.push_str(&format!(
                "\n{banner}\nMeeting: {}\nDate: {}\n{banner}\n{}\n\n",
                meeting.display_title(),
                meeting.created_at.as_deref().unwrap_or("Unknown date"),
                meeting.transcript_text(),
            ));
        }

        format!(
            "{}\n\n{}\n\nAnalyze these meetings and give {} actionable feedback.\n\n{}\n\n\
             MEETINGS:\n{}\n{}",
            self.base_prompt(),
            context.join("\n\n"),
            self.config.name,
            GUIDELINES,
            meetings_text,
            RESPONSE_SECTIONS,
        )
    }

    /// Analyzes `meetings`.
    ///
    /// Never fails: an API error becomes the feedback text. An empty list
    /// returns without calling the API.
    pub async fn analyze(
        &self,
        meetings: &[Document],
        previous_feedback: Option<&str>,
        today: NaiveDate,
    ) -> AnalysisResult {
        let date = today.format("%Y-%m-%d").to_string();
        let num_meetings = meetings.len();

        if meetings.is_empty() {
            return AnalysisResult {
                summary: "No meetings found in the specified date range.".to_string(),
                feedback: NO_MEETINGS_FEEDBACK.to_string(),
                date,
                num_meetings,
            };
        }

        let prompt = self.build_prompt(meetings, previous_feedback);
        info!(
            meetings = num_meetings,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "requesting analysis"
        );

        match self.complete(&prompt).await {
            Ok(feedback) => AnalysisResult {
                summary: format!("Analyzed {} meetings", num_meetings),
                feedback,
                date,
                num_meetings,
            },
            Err(e) => {
                warn!(error = %e, "analysis failed");
                let reason = match e {
                    ClientError::Analysis(message) => message,
                    other => other.to_string(),
                };
                AnalysisResult {
                    summary: format!("Failed to analyze {} meetings", num_meetings),
                    feedback: format!("Analysis failed: {}", reason),
                    date,
                    num_meetings,
                }
            }
        }
    }

    async fn complete(&self, prompt: &str) -> ClientResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| ClientError::Analysis(format!("failed to encode request: {}", e)))?;

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .transport
            .send(HttpRequest::post(url, body).with_bearer(&self.config.api_key))
            .await
            .map_err(|e| ClientError::Analysis(e.to_string()))?;

        if !response.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&response.body)
                .map(|r| r.error.message)
                .unwrap_or(response.body);
            return Err(ClientError::Analysis(format!(
                "API error ({}): {}",
                response.status, message
            )));
        }

        let chat: ChatResponse = serde_json::from_str(&response.body)
            .map_err(|e| ClientError::Analysis(format!("invalid response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::Analysis("no choices in response".to_string()))?;

        debug!(chars = content.len(), "received analysis");
        Ok(content)
    }
}

/// Reads a custom coaching brief.
///
/// Returns `None` when the file is missing or blank. Other read errors are
/// logged and also fall back to the default brief.
pub fn load_custom_prompt(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let content = content.trim();
            if content.is_empty() {
                None
            } else {
                info!(path = %path.display(), "using custom prompt");
                Some(content.to_string())
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not load custom prompt");
            None
        }
    }
}

/// Renders `result` as the plain-text report.
pub fn format_report(result: &AnalysisResult) -> String {
    let banner = rule('=');
    [
        banner.clone(),
        format!("DAILY MEETING FEEDBACK - {}", result.date),
        banner.clone(),
        String::new(),
        format!("Summary: {}", result.summary),
        String::new(),
        banner.clone(),
        String::new(),
        result.feedback.clone(),
        String::new(),
        banner,
    ]
    .join("\n")
}
