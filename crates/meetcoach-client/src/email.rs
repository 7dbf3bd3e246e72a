//! Report delivery through the Resend email API.
//!
//! Reports go out as HTML with the plain text as fallback. The HTML is a
//! line-by-line rendering of the text report: rules become `<hr>`, known
//! section headings become headings, list items are indented.

use meetcoach_core::html_escape;
use meetcoach_notes::{HttpRequest, HttpTransport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

const SECTION_HEADINGS: &[&str] = &[
    "STRENGTHS",
    "AREAS FOR IMPROVEMENT",
    "ACTION ITEMS",
    "OVERALL ASSESSMENT",
];

const TEST_SUBJECT: &str = "Test Email - Meeting Coach";

const TEST_MESSAGE: &str = "\
This is a test email from your meeting coach.

If you received this email, your email configuration is working.

You can now run the analyzer to receive daily meeting reports.
";

/// Resolved email settings.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Base URL, without trailing slash.
    pub base_url: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Sends reports by email.
pub struct EmailSender<T: HttpTransport> {
    transport: T,
    config: EmailConfig,
}

impl<T: HttpTransport> EmailSender<T> {
    /// Creates a sender.
    pub fn new(transport: T, config: EmailConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the recipient address.
    pub fn recipient(&self) -> &str {
        &self.config.to
    }

    /// Sends `report` for the given date range. Returns the message id.
    pub async fn send_report(&self, report: &str, range_label: &str) -> ClientResult<String> {
        let subject = report_subject(range_label);
        let html = render_html(report);
        self.send(OutgoingEmail {
            from: &self.config.from,
            to: [&self.config.to],
            subject: &subject,
            html: Some(&html),
            text: report,
        })
        .await
    }

    /// Sends a fixed plain-text message to check the configuration.
    pub async fn send_test(&self) -> ClientResult<String> {
        self.send(OutgoingEmail {
            from: &self.config.from,
            to: [&self.config.to],
            subject: TEST_SUBJECT,
            html: None,
            text: TEST_MESSAGE,
        })
        .await
    }

    async fn send(&self, email: OutgoingEmail<'_>) -> ClientResult<String> {
        let body = serde_json::to_value(&email)
            .map_err(|e| ClientError::Delivery(format!("failed to encode email: {}", e)))?;
        let url = format!("{}/emails", self.config.base_url);

        debug!(to = %self.config.to, subject = email.subject, "sending email");
        let response = self
            .transport
            .send(HttpRequest::post(url, body).with_bearer(&self.config.api_key))
            .await
            .map_err(|e| ClientError::Delivery(e.to_string()))?;

        if !response.is_success() {
            return Err(ClientError::Delivery(format!(
                "email API returned {}: {}",
                response.status,
                response.body.trim()
            )));
        }

        let id = serde_json::from_str::<SendResponse>(&response.body)
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_else(|| "unknown".to_string());
        info!(id = %id, "email sent");
        Ok(id)
    }
}

/// Subject line for a report covering `range_label`.
pub fn report_subject(range_label: &str) -> String {
    format!("Meeting Coaching Report - {}", range_label)
}

/// Renders a text report as a standalone HTML document.
pub fn render_html(report: &str) -> String {
    let escaped = html_escape(report);
    let body: Vec<String> = escaped.split('\n').map(render_line).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Meeting Coaching Report</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; background-color: #f9fafb; color: #111827;">
    <div style="background-color: white; padding: 30px; border-radius: 8px;">
{}
    </div>
    <div style="text-align: center; margin-top: 20px; color: #6b7280; font-size: 12px;">
        <p>Generated automatically by meetcoach</p>
    </div>
</body>
</html>
"#,
        body.join("\n")
    )
}

fn render_line(line: &str) -> String {
    let trimmed = line.trim();

    if line.contains(&"=".repeat(40)) {
        r#"<hr style="border: 2px solid #333; margin: 20px 0;">"#.to_string()
    } else if line.contains(&"-".repeat(40)) {
        r#"<hr style="border: 1px solid #666; margin: 15px 0;">"#.to_string()
    } else if trimmed.starts_with("Meeting: ") {
        format!(r#"<h3 style="color: #1e40af; margin-top: 15px;">{}</h3>"#, trimmed)
    } else if is_section_heading(trimmed) {
        format!(r#"<h2 style="color: #2563eb; margin-top: 20px;">{}</h2>"#, trimmed)
    } else if trimmed.starts_with("DAILY MEETING FEEDBACK") {
        format!(r#"<h1 style="color: #1e3a8a;">{}</h1>"#, trimmed)
    } else if is_list_item(trimmed) {
        format!(r#"<p style="margin-left: 20px; line-height: 1.6;">{}</p>"#, trimmed)
    } else if !trimmed.is_empty() {
        format!(r#"<p style="line-height: 1.6;">{}</p>"#, trimmed)
    } else {
        "<br>".to_string()
    }
}

fn is_section_heading(line: &str) -> bool {
    let line = line.trim_start_matches(['#', '*', ' ']);
    SECTION_HEADINGS.iter().any(|h| line.starts_with(h))
}

fn is_list_item(line: &str) -> bool {
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("• ") {
        return true;
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with('.')
}
