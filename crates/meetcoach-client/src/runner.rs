//! End-to-end analysis run.
//!
//! One run fetches the meetings in a date range, analyzes them in a single
//! call, stores the feedback and a report log, optionally emails the report,
//! and finally records every analyzed document in the ledger. Only failures
//! to reach the notes service abort a run; analysis, storage, and email
//! problems are logged and the run carries on.

use chrono::NaiveDateTime;
use meetcoach_core::{DateRange, Document};
use meetcoach_notes::{CredentialStore, FetchOptions, HttpTransport, NotesClient, ReqwestTransport};
use tracing::{info, warn};

use crate::analyzer::{MeetingAnalyzer, format_report, load_custom_prompt};
use crate::config::ClientConfig;
use crate::email::EmailSender;
use crate::error::ClientResult;
use crate::feedback::FeedbackStore;
use crate::ledger::Ledger;
use crate::report::ReportLog;

/// What to analyze.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Window of meeting creation times.
    pub range: DateRange,
    /// Skip documents already in the ledger.
    pub new_only: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to analyze in the range.
    NoMeetings,
    /// A report was produced.
    Analyzed {
        /// Number of meetings analyzed.
        meetings: usize,
        /// The plain-text report.
        report: String,
        /// Message id, if the report was emailed.
        email_id: Option<String>,
    },
}

/// Wires the notes client, analyzer, stores, and email sender together.
pub struct Runner<T: HttpTransport> {
    notes: NotesClient<T>,
    analyzer: MeetingAnalyzer<T>,
    email: Option<EmailSender<T>>,
    ledger: Ledger,
    feedback: FeedbackStore,
    reports: ReportLog,
    fetch_options: FetchOptions,
}

impl Runner<ReqwestTransport> {
    /// Builds a runner from configuration.
    ///
    /// Email settings are only resolved when `send_email` is true, so a
    /// `--no-email` run works without them.
    pub fn from_config(config: &ClientConfig, send_email: bool) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config.notes.timeout())?;

        let store = CredentialStore::new(config.notes.credentials_path());
        let notes = NotesClient::connect(transport.clone(), store, config.notes.endpoints()?)?;

        let custom_prompt = load_custom_prompt(&config.analysis.prompt_file());
        let analyzer = MeetingAnalyzer::new(transport.clone(), config.analysis.resolve()?)
            .with_custom_prompt(custom_prompt);

        let email = if send_email {
            Some(EmailSender::new(transport, config.email.resolve()?))
        } else {
            None
        };

        Ok(Self::new(
            notes,
            analyzer,
            Ledger::load(config.storage.state_file()),
            FeedbackStore::new(config.storage.feedback_dir()),
            ReportLog::new(config.storage.logs_dir()),
        )
        .with_email(email)
        .with_fetch_options(config.notes.fetch_options()))
    }
}

impl<T: HttpTransport> Runner<T> {
    /// Creates a runner that does not send email.
    pub fn new(
        notes: NotesClient<T>,
        analyzer: MeetingAnalyzer<T>,
        ledger: Ledger,
        feedback: FeedbackStore,
        reports: ReportLog,
    ) -> Self {
        Self {
            notes,
            analyzer,
            email: None,
            ledger,
            feedback,
            reports,
            fetch_options: FetchOptions::default(),
        }
    }

    /// Builder method to set the email sender.
    #[must_use]
    pub fn with_email(mut self, email: Option<EmailSender<T>>) -> Self {
        self.email = email;
        self
    }

    /// Builder method to set pagination options.
    #[must_use]
    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.fetch_options = options;
        self
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Runs one analysis. `now` is local wall-clock time.
    pub async fn run(&mut self, options: &RunOptions, now: NaiveDateTime) -> ClientResult<RunOutcome> {
        println!("Analyzing meetings for: {}", options.range.label);

        let meetings = self
            .notes
            .fetch_meetings(&options.range, &self.fetch_options)
            .await?;
        let meetings = if options.new_only {
            self.drop_processed(meetings)
        } else {
            meetings
        };

        if meetings.is_empty() {
            println!("No meetings found. Nothing to analyze.");
            return Ok(RunOutcome::NoMeetings);
        }
        println!("Found {} meetings to analyze", meetings.len());

        let today = now.date();
        let previous = self.feedback.load_previous(today);
        if previous.is_some() {
            println!("Loaded previous feedback for context");
        }

        let result = self
            .analyzer
            .analyze(&meetings, previous.as_deref(), today)
            .await;
        let report = format_report(&result);

        match self.feedback.save(&result.feedback, now) {
            Ok(saved) => {
                if let Some(backup) = saved.backup {
                    println!("Previous feedback backed up to: {}", backup.display());
                }
                println!("Feedback saved to: {}", saved.path.display());
            }
            Err(e) => warn!(dir = %self.feedback.dir().display(), error = %e, "failed to save feedback"),
        }

        match self.reports.save(&report, &options.range.label, &result, now) {
            Ok(saved) => {
                println!("Report saved to: {}", saved.text.display());
                println!("JSON data saved to: {}", saved.json.display());
            }
            Err(e) => warn!(dir = %self.reports.dir().display(), error = %e, "failed to save report log"),
        }

        println!("\n{}", report);

        let email_id = match self.email {
            Some(ref sender) => match sender.send_report(&report, &options.range.label).await {
                Ok(id) => {
                    println!("Email sent to {} (id: {})", sender.recipient(), id);
                    Some(id)
                }
                Err(e) => {
                    warn!(error = %e, "failed to send report email");
                    println!("Failed to send email. The report was still saved locally.");
                    None
                }
            },
            None => None,
        };

        for meeting in &meetings {
            self.ledger.mark_processed(&meeting.id);
        }
        info!(count = meetings.len(), "marked meetings as processed");

        Ok(RunOutcome::Analyzed {
            meetings: meetings.len(),
            report,
            email_id,
        })
    }

    fn drop_processed(&self, meetings: Vec<Document>) -> Vec<Document> {
        let total = meetings.len();
        let fresh: Vec<Document> = meetings
            .into_iter()
            .filter(|m| !self.ledger.is_processed(&m.id))
            .collect();
        let filtered = total - fresh.len();
        if filtered > 0 {
            info!(filtered, "skipping already-processed meetings");
            println!("Filtered out {} already-processed meetings", filtered);
        }
        fresh
    }
}
