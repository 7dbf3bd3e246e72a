//! Client for the meeting-notes service.
//!
//! This crate covers everything between the local credential file and a
//! list of meetings with transcripts:
//!
//! - [`CredentialStore`] - Reads the desktop app's token file and writes
//!   rotated tokens back
//! - [`HttpTransport`] - The seam every request goes through
//! - [`NotesClient`] - Bearer auth with a single refresh-and-retry on 401
//! - [`NotesClient::fetch_meetings`] - Paginated, date-filtered scan
//! - [`NotesError`] - Error types with run-fatal classification
//!
//! # Flow
//!
//! ```text
//! supabase.json ──► CredentialStore ──► NotesClient ──► HttpTransport
//!       ▲                                   │
//!       └──────── persist on refresh ───────┘
//!                                           │
//!                                           ▼ fetch_meetings()
//!                                   Vec<Document> + transcripts
//! ```
//!
//! # Example
//!
//! ```ignore
//! use meetcoach_notes::{CredentialStore, FetchOptions, NotesClient, NotesEndpoints, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new(Duration::from_secs(30))?;
//! let store = CredentialStore::new(CredentialStore::default_path());
//! let mut client = NotesClient::connect(transport, store, NotesEndpoints::default())?;
//! let meetings = client.fetch_meetings(&range, &FetchOptions::default()).await?;
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod transport;

pub use client::{
    DEFAULT_API_BASE, DEFAULT_AUTH_URL, DEFAULT_CLIENT_VERSION, NotesClient, NotesEndpoints,
};
pub use credentials::{CredentialShape, CredentialStore, Credentials, DEFAULT_CLIENT_ID};
pub use error::{NotesError, NotesErrorCode, NotesResult};
pub use fetch::{DEFAULT_PAGE_SIZE, FetchOptions};
pub use transport::{BoxFuture, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
