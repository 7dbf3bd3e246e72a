//! `--test-email`: checks the email configuration end to end.

use meetcoach_notes::{HttpTransport, ReqwestTransport};

use crate::config::ClientConfig;
use crate::email::EmailSender;
use crate::error::ClientResult;

/// Sends the test email using the configured settings.
pub async fn test_email(config: &ClientConfig) -> ClientResult<()> {
    let transport = ReqwestTransport::new(config.notes.timeout())?;
    let sender = EmailSender::new(transport, config.email.resolve()?);
    send_test(&sender).await
}

async fn send_test<T: HttpTransport>(sender: &EmailSender<T>) -> ClientResult<()> {
    println!("Sending test email to {}...", sender.recipient());
    let id = sender.send_test().await?;
    println!("Test email sent (id: {})", id);
    Ok(())
}
