mod mailer;
mod notifier;
#[cfg(test)]
mod notifier_tests;

pub use mailer::{Mailer, NullMailer, SendmailMailer};
pub use notifier::{Notifier, TaskOutput};

/// The address Zeus mail appears to come from: `zeus+<id>+noreply@<hostname>.<mail_domain>`.
pub fn zeus_email_id(pipeline_id: &str, mail_domain: &str) -> String {
  format!(
    "zeus+{pipeline_id}+noreply@{}.{mail_domain}",
    whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string())
  )
}
