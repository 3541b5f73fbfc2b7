use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Sends the two shapes of mail Zeus needs: a plain message, and a message with one or
/// more files' contents appended (used when a task's output was captured to a log file
/// rather than piped directly).
pub trait Mailer: Send + Sync {
  fn send_simple_message(&self, from: &str, to: &[String], subject: &str, body: &str);

  fn send_message_from_files(&self, from: &str, to: &[String], subject: &str, files: &[&Path], body: &str);
}

/// Drops every message on the floor except for a debug log line. The default mailer when
/// no `--success_mail`/`--failure_mail` receiver is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMailer;

impl Mailer for NullMailer {
  fn send_simple_message(&self, _from: &str, to: &[String], subject: &str, _body: &str) {
    log::debug!("not sending mail to {to:?}: {subject}");
  }

  fn send_message_from_files(&self, _from: &str, to: &[String], subject: &str, _files: &[&Path], _body: &str) {
    log::debug!("not sending mail to {to:?}: {subject}");
  }
}

/// Shells out to the system `sendmail` binary with an RFC 822 message on stdin, the same
/// way the original's mailer ultimately hands off to the host MTA.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendmailMailer;

impl SendmailMailer {
  fn deliver(&self, from: &str, to: &[String], subject: &str, body: &str) {
    if to.is_empty() {
      return;
    }
    let message = format!(
      "From: {from}\r\nTo: {}\r\nSubject: {subject}\r\n\r\n{body}\r\n",
      to.join(", ")
    );

    let child = Command::new("sendmail")
      .arg("-t")
      .arg("-f")
      .arg(from)
      .stdin(Stdio::piped())
      .spawn();
    let mut child = match child {
      Ok(child) => child,
      Err(e) => {
        log::warn!("failed to spawn sendmail: {e}");
        return;
      }
    };
    if let Some(mut stdin) = child.stdin.take() {
      if let Err(e) = stdin.write_all(message.as_bytes()) {
        log::warn!("failed to write mail to sendmail: {e}");
      }
    }
    match child.wait() {
      Ok(status) if !status.success() => {
        log::warn!("sendmail exited with {status}");
      }
      Err(e) => log::warn!("failed to wait on sendmail: {e}"),
      Ok(_) => {}
    }
  }
}

impl Mailer for SendmailMailer {
  fn send_simple_message(&self, from: &str, to: &[String], subject: &str, body: &str) {
    self.deliver(from, to, subject, body);
  }

  fn send_message_from_files(&self, from: &str, to: &[String], subject: &str, files: &[&Path], body: &str) {
    let mut full_body = body.to_string();
    for file in files {
      full_body.push_str("\r\n\r\n--- ");
      full_body.push_str(&file.display().to_string());
      full_body.push_str(" ---\r\n");
      match std::fs::read_to_string(file) {
        Ok(contents) => full_body.push_str(&contents),
        Err(e) => full_body.push_str(&format!("<could not read {}: {e}>", file.display())),
      }
    }
    self.deliver(from, to, subject, &full_body);
  }
}
