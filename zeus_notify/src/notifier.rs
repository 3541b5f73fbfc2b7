use std::path::Path;
use std::time::Duration;

use zeus_config::PipelineConfig;
use zeus_discovery::{display_name, ExitClass, Task};

use crate::mailer::Mailer;
use crate::zeus_email_id;

fn exit_description(class: ExitClass) -> &'static str {
  match class {
    ExitClass::Success => "SUCCESS",
    ExitClass::AllowFail => "ALLOW_FAIL",
    ExitClass::Failure => "FAILURE",
    ExitClass::AbortFail => "ABORT_FAIL",
  }
}

/// Where a finished task's output can be read from: a log file it was redirected to, or a
/// message captured directly in memory. Exactly one is ever present, the same way the
/// original only ever has one of `log_file`/`msg` for a given task.
pub enum TaskOutput<'a> {
  LogFile(&'a Path),
  Message(&'a str),
}

/// Sends per-task and final-summary mail the way `Runner._SendMailForTask` and
/// `Runner._SendFinalStatusMail` do: a receiver configured via `--success_mail` /
/// `--failure_mail`, silently skipped if empty, with the recipient's address built from
/// the pipeline id and the local hostname.
pub struct Notifier {
  mailer: Box<dyn Mailer>,
  success_mail: Option<String>,
  failure_mail: Option<String>,
  mail_domain: String,
  detailed_success_mail: bool,
}

impl Notifier {
  pub fn new(
    mailer: Box<dyn Mailer>,
    success_mail: Option<String>,
    failure_mail: Option<String>,
    mail_domain: String,
    detailed_success_mail: bool,
  ) -> Self {
    Self {
      mailer,
      success_mail,
      failure_mail,
      mail_domain,
      detailed_success_mail,
    }
  }

  fn from_address(&self, config: &PipelineConfig) -> String {
    zeus_email_id(config.id(), &self.mail_domain)
  }

  /// Mails the outcome of a single task, if a receiver is configured for it. A success is
  /// only mailed when `--detailed_success_mail` was passed; anything else is always
  /// mailed to `--failure_mail` when one is set.
  pub fn notify_task(
    &self,
    config: &PipelineConfig,
    task: &Task,
    exit_class: ExitClass,
    time_taken: Duration,
    output: TaskOutput<'_>,
  ) {
    let receiver = if exit_class == ExitClass::Success {
      if !self.detailed_success_mail {
        return;
      }
      &self.success_mail
    } else {
      &self.failure_mail
    };
    let Some(receiver) = receiver else { return };

    let subject = format!(
      "[{}:{}] {} : {}",
      config.id(),
      config.date(),
      exit_description(exit_class),
      display_name(task, config)
    );
    let body = format!(
      "Executed task: {}. \nStatus:{} \nTime: {:.2}s.",
      task.display(),
      exit_description(exit_class),
      time_taken.as_secs_f64()
    );

    let from = self.from_address(config);
    let to = [receiver.clone()];
    match output {
      TaskOutput::Message(msg) => {
        let body = format!("{body}\n{msg}");
        self.mailer.send_simple_message(&from, &to, &subject, &body);
      }
      TaskOutput::LogFile(log_file) => {
        self
          .mailer
          .send_message_from_files(&from, &to, &subject, &[log_file], &body);
      }
    }
  }

  /// Mails the run's final status: a receiver configured for success (if nothing failed)
  /// or failure (otherwise), skipped entirely if no task ran at all.
  #[allow(clippy::too_many_arguments)]
  pub fn notify_final(
    &self,
    config: &PipelineConfig,
    successful: &[String],
    failed: &[String],
    aborted_by: Option<&str>,
    time_taken: Duration,
    config_string: &str,
  ) {
    if successful.is_empty() && failed.is_empty() {
      return;
    }

    let (receiver, status_description) = if failed.is_empty() {
      (&self.success_mail, "SUCCESS".to_string())
    } else {
      (
        &self.failure_mail,
        if aborted_by.is_some() { "ABORT FAIL".to_string() } else { "FAIL".to_string() },
      )
    };
    let Some(receiver) = receiver else { return };

    let subject = format!(
      "[{}:{}] Final Status: {status_description}",
      config.id(),
      config.date()
    );

    let mut body = String::new();
    if let Some(who) = aborted_by {
      body.push_str(&format!("Aborted by: {who}\n\n"));
    }
    body.push_str(&format!(
      "Successful tasks: {}\n{}\n\nFailed tasks: {}\n{}\n\nTotal Time: {:.2}s.\n\n{config_string}\n\n",
      successful.len(),
      serde_json::to_string_pretty(successful).unwrap_or_default(),
      failed.len(),
      serde_json::to_string_pretty(failed).unwrap_or_default(),
      time_taken.as_secs_f64(),
    ));

    let from = self.from_address(config);
    let to = [receiver.clone()];
    self.mailer.send_simple_message(&from, &to, &subject, &body);
  }
}
