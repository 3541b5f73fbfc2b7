use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::tempdir;
use zeus_config::{GlobalArgs, PipelineConfig};
use zeus_discovery::ExitClass;

use super::mailer::Mailer;
use super::notifier::{Notifier, TaskOutput};

#[derive(Default, Clone)]
struct RecordingMailer {
  sent: Arc<Mutex<Vec<String>>>,
}

impl Mailer for RecordingMailer {
  fn send_simple_message(&self, _from: &str, to: &[String], subject: &str, _body: &str) {
    self.sent.lock().unwrap().push(format!("{to:?}:{subject}"));
  }

  fn send_message_from_files(&self, _from: &str, to: &[String], subject: &str, _files: &[&Path], _body: &str) {
    self.sent.lock().unwrap().push(format!("{to:?}:{subject}"));
  }
}

fn config(root: &Path) -> PipelineConfig {
  let args = GlobalArgs {
    id: "zeus-notify-test".to_string(),
    root: root.to_path_buf(),
    publish_root: None,
    bin_root: None,
    utils_root: None,
    out_dirs: Vec::new(),
    date: "20260101".to_string(),
    nolog_output: true,
    log_to_tmp: false,
  };
  PipelineConfig::new(&args).unwrap()
}

#[test]
fn skips_task_mail_without_a_configured_receiver() {
  let recorder = RecordingMailer::default();
  let notifier = Notifier::new(
    Box::new(recorder.clone()),
    None,
    None,
    "example.com".to_string(),
    false,
  );
  let root = tempdir().unwrap();
  let cfg = config(root.path());
  let task = cfg.base_dir().join("01_a").join("02_run.sh");
  notifier.notify_task(
    &cfg,
    &task,
    ExitClass::Failure,
    Duration::from_secs(1),
    TaskOutput::Message("boom"),
  );
  assert!(recorder.sent.lock().unwrap().is_empty());
}

#[test]
fn mails_failure_when_a_receiver_is_configured() {
  let recorder = RecordingMailer::default();
  let notifier = Notifier::new(
    Box::new(recorder.clone()),
    None,
    Some("oncall@example.com".to_string()),
    "example.com".to_string(),
    false,
  );
  let root = tempdir().unwrap();
  let cfg = config(root.path());
  let task = cfg.base_dir().join("01_a").join("02_run.sh");
  notifier.notify_task(
    &cfg,
    &task,
    ExitClass::Failure,
    Duration::from_secs(1),
    TaskOutput::Message("boom"),
  );
  let sent = recorder.sent.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert!(sent[0].contains("oncall@example.com"));
  assert!(sent[0].contains("FAILURE"));
}

#[test]
fn skips_success_mail_unless_detailed_success_mail_is_set() {
  let recorder = RecordingMailer::default();
  let notifier = Notifier::new(
    Box::new(recorder.clone()),
    Some("team@example.com".to_string()),
    None,
    "example.com".to_string(),
    false,
  );
  let root = tempdir().unwrap();
  let cfg = config(root.path());
  let task = cfg.base_dir().join("01_a").join("02_run.sh");
  notifier.notify_task(
    &cfg,
    &task,
    ExitClass::Success,
    Duration::from_secs(1),
    TaskOutput::Message("ok"),
  );
  assert!(recorder.sent.lock().unwrap().is_empty());
}

#[test]
fn final_status_mail_skipped_when_nothing_ran() {
  let recorder = RecordingMailer::default();
  let notifier = Notifier::new(
    Box::new(recorder.clone()),
    Some("team@example.com".to_string()),
    Some("oncall@example.com".to_string()),
    "example.com".to_string(),
    false,
  );
  let root = tempdir().unwrap();
  notifier.notify_final(&config(root.path()), &[], &[], None, Duration::from_secs(0), "CONFIG");
  assert!(recorder.sent.lock().unwrap().is_empty());
}

#[test]
fn final_status_mail_reports_abort_fail() {
  let recorder = RecordingMailer::default();
  let notifier = Notifier::new(
    Box::new(recorder.clone()),
    Some("team@example.com".to_string()),
    Some("oncall@example.com".to_string()),
    "example.com".to_string(),
    false,
  );
  let root = tempdir().unwrap();
  notifier.notify_final(
    &config(root.path()),
    &["//01_a/01_ok.sh".to_string()],
    &["//01_a/02_bad.sh".to_string()],
    Some("//01_a/02_bad.sh"),
    Duration::from_secs(5),
    "CONFIG",
  );
  let sent = recorder.sent.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert!(sent[0].contains("ABORT FAIL"));
  assert!(sent[0].contains("oncall@example.com"));
}
