use std::path::Path;
use std::time::Duration;

/// Resolves a task's timeout: `<task>.timeout`, then `<dir(task)>/timeout`, else `default`.
/// Side-file contents are `<number>[unit]`, unit one of `d`, `h`, `m`, `ms`, `us`, or none
/// (seconds).
pub fn resolve_timeout(task: &Path, default: Duration) -> Duration {
  let mut task_timeout_name = task.as_os_str().to_owned();
  task_timeout_name.push(".timeout");
  if let Some(d) = read_timeout_file(Path::new(&task_timeout_name)) {
    return d;
  }
  if let Some(dir) = task.parent() {
    if let Some(d) = read_timeout_file(&dir.join("timeout")) {
      return d;
    }
  }
  default
}

fn read_timeout_file(path: &Path) -> Option<Duration> {
  let contents = std::fs::read_to_string(path).ok()?;
  parse_timeout(contents.trim())
}

fn parse_timeout(s: &str) -> Option<Duration> {
  if s.is_empty() {
    return None;
  }
  let unit_start = s.find(|c: char| c.is_ascii_alphabetic()).unwrap_or(s.len());
  let (number, unit) = s.split_at(unit_start);
  let n: f64 = number.parse().ok()?;
  if n < 0.0 {
    return None;
  }
  let seconds = match unit {
    "" => n,
    "d" => n * 86_400.0,
    "h" => n * 3_600.0,
    "m" => n * 60.0,
    "ms" => n / 1_000.0,
    "us" => n / 1_000_000.0,
    _ => return None,
  };
  Some(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn plain_digits_are_seconds() {
    assert_eq!(parse_timeout("30"), Some(Duration::from_secs(30)));
  }

  #[test]
  fn unit_suffixes_convert() {
    assert_eq!(parse_timeout("100ms"), Some(Duration::from_millis(100)));
    assert_eq!(parse_timeout("2h"), Some(Duration::from_secs(7200)));
    assert_eq!(parse_timeout("1d"), Some(Duration::from_secs(86_400)));
    assert_eq!(parse_timeout("5m"), Some(Duration::from_secs(300)));
    assert_eq!(parse_timeout("500us"), Some(Duration::from_micros(500)));
  }

  #[test]
  fn garbage_is_rejected() {
    assert_eq!(parse_timeout("abc"), None);
    assert_eq!(parse_timeout(""), None);
  }

  #[test]
  fn task_file_timeout_takes_priority_over_dir_timeout() {
    let dir = tempdir().unwrap();
    let task = dir.path().join("01_a").join("02_run.sh");
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();
    std::fs::write(task.parent().unwrap().join("timeout"), "10").unwrap();
    let mut task_timeout = task.as_os_str().to_owned();
    task_timeout.push(".timeout");
    std::fs::write(&task_timeout, "100ms").unwrap();

    assert_eq!(
      resolve_timeout(&task, Duration::from_secs(1)),
      Duration::from_millis(100)
    );
  }

  #[test]
  fn dir_timeout_used_when_no_task_timeout() {
    let dir = tempdir().unwrap();
    let task = dir.path().join("01_a").join("02_run.sh");
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();
    std::fs::write(task.parent().unwrap().join("timeout"), "10").unwrap();

    assert_eq!(resolve_timeout(&task, Duration::from_secs(1)), Duration::from_secs(10));
  }

  #[test]
  fn default_used_when_no_side_files() {
    let dir = tempdir().unwrap();
    let task = dir.path().join("01_a").join("02_run.sh");
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();

    assert_eq!(resolve_timeout(&task, Duration::from_secs(42)), Duration::from_secs(42));
  }
}
