use std::fs::OpenOptions;
use std::path::Path;

use serde::Serialize;

use crate::cmd::{DoctorArgs, OutputFormat, Settings};
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    sysfs_root: String,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, settings: &Settings) -> CliResult<i32> {
    let root = settings.sysfs_root.as_path();
    let checks = vec![
        platform_check(),
        root_check(root),
        attribute_check(root, "export"),
        attribute_check(root, "unexport"),
    ];

    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    let output = DoctorOutput {
        sysfs_root: root.display().to_string(),
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, args.format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Pretty => {
            println!("gpioport doctor ({})\n", output.sysfs_root);
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<10} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
    }
}

fn platform_check() -> CheckResult {
    let (status, detail) = if cfg!(target_os = "linux") {
        (CheckStatus::Pass, "linux sysfs gpio interface".to_string())
    } else {
        (
            CheckStatus::Warn,
            format!("{} has no sysfs gpio interface", std::env::consts::OS),
        )
    };
    CheckResult {
        name: "platform".to_string(),
        status,
        detail,
    }
}

fn root_check(root: &Path) -> CheckResult {
    let (status, detail) = match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => (CheckStatus::Pass, "directory present".to_string()),
        Ok(_) => (CheckStatus::Fail, "not a directory".to_string()),
        Err(err) => (CheckStatus::Fail, err.to_string()),
    };
    CheckResult {
        name: "root".to_string(),
        status,
        detail,
    }
}

/// Opens the attribute for writing without writing to it.
fn attribute_check(root: &Path, attr: &str) -> CheckResult {
    let path = root.join(attr);
    let (status, detail) = match OpenOptions::new().write(true).open(&path) {
        Ok(_) => (CheckStatus::Pass, "writable".to_string()),
        Err(err) => (CheckStatus::Fail, err.to_string()),
    };
    CheckResult {
        name: attr.to_string(),
        status,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gpioport-doctor-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writable_attributes_pass() {
        let root = temp_root("pass");
        std::fs::write(root.join("export"), "").unwrap();
        std::fs::write(root.join("unexport"), "").unwrap();

        assert_eq!(root_check(&root).status, CheckStatus::Pass);
        assert_eq!(attribute_check(&root, "export").status, CheckStatus::Pass);
        assert_eq!(attribute_check(&root, "unexport").status, CheckStatus::Pass);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_root_fails() {
        let root = temp_root("missing").join("nope");
        assert_eq!(root_check(&root).status, CheckStatus::Fail);
        assert_eq!(attribute_check(&root, "export").status, CheckStatus::Fail);
    }

    #[test]
    fn report_serializes_lowercase_status() {
        let output = DoctorOutput {
            sysfs_root: "/sys/class/gpio".to_string(),
            checks: vec![CheckResult {
                name: "root".to_string(),
                status: CheckStatus::Fail,
                detail: "missing".to_string(),
            }],
            overall: "fail",
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["checks"][0]["status"], "fail");
        assert_eq!(value["overall"], "fail");
    }
}
