#![cfg(unix)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use gpioport::term::{self, Creation, Reference, Term};

fn unique_sysfs(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "gpioport-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    std::fs::write(dir.join("export"), "").expect("export should be creatable");
    std::fs::write(dir.join("unexport"), "").expect("unexport should be creatable");
    dir
}

/// A pin that is already exported, with the attributes the kernel provides.
fn add_pin(root: &Path, pin: u32) {
    let dir = root.join(format!("gpio{pin}"));
    std::fs::create_dir_all(&dir).expect("pin dir should be creatable");
    for (attr, value) in [("direction", "in"), ("edge", "none"), ("value", "0")] {
        std::fs::write(dir.join(attr), value).expect("attribute should be creatable");
    }
}

fn frame(term: &Term) -> Vec<u8> {
    let payload = term::to_vec(term).expect("term should encode");
    let mut out = (payload.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(&payload);
    out
}

fn replies(mut wire: &[u8]) -> Vec<Term> {
    let mut out = Vec::new();
    while !wire.is_empty() {
        assert!(wire.len() >= 2, "dangling length prefix");
        let len = usize::from(u16::from_be_bytes([wire[0], wire[1]]));
        let payload = &wire[2..2 + len];
        out.push(term::decode(payload).expect("reply should decode"));
        wire = &wire[2 + len..];
    }
    out
}

fn run_port(root: &Path, input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gpioport"))
        .arg("--log-level")
        .arg("error")
        .arg("--sysfs-root")
        .arg(root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("port should start");

    {
        let mut stdin = child.stdin.take().expect("stdin should be piped");
        // The port may already have exited on a fatal frame.
        let _ = stdin.write_all(input);
    }

    child.wait_with_output().expect("port should exit")
}

fn reference(id: u32) -> Term {
    Term::Reference(Reference {
        node: "host@localhost".to_string(),
        creation: Creation::Wide(1_700_000_000),
        ids: vec![id, 7, 11],
    })
}

fn call(reference: Term, function: Term) -> Term {
    Term::tuple(vec![Term::atom("call"), reference, function])
}

#[test]
fn init_write_read_round_trip() {
    let root = unique_sysfs("rw");
    add_pin(&root, 4);

    let mut input = frame(&Term::tuple(vec![
        Term::atom("init"),
        Term::Integer(4),
        Term::atom("output"),
    ]));
    input.extend(frame(&call(
        reference(1),
        Term::tuple(vec![Term::atom("write"), Term::Integer(1)]),
    )));
    input.extend(frame(&call(reference(2), Term::tuple(vec![Term::atom("read")]))));

    let output = run_port(&root, &input);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let replies = replies(&output.stdout);
    assert_eq!(
        replies,
        vec![
            Term::atom("ok"),
            Term::tuple(vec![Term::atom("port_reply"), reference(1), Term::atom("ok")]),
            Term::tuple(vec![Term::atom("port_reply"), reference(2), Term::Integer(1)]),
        ]
    );

    assert_eq!(std::fs::read_to_string(root.join("export")).unwrap(), "");
    assert_eq!(
        std::fs::read_to_string(root.join("gpio4").join("direction")).unwrap(),
        "out"
    );
    assert_eq!(
        std::fs::read_to_string(root.join("gpio4").join("value")).unwrap(),
        "1"
    );
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn write_before_init_is_rejected() {
    let root = unique_sysfs("closed");

    let input = frame(&call(
        reference(3),
        Term::tuple(vec![Term::atom("write"), Term::Integer(1)]),
    ));
    let output = run_port(&root, &input);
    assert!(output.status.success());

    assert_eq!(
        replies(&output.stdout),
        vec![Term::tuple(vec![
            Term::atom("port_reply"),
            reference(3),
            Term::tuple(vec![Term::atom("error"), Term::atom("gpio_write_failed")]),
        ])]
    );
    assert_eq!(std::fs::read_to_string(root.join("export")).unwrap(), "");
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn init_failure_replies_and_keeps_running() {
    let root = unique_sysfs("initfail");
    // The kernel never creates the pin directory, so the export is undone.
    let mut input = frame(&Term::tuple(vec![
        Term::atom("init"),
        Term::Integer(9),
        Term::atom("input"),
    ]));
    input.extend(frame(&call(reference(4), Term::tuple(vec![Term::atom("read")]))));

    let output = run_port(&root, &input);
    assert!(output.status.success());
    assert_eq!(
        replies(&output.stdout),
        vec![
            Term::tuple(vec![Term::atom("error"), Term::atom("gpio_init_fail")]),
            Term::tuple(vec![
                Term::atom("port_reply"),
                reference(4),
                Term::tuple(vec![Term::atom("error"), Term::atom("gpio_read_failed")]),
            ]),
        ]
    );
    assert_eq!(std::fs::read_to_string(root.join("export")).unwrap(), "9");
    assert_eq!(std::fs::read_to_string(root.join("unexport")).unwrap(), "9");
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn improper_list_reference_is_echoed_verbatim() {
    let root = unique_sysfs("alias-ref");
    // [alias | 7]
    let mut alias = vec![108, 0, 0, 0, 1, 119, 5];
    alias.extend_from_slice(b"alias");
    alias.extend_from_slice(&[97, 7]);
    let reference = Term::Encoded(alias.into());

    let input = frame(&call(reference.clone(), Term::tuple(vec![Term::atom("read")])));
    let output = run_port(&root, &input);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let expected = frame(&Term::tuple(vec![
        Term::atom("port_reply"),
        reference,
        Term::tuple(vec![Term::atom("error"), Term::atom("gpio_read_failed")]),
    ]));
    assert_eq!(output.stdout, expected);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn unknown_function_replies_nil() {
    let root = unique_sysfs("unknown-fn");
    let input = frame(&call(reference(5), Term::tuple(vec![Term::atom("blink")])));

    let output = run_port(&root, &input);
    assert!(output.status.success());
    assert_eq!(
        replies(&output.stdout),
        vec![Term::tuple(vec![
            Term::atom("port_reply"),
            reference(5),
            Term::atom("nil"),
        ])]
    );
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn host_eof_exits_cleanly() {
    let root = unique_sysfs("eof");
    let output = run_port(&root, &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn oversized_length_prefix_is_fatal() {
    let root = unique_sysfs("oversized");
    let output = run_port(&root, &[0x04, 0x00]);
    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("frame too large"));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn undecodable_payload_is_fatal() {
    let root = unique_sysfs("garbage");
    let output = run_port(&root, &[0x00, 0x03, 0x01, 0x02, 0x03]);
    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn unknown_command_is_fatal_after_earlier_replies() {
    let root = unique_sysfs("unknown-cmd");
    let mut input = frame(&call(reference(6), Term::tuple(vec![Term::atom("read")])));
    input.extend(frame(&Term::tuple(vec![Term::atom("reboot")])));
    input.extend(frame(&call(reference(7), Term::tuple(vec![Term::atom("read")]))));

    let output = run_port(&root, &input);
    assert_eq!(output.status.code(), Some(60));
    assert_eq!(replies(&output.stdout).len(), 1);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn larger_max_frame_admits_bigger_frames() {
    let root = unique_sysfs("max-frame");
    // A 1100-byte frame: rejected by default, accepted when raised.
    let mut input = vec![0x04, 0x4a];
    input.extend_from_slice(&[0u8; 0x44a]);

    let output = Command::new(env!("CARGO_BIN_EXE_gpioport"))
        .arg("--log-level")
        .arg("error")
        .arg("--max-frame")
        .arg("2048")
        .arg("--sysfs-root")
        .arg(&root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            let _ = child.stdin.take().map(|mut stdin| stdin.write_all(&input));
            child.wait_with_output()
        })
        .expect("port should run");

    // Accepted by the framer, then rejected as a term.
    assert_eq!(output.status.code(), Some(60));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("frame too large"));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn doctor_reports_fake_sysfs() {
    let root = unique_sysfs("doctor");
    let output = Command::new(env!("CARGO_BIN_EXE_gpioport"))
        .arg("--sysfs-root")
        .arg(&root)
        .arg("doctor")
        .arg("--format")
        .arg("json")
        .output()
        .expect("doctor should run");

    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("doctor should emit json");
    let checks = payload["checks"].as_array().expect("checks array");
    let root_check = checks
        .iter()
        .find(|c| c["name"] == "root")
        .expect("root check present");
    assert_eq!(root_check["status"], "pass");
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn doctor_fails_without_sysfs() {
    let root = unique_sysfs("doctor-missing").join("absent");
    let output = Command::new(env!("CARGO_BIN_EXE_gpioport"))
        .arg("--sysfs-root")
        .arg(&root)
        .arg("doctor")
        .output()
        .expect("doctor should run");

    assert_eq!(output.status.code(), Some(30));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_gpioport"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
