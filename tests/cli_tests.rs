//! Integration tests running the exporter binary.
//!
//! Configuration errors are checked through `--check-config`; the serving
//! tests start the exporter against scripted jps/jstat stand-ins and scrape it
//! over a plain TCP connection.

mod common;

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::tempdir;

use common::{write_script, GC_ROW};

/// Helper to get the binary path
fn binary_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_jstat-exporter"))
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("Failed to reserve a port")
}

fn spawn_exporter(port: u16, jps: &Path, jstat: &Path, extra: &[&str]) -> Child {
    let listen = format!("127.0.0.1:{port}");
    Command::new(binary_path())
        .args(["--no-config", "--log-level", "off", "--web.listen-address", &listen])
        .arg("--jps.path")
        .arg(jps)
        .arg("--jstat.path")
        .arg(jstat)
        .args(["--target", "MyApp", "--interval", "100"])
        .args(extra)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start exporter")
}

/// Sends `GET path` and returns the raw response, or `None` if the server
/// could not be reached or closed the connection without answering.
fn http_get(port: u16, path: &str) -> Option<String> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;
    write!(
        stream,
        "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    )
    .ok()?;
    let mut response = String::new();
    stream.read_to_string(&mut response).ok()?;
    if response.is_empty() {
        None
    } else {
        Some(response)
    }
}

#[test]
fn test_check_config_defaults_are_valid() {
    let output = Command::new(binary_path())
        .args(["--no-config", "--check-config"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_check_config_rejects_relative_metrics_path() {
    let output = Command::new(binary_path())
        .args(["--no-config", "--web.telemetry-path", "metrics", "--check-config"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("must start with '/'"),
        "unexpected stderr: '{}'",
        stderr
    );
}

#[test]
fn test_check_config_rejects_bad_listen_address() {
    let output = Command::new(binary_path())
        .args(["--no-config", "--web.listen-address", "nowhere", "--check-config"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("Invalid listen address"),
        "unexpected stderr: '{}'",
        stderr
    );
}

#[test]
fn test_show_config_json() {
    let output = Command::new(binary_path())
        .args([
            "--no-config",
            "--target",
            "MyApp",
            "--show-config",
            "--config-format",
            "json",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(r#""target": "MyApp""#), "stdout: {stdout}");
    assert!(stdout.contains(r#""jstat_path": "/usr/bin/jstat""#), "stdout: {stdout}");
}

#[test]
fn test_scrape_serves_jstat_gauges() {
    let dir = tempdir().unwrap();
    let jps = write_script(dir.path(), "jps", "echo \"1234 MyApp\"\necho \"5678 Jps\"");
    let jstat = write_script(
        dir.path(),
        "jstat",
        &format!("echo HEADER\nif [ \"$1\" = \"-gc\" ]; then echo \"{GC_ROW}\"; fi\nsleep 5"),
    );
    let port = free_port();
    let mut child = spawn_exporter(port, &jps, &jstat, &[]);

    let deadline = Instant::now() + Duration::from_secs(15);
    let mut body = String::new();
    while Instant::now() < deadline {
        if let Some(resp) = http_get(port, "/metrics") {
            if resp.contains("jstat_fgcTimes") {
                body = resp;
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    let landing = http_get(port, "/");
    child.kill().ok();
    child.wait().ok();

    assert!(body.contains("jstat_fgcTimes 14"), "metrics body: {body}");
    assert!(body.contains("jstat_fgcSec 15"), "metrics body: {body}");
    // Categories without a sample are absent, not zero.
    assert!(!body.contains("jstat_oldUsed"), "metrics body: {body}");
    assert!(!body.contains("jstat_newMax"), "metrics body: {body}");

    let landing = landing.expect("landing page not served");
    assert!(landing.contains(r#"<a href="/metrics">Metrics</a>"#));
}

#[test]
fn test_malformed_sample_terminates_exporter() {
    let dir = tempdir().unwrap();
    let jps = write_script(dir.path(), "jps", "echo \"1234 MyApp\"");
    // -gcold needs token 5; this row has only three tokens.
    let jstat = write_script(
        dir.path(),
        "jstat",
        "echo HEADER\nif [ \"$1\" = \"-gcold\" ]; then echo \"1.0 2.0 3.0\"; fi\nsleep 5",
    );
    let port = free_port();
    let mut child = spawn_exporter(port, &jps, &jstat, &[]);

    let deadline = Instant::now() + Duration::from_secs(15);
    let status = loop {
        if let Some(status) = child.try_wait().expect("Failed to poll exporter") {
            break Some(status);
        }
        if Instant::now() >= deadline {
            break None;
        }
        let _ = http_get(port, "/metrics");
        std::thread::sleep(Duration::from_millis(100));
    };

    let Some(status) = status else {
        child.kill().ok();
        child.wait().ok();
        panic!("exporter kept running after a malformed sample was scraped");
    };
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_skip_policy_keeps_serving() {
    let dir = tempdir().unwrap();
    let jps = write_script(dir.path(), "jps", "echo \"1234 MyApp\"");
    let jstat = write_script(
        dir.path(),
        "jstat",
        &format!(
            "echo HEADER\ncase \"$1\" in\n  -gcold) echo \"1.0 2.0 3.0\" ;;\n  -gc) echo \"{GC_ROW}\" ;;\nesac\nsleep 5"
        ),
    );
    let port = free_port();
    let mut child = spawn_exporter(port, &jps, &jstat, &["--on-malformed", "skip"]);

    let deadline = Instant::now() + Duration::from_secs(15);
    let mut body = String::new();
    while Instant::now() < deadline {
        if let Some(resp) = http_get(port, "/metrics") {
            if resp.contains("jstat_fgcTimes")
                && resp.contains(r#"jstat_exporter_poller_samples_total{category="gcold"}"#)
                && !resp.contains(r#"jstat_exporter_poller_samples_total{category="gcold"} 0"#)
            {
                body = resp;
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    let still_running = child.try_wait().ok().flatten().is_none();
    child.kill().ok();
    child.wait().ok();

    assert!(still_running, "exporter exited under skip policy");
    assert!(body.contains("jstat_fgcTimes 14"), "metrics body: {body}");
    assert!(!body.contains("jstat_oldUsed"), "metrics body: {body}");
}
