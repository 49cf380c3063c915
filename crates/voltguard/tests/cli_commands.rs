#![cfg(feature = "cli")]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use bytes::BytesMut;
use voltguard_wire::{decode_message, encode_message, FeedMessage, FramePayload, DEFAULT_MAX_PAYLOAD};

const JPEG_A: &[u8] = &[0xFF, 0xD8, 0xAA, 0xFF, 0xD9];
const JPEG_B: &[u8] = &[0xFF, 0xD8, 0xBB, 0xFF, 0xD9];

fn voltguard() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_voltguard"));
    command.arg("--log-level").arg("error");
    command
}

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "voltguard-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn run_streak(stdin: &str, extra: &[&str]) -> std::process::Output {
    let mut child = voltguard()
        .args(["--format", "json", "streak"])
        .args(extra)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("streak should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should accept the snapshot");
    child.wait_with_output().expect("streak should finish")
}

/// Answer every `get_frame` with the next image, then go quiet until the
/// client hangs up. Returns the number of requests seen.
fn serve_frames(listener: TcpListener, images: Vec<&'static [u8]>) -> thread::JoinHandle<usize> {
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("client should connect");
        let mut images = images.into_iter();
        let mut buf = BytesMut::new();
        let mut chunk = [0u8; 4096];
        let mut requests = 0;
        loop {
            match decode_message(&mut buf, DEFAULT_MAX_PAYLOAD).expect("client frames should decode") {
                Some(FeedMessage::RequestFrame) => {
                    requests += 1;
                    if let Some(image) = images.next() {
                        let mut out = BytesMut::new();
                        encode_message(&FeedMessage::Frame(FramePayload::from_jpeg(image)), &mut out)
                            .expect("frame should encode");
                        stream.write_all(&out).expect("frame should send");
                    }
                }
                Some(other) => panic!("unexpected client message: {other:?}"),
                None => {
                    let n = stream.read(&mut chunk).unwrap_or(0);
                    if n == 0 {
                        return requests;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
            }
        }
    })
}

#[test]
fn tier_reports_high_performer_as_json() {
    let output = voltguard()
        .args(["--format", "json", "tier", "--streak", "12", "--efficiency", "75", "--missed", "0"])
        .output()
        .expect("tier should run");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("tier should emit json");
    assert_eq!(report["tier"], "High Performer");
    assert_eq!(report["profile"]["animation"], "glowing");
    assert_eq!(report["progress"], 12.0 / 1000.0);
    assert_eq!(report["maxTierReached"], true);
    assert_eq!(report["nextTierHint"], "Maximum Tier Achieved!");
    assert!(report.get("daysToNextTier").is_none());
}

#[test]
fn tier_reports_days_to_next_tier() {
    let output = voltguard()
        .args(["--format", "json", "tier", "--streak", "6", "--efficiency", "55", "--missed", "0"])
        .output()
        .expect("tier should run");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("tier should emit json");
    assert_eq!(report["tier"], "Steady");
    assert_eq!(report["maxTierReached"], false);
    assert_eq!(report["daysToNextTier"], 5);
    assert_eq!(report["nextTierHint"], "5 more days to High Performer!");
}

#[test]
fn tiers_lists_every_tier_with_eligibility() {
    let output = voltguard()
        .args(["--format", "json", "tiers"])
        .output()
        .expect("tiers should run");

    assert!(output.status.success());
    let list: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("tiers should emit json");
    let entries = list.as_array().expect("tiers should emit an array");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["tier"], "Starter");
    assert_eq!(entries[0]["eligibility"], "New users");
    assert_eq!(entries[1]["eligibility"], "Missed 2+ days");
    assert_eq!(entries[2]["eligibility"], "4+ days streak");
    assert_eq!(entries[3]["eligibility"], "11+ days streak");
    assert_eq!(entries[3]["profile"]["animation"], "glowing");
}

#[test]
fn tier_missed_days_override_everything() {
    let output = voltguard()
        .args(["--format", "raw", "tier", "--streak", "30", "--efficiency", "95", "--missed", "3"])
        .output()
        .expect("tier should run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Low Activity");
}

#[test]
fn streak_summarises_stdin_snapshot() {
    let snapshot = r#"{
        "currentStreak": 5,
        "bestStreak": 9,
        "missedDays": 0,
        "weeklyUsage": [
            {"day": "Monday", "usage": 80, "efficiency": 70},
            {"day": "Tuesday", "usage": 90, "efficiency": 50}
        ],
        "petName": "Watt"
    }"#;
    let output = run_streak(snapshot, &[]);

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("streak should emit json");
    assert_eq!(summary["tier"], "Steady");
    assert_eq!(summary["avgEfficiency"], 60.0);
    assert_eq!(summary["weeklyGoalsMet"], 2);
    assert_eq!(summary["pet"]["name"], "Watt");
    assert_eq!(summary["weeklyUsage"].as_array().map(Vec::len), Some(7));
    assert_eq!(summary["daysToNextTier"], 6);
    assert_eq!(summary["nextTierHint"], "6 more days to High Performer!");
}

#[test]
fn streak_without_efficiency_data_honours_missed_days() {
    let output = run_streak(r#"{"currentStreak":5,"missedDays":5}"#, &[]);

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("streak should emit json");
    assert_eq!(summary["tier"], "Low Activity");
    assert_eq!(summary["pet"]["animationState"], "sleeping");
}

#[test]
fn streak_falls_back_on_malformed_snapshot() {
    let output = run_streak("{ definitely not json", &[]);

    assert!(output.status.success());
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("streak should emit json");
    assert_eq!(summary["tier"], "Starter");
    assert_eq!(summary["pet"]["name"], "Sparky");
}

#[test]
fn streak_strict_rejects_malformed_snapshot() {
    let output = run_streak("{ definitely not json", &["--strict"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn watch_pulls_frames_and_writes_latest() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    let server = serve_frames(listener, vec![JPEG_A, JPEG_B]);

    let dir = unique_temp_dir("watch");
    let frame_path = dir.join("latest.jpg");
    let output = voltguard()
        .args(["--format", "json", "watch", "--count", "2", "--addr"])
        .arg(addr.to_string())
        .arg("--output")
        .arg(&frame_path)
        .output()
        .expect("watch should run");

    assert!(
        output.status.success(),
        "watch failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(std::fs::read(&frame_path).expect("frame should be written"), JPEG_B);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last_line = stdout.lines().last().expect("watch should print a status line");
    let status: serde_json::Value =
        serde_json::from_str(last_line).expect("status line should be json");
    assert_eq!(status["state"], "closed");
    assert_eq!(status["stats"]["framesReceived"], 2);

    let requests = server.join().expect("server thread should finish");
    assert!(requests >= 2, "server saw {requests} requests");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn watch_unreachable_server_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    drop(listener);

    let output = voltguard()
        .args(["watch", "--connect-timeout", "2s", "--addr"])
        .arg(addr.to_string())
        .output()
        .expect("watch should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&format!("frame server at {addr}")), "stderr: {stderr}");
}

/// Fill the accept queue of a listener nobody accepts on, so further
/// handshakes stall. Returns the held connections, or `None` when the
/// platform keeps completing them.
#[cfg(target_os = "linux")]
fn saturate_backlog(listener: &TcpListener) -> Option<Vec<TcpStream>> {
    let addr = listener.local_addr().expect("listener should have an address");
    let mut held = Vec::new();
    for _ in 0..4096 {
        match TcpStream::connect_timeout(&addr, Duration::from_millis(200)) {
            Ok(stream) => held.push(stream),
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => return Some(held),
            Err(_) => return None,
        }
    }
    None
}

#[cfg(target_os = "linux")]
#[test]
fn watch_connect_timeout_exits_124() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    let Some(_held) = saturate_backlog(&listener) else {
        eprintln!("accept queue never filled; skipping");
        return;
    };

    let output = voltguard()
        .args(["watch", "--connect-timeout", "1s", "--addr"])
        .arg(addr.to_string())
        .output()
        .expect("watch should run");

    assert_eq!(output.status.code(), Some(124));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timed out"), "stderr: {stderr}");
}

#[test]
fn version_prints_package_version() {
    let output = voltguard()
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("voltguard {}", env!("CARGO_PKG_VERSION"))
    );
}
