//! End-to-end tests for the `scrape_utils` binary.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::Duration;

/// The binary with proxies cleared so localhost requests go direct.
fn raw_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scrape_utils"));
    for var in ["HTTP_PROXY", "http_proxy", "HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"] {
        cmd.env_remove(var);
    }
    cmd
}

fn bin() -> Command {
    let mut cmd = raw_bin();
    cmd.args(["--log-format", "json", "--log-level", "error"]);
    cmd
}

fn stdout_of(args: &[&str]) -> String {
    let output = bin().args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_slug_and_deslug() {
    assert_eq!(stdout_of(&["slug", "Café de Flore"]).trim(), "cafe-de-flore");
    assert_eq!(stdout_of(&["deslug", "cafe-de_flore"]).trim(), "cafe de flore");
}

#[test]
fn test_coords_accepts_negative_latitude() {
    let yaml = stdout_of(&["coords", "--lat", "-33.86", "--lon", "151.2", "--radius", "500"]);
    assert_eq!(yaml.matches("latitude:").count(), 6);
    assert_eq!(yaml.matches("longitude:").count(), 6);
}

#[test]
fn test_extract_id() {
    let id = stdout_of(&[
        "extract-id",
        "places/abc123/reviews/rev9",
        "--kind",
        "reviews",
    ]);
    assert_eq!(id.trim(), "rev9");
}

#[test]
fn test_extract_id_missing_exits_one() {
    let output = bin()
        .args(["extract-id", "places/abc123", "--kind", "photos"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no photos id"));
}

#[test]
fn test_random_string_default_length() {
    let token = stdout_of(&["random-string"]);
    let token = token.trim();
    assert_eq!(token.len(), 256);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

    assert_eq!(stdout_of(&["random-string", "--length", "12"]).trim().len(), 12);
}

#[test]
fn test_yaml_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("place.json");
    std::fs::write(&path, r#"{"name": "Pizza Place", "tags": ["pizza", "pasta"]}"#).unwrap();

    let yaml = stdout_of(&["yaml", path.to_str().unwrap(), "--indent", "4"]);

    assert!(yaml.contains("    name: Pizza Place"), "got:\n{}", yaml);
    assert!(yaml.contains("    - pizza"), "got:\n{}", yaml);
}

#[test]
fn test_invalid_timeout_is_rejected() {
    let output = bin()
        .args(["--shutdown-timeout-secs", "0", "slug", "x"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_fetch_images_flushes_failed_urls_on_normal_exit() {
    let dir = tempfile::tempdir().unwrap();
    let urls = dir.path().join("urls.txt");
    // Port 9 on localhost refuses connections, so every download fails fast.
    std::fs::write(&urls, "# images\nhttp://127.0.0.1:9/a.png\n\nhttp://127.0.0.1:9/b.png\n").unwrap();
    let unsaved = dir.path().join("unsaved.json");
    let out_dir = dir.path().join("images");

    let output = bin()
        .args(["--unsaved-path", unsaved.to_str().unwrap()])
        .args(["fetch-images", urls.to_str().unwrap()])
        .args(["--out-dir", out_dir.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let pending: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&unsaved).unwrap()).unwrap();
    assert_eq!(pending, vec!["http://127.0.0.1:9/a.png", "http://127.0.0.1:9/b.png"]);
    assert!(out_dir.join("manifest.yaml").exists());
}

#[cfg(unix)]
#[test]
fn test_fetch_images_writes_manifest_on_sigterm() {
    // Accepts connections and never answers, so the download hangs.
    let server = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = server.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in server.incoming().flatten() {
            held.push(stream);
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let urls = dir.path().join("urls.txt");
    std::fs::write(&urls, format!("http://{}/slow.png\n", addr)).unwrap();
    let out_dir = dir.path().join("images");

    let mut child = raw_bin()
        .args(["--log-format", "json", "--log-level", "info"])
        .args(["fetch-images", urls.to_str().unwrap()])
        .args(["--out-dir", out_dir.to_str().unwrap()])
        .stderr(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();

    let stderr = child.stderr.take().unwrap();
    let mut lines = BufReader::new(stderr).lines();
    let installed = lines
        .by_ref()
        .map_while(Result::ok)
        .any(|line| line.contains("Installed SIGINT/SIGTERM handlers"));
    assert!(installed, "signal handlers were never installed");

    std::thread::sleep(Duration::from_millis(100));
    let status = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    // Drain the rest of stderr so the child never blocks on a full pipe.
    let drain = std::thread::spawn(move || lines.map_while(Result::ok).count());
    let exit = child.wait().unwrap();
    drain.join().unwrap();

    assert_eq!(exit.code(), Some(0));
    let manifest = std::fs::read_to_string(out_dir.join("manifest.yaml")).unwrap();
    assert_eq!(manifest.trim(), "[]");
}
