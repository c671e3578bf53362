//! Integration tests for channel registration and writes
//!
//! Exercises the registry from many threads at once, the way independent
//! observer units use it.

use observer_log::{ChannelRegistry, Platform, RegistrySettings, RetryPolicy};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// =============================================================================
// Helpers
// =============================================================================

fn registry(dir: &Path) -> Arc<ChannelRegistry> {
    Arc::new(ChannelRegistry::new(RegistrySettings {
        base_path: Some(dir.to_string_lossy().to_string()),
        platform: Platform::Posix,
        flush_interval: Duration::from_millis(20),
        retry: RetryPolicy::new(3, Duration::from_millis(5)),
        ..RegistrySettings::default()
    }))
}

fn files_under(dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            found.extend(files_under(&path));
        } else {
            found.push(path.to_string_lossy().to_string());
        }
    }
    found
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_concurrent_first_use_registers_once() {
    let tmp = tempfile::tempdir().unwrap();
    let reg = registry(tmp.path());
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let reg = reg.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let channel = reg.get_or_create_channel("NodeObserver", None).unwrap();
                channel.error(format_args!("worker {}", i));
                channel.path().to_path_buf()
            })
        })
        .collect();

    let paths: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(paths.len(), 1);
    assert_eq!(reg.len(), 1);

    assert!(reg.flush_all());
    assert_eq!(files_under(tmp.path()).len(), 1);

    let content = fs::read_to_string(paths.iter().next().unwrap()).unwrap();
    assert_eq!(content.lines().count(), 16);
}

#[test]
fn test_concurrent_distinct_names() {
    let tmp = tempfile::tempdir().unwrap();
    let reg = registry(tmp.path());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let reg = reg.clone();
            thread::spawn(move || {
                let name = format!("Observer{}", i % 4);
                let channel = reg.get_or_create_channel(&name, None).unwrap();
                for n in 0..50 {
                    channel.warn(format_args!("{} sample {}", name, n));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(reg.len(), 4);
    assert!(reg.flush_all());

    for i in 0..4 {
        let name = format!("Observer{}", i);
        let path = tmp.path().join(&name).join(format!("{}.log", name));
        let content = fs::read_to_string(&path).unwrap();
        // Two threads per name, fifty lines each, no torn lines.
        assert_eq!(content.lines().count(), 100);
        assert!(content.lines().all(|l| l.contains("--WARN--") && l.contains(&name)));
    }
}

#[test]
fn test_verbosity_gating_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let reg = registry(tmp.path());

    let quiet = reg.get_or_create_channel("Quiet", None).unwrap();
    let chatty = reg.get_or_create_channel("Chatty", None).unwrap();
    chatty.set_verbose(true);

    quiet.info("X");
    chatty.info("X");
    assert!(reg.flush_all());

    assert!(!quiet.path().exists());
    let content = fs::read_to_string(chatty.path()).unwrap();
    assert!(content.contains("X"));
}

#[test]
fn test_shutdown_drops_later_writes() {
    let tmp = tempfile::tempdir().unwrap();
    let reg = registry(tmp.path());
    let channel = reg.get_or_create_channel("AppObserver", None).unwrap();

    channel.warn("kept");
    reg.shutdown_all();
    let before = fs::read_to_string(channel.path()).unwrap();

    let writer = {
        let reg = reg.clone();
        thread::spawn(move || {
            let late = reg.get_or_create_channel("AppObserver", None);
            assert!(late.is_err());
        })
    };
    writer.join().unwrap();

    channel.warn("dropped");
    channel.error("dropped");
    reg.shutdown_all();
    assert!(!reg.flush_all());

    assert_eq!(fs::read_to_string(channel.path()).unwrap(), before);
}

#[test]
fn test_retry_file_ops_alongside_channels() {
    let tmp = tempfile::tempdir().unwrap();
    let reg = registry(tmp.path());
    let channel = reg.get_or_create_channel("FabricSystemObserver", None).unwrap();

    let report = tmp.path().join("reports").join("fso.txt");
    assert!(channel.write_file(&report, "handles=1200").unwrap());
    assert!(!channel.write_file(&report, "").unwrap());
    assert_eq!(fs::read_to_string(&report).unwrap(), "handles=1200");

    channel.warn("report written");
    assert!(channel.flush());
    assert!(channel.delete_log_file().unwrap());
    assert!(!channel.delete_log_file().unwrap());
}

#[test]
fn test_delete_log_file_under_concurrent_writes() {
    let tmp = tempfile::tempdir().unwrap();
    let reg = registry(tmp.path());

    for round in 0..20 {
        let channel = Arc::new(reg.get_or_create_channel("NetworkObserver", None).unwrap());
        let writer = {
            let channel = channel.clone();
            thread::spawn(move || {
                for n in 0..200 {
                    channel.warn(format_args!("round {} sample {}", round, n));
                }
            })
        };
        channel.delete_log_file().unwrap();
        writer.join().unwrap();

        let marker = format!("marker {}", round);
        channel.error(&marker);
        assert!(channel.flush());
        let content = fs::read_to_string(channel.path()).unwrap();
        assert!(content.contains(&marker), "round {}", round);
    }
}
