//! Ticket space lifecycle integration tests.
//!
//! These tests drive a ticket space the way a worker would:
//! generate -> save -> select -> load -> remove, plus expiration.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use ticketer_core::{
    load_config_from_str, spawn_expiration_task,
    testing::{backdate, decode_sequence},
    SequenceState, TicketSpace,
};

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Test helper owning the temp directory for the lifetime of the space.
struct TestHarness {
    space: Arc<TicketSpace>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let space = Arc::new(TicketSpace::new(temp_dir.path().join("spool")));
        Self {
            space,
            _temp_dir: temp_dir,
        }
    }

    fn sequencing() -> Self {
        let harness = Self::new();
        harness.space.enable_sequencing();
        harness
    }
}

#[test]
fn test_store_and_retrieve_scenario() {
    let harness = TestHarness::new();
    let space = &harness.space;

    let ticket = space.generate();
    let (saved, ok) = space.save(Some(&ticket), &b"hello"[..]);
    assert!(ok);
    assert_eq!(saved, ticket);

    let mut out = Vec::new();
    assert!(space.load(&ticket, &mut out));
    assert_eq!(String::from_utf8(out).unwrap(), "hello");

    assert!(space.remove(&ticket));
    assert!(!space.load(&ticket, &mut Vec::new()));
}

#[test]
fn test_sequencing_scenario() {
    let harness = TestHarness::new();
    let space = &harness.space;

    space.enable_sequencing();
    let sequences: Vec<u32> = (0..3)
        .map(|_| decode_sequence(&space.generate()).unwrap())
        .collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[test]
fn test_enable_sequencing_twice_is_noop() {
    let harness = TestHarness::new();
    let space = &harness.space;

    space.enable_sequencing().enable_sequencing();
    assert_eq!(space.sequence_state(), SequenceState::Sequencing(0));
    assert_eq!(decode_sequence(&space.generate()), Some(1));
}

#[test]
fn test_concurrent_generation_yields_contiguous_sequences() {
    let harness = TestHarness::sequencing();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let space = Arc::clone(&harness.space);
            thread::spawn(move || (0..250).map(|_| space.generate()).collect::<Vec<_>>())
        })
        .collect();

    let mut sequences = HashSet::new();
    for handle in handles {
        for ticket in handle.join().unwrap() {
            assert!(sequences.insert(decode_sequence(&ticket).unwrap()));
        }
    }

    let expected: HashSet<u32> = (1..=4000).collect();
    assert_eq!(sequences, expected);
}

#[test]
fn test_random_tickets_do_not_repeat() {
    let harness = TestHarness::new();
    let tickets: HashSet<String> = (0..10_000).map(|_| harness.space.generate()).collect();
    assert_eq!(tickets.len(), 10_000);
}

#[test]
fn test_worker_drains_queue() {
    let harness = TestHarness::sequencing();
    let space = &harness.space;

    let mut expected = HashSet::new();
    for i in 0..20 {
        let (ticket, ok) = space.save(None, format!("job-{}", i).as_bytes());
        assert!(ok);
        expected.insert(ticket);
    }

    let mut processed = HashSet::new();
    while let Some(path) = space.next(false) {
        let ticket = path.file_name().unwrap().to_str().unwrap().to_string();
        let mut payload = Vec::new();
        assert!(space.load(&ticket, &mut payload));
        assert!(String::from_utf8(payload).unwrap().starts_with("job-"));
        assert!(space.remove(&ticket));
        processed.insert(ticket);
    }

    assert_eq!(processed, expected);
}

#[test]
fn test_expiration_keeps_fresh_entries() {
    let harness = TestHarness::new();
    let space = &harness.space;

    let (stale, _) = space.save(None, &b"stale"[..]);
    let (fresh, _) = space.save(None, &b"fresh"[..]);
    backdate(&space.path().join(&stale), 3 * HOUR).unwrap();
    backdate(&space.path().join(&fresh), HOUR / 2).unwrap();

    let report = space.expire(Some(2 * HOUR)).unwrap();
    assert_eq!(report.removed, 1);
    assert!(!space.load(&stale, &mut Vec::new()));
    assert!(space.load(&fresh, &mut Vec::new()));
}

#[tokio::test]
async fn test_background_expiration_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let toml = format!(
        r#"
[space]
path = "{}"
ttl_secs = 7200
sequencing = true
"#,
        temp_dir.path().join("configured").display()
    );
    let config = load_config_from_str(&toml).unwrap();
    let space = Arc::new(TicketSpace::from_config(&config.space));

    let (old, _) = space.save(None, &b"old"[..]);
    let (young, _) = space.save(None, &b"young"[..]);
    backdate(&space.path().join(&old), 3 * HOUR).unwrap();
    backdate(&space.path().join(&young), HOUR).unwrap();

    let (cancel, handle) = spawn_expiration_task(Arc::clone(&space), config.sweeper.interval());
    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("expiration task did not stop")
        .unwrap();

    assert!(!space.path().join(&old).exists());
    assert!(space.path().join(&young).exists());
    assert_eq!(space.ttl(), 2 * HOUR);
}
