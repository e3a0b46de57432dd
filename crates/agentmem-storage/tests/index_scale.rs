use std::time::{Duration, Instant};

use agentmem_core::Record;
use agentmem_storage::{MemoryStore, StorageLayout};
use tempfile::TempDir;

const TOPICS: [(&str, &str); 3] = [
    ("deploy", "rollback the canary before paging the on-call engineer"),
    ("billing", "invoices are reconciled nightly against the ledger export"),
    ("onboarding", "new hires pair with a buddy during their first sprint"),
];

fn seed_notes(store: &MemoryStore, count: usize) -> Vec<Record> {
    TOPICS
        .iter()
        .cycle()
        .take(count)
        .enumerate()
        .map(|(n, (topic, note))| {
            let record = Record::create(
                format!("note {n} about {topic}: {note}"),
                vec![topic.to_string(), "team-notes".to_string()],
            );
            store.insert(&record).expect("insert note");
            record
        })
        .collect()
}

fn p95(mut samples: Vec<Duration>) -> Duration {
    samples.sort_unstable();
    let rank = samples.len() * 95 / 100;
    samples
        .get(rank.min(samples.len().saturating_sub(1)))
        .copied()
        .unwrap_or_default()
}

#[test]
fn index_tracks_every_record_across_many_writes() {
    let dir = TempDir::new().expect("temp dir");
    let store = MemoryStore::open(StorageLayout::new(dir.path()));
    let written = seed_notes(&store, 60);

    let index = store.index().load().expect("load index");
    assert_eq!(index.get("team-notes").map(Vec::len), Some(60));
    assert_eq!(index.get("billing").map(Vec::len), Some(20));
    assert_eq!(index.get("ledger").map(Vec::len), Some(20));

    for ids in index.values() {
        for id in ids {
            assert!(store.records().exists(id), "dangling id {id}");
        }
    }

    let onboarding = store.search("onboard", 100).expect("search");
    assert_eq!(onboarding.len(), 20);
    assert!(onboarding.iter().all(|r| r.content.contains("onboarding")));
    assert!(written.iter().all(|r| store.get(&r.id).expect("get").is_some()));
}

#[test]
#[ignore]
fn search_p95_stays_low_with_2k_notes() {
    let dir = TempDir::new().expect("temp dir");
    let store = MemoryStore::open(StorageLayout::new(dir.path()));
    seed_notes(&store, 2_000);

    let samples = (0..60)
        .map(|n| {
            let query = if n % 2 == 0 { "deploy" } else { "recon" };
            let started = Instant::now();
            let _ = store.search(query, 8).expect("search");
            started.elapsed()
        })
        .collect::<Vec<_>>();

    let slowest = p95(samples);
    assert!(slowest < Duration::from_millis(300), "p95 too high: {slowest:?}");
}
