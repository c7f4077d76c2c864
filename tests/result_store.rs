mod common;

use std::sync::Arc;

use rankpred::infrastructure::{JsonFileBackend, ShiftBackend};
use rankpred::models::{ShiftId, UpsertOutcome};
use rankpred::ResultStore;
use tempfile::TempDir;

use common::{identity, single_subject, single_subject_sheet};

const EXAM: &str = "SSC_CGL_2024";

fn shift() -> ShiftId {
    ShiftId::from_tokens("21/04/2024", "9:00 AM - 10:00 AM")
}

fn ranks_by_roll(records: &[rankpred::CandidateRecord]) -> Vec<(String, Option<u32>)> {
    let mut ranks: Vec<_> = records
        .iter()
        .map(|r| (r.identity.roll.clone(), r.rank))
        .collect();
    ranks.sort();
    ranks
}

#[tokio::test]
async fn tied_scores_share_a_rank() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::json(dir.path());

    for (roll, marks) in [("R1", 90.0), ("R2", 90.0), ("R3", 80.0)] {
        store
            .upsert(EXAM, &shift(), identity(roll, roll), single_subject_sheet(marks), &single_subject())
            .await
            .unwrap();
    }

    let records = store.all(EXAM, &shift()).await.unwrap();
    assert_eq!(
        ranks_by_roll(&records),
        vec![
            ("R1".to_string(), Some(1)),
            ("R2".to_string(), Some(1)),
            ("R3".to_string(), Some(3)),
        ]
    );
}

#[tokio::test]
async fn resubmission_overwrites_and_reranks() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::json(dir.path());

    store
        .upsert(EXAM, &shift(), identity("Asha", "R1"), single_subject_sheet(50.0), &single_subject())
        .await
        .unwrap();
    store
        .upsert(EXAM, &shift(), identity("Ravi", "R2"), single_subject_sheet(60.0), &single_subject())
        .await
        .unwrap();

    let report = store
        .upsert(EXAM, &shift(), identity("Asha", "R1"), single_subject_sheet(70.0), &single_subject())
        .await
        .unwrap();
    assert_eq!(report.outcome, UpsertOutcome::Updated);
    assert_eq!(report.rank, 1);
    assert_eq!(report.total_candidates, 2);

    let records = store.all(EXAM, &shift()).await.unwrap();
    let asha = records.iter().find(|r| r.roll() == "R1").unwrap();
    assert_eq!(asha.final_marks, 70.0);
    assert_eq!(asha.recomputed_final(), asha.final_marks);
    assert_eq!(
        ranks_by_roll(&records),
        vec![("R1".to_string(), Some(1)), ("R2".to_string(), Some(2))]
    );
}

#[tokio::test]
async fn identical_resubmission_keeps_one_record() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::json(dir.path());

    for _ in 0..3 {
        store
            .upsert(EXAM, &shift(), identity("Asha", "R1"), single_subject_sheet(42.5), &single_subject())
            .await
            .unwrap();
    }

    let records = store.all(EXAM, &shift()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rank, Some(1));
    assert_eq!(records[0].final_marks, 42.5);
}

#[tokio::test]
async fn roll_numbers_are_trimmed_before_matching() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::json(dir.path());

    store
        .upsert(EXAM, &shift(), identity("Asha", "R1"), single_subject_sheet(10.0), &single_subject())
        .await
        .unwrap();
    let report = store
        .upsert(EXAM, &shift(), identity("Asha", " R1 "), single_subject_sheet(20.0), &single_subject())
        .await
        .unwrap();

    assert_eq!(report.outcome, UpsertOutcome::Updated);
    let records = store.all(EXAM, &shift()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].roll(), "R1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_to_one_shift_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ResultStore::json(dir.path()));

    let handles: Vec<_> = (0..24)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let roll = format!("R{:02}", i);
                store
                    .upsert(
                        EXAM,
                        &shift(),
                        identity(&roll, &roll),
                        single_subject_sheet(f64::from(i % 6) * 10.0),
                        &single_subject(),
                    )
                    .await
            })
        })
        .collect();

    for joined in futures::future::join_all(handles).await {
        joined.unwrap().unwrap();
    }

    let records = store.all(EXAM, &shift()).await.unwrap();
    assert_eq!(records.len(), 24);

    // 名次 = 1 + 严格高分人数
    for record in &records {
        let higher = records
            .iter()
            .filter(|other| other.final_marks > record.final_marks)
            .count() as u32;
        assert_eq!(record.rank, Some(higher + 1), "准考证号 {}", record.roll());
    }
}

#[tokio::test]
async fn shifts_are_independent_partitions() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::json(dir.path());
    let morning = shift();
    let evening = ShiftId::from_tokens("21/04/2024", "3:00 PM - 4:00 PM");

    store
        .upsert(EXAM, &morning, identity("Asha", "R1"), single_subject_sheet(10.0), &single_subject())
        .await
        .unwrap();
    let report = store
        .upsert(EXAM, &evening, identity("Ravi", "R2"), single_subject_sheet(5.0), &single_subject())
        .await
        .unwrap();

    assert_eq!(report.rank, 1);
    assert_eq!(report.total_candidates, 1);
    assert_eq!(store.shifts(EXAM).await.unwrap().len(), 2);

    let found = store.find_by_roll(EXAM, "R2").await.unwrap().unwrap();
    assert_eq!(found.shift_id, evening);
    assert_eq!(found.total_candidates, 1);
    assert!(store.find_by_roll(EXAM, "R9").await.unwrap().is_none());
}

#[tokio::test]
async fn tables_survive_reopening() {
    let dir = TempDir::new().unwrap();
    {
        let store = ResultStore::json(dir.path());
        store
            .upsert(EXAM, &shift(), identity("Asha", "R1"), single_subject_sheet(33.0), &single_subject())
            .await
            .unwrap();
    }

    let backend = JsonFileBackend::new(dir.path());
    let path = backend.table_path(EXAM, &shift());
    assert!(path.ends_with("responses_21-04-2024_9-00AM-10-00AM.json"));

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let columns: Vec<&str> = raw["columns"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c.as_str())
        .collect();
    assert_eq!(columns.first(), Some(&"Name"));
    assert!(columns.contains(&"Reasoning_Marks"));
    assert_eq!(columns.last(), Some(&"Rank"));

    let table = backend.load(EXAM, &shift()).unwrap().unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.records[0].rank, Some(1));
    assert_eq!(table.records[0].final_marks, 33.0);
}

#[tokio::test]
async fn manual_recompute_repairs_missing_ranks() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::json(dir.path());
    store
        .upsert(EXAM, &shift(), identity("Asha", "R1"), single_subject_sheet(10.0), &single_subject())
        .await
        .unwrap();
    store
        .upsert(EXAM, &shift(), identity("Ravi", "R2"), single_subject_sheet(20.0), &single_subject())
        .await
        .unwrap();

    // 外部直接改写的表：名次被清空
    let backend = JsonFileBackend::new(dir.path());
    let mut table = backend.load(EXAM, &shift()).unwrap().unwrap();
    for record in &mut table.records {
        record.rank = None;
    }
    backend.save(&table).unwrap();

    store.recompute_ranks(EXAM, &shift()).await.unwrap();
    assert_eq!(
        ranks_by_roll(&store.all(EXAM, &shift()).await.unwrap()),
        vec![("R1".to_string(), Some(2)), ("R2".to_string(), Some(1))]
    );
}
