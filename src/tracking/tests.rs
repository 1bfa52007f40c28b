use super::storage::{InMemoryBackend, JsonFileBackend, TrackingBackend};
use super::*;
use crate::config::ConfigTree;
use crate::fold::assign;

fn tracker() -> ExperimentTracker<InMemoryBackend> {
    ExperimentTracker::new("jigsaw", InMemoryBackend::new()).unwrap()
}

#[test]
fn test_start_run_numbers_sequentially() {
    let mut t = tracker();
    assert_eq!(t.start_run(None).unwrap(), "run-1");
    assert_eq!(t.start_run(Some("second")).unwrap(), "run-2");
}

#[test]
fn test_fold_run_records_fold_and_name() {
    let mut t = tracker();
    let id = t.start_fold_run(3).unwrap();
    let run = t.get_run(&id).unwrap();
    assert_eq!(run.fold, Some(3));
    assert_eq!(run.run_name.as_deref(), Some("fold-3"));
    assert_eq!(run.status, RunStatus::Active);
}

#[test]
fn test_experiment_tags_inherited() {
    let mut t = tracker();
    t.add_tag("dataset", "ruddit");
    let id = t.start_run(None).unwrap();
    assert_eq!(t.get_run(&id).unwrap().tags["dataset"], "ruddit");
}

#[test]
fn test_end_run_persists() {
    let mut t = tracker();
    let id = t.start_run(None).unwrap();
    t.log_metric(&id, "val/loss", 0.5, 1).unwrap();
    t.end_run(&id, RunStatus::Completed).unwrap();

    let stored = t.backend().load_run(&id).unwrap();
    assert_eq!(stored.status, RunStatus::Completed);
    assert!(stored.end_time_ms.is_some());
    assert_eq!(stored.last_metric("val/loss"), Some(0.5));
}

#[test]
fn test_log_to_ended_run_fails() {
    let mut t = tracker();
    let id = t.start_run(None).unwrap();
    t.end_run(&id, RunStatus::Completed).unwrap();
    let err = t.log_param(&id, "lr", "1e-5").unwrap_err();
    assert!(matches!(err, TrackingError::RunNotActive(_)));
}

#[test]
fn test_end_unknown_run() {
    let mut t = tracker();
    assert!(matches!(
        t.end_run("run-99", RunStatus::Failed),
        Err(TrackingError::RunNotFound(_))
    ));
}

#[test]
fn test_cv_score_averages_completed_folds() {
    let mut t = tracker();
    for (fold, loss) in [(0, 0.2), (1, 0.4)] {
        let id = t.start_fold_run(fold).unwrap();
        t.log_metric(&id, "val/loss", 9.0, 0).unwrap();
        t.log_metric(&id, "val/loss", loss, 1).unwrap();
        t.end_run(&id, RunStatus::Completed).unwrap();
    }
    let failed = t.start_fold_run(2).unwrap();
    t.log_metric(&failed, "val/loss", 100.0, 1).unwrap();
    t.end_run(&failed, RunStatus::Failed).unwrap();

    let score = t.cv_score("val/loss").unwrap().unwrap();
    assert!((score - 0.3).abs() < 1e-12);
    assert_eq!(t.cv_score("val/acc").unwrap(), None);
}

#[test]
fn test_json_backend_roundtrip_and_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let runs_dir = dir.path().join("runs");

    let mut t = ExperimentTracker::new("jigsaw", JsonFileBackend::new(&runs_dir)).unwrap();
    let id = t.start_fold_run(0).unwrap();
    t.log_param(&id, "model/lr", "3e-5").unwrap();
    t.end_run(&id, RunStatus::Completed).unwrap();
    assert!(runs_dir.join("run-1.json").exists());

    let mut resumed = ExperimentTracker::new("jigsaw", JsonFileBackend::new(&runs_dir)).unwrap();
    assert_eq!(resumed.start_run(None).unwrap(), "run-2");
    let loaded = resumed.get_run("run-1").unwrap();
    assert_eq!(loaded.params["model/lr"], "3e-5");
    assert_eq!(loaded.fold, Some(0));
}

#[test]
fn test_json_backend_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = JsonFileBackend::new(dir.path());
    let mut t = ExperimentTracker::new("x", InMemoryBackend::new()).unwrap();
    let id = t.start_run(None).unwrap();
    backend.save_run(&t.get_run(&id).unwrap()).unwrap();

    backend.delete_run(&id).unwrap();
    assert!(backend.list_runs().unwrap().is_empty());
    assert!(backend.delete_run(&id).is_err());
}

#[test]
fn test_json_backend_stray_file_keeps_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let runs_dir = dir.path().join("runs");

    let mut t = ExperimentTracker::new("jigsaw", JsonFileBackend::new(&runs_dir)).unwrap();
    let id = t.start_fold_run(0).unwrap();
    t.log_param(&id, "model/lr", "3e-5").unwrap();
    t.end_run(&id, RunStatus::Completed).unwrap();
    std::fs::write(runs_dir.join("notes.json"), "{\"note\": \"baseline\"}").unwrap();

    let mut resumed = ExperimentTracker::new("jigsaw", JsonFileBackend::new(&runs_dir)).unwrap();
    let id = resumed.start_fold_run(1).unwrap();
    assert_eq!(id, "run-2");
    resumed.end_run(&id, RunStatus::Completed).unwrap();

    let first = JsonFileBackend::new(&runs_dir).load_run("run-1").unwrap();
    assert_eq!(first.fold, Some(0));
    assert_eq!(first.params["model/lr"], "3e-5");
}

#[test]
fn test_new_fails_when_runs_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("runs");
    std::fs::write(&not_a_dir, "plain file").unwrap();

    let err = ExperimentTracker::new("jigsaw", JsonFileBackend::new(&not_a_dir)).unwrap_err();
    assert!(matches!(err, TrackingError::Storage(_)));
}

#[test]
fn test_list_runs_numeric_order() {
    let mut t = tracker();
    for _ in 0..11 {
        let id = t.start_run(None).unwrap();
        t.end_run(&id, RunStatus::Completed).unwrap();
    }
    let expected: Vec<String> = (1..=11).map(|n| format!("run-{n}")).collect();

    let ids: Vec<String> = t.list_runs().unwrap().into_iter().map(|r| r.run_id).collect();
    assert_eq!(ids, expected);
    let stored: Vec<String> = t
        .backend()
        .list_runs()
        .unwrap()
        .into_iter()
        .map(|r| r.run_id)
        .collect();
    assert_eq!(stored, expected);
}

#[test]
fn test_json_backend_lists_in_numeric_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = ExperimentTracker::new("jigsaw", JsonFileBackend::new(dir.path())).unwrap();
    for _ in 0..10 {
        let id = t.start_run(None).unwrap();
        t.end_run(&id, RunStatus::Completed).unwrap();
    }
    let runs = t.backend().list_runs().unwrap();
    assert_eq!(runs[1].run_id, "run-2");
    assert_eq!(runs[9].run_id, "run-10");
}

#[test]
fn test_hyperparameters_flatten_sections() {
    let tree = ConfigTree::from_yaml_str(
        "seed: 7\nmodel:\n  lr: 3.0e-5\n  pretrained: roberta-base\ntrainer:\n  max_epochs: ${datamodule.epochs}\ndatamodule:\n  epochs: 4\nlogger:\n  name: wandb\n",
        "test",
    )
    .unwrap();

    let params = hyperparameters(&tree).unwrap();
    assert_eq!(params["seed"], "7");
    assert_eq!(params["model/pretrained"], "roberta-base");
    assert_eq!(params["trainer/max_epochs"], "4");
    assert!(params.keys().all(|k| !k.starts_with("logger")));
    assert!(!params.contains_key("callbacks"));
}

#[test]
fn test_hyperparameters_missing_section_is_null() {
    let tree = ConfigTree::from_yaml_str("model:\n  lr: 1\n", "test").unwrap();
    let params = hyperparameters(&tree).unwrap();
    assert_eq!(params["trainer"], "null");
    assert_eq!(params["datamodule"], "null");
}

#[test]
fn test_log_fold_split_sizes() {
    let assignment = assign(10, 5, 42).unwrap();
    let split = assignment.split(1).unwrap();

    let mut t = tracker();
    let id = t.start_fold_run(1).unwrap();
    log_fold_split(&mut t, &id, &split, 5).unwrap();

    let run = t.get_run(&id).unwrap();
    assert_eq!(run.params["fold/k_fold"], "5");
    assert_eq!(run.params["fold/current_fold"], "1");
    assert_eq!(run.last_metric("fold/train_size"), Some(8.0));
    assert_eq!(run.last_metric("fold/val_size"), Some(2.0));
}
