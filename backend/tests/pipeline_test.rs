use std::sync::Arc;

use romanize::{
    transliterate_one, ArtifactStore, NamePipeline, PipelineError, RuleBasedTransliterator,
    SourceScript, TargetScheme,
};
use tempfile::TempDir;

const NAMES_CSV: &str = "Name,City\nअमिताभ बच्चन,मुंबई\nशाहरुख़ ख़ान,दिल्ली\nकमला,पुणे\n";

fn rule_pipeline(dir: &TempDir) -> NamePipeline {
    NamePipeline::new(
        Arc::new(RuleBasedTransliterator::default()),
        ArtifactStore::new(dir.path().join("static")),
    )
}

#[tokio::test]
async fn test_rule_based_end_to_end() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let outcome = pipeline.run_bytes(NAMES_CSV.as_bytes(), "Name").await.unwrap();

    assert_eq!(outcome.strategy, "rule-based");
    assert_eq!(outcome.row_count, 3);
    assert_eq!(
        outcome.table.column("Names_Pronounced").unwrap(),
        vec!["Amitabh Bachchan", "Shahrukh Khan", "Kamla"]
    );

    let artifact = String::from_utf8(pipeline.store().read_latest().unwrap()).unwrap();
    let mut lines = artifact.lines();
    assert_eq!(lines.next(), Some("Name,City,Names_Pronounced"));
    assert_eq!(lines.next(), Some("अमिताभ बच्चन,मुंबई,Amitabh Bachchan"));
    assert_eq!(artifact.lines().count(), 4);
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let first = pipeline.run_bytes(NAMES_CSV.as_bytes(), "Name").await.unwrap();
    let first_bytes = pipeline.store().read_latest().unwrap();

    let second = pipeline.run_bytes(NAMES_CSV.as_bytes(), "Name").await.unwrap();
    let second_bytes = pipeline.store().read_latest().unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.receipt.run_id, second.receipt.run_id);
    assert_eq!(pipeline.store().list_runs().unwrap().len(), 1);
}

#[tokio::test]
async fn test_new_run_replaces_latest_and_keeps_history() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let first = pipeline.run_bytes(NAMES_CSV.as_bytes(), "Name").await.unwrap();
    let second = pipeline.run_bytes("Name\nराम\n".as_bytes(), "Name").await.unwrap();

    assert_ne!(first.receipt.run_id, second.receipt.run_id);
    let latest = String::from_utf8(pipeline.store().read_latest().unwrap()).unwrap();
    assert_eq!(latest, "Name,Names_Pronounced\nराम,Ram\n");

    let earlier = pipeline.store().read_run(&first.receipt.run_id).unwrap();
    assert!(String::from_utf8(earlier).unwrap().contains("Amitabh Bachchan"));
}

#[tokio::test]
async fn test_each_row_matches_single_name_transliteration() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let csv = "Name\nसीता\nमनमोहन सिंह\n\"खान, सलमान\"\nनरेंद्र मोदी\nअंबिका\n";
    let outcome = pipeline.run_bytes(csv.as_bytes(), "Name").await.unwrap();

    let originals = outcome.table.column("Name").unwrap();
    let romanized = outcome.table.column("Names_Pronounced").unwrap();
    assert_eq!(originals.len(), romanized.len());
    for (original, output) in originals.iter().zip(&romanized) {
        assert_eq!(
            output,
            &transliterate_one(original, SourceScript::Devanagari, TargetScheme::Phonetic)
        );
    }
    assert_eq!(romanized[2], "Khan, Salman");
}

#[tokio::test]
async fn test_zero_rows_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let outcome = pipeline.run_bytes(b"Name,City\n", "Name").await.unwrap();

    assert_eq!(outcome.row_count, 0);
    assert_eq!(
        pipeline.store().read_latest().unwrap(),
        b"Name,City,Names_Pronounced\n"
    );
}

#[tokio::test]
async fn test_empty_and_latin_cells_keep_their_rows() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let csv = "Name,City\n,Pune\nJohn Smith,Delhi\n१२३,Agra\n";
    let outcome = pipeline.run_bytes(csv.as_bytes(), "Name").await.unwrap();

    assert_eq!(
        outcome.table.column("Names_Pronounced").unwrap(),
        vec!["", "John Smith", "123"]
    );
}

#[tokio::test]
async fn test_invalid_column_leaves_store_empty() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let err = pipeline
        .run_bytes(NAMES_CSV.as_bytes(), "name")
        .await
        .unwrap_err();

    match err {
        PipelineError::InvalidColumn(e) => {
            assert_eq!(e.requested, "name");
            assert_eq!(e.available, vec!["Name", "City"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(pipeline.store().read_latest().is_err());
}

#[tokio::test]
async fn test_existing_output_column_is_overwritten_in_place() {
    let dir = TempDir::new().unwrap();
    let pipeline = rule_pipeline(&dir);

    let csv = "Name,Names_Pronounced,City\nराम,old,Pune\n";
    let outcome = pipeline.run_bytes(csv.as_bytes(), "Name").await.unwrap();

    assert_eq!(outcome.table.headers(), &["Name", "Names_Pronounced", "City"]);
    assert_eq!(
        pipeline.store().read_latest().unwrap(),
        "Name,Names_Pronounced,City\nराम,Ram,Pune\n".as_bytes()
    );
}

#[tokio::test]
async fn test_other_script_and_scheme() {
    let dir = TempDir::new().unwrap();
    let pipeline = NamePipeline::new(
        Arc::new(RuleBasedTransliterator::new(SourceScript::Devanagari, TargetScheme::Iast)),
        ArtifactStore::new(dir.path()),
    )
    .with_output_column("IAST");

    let outcome = pipeline
        .run_bytes("Name\nअमिताभ बच्चन\n".as_bytes(), "Name")
        .await
        .unwrap();
    assert_eq!(outcome.table.column("IAST").unwrap(), vec!["Amitābha Baccana"]);
}
