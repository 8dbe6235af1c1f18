use super::*;

use branchscout_core::CardFields;

fn record(name: &str, phone: &str, region: &str) -> BranchRecord {
    BranchRecord::for_region(
        CardFields {
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            status: Some("ເປີດ".to_string()),
            rating_or_count: None,
        },
        region,
    )
}

fn two_region_aggregate() -> Aggregator {
    let mut agg = Aggregator::new();
    agg.absorb(vec![record("X", "1", "A"), record("Y", "2", "A")]);
    agg.absorb(vec![record("X", "1", "B"), record("Z", "3", "B")]);
    agg
}

fn read_records(path: &Path) -> Vec<BranchRecord> {
    let text = std::fs::read_to_string(path).expect("read output");
    serde_json::from_str(&text).expect("parse output")
}

#[test]
fn sanitize_replaces_reserved_characters() {
    assert_eq!(sanitize_file_name("a/b:c"), "a_b_c");
    assert_eq!(sanitize_file_name(r#"\*?"<>|"#), "_______");
}

#[test]
fn sanitize_preserves_lao_script() {
    assert_eq!(sanitize_file_name("ແຂວງ ຈຳປາສັກ"), "ແຂວງ ຈຳປາສັກ");
    assert_eq!(sanitize_file_name("ແຂວງ/ວຽງຈັນ"), "ແຂວງ_ວຽງຈັນ");
}

#[test]
fn flush_writes_aggregate_and_region_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("nested").join("out");
    let mut sink = OutputSink::new(&out, false);

    let report = sink.flush(&two_region_aggregate()).expect("flush");

    assert_eq!(report.records, 3);
    assert_eq!(report.region_files, vec![out.join("A.json"), out.join("B.json")]);
    assert_eq!(report.csv, None);
    assert!(!out.join(ALL_CSV).exists());

    assert_eq!(read_records(&out.join(ALL_JSON)).len(), 3);
    let b = read_records(&out.join("B.json"));
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].name.as_deref(), Some("Z"));
    assert_eq!(b[0].phone.as_deref(), Some("3"));
}

#[test]
fn json_keeps_non_ascii_unescaped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = OutputSink::new(dir.path(), false);
    let mut agg = Aggregator::new();
    agg.absorb(vec![record("ສາຂາ ໂພນທັນ", "020", "ນະຄອນຫຼວງວຽງຈັນ")]);

    sink.flush(&agg).expect("flush");

    let text = std::fs::read_to_string(dir.path().join(ALL_JSON)).expect("read");
    assert!(text.contains("ສາຂາ ໂພນທັນ"));
    assert!(text.contains("\"ratingOrCount\": null"));
    assert!(dir.path().join("ນະຄອນຫຼວງວຽງຈັນ.json").exists());
}

#[test]
fn csv_has_fixed_header_and_empty_cells_for_missing_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = OutputSink::new(dir.path(), true);
    let mut agg = Aggregator::new();
    agg.absorb(vec![record("X", "1", "A")]);

    let report = sink.flush(&agg).expect("flush");

    let text = std::fs::read_to_string(report.csv.expect("csv path")).expect("read csv");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("name,phone,status,ratingOrCount,pageUrl,region"));
    assert_eq!(lines.next(), Some("X,1,ເປີດ,,,A"));
    assert_eq!(lines.next(), None);
}

#[test]
fn repeated_flush_overwrites_previous_checkpoint() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = OutputSink::new(dir.path(), false);
    let mut agg = Aggregator::new();
    agg.absorb(vec![record("X", "1", "A")]);
    sink.flush(&agg).expect("first flush");

    agg.absorb(vec![record("Y", "2", "A")]);
    sink.flush(&agg).expect("second flush");

    assert_eq!(read_records(&dir.path().join("A.json")).len(), 2);
    assert_eq!(read_records(&dir.path().join(ALL_JSON)).len(), 2);
}

#[test]
fn paginated_records_produce_no_region_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = OutputSink::new(dir.path(), false);
    let mut agg = Aggregator::new();
    agg.absorb(vec![BranchRecord::for_page(
        CardFields {
            name: Some("X".to_string()),
            ..CardFields::default()
        },
        "https://example.com/branches?page=1",
    )]);

    let report = sink.flush(&agg).expect("flush");

    assert!(report.region_files.is_empty());
    let all = read_records(&report.all_json);
    assert_eq!(all[0].page_url.as_deref(), Some("https://example.com/branches?page=1"));
}

#[test]
fn first_flush_removes_files_from_previous_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut stale = Aggregator::new();
    stale.absorb(vec![record("Q", "9", "Old")]);
    OutputSink::new(dir.path(), true).flush(&stale).expect("previous run");
    std::fs::write(dir.path().join("notes.txt"), "keep me").expect("seed unrelated file");

    let mut sink = OutputSink::new(dir.path(), false);
    let agg = two_region_aggregate();
    sink.flush(&agg).expect("flush");

    let mut files: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["A.json", "B.json", "branches_all.json", "notes.txt"]);

    let in_region_files: usize = ["A.json", "B.json"]
        .iter()
        .map(|name| read_records(&dir.path().join(name)).len())
        .sum();
    assert_eq!(in_region_files, read_records(&dir.path().join(ALL_JSON)).len());
}

#[test]
fn later_flushes_keep_this_runs_region_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut sink = OutputSink::new(dir.path(), false);
    let mut agg = Aggregator::new();
    agg.absorb(vec![record("X", "1", "A")]);
    sink.flush(&agg).expect("first flush");

    agg.absorb(vec![record("Z", "3", "B")]);
    sink.flush(&agg).expect("second flush");

    assert_eq!(read_records(&dir.path().join("A.json")).len(), 1);
    assert_eq!(read_records(&dir.path().join("B.json")).len(), 1);
}
