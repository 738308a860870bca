use artifact_merge_core::collector::{ArtifactCollector, CollectOptions};
use artifact_merge_core::contract::{MockArtifactSink, MockCandidateSource, WrittenArtifact};
use artifact_merge_core::naming::NamingRules;
use artifact_merge_core::CollectError;
use std::path::{Path, PathBuf};

fn written(source: &Path, destination: &Path, name: &str) -> WrittenArtifact {
    WrittenArtifact {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        canonical_name: name.to_string(),
        bytes: 0,
        sha256: String::new(),
    }
}

#[test]
fn apply_passes_clear_flag_and_flattened_targets() {
    let collector = ArtifactCollector::new(
        NamingRules::profile_defaults("ns"),
        CollectOptions {
            exclude_timestamped: true,
            clear_destination_before_copy: true,
        },
    );
    let plan = collector.plan(["deep/dir/x-baseline-prof.txt"]);

    let mut sink = MockArtifactSink::new();
    sink.expect_prepare()
        .withf(|dest, clear| dest.to_path_buf() == PathBuf::from("/out") && *clear)
        .times(1)
        .returning(|_, _| Ok(()));
    sink.expect_write()
        .withf(|src, dst, name| {
            src.to_path_buf() == PathBuf::from("deep/dir/x-baseline-prof.txt")
                && dst.to_path_buf() == PathBuf::from("/out/baseline-prof.txt")
                && name.to_string() == "baseline-prof.txt"
        })
        .times(1)
        .returning(|src, dst, name| Ok(written(src, dst, name)));

    let applied = collector.apply(&plan, Path::new("/out"), &sink).unwrap();
    assert_eq!(applied.written.len(), 1);
    assert_eq!(applied.destination, PathBuf::from("/out"));
}

#[test]
fn apply_stops_at_first_failure() {
    let collector = ArtifactCollector::new(NamingRules::profile_defaults("ns"), CollectOptions::default());
    let plan = collector.plan(["a-baseline-prof.txt", "a-startup-prof.txt", "ns-benchmarkData.json"]);

    let mut sink = MockArtifactSink::new();
    sink.expect_prepare()
        .withf(|_, clear| !*clear)
        .times(1)
        .returning(|_, _| Ok(()));
    sink.expect_write()
        .withf(|_, _, name| name.to_string() == "baseline-prof.txt")
        .times(1)
        .returning(|src, dst, name| Ok(written(src, dst, name)));
    sink.expect_write()
        .withf(|_, _, name| name.to_string() == "startup-prof.txt")
        .times(1)
        .returning(|src, _, _| {
            Err(CollectError::io(
                src,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ))
        });
    // The benchmark entry is never attempted.
    sink.expect_write()
        .withf(|_, _, name| name.to_string() == "ns-benchmarkData.json")
        .times(0);

    let err = collector.apply(&plan, Path::new("/out"), &sink).unwrap_err();
    assert!(matches!(err, CollectError::Io { ref path, .. } if path == Path::new("a-startup-prof.txt")));
}

#[test]
fn prepare_failure_means_no_writes() {
    let collector = ArtifactCollector::new(NamingRules::profile_defaults("ns"), CollectOptions::default());
    let plan = collector.plan(["a-baseline-prof.txt"]);

    let mut sink = MockArtifactSink::new();
    sink.expect_prepare().times(1).returning(|dest, _| {
        Err(CollectError::io(
            dest,
            std::io::Error::new(std::io::ErrorKind::Other, "read-only filesystem"),
        ))
    });
    sink.expect_write().times(0);

    assert!(collector.apply(&plan, Path::new("/ro"), &sink).is_err());
}

#[test]
fn collect_propagates_source_errors_before_touching_sink() {
    let collector = ArtifactCollector::new(NamingRules::profile_defaults("ns"), CollectOptions::default());

    let mut source = MockCandidateSource::new();
    source.expect_list_candidates().times(1).returning(|| {
        Err(CollectError::io(
            "/results",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        ))
    });
    let mut sink = MockArtifactSink::new();
    sink.expect_prepare().times(0);

    assert!(collector.collect(&source, Path::new("/out"), &sink).is_err());
}

#[test]
fn collect_reports_plan_and_discards() {
    let collector = ArtifactCollector::new(NamingRules::profile_defaults("ns"), CollectOptions::default());

    let mut source = MockCandidateSource::new();
    source.expect_list_candidates().returning(|| {
        Ok(vec![
            PathBuf::from("r/a-startup-prof.txt"),
            PathBuf::from("r/a-startup-prof-2024-01-01-00-00-00.txt"),
            PathBuf::from("r/readme.md"),
        ])
    });
    let mut sink = MockArtifactSink::new();
    sink.expect_prepare().returning(|_, _| Ok(()));
    sink.expect_write()
        .returning(|src, dst, name| Ok(written(src, dst, name)));

    let report = collector.collect(&source, Path::new("/out"), &sink).unwrap();
    assert_eq!(report.candidates, 3);
    assert_eq!(report.planned.len(), 1);
    assert_eq!(report.discarded.len(), 2);
    assert_eq!(report.applied.written[0].canonical_name, "startup-prof.txt");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["discarded"][0]["reason"], "timestamped");
    assert_eq!(json["discarded"][1]["reason"], "no_matching_rule");
}
