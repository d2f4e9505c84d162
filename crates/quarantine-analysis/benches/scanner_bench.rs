//! Scanner benchmarks: cold scan of generated test trees.
//!
//! Run with: cargo bench -p quarantine-analysis --bench scanner_bench

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use quarantine_analysis::dates::NoDates;
use quarantine_analysis::mutator::FunctionSelector;
use quarantine_analysis::scanner::Scanner;
use quarantine_analysis::{Mutator, SourceTree};
use quarantine_core::QuarantineConfig;
use tempfile::TempDir;

const TEAMS: &[&str] = &["network", "storage", "virt", "observability", "install_upgrade_operators"];

fn module(i: usize) -> String {
    let mut src = String::from("import pytest\nfrom quarantine_tools.constants import QUARANTINED\n\n\n");
    for j in 0..10 {
        if j == 0 && i % 5 == 0 {
            src.push_str(&format!(
                "@pytest.mark.xfail(\n    reason=f\"{{QUARANTINED}}: flaky, CNV-{i}\",\n    run=False,\n)\n"
            ));
        }
        src.push_str(&format!(
            "@pytest.mark.polarion(\"CNV-{j}\")\ndef test_case_{j}():\n    assert {j} == {j}\n\n\n"
        ));
    }
    src
}

/// Create a repository with `count` test modules spread over teams.
fn create_tree(count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..count {
        let team = TEAMS[i % TEAMS.len()];
        let subdir = dir.path().join("tests").join(team).join(format!("area_{:02}", i / 50));
        std::fs::create_dir_all(&subdir).unwrap();
        std::fs::write(subdir.join(format!("test_m{i:05}.py")), module(i)).unwrap();
    }
    dir
}

fn scanner_cold_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner_cold");
    group.sample_size(10);

    for size in [100, 1000] {
        let dir = create_tree(size);
        let config = QuarantineConfig::default();
        let today = Utc::now().date_naive();

        group.bench_with_input(BenchmarkId::new("cold_scan", size), &size, |b, _| {
            b.iter(|| {
                let scanner = Scanner::new(dir.path(), &config).unwrap();
                scanner.scan(&NoDates, today).unwrap();
            });
        });
    }
    group.finish();
}

fn mutator_plan(c: &mut Criterion) {
    let source = module(1);
    let tree = SourceTree::parse(source).unwrap();
    let mutator = Mutator::default();
    let selector = FunctionSelector::parse("test_case_5").unwrap();
    let path = std::path::Path::new("tests/network/test_m.py");

    c.bench_function("plan_apply", |b| {
        b.iter(|| mutator.plan_apply(path, &tree, &selector, "CNV-1", "flaky").unwrap());
    });
}

criterion_group!(benches, scanner_cold_scan, mutator_plan);
criterion_main!(benches);
