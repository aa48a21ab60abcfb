//! Hashing and validation benchmarks.
//!
//! Measures:
//! - Streaming digest throughput for MD5 and SHA-256
//! - Member path validation
//! - Safety check over a full archive listing

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use etupdate_core::HashAlgorithm;
use etupdate_core::archive::ArchiveMember;
use etupdate_core::integrity::hash_stream;
use etupdate_core::security::check_archive_safety;
use etupdate_core::types::DestDir;
use etupdate_core::types::SafePath;
use std::hint::black_box;
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;

fn benchmark_hash_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_stream");

    for size in [64 * 1024, 1024 * 1024, 16 * 1024 * 1024] {
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        group.throughput(Throughput::Bytes(size as u64));

        for algorithm in [HashAlgorithm::Md5, HashAlgorithm::Sha256] {
            group.bench_with_input(
                BenchmarkId::new(algorithm.extension(), size),
                &data,
                |b, data| {
                    b.iter(|| hash_stream(&mut Cursor::new(black_box(data)), algorithm).unwrap());
                },
            );
        }
    }

    group.finish();
}

fn benchmark_path_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_validation");

    let temp = TempDir::new().unwrap();
    let dest = DestDir::new(temp.path()).unwrap();

    group.bench_function("rules_file", |b| {
        let path = PathBuf::from("rules/emerging-dns.rules");
        b.iter(|| SafePath::validate(black_box(&path), black_box(&dest)));
    });

    group.bench_function("with_dot_components", |b| {
        let path = PathBuf::from("./rules/./emerging-dns.rules");
        b.iter(|| SafePath::validate(black_box(&path), black_box(&dest)));
    });

    group.bench_function("traversal_rejected", |b| {
        let path = PathBuf::from("rules/../../etc/passwd");
        b.iter(|| SafePath::validate(black_box(&path), black_box(&dest)));
    });

    group.finish();
}

fn benchmark_archive_safety(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let dest = DestDir::new(temp.path()).unwrap();

    // The open ruleset ships a few hundred members
    let mut members = vec![ArchiveMember::directory("rules")];
    members.extend((0..400).map(|i| ArchiveMember::file(format!("rules/emerging-{i}.rules"), 4096)));

    c.bench_function("check_archive_safety_400", |b| {
        b.iter(|| check_archive_safety(black_box(&members), black_box(&dest)).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_hash_stream,
    benchmark_path_validation,
    benchmark_archive_safety
);
criterion_main!(benches);
