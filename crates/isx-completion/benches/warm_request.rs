//! Completion Request Benchmark
//!
//! Measures extension method completion once the library surface is cached,
//! plus the one-off cost of building a surface.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use isx_binder::{Compilation, Library, Program};
use isx_common::CancellationToken;
use isx_completion::{
    CompletionOptions, CompletionRequest, ExtensionMethodCompletionProvider, SurfaceCache,
};
use std::sync::Arc;

// =============================================================================
// Test Sources
// =============================================================================

const SOURCE: &str = r#"
using System.Collections.Generic;

class Program
{
    void Run(List<string> list, object obj)
    {
        list.
    }
}
"#;

/// A referenced library with `classes` static classes of ten extension
/// methods each.
fn generate_library(classes: usize) -> Library {
    let mut source = String::new();
    for c in 0..classes {
        source.push_str(&format!(
            "namespace Generated.N{c}\n{{\n    public static class Ext{c}\n    {{\n"
        ));
        for m in 0..10 {
            source.push_str(&format!(
                "        public static int M{c}_{m}<T>(this IEnumerable<T> source) => 0;\n"
            ));
        }
        source.push_str("    }\n}\n\n");
    }
    Library::new("Generated", format!("{classes}.0")).with_file(
        "Generated.cs",
        format!("using System.Collections.Generic;\n{source}"),
    )
}

fn program(classes: usize) -> Program {
    Program::new("Bench")
        .with_reference(generate_library(classes))
        .with_document("bench.cs", SOURCE)
}

fn offset() -> u32 {
    (SOURCE.find("list.").unwrap_or(0) + "list.".len()) as u32
}

// =============================================================================
// Benchmarks
// =============================================================================

/// Benchmark: warm request, surface already cached
fn bench_warm_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_request");

    for classes in [0usize, 50, 200] {
        let compilation = Compilation::new(&program(classes));
        let file = compilation.file_by_name("bench.cs").unwrap();
        let token = CancellationToken::new();
        let provider = ExtensionMethodCompletionProvider::new(CompletionOptions::default())
            .with_surface_cache(Arc::new(SurfaceCache::new()));
        let request = CompletionRequest {
            compilation: &compilation,
            file,
            offset: offset(),
            cancellation: &token,
        };
        provider.complete(&request).unwrap();

        group.bench_with_input(
            BenchmarkId::new("complete", classes),
            &request,
            |b, request| b.iter(|| black_box(provider.complete(request).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark: cold surface build for a reference set
fn bench_surface_build(c: &mut Criterion) {
    let compilation = Compilation::new(&program(200));
    let token = CancellationToken::new();
    c.bench_function("surface_build_200_classes", |b| {
        b.iter(|| {
            let cache = SurfaceCache::new();
            black_box(cache.get_or_build(compilation.references(), &token).unwrap())
        })
    });
}

criterion_group!(benches, bench_warm_request, bench_surface_build);
criterion_main!(benches);
