//! Rendering benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use iconify_core::{Customisations, IconData};
use iconify_export::{build_icon, replace_ids_with, IdGenerator, IdRegistry};

const ANIMATED_BODY: &str = concat!(
    "<defs><linearGradient id=\"g\"><stop offset=\"0\"/></linearGradient></defs>",
    "<circle id=\"c\" cx=\"12\" cy=\"12\" r=\"0\" fill=\"url(#g)\">",
    "<animate id=\"a\" attributeName=\"r\" begin=\"0;b.end\" dur=\"1.2s\" values=\"0;11\"/>",
    "<animate id=\"b\" attributeName=\"r\" begin=\"a.end\" dur=\"1.2s\" values=\"11;0\"/>",
    "</circle>",
);

fn sample_icon() -> IconData {
    let mut icon = IconData::new(ANIMATED_BODY);
    icon.width = 24.0;
    icon.height = 24.0;
    icon
}

fn build_plain(c: &mut Criterion) {
    let icon = sample_icon();
    let customisations = Customisations::default();
    c.bench_function("build_plain", |b| {
        b.iter(|| build_icon(black_box(&icon), black_box(&customisations)))
    });
}

fn build_transformed(c: &mut Criterion) {
    let icon = sample_icon();
    let customisations = Customisations::new()
        .with_rotate(1)
        .with_flip(true, false)
        .with_width("2em");
    c.bench_function("build_transformed", |b| {
        b.iter(|| build_icon(black_box(&icon), black_box(&customisations)))
    });
}

fn replace_animated_ids(c: &mut Criterion) {
    let mut registry = IdRegistry::with_prefix("bench");
    c.bench_function("replace_ids", |b| {
        b.iter(|| replace_ids_with(&mut registry, black_box(ANIMATED_BODY), IdGenerator::Default))
    });
}

criterion_group!(benches, build_plain, build_transformed, replace_animated_ids);
criterion_main!(benches);
