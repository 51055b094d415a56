//! Codec and search benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use hanji_core::codec::{decode, encode};
use hanji_core::edit::{self, ParaRef};
use hanji_core::index::TextIndex;
use hanji_core::{query, Document};

fn sample_document(paragraphs: usize) -> Document {
    let mut doc = Document::new("Benchmark", "ko");
    edit::set_paragraph_text(&mut doc, ParaRef::new(0, 0), "paragraph 0 with some text").unwrap();
    for i in 1..paragraphs {
        edit::append_paragraph(&mut doc, 0, &format!("paragraph {} with some text", i)).unwrap();
    }
    doc
}

fn codec_benchmark(c: &mut Criterion) {
    let doc = sample_document(200);
    let bytes = encode(&doc).unwrap();

    c.bench_function("encode_200_paragraphs", |b| {
        b.iter(|| encode(std::hint::black_box(&doc)).unwrap())
    });
    c.bench_function("decode_200_paragraphs", |b| {
        b.iter(|| decode(std::hint::black_box(&bytes)).unwrap())
    });
}

fn search_benchmark(c: &mut Criterion) {
    let doc = sample_document(200);
    c.bench_function("index_and_find", |b| {
        b.iter(|| {
            let index = TextIndex::build(&doc);
            query::find_literal(&doc, &index, "paragraph 199", true).count()
        })
    });
}

criterion_group!(benches, codec_benchmark, search_benchmark);
criterion_main!(benches);
