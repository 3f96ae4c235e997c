//! Encodes the logic of a large synthetic event tree.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use pramef::{EncodedTerm, domain::sequence_logic::encode_logic, storage::input::Term};

fn synthetic_sequences() -> Vec<Vec<Term>> {
    (0..1_000u64)
        .map(|seq| (0..50u64).map(|i| Term(seq * 7_919 + i * 104_729)).collect())
        .collect()
}

fn encode(c: &mut Criterion) {
    let sequences = synthetic_sequences();

    c.bench_function("encode sequence logic", |b| {
        b.iter(|| {
            sequences
                .iter()
                .map(|terms| encode_logic(black_box(terms)))
                .collect::<Vec<_>>()
        });
    });

    c.bench_function("render encoded terms", |b| {
        b.iter(|| EncodedTerm::encode(black_box(151_553)).to_string());
    });
}

criterion_group!(benches, encode);
criterion_main!(benches);
