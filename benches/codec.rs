use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serpentine::{from_slice, parse, to_bytes, to_bytes_pretty, Node};

fn sample_record(i: u32) -> Node {
    Node::Dict(vec![
        (Node::from("id"), Node::from(i)),
        (Node::from("name"), Node::from(format!("item {i}"))),
        (Node::from("price"), Node::from(9.99 + f64::from(i))),
        (Node::from("active"), Node::from(i % 2 == 0)),
    ])
}

fn benchmark_serialize_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_scalars");

    group.bench_function("integer", |b| b.iter(|| to_bytes(black_box(123456789))));
    group.bench_function("float", |b| b.iter(|| to_bytes(black_box(99.1234))));
    group.bench_function("string", |b| {
        b.iter(|| to_bytes(black_box("a medium length string with 'quotes' in it")))
    });

    group.finish();
}

fn benchmark_serialize_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_records");

    for size in [10u32, 100, 500].iter() {
        let records = Node::List((0..*size).map(sample_record).collect());

        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| to_bytes(black_box(records.clone())))
        });
    }
    group.finish();
}

fn benchmark_serialize_sorted_containers(c: &mut Criterion) {
    let set = Node::Set((0..200).rev().map(Node::from).collect());
    let dict = Node::Dict(
        (0..200)
            .rev()
            .map(|i| (Node::from(format!("key{i}")), Node::from(i)))
            .collect(),
    );

    let mut group = c.benchmark_group("canonical_sort");
    group.bench_function("set_200", |b| b.iter(|| to_bytes(black_box(set.clone()))));
    group.bench_function("dict_200", |b| b.iter(|| to_bytes(black_box(dict.clone()))));
    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [10u32, 100, 500].iter() {
        let records = Node::List((0..*size).map(sample_record).collect());
        let bytes = to_bytes(records).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| parse(black_box(bytes)))
        });
    }
    group.finish();
}

fn benchmark_objectify(c: &mut Criterion) {
    let records = Node::List((0..100u32).map(sample_record).collect());
    let bytes = to_bytes(records).unwrap();

    c.bench_function("objectify_100_records", |b| {
        b.iter(|| from_slice(black_box(&bytes)))
    });
}

fn benchmark_pretty_print(c: &mut Criterion) {
    let records = Node::List((0..100u32).map(sample_record).collect());

    c.bench_function("pretty_100_records", |b| {
        b.iter(|| to_bytes_pretty(black_box(records.clone())))
    });
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let record = sample_record(7);

    c.bench_function("roundtrip_record", |b| {
        b.iter(|| {
            let bytes = to_bytes(black_box(record.clone())).unwrap();
            from_slice(black_box(&bytes)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_scalars,
    benchmark_serialize_records,
    benchmark_serialize_sorted_containers,
    benchmark_parse,
    benchmark_objectify,
    benchmark_pretty_print,
    benchmark_roundtrip
);
criterion_main!(benches);
