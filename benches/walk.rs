// ABOUTME: Benchmarks for device tree walking and rendering
// ABOUTME: Measures traversal, tree building and text output using Criterion

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use devicetree_inspect::test_utils::NodeBuilder;
use devicetree_inspect::{DeviceTreeParser, RenderConfig, classify, iterate, render};
use std::hint::black_box;

/// A wide, moderately deep synthetic tree with mixed property kinds
fn synthetic_tree(fanout: usize, depth: usize) -> NodeBuilder {
    fn build(level: usize, fanout: usize, depth: usize) -> NodeBuilder {
        let mut reg = Vec::new();
        reg.extend_from_slice(&(0x2_0000_0000u64 + level as u64 * 0x1000).to_le_bytes());
        reg.extend_from_slice(&0x4000u64.to_le_bytes());

        let mut node = NodeBuilder::named("node")
            .string_property("compatible", "gpio,t8010\0gpio,s5l8960x")
            .u32_property("#interrupt-cells", 2)
            .property("reg", &reg)
            .property("calibration", &[0x5a; 96]);
        if level < depth {
            for _ in 0..fanout {
                node = node.child(build(level + 1, fanout, depth));
            }
        }
        node
    }
    build(0, fanout, depth)
}

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    for (fanout, depth) in [(4, 3), (8, 3), (4, 6)] {
        let data = synthetic_tree(fanout, depth).encode();
        group.throughput(Throughput::Bytes(data.len() as u64));
        let label = format!("{fanout}x{depth}");

        group.bench_with_input(BenchmarkId::new("iterate", &label), &data, |b, data| {
            b.iter(|| iterate(black_box(data), ()).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("parse_tree", &label), &data, |b, data| {
            b.iter(|| DeviceTreeParser::new(black_box(data)).parse_tree().unwrap())
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let data = synthetic_tree(4, 4).encode();
    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (label, config) in [
        ("bounded", RenderConfig::default()),
        ("verbose", RenderConfig::default().verbose()),
    ] {
        group.bench_function(label, |b| {
            let mut out = String::with_capacity(1 << 16);
            b.iter(|| {
                out.clear();
                render(black_box(&data), &config, &mut out).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let samples: [(&[u8], &[u8]); 4] = [
        (&b"model"[..], &b"iPhone9,1\0"[..]),
        (&b"reg"[..], &[0, 0, 0x10, 0x0f, 2, 0, 0, 0, 0, 0, 0x10, 0, 0, 0, 0, 0][..]),
        (&b"calibration"[..], &[0x5a; 96][..]),
        (&b"#size-cells"[..], &[2, 0, 0, 0][..]),
    ];

    c.bench_function("classify_mixed", |b| {
        b.iter(|| {
            for (name, value) in samples {
                black_box(classify(black_box(name), black_box(value)));
            }
        })
    });
}

criterion_group!(benches, bench_walk, bench_render, bench_classify);
criterion_main!(benches);
