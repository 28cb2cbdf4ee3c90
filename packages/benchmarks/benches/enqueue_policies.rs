//! Enqueue cost of the async-queued pipeline under each overflow policy.
//!
//! The headline comparison uses the blocking policy only, sized so the queue
//! never fills. This bench is the backpressure variant: sustained iteration can
//! outpace the worker, so the numbers include what each policy does at capacity
//! (waiting, evicting, or rejecting). Dropped counts are printed per policy so
//! a reader can see how often the drop policies actually engaged.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use log_pipelines::{AsyncQueuedPipeline, Field, Level, OverflowPolicy, Pipeline, Template};
use new_zealand::nz;
use null_sink::NullSink;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_policies");

    let policies = [
        ("block", OverflowPolicy::Block),
        ("drop_oldest", OverflowPolicy::DropOldest),
        ("drop_newest", OverflowPolicy::DropNewest),
    ];

    let template = Arc::new(Template::parse("x={x} y={y} z={z}").expect("static template"));
    let fields = [
        Field::new("x", 100),
        Field::new("y", 200),
        Field::new("z", 300),
    ];

    for (name, policy) in policies {
        let sink = NullSink::new();
        let pipeline = AsyncQueuedPipeline::builder(sink, policy)
            .capacity(nz!(4096))
            .build();

        group.bench_function(name, |b| {
            b.iter(|| {
                pipeline.log(Level::Info, black_box(&template), black_box(&fields));
            });
        });

        pipeline.flush().expect("pipeline must drain");
        println!("policy '{name}': {} messages dropped", pipeline.dropped());
    }

    group.finish();
}
