use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use parking_lot::Mutex;

use dog_task_queue::{CompletionToken, FnTask, QueueRegistry};

fn inline_release(c: &mut Criterion) {
    let registry = QueueRegistry::new();
    let queue = registry.get_queue("bench-inline");

    c.bench_function("push_inline_release", |b| {
        b.iter(|| {
            queue.push(FnTask::new("inline", |token| {
                black_box(token.release());
            }));
        })
    });
}

fn deferred_release(c: &mut Criterion) {
    c.bench_function("push_1000_then_drain", |b| {
        b.iter_batched(
            || {
                let registry = QueueRegistry::new();
                let queue = registry.get_queue("bench-deferred");
                (registry, queue, Arc::new(Mutex::new(None::<CompletionToken>)))
            },
            |(_registry, queue, slot)| {
                for _ in 0..1000 {
                    let slot = slot.clone();
                    queue.push(FnTask::new("deferred", move |token| {
                        *slot.lock() = Some(token);
                    }));
                }
                loop {
                    let token = slot.lock().take();
                    match token {
                        Some(token) => {
                            token.release();
                        }
                        None => break,
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, inline_release, deferred_release);
criterion_main!(benches);
