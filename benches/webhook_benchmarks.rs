use criterion::{Criterion, criterion_group, criterion_main};
use payhook::prelude::*;
use std::hint::black_box;

const SECRET: &str = "whsec_bench_secret";

fn sample_payload(entries: usize) -> String {
    let items: Vec<String> = (0..entries)
        .map(|i| format!(r#"{{"line":{},"amount":{}}}"#, i, i * 100))
        .collect();
    format!(
        r#"{{"id":"evt_bench","event":"invoice.paid","data":{{"items":[{}]}}}}"#,
        items.join(",")
    )
}

fn bench_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("signature");
    let signer = WebhookSignature::new(SECRET).unwrap();

    for entries in [1, 100, 1000] {
        let payload = sample_payload(entries);
        let signature = signer.sign(payload.as_bytes());

        group.bench_function(format!("validate_{}_items", entries), |b| {
            b.iter(|| signer.validate(black_box(payload.as_bytes()), black_box(&signature)))
        });
    }

    group.finish();
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("processor");
    let rt = tokio::runtime::Runtime::new().unwrap();

    let dispatcher = WebhookDispatcher::builder()
        .on("invoice.paid", |_envelope, _cancel| async {
            Ok::<(), HandlerError>(())
        })
        .build();
    let processor = WebhookProcessor::new(SECRET, dispatcher).unwrap();

    let payload = sample_payload(100);
    let signature = WebhookSignature::compute_signature(SECRET, payload.as_bytes());

    group.bench_function("process_valid", |b| {
        b.to_async(&rt).iter(|| async {
            processor
                .process(payload.as_bytes(), &signature, CancellationToken::new())
                .await
        })
    });

    group.bench_function("process_bad_signature", |b| {
        b.to_async(&rt).iter(|| async {
            processor
                .process(payload.as_bytes(), "deadbeef", CancellationToken::new())
                .await
        })
    });

    group.finish();
}

criterion_group!(benches, bench_signature, bench_process);
criterion_main!(benches);
