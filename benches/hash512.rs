use criterion::{black_box, criterion_group, criterion_main, Criterion};
use digest::{FixedOutput, Update};
use rand::RngCore;
use subsetsum::core_api::Sumhash512;
use subsetsum::sumhash512;

fn bench_hash512(c: &mut Criterion) {
    let mut msg = [0u8; 600];
    rand::thread_rng().fill_bytes(&mut msg);

    c.bench_function("sumhash512 600 bytes", |b| {
        b.iter(|| {
            let mut h = sumhash512::new();
            h.write(black_box(&msg)).unwrap();
            h.sum(Vec::new())
        })
    });

    c.bench_function("sumhash512 core wrapper 600 bytes", |b| {
        b.iter(|| {
            let mut h = Sumhash512::default();
            h.update(black_box(&msg));
            h.finalize_fixed()
        })
    });
}

criterion_group!(benches, bench_hash512);
criterion_main!(benches);
