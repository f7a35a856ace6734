use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::OsRng;
use rand::RngCore;
use xmss::{generate_seed, verify, PrivateKey};

const H_CASES: &[u32] = &[20];
const D_CASES: &[u32] = &[2, 4];
const MESSAGE_LEN: usize = 51200;

fn random_message() -> Vec<u8> {
    let mut message = vec![0u8; MESSAGE_LEN];
    OsRng.fill_bytes(&mut message);
    message
}

fn keygen_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("XMSS_keygen");
    group.sample_size(10);

    for &h in H_CASES {
        for &d in D_CASES {
            let seed = generate_seed();
            group.bench_function(BenchmarkId::new("keygen", format!("h{h}d{d}")), |b| {
                b.iter(|| {
                    let sk = PrivateKey::new(&seed, h, d).unwrap();
                    black_box(sk.public_key());
                })
            });
        }
    }
    group.finish();
}

fn sign_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("XMSS_sign");
    group.sample_size(10);

    for &h in H_CASES {
        for &d in D_CASES {
            let sk = PrivateKey::new(&generate_seed(), h, d).unwrap();
            let message = random_message();
            group.bench_function(BenchmarkId::new("sign", format!("h{h}d{d}")), |b| {
                b.iter(|| black_box(sk.sign(&message).unwrap()))
            });
        }
    }
    group.finish();
}

fn verify_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("XMSS_verify");
    group.sample_size(10);

    for &h in H_CASES {
        for &d in D_CASES {
            let sk = PrivateKey::new(&generate_seed(), h, d).unwrap();
            let pk = sk.public_key();
            let message = random_message();
            let sig = sk.sign(&message).unwrap();
            group.bench_function(BenchmarkId::new("verify", format!("h{h}d{d}")), |b| {
                b.iter(|| black_box(verify(&sig, &message, &pk)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, keygen_benchmarks, sign_benchmarks, verify_benchmarks);
criterion_main!(benches);
