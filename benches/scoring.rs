use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hescore::codec::{decode_from_text, encode_to_text};
use hescore::keys::KeyBundle;
use hescore::math::GaussianSampler;
use hescore::params::SchemeParameters;
use hescore::serialize::{from_bytes, to_bytes};
use hescore::{ScoreDecryptor, VectorEncryptor};

fn scoring_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    group.sample_size(20);

    for params in [SchemeParameters::bfv_d4096(), SchemeParameters::system()] {
        let n = params.ring_degree;
        let mut sampler = GaussianSampler::with_seed(params.sigma, 7);
        let bundle = KeyBundle::generate(&params, &mut sampler).unwrap();

        let encryptor = VectorEncryptor::new(params.clone(), bundle.public_key.clone()).unwrap();
        let decryptor = ScoreDecryptor::new(params.clone(), bundle.secret_key.clone()).unwrap();

        let query: Vec<u64> = (0..n as u64).map(|i| (i % 3 == 0) as u64).collect();
        let ct = encryptor.encrypt(&query, &mut sampler).unwrap();
        let bytes = to_bytes(&ct, &params).unwrap();
        let text = encode_to_text(&bytes);

        group.bench_with_input(BenchmarkId::new("encrypt", n), &n, |b, _| {
            b.iter(|| encryptor.encrypt_to_vec(&query).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("decrypt", n), &n, |b, _| {
            b.iter(|| decryptor.decrypt_score(&ct).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("parse_and_decode", n), &n, |b, _| {
            b.iter(|| {
                let raw = decode_from_text(&text).unwrap();
                from_bytes::<hescore::bfv::Ciphertext>(&raw, &params).unwrap()
            });
        });
    }

    group.finish();
}

fn keygen_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("keygen");
    group.sample_size(10);

    let params = SchemeParameters::system();
    group.bench_function("bundle_8192", |b| {
        let mut sampler = GaussianSampler::with_seed(params.sigma, 11);
        b.iter(|| KeyBundle::generate(&params, &mut sampler).unwrap());
    });

    group.finish();
}

criterion_group!(benches, scoring_benchmark, keygen_benchmark);
criterion_main!(benches);
