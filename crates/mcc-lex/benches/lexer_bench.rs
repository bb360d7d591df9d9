//! Lexer throughput benchmark.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mcc_lex::Lexer;
use mcc_util::Handler;

fn sample_source() -> String {
    let mut source = String::from("int main(void) {\n");
    for i in 0..200 {
        source.push_str(&format!("    int v{i} = {i} * 3 + (v0 << 2);\n"));
        source.push_str(&format!("    v{i} += v{i} % 7; /* keep */\n"));
    }
    source.push_str("    return v0 && v1 || !v2;\n}\n");
    source
}

fn bench_tokenize(c: &mut Criterion) {
    let source = sample_source();
    c.bench_function("tokenize_function_body", |b| {
        b.iter(|| {
            let mut handler = Handler::new();
            let tokens = Lexer::new(black_box(&source), &mut handler).tokenize();
            black_box(tokens)
        })
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
