use criterion::{criterion_group, criterion_main, Criterion};
use fuzzpatch::Differ;

// Two mid-sized texts with interleaved edits, built deterministically so
// runs are comparable.
fn corpus() -> (String, String) {
    let mut old = String::new();
    let mut new = String::new();
    for i in 0..400 {
        old.push_str(&format!("line {i}: the quick brown fox jumps over the lazy dog\n"));
        if i % 7 == 0 {
            new.push_str(&format!("line {i}: the slow red fox crawls under the eager dog\n"));
        } else {
            new.push_str(&format!("line {i}: the quick brown fox jumps over the lazy dog\n"));
        }
    }
    (old, new)
}

fn diff_main(c: &mut Criterion) {
    let (old, new) = corpus();
    let differ = Differ::new();

    c.bench_function("diff_main", |bencher| {
        bencher.iter(|| differ.main(&old, &new));
    });
}

criterion_group!(diff, diff_main);
criterion_main!(diff);
