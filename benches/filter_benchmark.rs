//! apply_filter over a large catalog: plain listing, search, category and both

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use product_dashboard_lib::domain::{FilterCriteria, Product, ProductId, Rating, apply_filter};

const CATEGORIES: [&str; 4] = ["electronics", "jewelery", "men's clothing", "women's clothing"];

fn catalog(size: i64) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            id: ProductId::Int(i),
            title: format!("Product {i} Deluxe Edition"),
            price: 10.0 + (i % 90) as f64,
            description: format!("Description for item number {i} with a few extra words"),
            category: CATEGORIES[(i % 4) as usize].to_string(),
            image: String::new(),
            rating: Rating { rate: 4.0, count: 10 },
        })
        .collect()
}

fn filter_benchmark(c: &mut Criterion) {
    let products = catalog(10_000);
    let cases = [
        ("no_filter", FilterCriteria::default()),
        ("search", FilterCriteria::new("number 99", "all")),
        ("category", FilterCriteria::new("", "jewelery")),
        ("search_and_category", FilterCriteria::new("deluxe", "electronics")),
    ];

    let mut group = c.benchmark_group("apply_filter_10k");
    for (name, criteria) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| apply_filter(black_box(&products), black_box(criteria)));
        });
    }
    group.finish();
}

criterion_group!(benches, filter_benchmark);
criterion_main!(benches);
