use common::ItemId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{ItemPatch, Money, OrderItem, order_total, plan_item_changes};

fn make_items(count: i64) -> Vec<OrderItem> {
    (1..=count)
        .map(|id| OrderItem {
            id: ItemId::new(id),
            name: format!("Dish {id}"),
            price: Money::from_cents(id * 100),
            quantity: (id % 5) as u32 + 1,
        })
        .collect()
}

fn bench_order_total(c: &mut Criterion) {
    let items = make_items(50);

    c.bench_function("domain/order_total_50_items", |b| {
        b.iter(|| order_total(&items));
    });
}

fn bench_plan_item_changes(c: &mut Criterion) {
    let items = make_items(50);
    let patches: Vec<ItemPatch> = (1..=50)
        .map(|id| ItemPatch {
            id: Some(id),
            price: Some(Money::from_cents(id * 150)),
            ..ItemPatch::default()
        })
        .collect();

    c.bench_function("domain/plan_50_item_updates", |b| {
        b.iter(|| plan_item_changes(&items, &patches).unwrap());
    });
}

criterion_group!(benches, bench_order_total, bench_plan_item_changes);
criterion_main!(benches);
