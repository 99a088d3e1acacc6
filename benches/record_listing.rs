//! Record listing throughput: translate a query and run the plan against sled.

use aino::query::{translate, ListQuery};
use aino::record::{RecordStore, SledRecordStore};
use aino::schema::FieldDefinition;
use aino::store::Database;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use tokio::runtime::Runtime;

fn definition(key: &str, field_type: &str) -> FieldDefinition {
    serde_json::from_value(json!({
        "id": format!("def-{}", key),
        "directoryId": "bench",
        "key": key,
        "kind": "primitive",
        "type": field_type,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z",
    }))
    .unwrap()
}

fn seeded_store(rt: &Runtime, rows: usize) -> SledRecordStore {
    let store = SledRecordStore::new(&Database::temporary().unwrap()).unwrap();
    rt.block_on(async {
        for i in 0..rows {
            let data = json!({ "name": format!("row-{}", i), "score": (i * 7919) % 1000 });
            store
                .create("bench", data.as_object().cloned().unwrap(), None)
                .await
                .unwrap();
        }
    });
    store
}

fn bench_listing(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let definitions = vec![definition("name", "text"), definition("score", "number")];
    let query = ListQuery {
        page: Some("2".into()),
        page_size: Some("25".into()),
        sort: Some("score:desc".into()),
        filter: Some("score:gte:250".into()),
        ..ListQuery::default()
    };
    let plan = translate(&query, &definitions).unwrap();

    let mut group = c.benchmark_group("record_listing");
    for rows in [100usize, 1_000, 5_000] {
        let store = seeded_store(&rt, rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.to_async(&rt).iter(|| async {
                black_box(store.find_many("bench", &plan).await.unwrap());
            });
        });
    }
    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let definitions: Vec<FieldDefinition> = (0..50)
        .map(|i| definition(&format!("field_{}", i), "text"))
        .collect();
    let query = ListQuery {
        sort: Some("field_3:asc,createdAt:desc".into()),
        filter: Some("field_7:contains:abc;field_9:ne:x".into()),
        fields: Some("field_1,field_2,field_3".into()),
        ..ListQuery::default()
    };
    c.bench_function("translate", |b| {
        b.iter(|| translate(black_box(&query), black_box(&definitions)).unwrap())
    });
}

criterion_group!(benches, bench_listing, bench_translate);
criterion_main!(benches);
