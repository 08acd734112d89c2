//! Benchmarks for CarLot table operations

use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use tempfile::TempDir;

use carlot::table::Table;
use carlot::{Car, CarStatus, Money};

const CAR_COUNT: usize = 500;

fn car(i: usize) -> Car {
    Car {
        vin: format!("VIN{:08}", i),
        model: (i % 7) as u32,
        price: Money::from_units(10_000 + i as i64),
        date_start: NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap(),
        status: CarStatus::Available,
    }
}

fn table_benchmarks(c: &mut Criterion) {
    c.bench_function("table_put_500", |b| {
        b.iter(|| {
            let temp_dir = TempDir::new().unwrap();
            let mut table: Table<Car> = Table::open(temp_dir.path(), "cars", 500).unwrap();
            for i in 0..CAR_COUNT {
                table.put(&car(i)).unwrap();
            }
        })
    });

    let temp_dir = TempDir::new().unwrap();
    let mut table: Table<Car> = Table::open(temp_dir.path(), "cars", 500).unwrap();
    for i in 0..CAR_COUNT {
        table.put(&car(i)).unwrap();
    }

    c.bench_function("table_get", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("VIN{:08}", i % CAR_COUNT);
            i += 1;
            black_box(table.get(&key).unwrap());
        })
    });

    c.bench_function("table_scan_all", |b| {
        b.iter(|| {
            let count = table.scan_all().unwrap().filter(|r| r.is_ok()).count();
            black_box(count);
        })
    });
}

criterion_group!(benches, table_benchmarks);
criterion_main!(benches);
