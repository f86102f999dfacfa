use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use zero_mysql_result::col::ColumnDefinition;
use zero_mysql_result::constant::{BINARY_CHARSET, ColumnType};
use zero_mysql_result::protocol::Protocol;
use zero_mysql_result::protocol::primitive::*;
use zero_mysql_result::{BufferedResult, QueryResult, ResultSet, StreamingResult};

pub struct User {
    pub id: i32,
    pub name: String,
    pub uuid: u128,
}

fn columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("id", ColumnType::MYSQL_TYPE_LONG),
        ColumnDefinition::new("name", ColumnType::MYSQL_TYPE_VAR_STRING),
        ColumnDefinition::new("uuid", ColumnType::MYSQL_TYPE_STRING).with_charset(BINARY_CHARSET),
    ]
}

fn text_payloads(size: usize) -> Vec<Vec<u8>> {
    (0..size)
        .map(|i| {
            let mut out = Vec::new();
            write_string_lenenc(&mut out, &i.to_string());
            write_string_lenenc(&mut out, &format!("user_{}", i));
            write_bytes_lenenc(&mut out, &(i as u128).to_be_bytes());
            out
        })
        .collect()
}

fn binary_payloads(size: usize) -> Vec<Vec<u8>> {
    (0..size)
        .map(|i| {
            // header + 1 byte NULL bitmap for 3 columns
            let mut out = vec![0x00, 0x00];
            write_int_4(&mut out, i as u32);
            write_string_lenenc(&mut out, &format!("user_{}", i));
            write_bytes_lenenc(&mut out, &(i as u128).to_be_bytes());
            out
        })
        .collect()
}

fn collect_users(result: Arc<dyn ResultSet>) -> Vec<User> {
    QueryResult::new(result)
        .iter()
        .map(|row| {
            let row = row.unwrap();
            User {
                id: row.get(0).unwrap().to_i32().unwrap(),
                name: row.get(1).unwrap().to_text(),
                uuid: row.get(2).unwrap().to_u128().unwrap(),
            }
        })
        .collect()
}

fn bench_buffered(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered");

    for size in [1, 100, 10_000].iter() {
        for (name, protocol, payloads) in [
            ("text", Protocol::Text, text_payloads(*size)),
            ("binary", Protocol::Binary, binary_payloads(*size)),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &payloads, |b, payloads| {
                b.iter(|| {
                    let result =
                        BufferedResult::from_payloads(columns(), protocol, payloads).unwrap();
                    black_box(collect_users(Arc::new(result)))
                })
            });
        }
    }
    group.finish();
}

fn bench_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");

    for size in [1, 100, 10_000].iter() {
        let payloads = binary_payloads(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &payloads, |b, payloads| {
            b.iter(|| {
                let result =
                    StreamingResult::from_payloads(columns(), Protocol::Binary, payloads.clone());
                black_box(collect_users(Arc::new(result)))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_buffered, bench_streaming);
criterion_main!(benches);
