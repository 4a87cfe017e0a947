//! Performance benchmarks for the timesheet rate engine.
//!
//! Covers the pure resolution path, the HTTP quote endpoint, and a batch
//! of quotes across the whole rate table.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use catams_engine::api::{create_router, AppState};
use catams_engine::calculation::{
    resolve_rate, PriorSession, PriorSessionLookup, RepeatCandidate, ResolutionRequest,
};
use catams_engine::models::{Actor, Qualification, Role, TaskType};
use catams_engine::policy::{PolicyLoader, PolicySnapshot};
use catams_engine::service::TimesheetService;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

struct OnePriorSession;

impl PriorSessionLookup for OnePriorSession {
    fn matching_sessions(&self, _candidate: &RepeatCandidate<'_>) -> Vec<PriorSession> {
        vec![PriorSession {
            session_date: NaiveDate::from_ymd_opt(2024, 7, 8).expect("valid date"),
            repeat: false,
        }]
    }
}

fn load_policy() -> PolicySnapshot {
    PolicyLoader::load("./config/ea2023")
        .expect("Failed to load policy")
        .snapshot()
        .clone()
}

fn create_test_state() -> AppState {
    let actors = vec![Actor {
        id: "lecturer_001".to_string(),
        name: "Sam Patel".to_string(),
        role: Role::Lecturer,
        course_assignments: vec!["COMP2022".to_string()],
    }];
    AppState::new(TimesheetService::new(load_policy(), actors))
}

fn quote_body(task_type: &str, qualification: &str, repeat: bool) -> String {
    serde_json::json!({
        "tutor_id": "tutor_001",
        "course_id": "COMP2022",
        "session_date": "2024-07-15",
        "task_type": task_type,
        "qualification": qualification,
        "delivery_hours": if task_type == "TUTORIAL" { "1.0" } else { "2.0" },
        "repeat": repeat
    })
    .to_string()
}

/// Benchmark: one pure rate resolution, no HTTP or storage.
fn bench_resolve_rate(c: &mut Criterion) {
    let snapshot = load_policy();
    let request = ResolutionRequest {
        tutor_id: "tutor_001",
        course_id: "COMP2022",
        task_type: TaskType::Tutorial,
        qualification: Qualification::Phd,
        session_date: NaiveDate::from_ymd_opt(2024, 7, 15).expect("valid date"),
        delivery_hours: Decimal::ONE,
        requested_repeat: true,
    };

    c.bench_function("resolve_rate", |b| {
        b.iter(|| {
            let resolution =
                resolve_rate(black_box(&request), &snapshot, &OnePriorSession).unwrap();
            black_box(resolution)
        })
    });
}

/// Benchmark: one quote through the full HTTP stack.
fn bench_quote_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());
    let body = quote_body("TUTORIAL", "PHD", false);

    c.bench_function("quote_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/timesheets/quote")
                        .header("Content-Type", "application/json")
                        .header("X-Actor-Id", "lecturer_001")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: a batch of 100 quotes spanning the whole rate table.
fn bench_batch_quotes(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(create_test_state());

    let combinations = [
        ("TUTORIAL", "PHD"),
        ("TUTORIAL", "STANDARD"),
        ("LECTURE", "COORDINATOR"),
        ("LECTURE", "STANDARD"),
        ("ORAA", "PHD"),
        ("ORAA", "STANDARD"),
        ("DEMO", "PHD"),
        ("DEMO", "STANDARD"),
        ("MARKING", "PHD"),
        ("MARKING", "STANDARD"),
    ];
    let bodies: Vec<String> = (0..100)
        .map(|i| {
            let (task, qualification) = combinations[i % combinations.len()];
            quote_body(task, qualification, i % 4 == 0)
        })
        .collect();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100));

    group.bench_function("batch_100_quotes", |b| {
        b.to_async(&rt).iter(|| async {
            let mut results = Vec::with_capacity(bodies.len());
            for body in &bodies {
                let router = router.clone();
                let response = router
                    .oneshot(
                        Request::builder()
                            .method("POST")
                            .uri("/api/timesheets/quote")
                            .header("Content-Type", "application/json")
                            .header("X-Actor-Id", "lecturer_001")
                            .body(Body::from(body.clone()))
                            .unwrap(),
                    )
                    .await
                    .unwrap();
                results.push(response);
            }
            black_box(results)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_rate,
    bench_quote_endpoint,
    bench_batch_quotes
);
criterion_main!(benches);
