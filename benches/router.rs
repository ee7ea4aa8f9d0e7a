//! Router hot-path benchmarks.
//!
//! Measures inbound dispatch for the three traffic classes the router sees:
//! - Foreign page noise (dropped)
//! - Responses settling a pending request
//! - Notifications fanned out to listeners
//!
//! Run with: cargo bench --bench router
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use ton_provider_bridge::{
    BridgeConfig, Listener, MessageEvent, Provider, Result, TargetOrigin, Transport,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const LISTENER_COUNTS: &[usize] = &[1, 8, 64];

/// Transport that accepts and discards everything.
struct NullTransport;

impl Transport for NullTransport {
    fn post_message(&self, message: Value, _target_origin: &TargetOrigin) -> Result<()> {
        black_box(message);
        Ok(())
    }

    fn dispatch_event(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}

fn provider() -> Provider {
    Provider::new(BridgeConfig::default(), NullTransport)
}

// ============================================================================
// Benchmark: Noise
// ============================================================================

fn bench_noise(c: &mut Criterion) {
    let provider = provider();
    let foreign = MessageEvent::json(&json!({"type": "analytics", "payload": {"k": "v"}}));
    let garbage = MessageEvent::new("<html>not json</html>");

    let mut group = c.benchmark_group("noise");
    group.bench_function("foreign_envelope", |b| {
        b.iter(|| provider.handle_message(black_box(&foreign)))
    });
    group.bench_function("unparseable", |b| {
        b.iter(|| provider.handle_message(black_box(&garbage)))
    });
    group.finish();
}

// ============================================================================
// Benchmark: Response Settlement
// ============================================================================

fn bench_settle(c: &mut Criterion) {
    let provider = provider();

    c.bench_function("send_and_settle", |b| {
        b.iter(|| {
            let pending = provider
                .send("ton_getBalance", vec![json!("addr1")])
                .expect("send");
            let reply = MessageEvent::json(&json!({
                "type": "TONHoldAPI",
                "message": {"jsonrpc": "2.0", "id": pending.id(), "result": "1000"}
            }));
            black_box(provider.handle_message(&reply));
        })
    });
}

// ============================================================================
// Benchmark: Notification Fan-out
// ============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");

    for &count in LISTENER_COUNTS {
        let provider = provider();
        for _ in 0..count {
            provider.on(
                "notification",
                Listener::new(|params: &Value| {
                    black_box(params);
                }),
            );
        }

        let event = MessageEvent::json(&json!({
            "type": "TONHoldAPI",
            "message": {
                "jsonrpc": "2.0",
                "method": "balance_subscription",
                "params": {"addr": "addr1", "balance": "900"}
            }
        }));

        group.bench_with_input(BenchmarkId::new("listeners", count), &event, |b, event| {
            b.iter(|| provider.handle_message(black_box(event)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_noise, bench_settle, bench_fanout);
criterion_main!(benches);
