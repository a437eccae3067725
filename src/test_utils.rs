//! Shared test utilities and arbitrary generators for property-based testing.

use std::sync::Once;

use proptest::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Respects `RUST_LOG`; defaults to `workqueue=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| "workqueue=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// One step of a model-checked queue run.
#[derive(Debug, Clone)]
pub enum QueueOp {
    Push(Vec<u8>),
    Pop,
    Drain,
    Has(Vec<u8>),
}

/// Small payload alphabet so unique-mode collisions are common.
pub fn arb_payload() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(b"a".to_vec()),
        Just(b"b".to_vec()),
        Just(b"c".to_vec()),
        Just(Vec::new()),
    ]
}

pub fn arb_queue_op() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        4 => arb_payload().prop_map(QueueOp::Push),
        3 => Just(QueueOp::Pop),
        1 => Just(QueueOp::Drain),
        2 => arb_payload().prop_map(QueueOp::Has),
    ]
}

pub fn arb_queue_ops() -> impl Strategy<Value = Vec<QueueOp>> {
    prop::collection::vec(arb_queue_op(), 0..40)
}
