#![allow(dead_code)]

use std::sync::Arc;

use rigging::Injectable;

pub(crate) trait Service: Send + Sync {
    fn name(&self) -> &'static str;
}

#[Injectable(implements = [dyn Service])]
pub(crate) struct ImplA;

impl Service for ImplA {
    fn name(&self) -> &'static str {
        "a"
    }
}

#[Injectable(implements = [dyn Service])]
pub(crate) struct ImplB;

impl Service for ImplB {
    fn name(&self) -> &'static str {
        "b"
    }
}

#[Injectable]
pub(crate) struct Consumer {
    pub(crate) service: Arc<dyn Service>,
}

#[Injectable]
pub(crate) struct Standalone;

/// Not constructible, only resolvable through an explicit binding.
pub(crate) struct Plain;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rigging=trace")
        .with_test_writer()
        .try_init();
}
