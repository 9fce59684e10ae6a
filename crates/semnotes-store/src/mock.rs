//! Mock media host for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use semnotes_core::traits::MediaHost;

/// A media host that records destroy calls instead of making them.
#[derive(Default)]
pub struct MockMediaHost {
    /// Public ids passed to `destroy`, in call order.
    destroyed: Mutex<Vec<String>>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// When set, every call fails after being recorded.
    fail: bool,
}

impl MockMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose every destroy call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Public ids destroyed so far.
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MediaHost for MockMediaHost {
    fn name(&self) -> &str {
        "mock"
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.destroyed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(public_id.to_string());

        if self.fail {
            anyhow::bail!("mock media host refused to destroy {public_id}");
        }
        Ok(())
    }
}
