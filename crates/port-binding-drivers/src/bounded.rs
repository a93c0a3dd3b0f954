// port-binding-drivers/src/bounded.rs
// ============================================================================
// Module: Bounded Driver Wrapper
// Description: Deadline enforcement around blocking driver bind calls.
// Purpose: Convert slow drivers into driver-level timeout failures.
// Dependencies: port-binding-core, std::sync, std::thread
// ============================================================================

//! ## Overview
//! Driver `bind` calls represent calls to external agents and may block. The
//! bounded wrapper runs the inner bind on a worker thread and waits up to the
//! configured deadline: exceeding it yields [`DriverError::Timeout`], which
//! the negotiator records before falling through to the next candidate. A
//! late result from the worker is discarded; no further cancellation is
//! attempted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use port_binding_core::BindOutcome;
use port_binding_core::BindingDriver;
use port_binding_core::BindingRequest;
use port_binding_core::DriverError;

// ============================================================================
// SECTION: Bounded Wrapper
// ============================================================================

/// Driver wrapper enforcing a bind deadline.
#[derive(Debug)]
pub struct BoundedDriver<D> {
    /// Wrapped driver.
    inner: Arc<D>,
    /// Deadline applied to each bind call.
    timeout: Duration,
}

impl<D> BoundedDriver<D> {
    /// Wraps a driver with a bind deadline.
    #[must_use]
    pub fn new(driver: D, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(driver),
            timeout,
        }
    }

    /// Returns the configured deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<D> BindingDriver for BoundedDriver<D>
where
    D: BindingDriver + Send + Sync + 'static,
{
    fn supports(&self, request: &BindingRequest) -> bool {
        self.inner.supports(request)
    }

    fn bind(&self, request: &BindingRequest) -> Result<BindOutcome, DriverError> {
        let (sender, receiver) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let request = request.clone();
        let spawned = thread::Builder::new().name("binding-driver-bind".to_string()).spawn(
            move || {
                // The receiver may be gone after a timeout; a failed send is fine.
                let _ = sender.send(inner.bind(&request));
            },
        );
        if spawned.is_err() {
            return Err(DriverError::Bind("could not spawn bind worker thread".to_string()));
        }
        match receiver.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(DriverError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}
