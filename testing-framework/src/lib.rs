//! Wrapmint testing framework
//!
//! Scenario harness for the wrapped-asset subsystem: in-memory stand-ins
//! for the external collaborators (base asset, credential registry, TTL
//! policy) and a `TestBench` that deploys a complete system on a manual
//! clock.
//!
//! Unit tests live next to the code they cover in `wrapmint_common`; this
//! crate carries the cross-component scenarios.

pub mod bench;
pub mod mocks;

pub use bench::TestBench;
pub use mocks::{MockAsset, MockCredentials, MockPolicy};
