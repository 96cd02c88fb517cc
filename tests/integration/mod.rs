//! Integration test suite for redislock
//!
//! End-to-end checks of the lock protocol through the public API. Almost all
//! tests run against the in-process `MemoryStore`, with tokio's paused clock
//! where expiry or latency matters, so the suite needs no external services.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # include the live Redis test
//! REDISLOCK_TEST_URL=redis://127.0.0.1:6379 cargo test --test integration -- --ignored
//! ```
//!
//! # Test Organization
//!
//! - **mutual_exclusion**: concurrent acquisition of one resource
//! - **release**: token-gated and repeated release
//! - **expiry**: passive expiry of unreleased locks
//! - **drift**: rejection of acquisitions that came back too late
//! - **scenarios**: multi-caller walkthroughs
//! - **redis_live**: the same walkthrough against a real server

mod drift;
mod expiry;
mod mutual_exclusion;
mod redis_live;
mod release;
mod scenarios;
