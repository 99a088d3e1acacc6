//! End-to-end tests driving the HTTP router in process.

mod integration;
