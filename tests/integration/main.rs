//! Router integration tests

mod database_tests;
mod router_tests;
