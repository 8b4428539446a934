//! Helpers for tests: throwaway SQLite databases and an in-memory payment gateway.
pub mod fake_gateway;
pub mod prepare_env;
