// tests/integration/main.rs

mod api;
