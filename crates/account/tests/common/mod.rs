// crates/account/tests/common/mod.rs

mod setup_postgres_test_db;

pub use setup_postgres_test_db::{setup_postgres_test_db, TestDb};
