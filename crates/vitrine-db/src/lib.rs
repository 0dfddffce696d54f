//! Product persistence
//!
//! [`ProductRepository`] is the only thing the HTTP layer sees. The
//! PostgreSQL implementation is used when `DATABASE_URL` is set; otherwise
//! products live in memory for the lifetime of the process.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryProductRepository;
pub use postgres::PgProductRepository;
pub use repository::ProductRepository;
