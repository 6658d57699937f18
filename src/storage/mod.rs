//! Storage implementations for invoice records

pub mod in_memory;

pub use in_memory::InMemoryInvoiceStore;
