//! Pure data structures for the catalog: [`Product`] and the [`ProductsResponse`] envelope.

pub mod product;

pub use product::*;
