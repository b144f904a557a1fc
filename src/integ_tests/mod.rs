//! Engine scenarios run in-process via `cargo test --lib`.
//!
//! These exercise the library API only; HTTP-level tests live in `tests/`.

mod test_facets;
mod test_library;
