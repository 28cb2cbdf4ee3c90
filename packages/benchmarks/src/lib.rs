//! This package exists only to host benchmarks; see the `benches` directory.
