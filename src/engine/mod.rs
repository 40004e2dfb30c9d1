//! Engine modules: the stateful side of the resolver.
//!
//! The engine owns the live selection and talks to a `DataSource`; every
//! decision it makes is delegated to the pure `logic` layer.

pub mod session;
