//! Query parameter binding on top of resolved basic types.

pub mod parameters;
