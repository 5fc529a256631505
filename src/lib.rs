//! Schema-aware store for GameMaker Studio 2 `.yy` resource descriptors.
//!
//! The core cycle is parse → validate → resolve → serialize: relaxed-JSON
//! descriptor text becomes an ordered value tree, is checked against
//! declarative per-kind shapes and a project-wide name/path index, and
//! round-trips back to byte-identical text when untouched.

pub mod yy;
