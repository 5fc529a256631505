pub mod check;
pub mod fmt;
pub mod index_cmd;
pub mod refs;
pub mod scan;
pub mod show;
