pub mod concat;

pub use concat::{concat, concat_fallible, ConcatOp};
