pub mod alias;
pub mod builtin;
pub mod compile;
pub mod dedup;
pub mod discover;
pub mod dist;
pub mod expand;
pub mod fs_ops;
pub mod gate;
pub mod pool;
pub mod process;
