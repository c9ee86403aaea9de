pub mod blocks;
pub mod eval;
pub mod init;
pub mod invoke;
