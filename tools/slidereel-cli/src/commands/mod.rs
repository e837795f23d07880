pub mod add;
pub mod check;
pub mod compile;
pub mod info;
pub mod init;
pub mod probe;
