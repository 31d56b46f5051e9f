pub mod fs_loader;
pub mod ops_convert;
pub mod ops_inspect;
pub mod ops_locate;

pub use fs_loader::FsLoader;
