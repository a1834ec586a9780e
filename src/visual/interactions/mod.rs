pub mod pointer;

pub use pointer::target_pointer;
