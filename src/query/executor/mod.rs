//! 执行辅助
//!
//! 分片连接与结果流由外部执行器负责，这里只提供联邦层归并排序。

pub mod merge_sort;

pub use merge_sort::{local_sort, merge_sort, resolve_bounds, MergeSortIterator, Row};
