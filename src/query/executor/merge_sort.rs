//! 联邦层归并排序
//!
//! 对各分片已经有序的结果流做多路归并。堆中每个流只保留一个游标，
//! 无界时占用 O(k) 内存；OFFSET/FETCH 在流式输出时应用，不缓冲全部结果。

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::core::error::{DBError, DBResult};
use crate::core::Value;
use crate::query::planner::plan::{Collation, RowBound};

pub type Row = Vec<Value>;

/// 在执行期求值 OFFSET/FETCH
pub fn resolve_bounds(
    offset: Option<&RowBound>,
    fetch: Option<&RowBound>,
    parameters: &[Value],
) -> DBResult<(Option<u64>, Option<u64>)> {
    let evaluate = |bound: Option<&RowBound>| -> DBResult<Option<u64>> {
        bound
            .map(|bound| {
                bound
                    .evaluate(parameters)
                    .ok_or_else(|| DBError::Internal(format!("无法求值行数边界 {}", bound)))
            })
            .transpose()
    };
    Ok((evaluate(offset)?, evaluate(fetch)?))
}

/// 分片本地排序：排序后跳过 offset 行，最多保留 fetch 行
pub fn local_sort(mut rows: Vec<Row>, collation: &Collation, offset: Option<u64>, fetch: Option<u64>) -> Vec<Row> {
    rows.sort_by(|a, b| collation.compare(a, b));
    let skip = offset.map_or(0, |o| usize::try_from(o).unwrap_or(usize::MAX));
    let take = fetch.map_or(usize::MAX, |f| usize::try_from(f).unwrap_or(usize::MAX));
    rows.into_iter().skip(skip).take(take).collect()
}

/// 堆项：当前行及其来源流
struct Cursor {
    row: Row,
    stream: usize,
    collation: Arc<Collation>,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap 是大顶堆，反转比较得到最小行；相等时编号小的流优先
        self.collation
            .compare(&other.row, &self.row)
            .then_with(|| other.stream.cmp(&self.stream))
    }
}

/// 多路归并迭代器
pub struct MergeSortIterator<I: Iterator<Item = Row>> {
    streams: Vec<I>,
    heap: BinaryHeap<Cursor>,
    collation: Arc<Collation>,
    remaining_offset: u64,
    remaining_fetch: Option<u64>,
}

impl<I: Iterator<Item = Row>> MergeSortIterator<I> {
    fn advance(&mut self, stream: usize) {
        if let Some(row) = self.streams[stream].next() {
            self.heap.push(Cursor {
                row,
                stream,
                collation: Arc::clone(&self.collation),
            });
        }
    }

    /// 当前打开的游标数
    pub fn open_cursors(&self) -> usize {
        self.heap.len()
    }
}

impl<I: Iterator<Item = Row>> Iterator for MergeSortIterator<I> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        loop {
            if self.remaining_fetch == Some(0) {
                return None;
            }
            let cursor = self.heap.pop()?;
            self.advance(cursor.stream);
            if self.remaining_offset > 0 {
                self.remaining_offset -= 1;
                continue;
            }
            if let Some(fetch) = self.remaining_fetch.as_mut() {
                *fetch -= 1;
            }
            return Some(cursor.row);
        }
    }
}

/// 归并多个有序流，归并后应用 offset/fetch
pub fn merge_sort<S>(
    streams: Vec<S>,
    collation: &Collation,
    offset: Option<u64>,
    fetch: Option<u64>,
) -> MergeSortIterator<S::IntoIter>
where
    S: IntoIterator<Item = Row>,
{
    let streams: Vec<S::IntoIter> = streams.into_iter().map(IntoIterator::into_iter).collect();
    let mut iterator = MergeSortIterator {
        heap: BinaryHeap::with_capacity(streams.len()),
        streams,
        collation: Arc::new(collation.clone()),
        remaining_offset: offset.unwrap_or(0),
        remaining_fetch: fetch,
    };
    for stream in 0..iterator.streams.len() {
        iterator.advance(stream);
    }
    iterator
}
