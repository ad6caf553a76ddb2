use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride must be non-zero.
    #[error("row stride must be > 0, got {0}")]
    InvalidRowStride(usize),
}

/// Controls how row-wise image operations are executed.
///
/// Every strategy computes each output element with the same sequence of
/// floating point operations, so the results are bit-identical across strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Process rows in parallel on the current Rayon thread pool.
    ParallelRows,

    /// Process rows in parallel on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool, ParallelError> {
    if num_threads == 0 {
        return Err(ParallelError::InvalidThreadCount(num_threads));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| ParallelError::BuildError(e.to_string()))
}

/// Run `op` inside the thread pool selected by `strategy`.
///
/// [`ExecutionStrategy::Fixed`] installs a local pool; every other strategy runs
/// `op` on the current thread, so Rayon work inside it uses the global pool.
pub fn install<R, F>(strategy: ExecutionStrategy, op: F) -> Result<R, ParallelError>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match strategy {
        ExecutionStrategy::Fixed(n) => Ok(build_pool(n)?.install(op)),
        _ => Ok(op()),
    }
}

/// Apply `f(row_index, row)` to every row of a row-major buffer.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `data` - The destination buffer.
/// * `row_stride` - Number of elements per row (width * channels).
/// * `f` - The operation writing one row.
pub fn for_each_row<T, F>(
    strategy: ExecutionStrategy,
    data: &mut [T],
    row_stride: usize,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if data.is_empty() {
        return Ok(());
    }
    if row_stride == 0 {
        return Err(ParallelError::InvalidRowStride(row_stride));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            data.chunks_mut(row_stride)
                .enumerate()
                .for_each(|(r, row)| f(r, row));
        }
        ExecutionStrategy::ParallelRows => {
            data.par_chunks_mut(row_stride)
                .enumerate()
                .for_each(|(r, row)| f(r, row));
        }
        ExecutionStrategy::Fixed(n) => {
            let pool = build_pool(n)?;
            pool.install(|| {
                data.par_chunks_mut(row_stride)
                    .enumerate()
                    .for_each(|(r, row)| f(r, row));
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_rows(strategy: ExecutionStrategy) -> Result<Vec<usize>, ParallelError> {
        let mut data = vec![0usize; 12];
        for_each_row(strategy, &mut data, 4, |r, row| {
            row.iter_mut().enumerate().for_each(|(c, v)| *v = r * 10 + c)
        })?;
        Ok(data)
    }

    #[test]
    fn test_for_each_row_strategies_agree() -> Result<(), ParallelError> {
        let expected = vec![0, 1, 2, 3, 10, 11, 12, 13, 20, 21, 22, 23];
        assert_eq!(fill_rows(ExecutionStrategy::Serial)?, expected);
        assert_eq!(fill_rows(ExecutionStrategy::ParallelRows)?, expected);
        assert_eq!(fill_rows(ExecutionStrategy::Fixed(2))?, expected);
        Ok(())
    }

    #[test]
    fn test_for_each_row_invalid() {
        let mut data = vec![0u8; 4];
        let res = for_each_row(ExecutionStrategy::Serial, &mut data, 0, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidRowStride(0)));

        let res = for_each_row(ExecutionStrategy::Fixed(0), &mut data, 2, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }

    #[test]
    fn test_install() -> Result<(), ParallelError> {
        assert_eq!(install(ExecutionStrategy::Serial, || 3)?, 3);
        assert_eq!(install(ExecutionStrategy::Fixed(1), || 4)?, 4);
        assert!(install(ExecutionStrategy::Fixed(0), || 5).is_err());
        Ok(())
    }
}
