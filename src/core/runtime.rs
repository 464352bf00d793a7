use tracing::info;

pub struct RuntimeConfig;

impl RuntimeConfig {
    /// Sizes the global rayon pool. `None` or `Some(0)` keeps rayon's own
    /// choice (one thread per logical core).
    pub fn init_thread_pool(threads: Option<usize>) -> Result<(), rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("retrieval-worker-{}", i));
        if let Some(n) = threads.filter(|&n| n > 0) {
            builder = builder.num_threads(n);
        }
        builder.build_global()?;
        info!(
            threads = rayon::current_num_threads(),
            kernel = crate::simd::kernel_name(),
            "Thread pool ready"
        );
        Ok(())
    }
}
