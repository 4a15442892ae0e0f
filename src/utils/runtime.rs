use anyhow::Result;

/// Everything in shiftlog runs on one cooperative thread. Store mutations never interleave at a
/// finer grain than a whole read-modify-write cycle.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
