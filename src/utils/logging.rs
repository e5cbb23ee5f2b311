use tracing::span::Span;

/// Reports an error that does not change the outcome of a request, in the span in which
/// it happened.
pub trait LogError {
    fn log_error<E: Into<anyhow::Error>>(&self, error: E);
}

impl LogError for Span {
    fn log_error<E: Into<anyhow::Error>>(&self, error: E) {
        let error = error.into();
        self.in_scope(|| {
            tracing::error!("Error: {error:?}");
        });
    }
}
