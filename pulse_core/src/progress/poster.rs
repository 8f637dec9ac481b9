use futures::future::BoxFuture;

/// A deferred observer invocation.
pub type Callback = BoxFuture<'static, ()>;

/// The execution context observer callbacks are handed to.
///
/// `ProgressRegistry::dispatch` runs on whatever thread is reading the
/// response body; it never awaits an observer itself. Instead it posts the
/// invocation here. Implementations must run posted callbacks one at a time
/// and in posting order. `post` must not block.
pub trait CallbackPoster: Send + Sync + 'static {
    fn post(&self, callback: Callback);
}
