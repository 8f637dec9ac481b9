//! URL-keyed download progress tracking.
//!
//! A [`ProgressRegistry`] maps request URLs to [`ProgressObserver`]s. Response
//! bodies are wrapped in a [`TrackingBodyStream`] (or a [`TrackingReader`] for
//! blocking bodies) that reports every consumed chunk to the registry, which
//! throttles the reports by the observer's granularity and posts the
//! surviving ones to a [`ProgressNotifier`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use pulse_core::{ChannelObserver, ClientConfig, ProgressInterceptor, ProgressNotifier, ProgressRegistry};
//!
//! # async fn demo() -> pulse_core::Result<()> {
//! let (handle, notifier) = ProgressNotifier::new();
//! tokio::spawn(notifier.run());
//! let registry = Arc::new(ProgressRegistry::new(handle));
//! let interceptor = ProgressInterceptor::from_config(&ClientConfig::default(), Arc::clone(&registry))?;
//!
//! let url = pulse_core::url_key("https://example.com/image.png")?;
//! let (observer, mut updates) = ChannelObserver::new(1.0);
//! registry.expect(url.clone(), Arc::new(observer));
//! tokio::spawn(async move {
//!     while let Some(update) = updates.recv().await {
//!         println!("{:?}", update.percent());
//!     }
//! });
//! let body = interceptor.get(&url).await?.bytes().await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod progress;
pub mod types;

pub use body::{StreamState, TrackingBodyStream, TrackingReader};
pub use client::{url_key, BodyStream, ClientConfig, ProgressInterceptor, TrackedResponse};
pub use progress::{
    Callback, CallbackPoster, ChannelObserver, NotifierHandle, ProgressNotifier,
    ProgressObserver, ProgressRegistry, ProgressSnapshot,
};
pub use types::types::{ProgressError, Result};
