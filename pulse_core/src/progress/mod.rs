pub mod granularity;
pub mod notifier;
pub mod observer;
pub mod poster;
pub mod registry;
pub mod snapshot;

pub use notifier::{NotifierHandle, ProgressNotifier};
pub use observer::{ChannelObserver, ProgressObserver};
pub use poster::{Callback, CallbackPoster};
pub use registry::ProgressRegistry;
pub use snapshot::ProgressSnapshot;
