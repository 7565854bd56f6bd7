#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
// Unit tests also see this crate as its own dev-dependency.
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod audio_thread;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod playback;
pub mod prefetch;
pub mod retry;
pub mod session;
pub mod sound;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use audio_thread::AudioOutput;
pub use cache::{AudioCache, CacheEntry, CacheKey, LoadState};
pub use config::PlayerConfig;
pub use controller::PlayerHandle;
pub use error::PlayerError;
pub use loader::{SharedSpeed, SoundLoader};
pub use playback::{RodioSound, RodioSoundFactory};
pub use prefetch::PrefetchScheduler;
pub use retry::{RetryPolicy, with_retries};
pub use session::{PlayerEvent, PlayerState, SessionSnapshot};
pub use sound::{SoundEvent, SoundFactory, SoundHandle, SoundRef, SoundStatus};

// Silence unused dev-dependency warnings for the lib test harness
#[cfg(test)]
use tokio_test as _;
