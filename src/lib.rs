//! Card feed session: a profile index, a rotating window of visible
//! cards, a lazily filled detail cache and `mailto:` contact links.

use std::sync::Once;

pub mod cache;
pub mod config;
pub mod contact;
mod errors;
pub mod feed;
pub mod identity;
pub mod index;
pub mod profile;
pub mod queue;
pub mod shuffle;
pub mod source;
pub mod visible;

pub use cache::{FailurePolicy, ProfileCache};
pub use config::FeedConfig;
pub use contact::{local_part, ContactLink, ContactTemplate};
pub use errors::{FeedError, Result};
pub use feed::{ContactOutcome, Feed};
pub use identity::{Identity, IdentityStore};
pub use index::{IndexOrigin, IndexStore};
pub use profile::{
    DetailDefaults, PhotoFallback, ProfileDetail, ProfileId, ProfileSummary,
};
pub use queue::{Queue, RefillOrder};
pub use source::{HttpSource, ProfileSource};
pub use visible::VisibleSet;

static INIT: Once = Once::new();

/// Sets up logging from `RUST_LOG`. Safe to call more than once.
pub fn initialize() {
    INIT.call_once(|| {
        // Another logger may already be installed by the host.
        let _ = env_logger::try_init();
        log::info!("Initializing cardfeed");
    });
}
