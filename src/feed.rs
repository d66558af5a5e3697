use url::Url;

use crate::cache::ProfileCache;
use crate::config::FeedConfig;
use crate::contact::ContactLink;
use crate::identity::{Identity, IdentityStore};
use crate::index::IndexStore;
use crate::profile::{ProfileDetail, ProfileId, ProfileSummary};
use crate::queue::Queue;
use crate::source::{HttpSource, ProfileSource};
use crate::visible::VisibleSet;
use crate::{FeedError, Result};

type RedrawListener = Box<dyn FnMut(&[ProfileId]) + Send>;

/// Result of asking to contact a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The message link to hand to the mail handler. The card has
    /// already been rotated out.
    Link(Url),
    /// Nobody is signed in. The request is kept and resumed by
    /// [`Feed::sign_in`].
    IdentityRequired,
    /// The profile is not on screen; nothing happened.
    NotVisible,
}

/// One browsing session: the loaded index, the rotation queue, the
/// visible window and the detail cache.
pub struct Feed<S> {
    source: S,
    index: IndexStore,
    queue: Queue,
    visible: VisibleSet,
    cache: ProfileCache,
    contact: ContactLink,
    identity: IdentityStore,
    pending: Option<ProfileId>,
    listeners: Vec<RedrawListener>,
}

impl Feed<HttpSource> {
    /// Starts a session against the REST resources named in `config`.
    pub async fn connect(config: FeedConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpSource::new(config.index_url()?, config.detail_url()?)?;
        Self::start(source, config).await
    }
}

impl<S: ProfileSource> Feed<S> {
    /// Loads the index, then fills the visible window.
    ///
    /// The window is only filled once the index load has finished,
    /// successfully or with the fallback list.
    pub async fn start(source: S, config: FeedConfig) -> Result<Self> {
        config.validate()?;
        let photos = config.photos()?;

        let index = IndexStore::load(&source, &photos).await;

        let mut queue = match config.seed {
            Some(seed) => Queue::with_seed(config.refill_order, seed),
            None => Queue::new(config.refill_order),
        };
        let mut visible = VisibleSet::new(config.visible_slots);
        visible.fill(&mut queue, &index)?;
        log::info!(
            "feed: started with {} of {} profiles visible ({:?})",
            visible.len(),
            index.len(),
            index.origin()
        );

        Ok(Self {
            source,
            index,
            queue,
            visible,
            cache: ProfileCache::new(
                "details",
                config.failure_policy,
                photos,
                config.detail_defaults,
            ),
            contact: ContactLink::new(config.contact),
            identity: IdentityStore::new(config.identity_path),
            pending: None,
            listeners: Vec::new(),
        })
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    pub fn visible(&self) -> &[ProfileId] {
        self.visible.ids()
    }

    /// Summaries of the visible cards, in slot order.
    pub fn visible_profiles(&self) -> Vec<&ProfileSummary> {
        self.visible
            .ids()
            .iter()
            .filter_map(|id| self.index.get(*id))
            .collect()
    }

    /// Registers a listener called with the window after every change.
    /// It is called once right away with the current window.
    pub fn on_redraw<F>(&mut self, mut listener: F)
    where
        F: FnMut(&[ProfileId]) + Send + 'static,
    {
        listener(self.visible.ids());
        self.listeners.push(Box::new(listener));
    }

    /// Dismisses a card. Returns whether anything changed.
    pub fn skip(&mut self, id: ProfileId) -> Result<bool> {
        self.rotate(id)
    }

    pub fn pending_contact(&self) -> Option<ProfileId> {
        self.pending
    }

    /// Builds the contact link for a visible card and rotates it out,
    /// or parks the request until someone signs in.
    pub fn contact(&mut self, id: ProfileId) -> Result<ContactOutcome> {
        if !self.visible.contains(id) {
            return Ok(ContactOutcome::NotVisible);
        }

        match self.identity.load()? {
            Some(sender) => {
                let link = self.compose(id, &sender)?;
                Ok(ContactOutcome::Link(link))
            }
            None => {
                log::info!("feed: contact {} waits for sign-in", id);
                self.pending = Some(id);
                Ok(ContactOutcome::IdentityRequired)
            }
        }
    }

    /// Stores the identity and resumes a pending contact, returning its
    /// link if the card is still visible.
    pub fn sign_in(&mut self, name: &str, email: &str) -> Result<Option<Url>> {
        let sender = Identity::new(name, email)?;
        self.identity.save(&sender)?;

        let Some(id) = self.pending.take() else {
            return Ok(None);
        };
        if !self.visible.contains(id) {
            log::debug!("feed: pending contact {} no longer visible", id);
            return Ok(None);
        }
        self.compose(id, &sender).map(Some)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.pending = None;
        self.identity.clear()
    }

    pub fn signed_in(&self) -> Result<Option<Identity>> {
        self.identity.load()
    }

    /// Full record for a profile, fetched lazily and memoized.
    pub async fn detail(&self, id: ProfileId) -> Result<ProfileDetail> {
        self.cache.fetch(id, &self.index, &self.source).await
    }

    fn compose(&mut self, id: ProfileId, sender: &Identity) -> Result<Url> {
        let summary = self.index.get(id).ok_or(FeedError::UnknownProfile(id))?;
        let link = self.contact.build(&summary.name, id, Some(sender))?;
        self.rotate(id)?;
        Ok(link)
    }

    fn rotate(&mut self, id: ProfileId) -> Result<bool> {
        let replaced = self
            .visible
            .replace(id, &mut self.queue, &self.index)?
            .is_some();
        if replaced {
            self.notify();
        }
        Ok(replaced)
    }

    fn notify(&mut self) {
        let ids = self.visible.ids();
        for listener in self.listeners.iter_mut() {
            listener(ids);
        }
    }
}
