//! Directory view
//!
//! The per-client page state machine. Every user action is dispatched here,
//! processed to completion, and any failure becomes a notice on the page.
//!
//! The view subscribes to its session manager once, at construction. Identity
//! changes are drained after every action: a new identity triggers a full
//! reload of the listings, a cleared identity hides them. A token rejected by
//! the document store ends the session the same way a logout does.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::app::{ListingRepository, ModerationService, OwnerPolicy, SessionManager};
use crate::domain::entities::{
    Account, AuthSession, BotListing, BotListingId, BotType, ListingChange, NewBotListing,
};
use crate::domain::ports::{DocumentStore, IdentityProvider};
use crate::error::{DomainError, StoreError};

/// Shown when the document store no longer accepts the session's token
pub const SESSION_EXPIRED: &str = "Sitzung abgelaufen, bitte erneut anmelden";

/// Which credential form is shown while signed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// How the cached listings are brought up to date after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSync {
    /// Merge the mutation's outcome into the cache, reloading only if it is stale
    #[default]
    Merge,
    /// Refetch the whole collection after every mutation
    Reload,
}

impl std::str::FromStr for ListingSync {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(ListingSync::Merge),
            "reload" => Ok(ListingSync::Reload),
            _ => Err(format!("Unknown listing sync mode: {}", s)),
        }
    }
}

/// A message shown above the page until dismissed or the next action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Form contents. Each edit replaces the whole value.
///
/// Passwords are never kept here so they are never echoed back into the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub email: String,
    pub bot_name: String,
    pub bot_type: BotType,
    pub bot_website: String,
    pub bot_phone: String,
    pub bot_discord: String,
}

impl FormState {
    pub fn with_email(self, email: &str) -> Self {
        Self {
            email: email.to_string(),
            ..self
        }
    }

    pub fn with_bot(self, bot: &NewBotListing) -> Self {
        Self {
            bot_name: bot.name.clone(),
            bot_type: bot.bot_type,
            bot_website: bot.website.clone(),
            bot_phone: bot.phone.clone(),
            bot_discord: bot.discord_link.clone(),
            ..self
        }
    }

    /// Clear the bot text fields after a successful submission. The selected type stays.
    pub fn without_bot(self) -> Self {
        Self {
            bot_name: String::new(),
            bot_website: String::new(),
            bot_phone: String::new(),
            bot_discord: String::new(),
            ..self
        }
    }
}

/// User actions the view understands
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    ToggleTheme,
    ToggleAuthMode,
    ShowLogin,
    SubmitAuth { email: String, password: String },
    Logout,
    SubmitBot(NewBotListing),
    Verify(BotListingId),
    Ban(BotListingId),
    Delete(BotListingId),
    DismissNotice,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub auth_mode: AuthMode,
    pub theme: ThemeMode,
    pub form: FormState,
    /// Every fetched listing, banned ones included
    pub listings: Vec<BotListing>,
    pub notice: Option<Notice>,
}

/// One card of the bot grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotCard {
    pub id: BotListingId,
    pub name: String,
    #[serde(rename = "type")]
    pub bot_type: BotType,
    pub website: Option<String>,
    pub discord_link: Option<String>,
    pub phone: Option<String>,
    pub verified: bool,
    /// Submitted by the owner account
    pub owner_listing: bool,
    pub can_verify: bool,
    pub can_ban: bool,
    pub can_delete: bool,
}

impl BotCard {
    fn new(listing: &BotListing, policy: &OwnerPolicy, viewer_is_owner: bool) -> Self {
        Self {
            id: listing.id.clone(),
            name: listing.name.clone(),
            bot_type: listing.bot_type,
            website: non_empty(&listing.website),
            discord_link: non_empty(&listing.discord_link),
            phone: non_empty(&listing.phone),
            verified: listing.verified,
            owner_listing: policy.is_owner_listing(listing),
            can_verify: viewer_is_owner && !listing.verified,
            can_ban: viewer_is_owner,
            can_delete: viewer_is_owner,
        }
    }
}

/// Everything the renderer needs for one page
#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    pub account: Option<Account>,
    pub is_owner: bool,
    pub auth_mode: AuthMode,
    pub theme: ThemeMode,
    pub form: FormState,
    pub show_submission_form: bool,
    pub notice: Option<Notice>,
    pub bots: Vec<BotCard>,
}

/// Page state of one client
pub struct DirectoryView<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    session: SessionManager<IP>,
    identity: watch::Receiver<Option<AuthSession>>,
    current: Option<AuthSession>,
    listings: Arc<ListingRepository<S>>,
    moderation: Arc<ModerationService<S>>,
    sync: ListingSync,
    state: ViewState,
    /// Set by an action that left the cache current; the next page load skips its refetch
    listings_fresh: bool,
}

impl<IP, S> DirectoryView<IP, S>
where
    IP: IdentityProvider + ?Sized,
    S: DocumentStore + ?Sized,
{
    pub fn new(
        provider: Arc<IP>,
        listings: Arc<ListingRepository<S>>,
        moderation: Arc<ModerationService<S>>,
        sync: ListingSync,
    ) -> Self {
        let session = SessionManager::new(provider);
        let identity = session.subscribe();
        Self {
            session,
            identity,
            current: None,
            listings,
            moderation,
            sync,
            state: ViewState::default(),
            listings_fresh: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn account(&self) -> Option<&Account> {
        self.current.as_ref().map(|s| &s.account)
    }

    /// Process one user action, then any identity change it caused
    pub async fn dispatch(&mut self, action: ViewAction) {
        self.state.notice = None;
        self.listings_fresh = true;

        if let Err(e) = self.handle(action).await {
            tracing::warn!(error = %e, "Action failed");
            self.fail(e);
        }

        self.refresh().await;
    }

    /// Apply pending identity notifications
    pub async fn refresh(&mut self) {
        // Closed only once the session manager is gone
        while self.identity.has_changed().unwrap_or(false) {
            self.current = self.identity.borrow_and_update().clone();

            match self.current.clone() {
                Some(session) => {
                    if let Err(e) = self.reload(&session).await {
                        tracing::warn!(error = %e, "Listing reload failed");
                        self.fail(e);
                    }
                }
                None => self.state.listings.clear(),
            }
        }
    }

    /// Page load. Like a browser refresh, brings the listings up to date
    /// without touching the current notice.
    ///
    /// The load that follows an action's redirect reuses the cache that action
    /// just brought up to date.
    pub async fn load(&mut self) {
        let fresh = std::mem::take(&mut self.listings_fresh);
        if !fresh && !self.identity.has_changed().unwrap_or(false) {
            if let Some(session) = self.current.clone() {
                if let Err(e) = self.reload(&session).await {
                    tracing::warn!(error = %e, "Listing reload failed");
                    self.fail(e);
                }
            }
        }

        self.refresh().await;
    }

    /// Snapshot for rendering
    pub fn page(&self) -> PageModel {
        let policy = self.moderation.policy();
        let account = self.account().cloned();
        let is_owner = account.as_ref().is_some_and(|a| policy.is_owner(a));

        let bots = if account.is_some() {
            self.state
                .listings
                .iter()
                .filter(|l| l.is_public())
                .map(|l| BotCard::new(l, policy, is_owner))
                .collect()
        } else {
            Vec::new()
        };

        PageModel {
            show_submission_form: account.is_some() && !is_owner,
            account,
            is_owner,
            auth_mode: self.state.auth_mode,
            theme: self.state.theme,
            form: self.state.form.clone(),
            notice: self.state.notice.clone(),
            bots,
        }
    }

    async fn handle(&mut self, action: ViewAction) -> Result<(), DomainError> {
        match action {
            ViewAction::ToggleTheme => {
                self.state.theme = self.state.theme.toggled();
            }
            ViewAction::ToggleAuthMode => {
                self.state.auth_mode = self.state.auth_mode.toggled();
            }
            ViewAction::ShowLogin => {
                self.state.auth_mode = AuthMode::Login;
            }
            ViewAction::SubmitAuth { email, password } => {
                self.state.form = self.state.form.clone().with_email(&email);
                match self.state.auth_mode {
                    AuthMode::Login => self.session.login(&email, &password).await?,
                    AuthMode::Register => self.session.register(&email, &password).await?,
                };
            }
            ViewAction::Logout => {
                self.session.logout().await?;
            }
            ViewAction::SubmitBot(input) => {
                self.state.form = self.state.form.clone().with_bot(&input);
                let actor = self.require_session()?;

                let change = self
                    .listings
                    .create(&input, actor.email(), Some(&actor.id_token))
                    .await?;
                self.state.form = self.state.form.clone().without_bot();
                self.state.notice = Some(Notice::Info(format!("{} hinzugefügt", input.name.trim())));
                self.resync(change, &actor).await?;
            }
            ViewAction::Verify(id) => {
                let actor = self.require_session()?;
                let result = self.moderation.verify(&actor, &id).await;
                self.after_moderation(result, &id, &actor).await?;
            }
            ViewAction::Ban(id) => {
                let actor = self.require_session()?;
                let result = self.moderation.ban(&actor, &id).await;
                self.after_moderation(result, &id, &actor).await?;
            }
            ViewAction::Delete(id) => {
                let actor = self.require_session()?;
                let result = self.moderation.delete(&actor, &id).await;
                self.after_moderation(result, &id, &actor).await?;
            }
            ViewAction::DismissNotice => {}
        }
        Ok(())
    }

    fn fail(&mut self, error: DomainError) {
        self.listings_fresh = false;
        let message = match error {
            DomainError::Store(StoreError::Unauthenticated) => {
                self.session.expire();
                SESSION_EXPIRED.to_string()
            }
            e => e.to_string(),
        };
        self.state.notice = Some(Notice::Error(message));
    }

    fn require_session(&self) -> Result<AuthSession, DomainError> {
        self.current.clone().ok_or(DomainError::Unauthenticated)
    }

    async fn after_moderation(
        &mut self,
        result: Result<ListingChange, DomainError>,
        id: &BotListingId,
        actor: &AuthSession,
    ) -> Result<(), DomainError> {
        match result {
            Ok(change) => self.resync(change, actor).await,
            Err(DomainError::NotFound(missing)) => {
                // Deleted elsewhere; drop it from the cache too
                ListingChange::Removed(id.clone()).apply(&mut self.state.listings);
                Err(DomainError::NotFound(missing))
            }
            Err(e) => Err(e),
        }
    }

    async fn resync(
        &mut self,
        change: ListingChange,
        actor: &AuthSession,
    ) -> Result<(), DomainError> {
        match self.sync {
            ListingSync::Merge if change.apply(&mut self.state.listings) => Ok(()),
            _ => self.reload(actor).await,
        }
    }

    async fn reload(&mut self, session: &AuthSession) -> Result<(), DomainError> {
        self.state.listings = self.listings.fetch_all(Some(&session.id_token)).await?;
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
