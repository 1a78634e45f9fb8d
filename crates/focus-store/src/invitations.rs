//! Pending-invitation polling.
//!
//! A background task refreshes the pending invitations on a fixed interval
//! and publishes each result on a `watch` channel. It never touches the entity
//! caches while polling, so it cannot block or be blocked by mutations.
//! Accepting an invitation changes group membership, so it marks the groups
//! cache stale; inviting someone to a project marks the projects cache stale.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use focus_api::InvitationGateway;
use focus_core::{ApiError, EntityId, Group, InvitationList, Project, ProjectInvite};

use crate::cache::EntityCache;

/// Handle to the invitation poll loop.
pub struct InvitationPoller {
    gateway: Arc<dyn InvitationGateway>,
    groups: Arc<EntityCache<Group>>,
    projects: Arc<EntityCache<Project>>,
    latest: watch::Receiver<InvitationList>,
    poke: Arc<Notify>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl InvitationPoller {
    /// Start polling every `interval`. The first poll runs immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        gateway: Arc<dyn InvitationGateway>,
        groups: Arc<EntityCache<Group>>,
        projects: Arc<EntityCache<Project>>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, latest) = watch::channel(InvitationList::default());
        let poke = Arc::new(Notify::new());
        let task = tokio::spawn(poll_loop(
            gateway.clone(),
            tx,
            interval,
            poke.clone(),
            cancel.clone(),
        ));
        Self {
            gateway,
            groups,
            projects,
            latest,
            poke,
            cancel,
            task: Some(task),
        }
    }

    /// Most recent successful poll.
    pub fn latest(&self) -> InvitationList {
        self.latest.borrow().clone()
    }

    /// Receiver notified after every successful poll.
    pub fn subscribe(&self) -> watch::Receiver<InvitationList> {
        self.latest.clone()
    }

    /// Poll now instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.poke.notify_one();
    }

    /// Accept an invitation and mark the groups cache stale.
    pub async fn accept(&self, token: &str) -> Result<(), ApiError> {
        self.gateway.accept(token).await?;
        info!("invitation accepted");
        self.groups.invalidate_all();
        self.refresh_now();
        Ok(())
    }

    /// Decline an invitation.
    pub async fn decline(&self, token: &str) -> Result<(), ApiError> {
        self.gateway.decline(token).await?;
        info!("invitation declined");
        self.refresh_now();
        Ok(())
    }

    /// Invite someone to a project and mark the projects cache stale.
    pub async fn invite_to_project(
        &self,
        project_id: &EntityId,
        invite: &ProjectInvite,
    ) -> Result<(), ApiError> {
        self.gateway.invite_to_project(project_id, invite).await?;
        info!(project_id = %project_id, "project invitation sent");
        self.projects.invalidate_all();
        Ok(())
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "invitation poller task failed");
            }
        }
    }
}

impl Drop for InvitationPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    gateway: Arc<dyn InvitationGateway>,
    tx: watch::Sender<InvitationList>,
    interval: Duration,
    poke: Arc<Notify>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(interval_ms = interval.as_millis(), "invitation poller started");

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            () = poke.notified() => ticker.reset(),
        }

        match gateway.pending().await {
            Ok(list) => {
                debug!(pending = list.pending_count, "invitations polled");
                let _ = tx.send_replace(list);
            }
            Err(ApiError::Authentication) => {
                debug!("invitation poll skipped: not signed in");
            }
            Err(e) => {
                warn!(code = e.code(), "invitation poll failed: {e}");
            }
        }
    }

    debug!("invitation poller stopped");
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
