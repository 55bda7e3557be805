//! Async driver tying a [`BattleSession`] to a [`PokedexService`].
//!
//! [`Battle`] is the entry point a caller (UI, CLI runner, tests) uses. Each
//! operation locks the session only long enough to validate and record a
//! transition, releases it while the request is in flight, and locks again
//! to apply the response. A second action issued while a request is
//! outstanding sees the busy phase and fails with
//! [`SessionError::SessionBusy`] (or [`SessionError::IllegalTransition`]
//! while awaiting an opponent).
//!
//! After every transition a fresh [`SessionView`] is broadcast to
//! subscribers, so a presentation layer can render state changes without
//! being involved in the battle logic.
//!
//! The session lock is a plain [`std::sync::Mutex`] that is only taken in
//! synchronous sections, so a busy session can be rolled back from `Drop`
//! when a caller abandons an operation mid-request (a `select!`, an outer
//! timeout, an aborted task).
//!
//! Lock order is always catalog first, then session.

use core::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pokedex_types::{Creature, FORFEIT_MOVE, SessionView};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::catalog::SharedCatalog;
use crate::error::{ServiceError, SessionError};
use crate::service::PokedexService;
use crate::session::{BattleSession, TurnApplication, TurnReport, TurnRequest};

/// Capacity of the broadcast channel for session views.
///
/// A subscriber that falls behind by more than this many views receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const BROADCAST_CAPACITY: usize = 64;

/// A battle session driven against a remote service.
pub struct Battle<S> {
    service: S,
    session: Mutex<BattleSession>,
    catalog: SharedCatalog,
    events: broadcast::Sender<SessionView>,
    request_timeout: Duration,
}

/// Result of [`Battle::forfeit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forfeited {
    /// The concluding turn, always a loss.
    pub report: TurnReport,
    /// Why the service could not be told, if it could not.
    pub notification: Option<ServiceError>,
}

/// The busy phase an [`InFlight`] guard rolls back.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Initiate,
    Turn(u64),
}

/// Rolls the session back out of its busy phase unless disarmed.
struct InFlight<'a, S> {
    battle: &'a Battle<S>,
    pending: Option<Pending>,
}

impl<'a, S> InFlight<'a, S> {
    const fn new(battle: &'a Battle<S>, pending: Pending) -> Self {
        Self {
            battle,
            pending: Some(pending),
        }
    }

    /// The request completed; its result is handled by the caller.
    const fn disarm(&mut self) {
        self.pending = None;
    }
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let mut session = self.battle.lock();
        let rolled_back = match pending {
            Pending::Initiate => session.abort_initiate(),
            Pending::Turn(ticket) => session.abort_turn(ticket),
        };
        if rolled_back {
            warn!(?pending, "request abandoned before completion, session rolled back");
            self.battle.publish(&session);
        }
    }
}

impl<S> Battle<S> {
    /// Subscribe to session views published after every transition.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionView> {
        self.events.subscribe()
    }

    /// The underlying service.
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// The catalog store this battle updates.
    pub const fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Snapshot of the current session state.
    pub fn view(&self) -> SessionView {
        self.lock().view()
    }

    /// Return a concluded battle to idle, restoring the player's health.
    ///
    /// # Errors
    ///
    /// [`SessionError::IllegalTransition`] unless concluded.
    pub fn reset(&self) -> Result<SessionView, SessionError> {
        let mut session = self.lock();
        session.reset()?;
        self.publish(&session);
        Ok(session.view())
    }

    /// Lock the session.
    ///
    /// Session methods never panic, so a poisoned lock still holds a
    /// consistent state and is recovered.
    fn lock(&self) -> MutexGuard<'_, BattleSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast the session's current view.
    fn publish(&self, session: &BattleSession) {
        // No subscribers is not an error.
        let _ = self.events.send(session.view());
    }
}

impl<S: PokedexService> Battle<S> {
    /// Create an idle battle that unlocks creatures in `catalog` on victory.
    ///
    /// Every service request is bounded by `request_timeout`.
    pub fn new(service: S, catalog: SharedCatalog, request_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            service,
            session: Mutex::new(BattleSession::new()),
            catalog,
            events,
            request_timeout,
        }
    }

    /// Start a battle with a found creature.
    ///
    /// `starting_hit_points` is the player health to restore on reset.
    /// On failure, or if this future is dropped before the service answers,
    /// the session returns to idle.
    ///
    /// # Errors
    ///
    /// [`SessionError::IllegalTransition`] unless idle,
    /// [`SessionError::NotFound`] for a creature that is not found, and
    /// [`SessionError::Service`] if the request fails.
    pub async fn initiate(
        &self,
        player: Creature,
        starting_hit_points: u32,
    ) -> Result<SessionView, SessionError> {
        let request = {
            let catalog = self.catalog.read().await;
            let mut session = self.lock();
            let request = session.begin_initiate(player, starting_hit_points, &catalog)?;
            self.publish(&session);
            request
        };
        let mut guard = InFlight::new(self, Pending::Initiate);

        let response = self.call(self.service.start_game(&request.creature)).await;

        guard.disarm();
        let mut session = self.lock();
        match response {
            Ok(record) => {
                session.complete_initiate(record)?;
                self.publish(&session);
                Ok(session.view())
            }
            Err(error) => {
                warn!(creature = %request.creature, error = %error, "battle initiation failed");
                session.abort_initiate();
                self.publish(&session);
                Err(SessionError::Service(error))
            }
        }
    }

    /// Submit a move by its wire name.
    ///
    /// The reserved [`FORFEIT_MOVE`] is routed to [`forfeit`](Self::forfeit).
    /// On a transport or status failure, a stale response, or if this
    /// future is dropped before the service answers, the session is back in
    /// the active phase with nothing changed. No retry is attempted.
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionBusy`] while another move is in flight,
    /// [`SessionError::IllegalTransition`] unless active,
    /// [`SessionError::UnknownMove`] for a move the player does not have,
    /// and [`SessionError::Service`] if the request fails.
    pub async fn submit_move(&self, move_name: &str) -> Result<TurnApplication, SessionError> {
        if move_name == FORFEIT_MOVE {
            let forfeited = self.forfeit().await?;
            return Ok(TurnApplication::Applied(forfeited.report));
        }
        let request = {
            let mut session = self.lock();
            let request = session.begin_turn(move_name)?;
            self.publish(&session);
            request
        };
        self.resolve(request).await
    }

    /// Forfeit the battle: it concludes as a loss at once.
    ///
    /// The service is then notified with the reserved move. A failed
    /// notification is reported in [`Forfeited::notification`] and does not
    /// change the outcome. The found set is never changed by a forfeit.
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionBusy`] while a move is in flight and
    /// [`SessionError::IllegalTransition`] unless active.
    pub async fn forfeit(&self) -> Result<Forfeited, SessionError> {
        let forfeit = {
            let mut session = self.lock();
            let forfeit = session.forfeit()?;
            self.publish(&session);
            forfeit
        };
        let notice = forfeit.notice;
        info!(session_id = %notice.session_id, "notifying service of forfeit");

        let notification = match self
            .call(self.service.submit_move(
                &notice.session_id,
                &notice.player_id,
                &notice.move_name,
            ))
            .await
        {
            Ok(_) => None,
            Err(error) => {
                warn!(
                    session_id = %notice.session_id,
                    error = %error,
                    "forfeit notification failed, battle stays lost"
                );
                Some(error)
            }
        };
        Ok(Forfeited {
            report: forfeit.report,
            notification,
        })
    }

    /// Send a prepared turn and apply (or roll back) its result.
    async fn resolve(&self, request: TurnRequest) -> Result<TurnApplication, SessionError> {
        let mut guard = InFlight::new(self, Pending::Turn(request.ticket));

        let response = self
            .call(self.service.submit_move(
                &request.session_id,
                &request.player_id,
                &request.move_name,
            ))
            .await;

        let mut catalog = self.catalog.write().await;
        guard.disarm();
        let mut session = self.lock();
        match response {
            Ok(record) => {
                let application = session.apply_turn(request.ticket, record, &mut catalog);
                match &application {
                    TurnApplication::Applied(report) => debug!(
                        turn = report.turn,
                        move_name = request.move_name,
                        player_hp_pct = report.player_health_percent,
                        opponent_hp_pct = report.opponent_health_percent,
                        "turn resolved"
                    ),
                    TurnApplication::Discarded => {
                        // Nothing else will answer this ticket.
                        if session.abort_turn(request.ticket) {
                            warn!(
                                move_name = request.move_name,
                                "turn response rejected, back to active"
                            );
                        }
                    }
                }
                self.publish(&session);
                Ok(application)
            }
            Err(error) => {
                warn!(
                    session_id = %request.session_id,
                    move_name = request.move_name,
                    error = %error,
                    "move submission failed"
                );
                session.abort_turn(request.ticket);
                self.publish(&session);
                Err(SessionError::Service(error))
            }
        }
    }

    /// Await a service request, bounded by the request timeout.
    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ServiceError::Timeout(
                u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}
