use std::time::Instant;

use tracing::{debug, info, trace};

use crate::collision;
use crate::geometry::{BoundingBox, Position};
use crate::input::{Direction, InputEvent};
use crate::movement::MovementController;
use crate::zones::{Role, VisibleZones, Zone, ZoneAction, ZoneEffect, ZoneRegistry};
use crate::EngineConfig;

use super::bus::{InputBus, InputSubscription};
use super::debounce::{Debouncer, Schedule};

pub const LOGIN_ROUTE: &str = "/";

/// Routing and session collaborators the engine dispatches zone effects to.
pub trait ZoneHandler {
    fn navigate(&mut self, path: &str);
    fn invoke(&mut self, action: ZoneAction);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Occupancy {
    #[default]
    Idle,
    /// Dispatch already fired for the current visit to this zone.
    Entered(String),
}

impl Occupancy {
    pub fn zone_id(&self) -> Option<&str> {
        match self {
            Occupancy::Idle => None,
            Occupancy::Entered(id) => Some(id),
        }
    }

    fn is_entered(&self, zone_id: &str) -> bool {
        self.zone_id() == Some(zone_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTrigger {
    Overlap,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub zone_id: String,
    pub effect: ZoneEffect,
    pub trigger: DispatchTrigger,
}

/// What the auth collaborator knows at mount time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountContext {
    pub role_claim: Option<String>,
    pub session_present: bool,
}

impl MountContext {
    pub fn signed_in(role_claim: Option<&str>) -> Self {
        Self {
            role_claim: role_claim.map(ToString::to_string),
            session_present: true,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionStats {
    pub steps_applied: u64,
    pub steps_blocked: u64,
    pub keys_ignored: u64,
    pub passes_scheduled: u64,
    pub passes_coalesced: u64,
    pub passes_run: u64,
    pub overlap_dispatches: u64,
    pub click_dispatches: u64,
    pub clicks_ignored: u64,
}

/// Home-screen engine instance: movement, debounced zone detection and
/// dispatch, bound to one input subscription for as long as it is mounted.
pub struct InteractionCoordinator<H> {
    registry: ZoneRegistry,
    movement: MovementController,
    role: Role,
    occupancy: Occupancy,
    debounce: Debouncer,
    subscription: Option<InputSubscription>,
    handler: H,
    stats: InteractionStats,
}

impl<H: ZoneHandler> InteractionCoordinator<H> {
    /// Mounts the engine. Without a session the handler is sent to the login
    /// route and the instance stays inert: it never subscribes, moves or
    /// dispatches.
    pub fn mount(
        config: &EngineConfig,
        registry: ZoneRegistry,
        context: MountContext,
        mut handler: H,
        bus: &InputBus,
        now: Instant,
    ) -> Self {
        let role = Role::from_claim(context.role_claim.as_deref());
        let subscription = if context.session_present {
            Some(bus.subscribe())
        } else {
            info!(route = LOGIN_ROUTE, "session_missing_redirect");
            handler.navigate(LOGIN_ROUTE);
            None
        };

        let mut coordinator = Self {
            registry,
            movement: MovementController::new(config),
            role,
            occupancy: Occupancy::Idle,
            debounce: Debouncer::new(config.debounce_window()),
            subscription,
            handler,
            stats: InteractionStats::default(),
        };

        if coordinator.is_active() {
            // The spawn point counts as the first position change.
            coordinator.schedule_detection(now);
            info!(
                role = ?coordinator.role,
                x = coordinator.movement.position().x,
                y = coordinator.movement.position().y,
                visible_zones = coordinator.visible_zones().count(),
                "engine_mounted"
            );
        }
        coordinator
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Processes queued input in arrival order, then runs a detection pass if
    /// the quiescence window has elapsed. Stops at the first dispatch: the
    /// handler may have left the screen, so the rest of the batch and any due
    /// pass are discarded.
    pub fn pump(&mut self, now: Instant) -> Option<Dispatch> {
        let events = match &self.subscription {
            Some(subscription) => subscription.drain(),
            None => return None,
        };

        let total = events.len();
        for (index, event) in events.into_iter().enumerate() {
            if let Some(dispatch) = self.handle_event(event, now) {
                let dropped = total - index - 1;
                if dropped > 0 {
                    debug!(zone = %dispatch.zone_id, dropped, "input_dropped_after_dispatch");
                }
                return Some(dispatch);
            }
        }
        self.poll(now)
    }

    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Option<Dispatch> {
        match event {
            InputEvent::Key(name) => {
                self.handle_key(&name, now);
                None
            }
            InputEvent::PointerClick(point) => self.click_at(point),
            InputEvent::ZoneClick(zone_id) => self.click_zone(&zone_id),
        }
    }

    /// Returns `true` when the key moved the avatar.
    pub fn handle_key(&mut self, key_name: &str, now: Instant) -> bool {
        match Direction::from_key_name(key_name) {
            Some(direction) => self.step(direction, now),
            None => {
                increment(&mut self.stats.keys_ignored);
                trace!(key = key_name, "key_ignored");
                false
            }
        }
    }

    pub fn step(&mut self, direction: Direction, now: Instant) -> bool {
        if !self.is_active() {
            return false;
        }
        if !self.movement.step(direction) {
            increment(&mut self.stats.steps_blocked);
            return false;
        }
        increment(&mut self.stats.steps_applied);
        self.schedule_detection(now);
        true
    }

    /// Runs the pending detection pass once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Dispatch> {
        if !self.is_active() || !self.debounce.fire_if_due(now) {
            return None;
        }
        self.run_detection_pass()
    }

    /// Pointer press on a rendered zone. Skips debounce and position checks.
    pub fn click_zone(&mut self, zone_id: &str) -> Option<Dispatch> {
        if !self.is_active() {
            return None;
        }
        match self.registry.visible_zone(zone_id, self.role) {
            Some(zone) => {
                increment(&mut self.stats.click_dispatches);
                Some(dispatch_effect(&mut self.handler, zone, DispatchTrigger::Click))
            }
            None => {
                increment(&mut self.stats.clicks_ignored);
                debug!(zone = zone_id, role = ?self.role, "zone_click_ignored");
                None
            }
        }
    }

    /// Pointer press at a pixel-space point, hit-tested against visible zones.
    pub fn click_at(&mut self, point: Position) -> Option<Dispatch> {
        if !self.is_active() {
            return None;
        }
        match collision::zone_at_point(point, self.registry.zones_for(self.role)) {
            Some(zone) => {
                increment(&mut self.stats.click_dispatches);
                Some(dispatch_effect(&mut self.handler, zone, DispatchTrigger::Click))
            }
            None => {
                increment(&mut self.stats.clicks_ignored);
                trace!(x = point.x, y = point.y, "pointer_click_missed");
                None
            }
        }
    }

    pub fn position(&self) -> Position {
        self.movement.position()
    }

    pub fn avatar_bounds(&self) -> BoundingBox {
        self.movement.avatar_bounds()
    }

    pub fn visible_zones(&self) -> VisibleZones<'_> {
        self.registry.zones_for(self.role)
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn pending_detection_at(&self) -> Option<Instant> {
        self.debounce.due_at()
    }

    pub fn stats(&self) -> InteractionStats {
        self.stats
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Tears the engine down: releases the input subscription, cancels any
    /// pending pass and hands the handler back to the caller.
    pub fn unmount(mut self) -> H {
        let pending_cancelled = self.debounce.cancel();
        let released = self.subscription.take().is_some();
        info!(
            released,
            pending_cancelled,
            steps_applied = self.stats.steps_applied,
            passes_run = self.stats.passes_run,
            passes_coalesced = self.stats.passes_coalesced,
            overlap_dispatches = self.stats.overlap_dispatches,
            click_dispatches = self.stats.click_dispatches,
            "engine_unmounted"
        );
        self.handler
    }

    fn schedule_detection(&mut self, now: Instant) {
        increment(&mut self.stats.passes_scheduled);
        if self.debounce.schedule(now) == Schedule::Replaced {
            increment(&mut self.stats.passes_coalesced);
        }
    }

    fn run_detection_pass(&mut self) -> Option<Dispatch> {
        increment(&mut self.stats.passes_run);
        let avatar = self.movement.avatar_bounds();
        match collision::detect(avatar, self.registry.zones_for(self.role)) {
            None => {
                if let Some(previous) = self.occupancy.zone_id() {
                    debug!(zone = previous, "zone_left");
                }
                self.occupancy = Occupancy::Idle;
                None
            }
            Some(zone) if self.occupancy.is_entered(&zone.id) => None,
            Some(zone) => {
                debug!(zone = %zone.id, "zone_entered");
                self.occupancy = Occupancy::Entered(zone.id.clone());
                increment(&mut self.stats.overlap_dispatches);
                Some(dispatch_effect(&mut self.handler, zone, DispatchTrigger::Overlap))
            }
        }
    }
}

fn dispatch_effect<H: ZoneHandler>(
    handler: &mut H,
    zone: &Zone,
    trigger: DispatchTrigger,
) -> Dispatch {
    match &zone.effect {
        ZoneEffect::Navigate(path) => {
            info!(zone = %zone.id, path = %path, trigger = ?trigger, "zone_navigate");
            handler.navigate(path);
        }
        ZoneEffect::Invoke(action) => {
            info!(zone = %zone.id, action = ?action, trigger = ?trigger, "zone_invoke");
            handler.invoke(*action);
        }
    }
    Dispatch {
        zone_id: zone.id.clone(),
        effect: zone.effect.clone(),
        trigger,
    }
}

fn increment(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}
