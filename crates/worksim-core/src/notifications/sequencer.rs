use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, warn};

use super::demo::{select_demo_notification, SequencerMode};
use crate::config::SimulationTiming;
use crate::models::{Notification, NotificationTemplate, Trigger};
use crate::route::Route;
use crate::scheduler::{as_millis, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequencerTimer {
    AutoHide,
    Inject,
    DemoShow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    pub mode: SequencerMode,
    pub popup_auto_hide: Duration,
    pub first_delay: Duration,
    pub injection_interval: Duration,
}

impl SequencerConfig {
    pub fn from_timing(timing: &SimulationTiming, mode: SequencerMode) -> Self {
        Self {
            mode,
            popup_auto_hide: timing.popup_auto_hide(),
            first_delay: timing.first_notification_delay(),
            injection_interval: timing.injection_interval(),
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::from_timing(&SimulationTiming::default(), SequencerMode::Normal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    Raised(Notification),
    PopupHidden,
}

/// Popup/badge notification carousel.
///
/// Notifications are never removed. `active` ones (not yet viewed) form the
/// carousel; `current` is the active item at `active_index`. Dismissing only
/// hides the popup, viewing sets `read` and `viewed` together.
pub struct NotificationSequencer {
    config: SequencerConfig,
    notifications: Vec<Notification>,
    /// Timer-injected templates not raised yet, in pool order
    pool: VecDeque<NotificationTemplate>,
    /// Route-keyed templates not raised yet
    route_triggers: Vec<NotificationTemplate>,
    demo_sequence: Vec<NotificationTemplate>,
    active_index: usize,
    popup_visible: bool,
    started: bool,
    timers: Timers<SequencerTimer>,
}

impl NotificationSequencer {
    pub fn new(
        config: SequencerConfig,
        pool: Vec<NotificationTemplate>,
        demo_sequence: Vec<NotificationTemplate>,
    ) -> Self {
        let (mut route_triggers, timed): (Vec<_>, Vec<_>) = pool
            .into_iter()
            .partition(|t| matches!(t.trigger, Trigger::Route { .. }));
        // Demo mode raises only its step notification
        if matches!(config.mode, SequencerMode::Demo { .. }) {
            route_triggers.clear();
        }

        Self {
            config,
            notifications: Vec::new(),
            pool: timed.into(),
            route_triggers,
            demo_sequence,
            active_index: 0,
            popup_visible: false,
            started: false,
            timers: Timers::new(),
        }
    }

    /// Arm the first notification timer. Later calls are ignored.
    pub fn start(&mut self, now: Duration) {
        if self.started {
            return;
        }
        self.started = true;

        let first_at = now + self.config.first_delay;
        match self.config.mode {
            SequencerMode::Normal => {
                if !self.pool.is_empty() {
                    self.timers.schedule(SequencerTimer::Inject, first_at);
                }
            }
            SequencerMode::Demo { step } => {
                debug!(step, "notification sequencer in demo mode");
                self.timers.schedule(SequencerTimer::DemoShow, first_at);
            }
        }
    }

    /// Fire every timer due at `now`
    pub fn tick(&mut self, now: Duration) -> Vec<SequencerEvent> {
        let mut events = Vec::new();

        while let Some((at, timer)) = self.timers.pop_due(now) {
            match timer {
                SequencerTimer::AutoHide => {
                    if self.popup_visible {
                        self.popup_visible = false;
                        events.push(SequencerEvent::PopupHidden);
                    }
                }
                SequencerTimer::Inject => {
                    if let Some(template) = self.pool.pop_front() {
                        events.push(SequencerEvent::Raised(self.raise(&template, at)));
                    }
                    if !self.pool.is_empty() {
                        self.timers
                            .schedule(SequencerTimer::Inject, at + self.config.injection_interval);
                    }
                }
                SequencerTimer::DemoShow => {
                    let SequencerMode::Demo { step } = self.config.mode else {
                        continue;
                    };
                    match select_demo_notification(&self.demo_sequence, step).cloned() {
                        Some(template) => {
                            events.push(SequencerEvent::Raised(self.raise(&template, at)));
                        }
                        None => warn!(step, "no demo notification for step"),
                    }
                }
            }
        }

        events
    }

    fn raise(&mut self, template: &NotificationTemplate, at: Duration) -> Notification {
        let notification = template.raise(as_millis(at));
        debug!(id = %notification.id, title = %notification.title, "notification raised");
        self.notifications.push(notification.clone());
        self.popup_visible = true;
        self.timers
            .schedule(SequencerTimer::AutoHide, at + self.config.popup_auto_hide);
        notification
    }

    /// Raise a notification from a user action
    pub fn push(&mut self, template: &NotificationTemplate, now: Duration) -> Notification {
        self.raise(template, now)
    }

    /// Raise route-keyed notifications matching `route`; each fires once
    pub fn on_navigate(&mut self, route: &str, now: Duration) -> Vec<Notification> {
        if matches!(self.config.mode, SequencerMode::Demo { .. }) {
            return Vec::new();
        }
        let route = Route::parse(route);
        let (matched, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.route_triggers)
                .into_iter()
                .partition(|t| match &t.trigger {
                    Trigger::Route { prefix } => route.starts_with(prefix),
                    Trigger::Elapsed => false,
                });
        self.route_triggers = pending;

        matched.iter().map(|t| self.raise(t, now)).collect()
    }

    pub fn mode(&self) -> SequencerMode {
        self.config.mode
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(|n| n.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn current(&self) -> Option<&Notification> {
        self.active().nth(self.active_index)
    }

    /// Badge count
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn is_popup_visible(&self) -> bool {
        self.popup_visible
    }

    /// Pool notifications still waiting for the injection timer
    pub fn pending_pool(&self) -> usize {
        self.pool.len()
    }

    /// Re-open the popup on the current notification (e.g. from the bell icon)
    pub fn show(&mut self, now: Duration) -> bool {
        if self.current().is_none() {
            return false;
        }
        self.popup_visible = true;
        self.timers
            .schedule(SequencerTimer::AutoHide, now + self.config.popup_auto_hide);
        true
    }

    /// Hide the popup; the notification stays active and unviewed
    pub fn dismiss(&mut self) {
        self.popup_visible = false;
        self.timers.cancel(SequencerTimer::AutoHide);
    }

    /// View the current notification
    pub fn view(&mut self, now: Duration) -> Option<Notification> {
        let id = self.current()?.id.clone();
        self.mark_as_read(&id, now)
    }

    /// Mark one active notification as read and viewed. Returns None when the
    /// id is unknown or already viewed.
    pub fn mark_as_read(&mut self, id: &str, now: Duration) -> Option<Notification> {
        let position = self.active().position(|n| n.id == id)?;
        let notification = self.notifications.iter_mut().find(|n| n.id == id)?;
        notification.mark_viewed();
        let viewed = notification.clone();

        if position < self.active_index {
            self.active_index -= 1;
        }

        let remaining = self.active_count();
        if remaining == 0 {
            self.active_index = 0;
            self.popup_visible = false;
            self.timers.cancel(SequencerTimer::AutoHide);
        } else {
            self.active_index = self.active_index.min(remaining - 1);
            self.popup_visible = true;
            self.timers
                .schedule(SequencerTimer::AutoHide, now + self.config.popup_auto_hide);
        }

        Some(viewed)
    }

    /// Move to the next active notification; no-op at the last one
    pub fn next(&mut self) -> bool {
        if self.active_index + 1 < self.active_count() {
            self.active_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous active notification; no-op at the first one
    pub fn previous(&mut self) -> bool {
        if self.active_index > 0 {
            self.active_index -= 1;
            true
        } else {
            false
        }
    }

    /// Mark everything read and viewed and hide the popup
    pub fn clear_all(&mut self) {
        for notification in &mut self.notifications {
            notification.mark_viewed();
        }
        self.active_index = 0;
        self.popup_visible = false;
        self.timers.cancel(SequencerTimer::AutoHide);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Drop every pending timer; the sequencer stays inspectable
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.popup_visible = false;
    }
}
