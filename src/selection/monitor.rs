use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::capabilities::{
    Capabilities, GlobalInputSource, InputSink, PopupSurface, ScreenInfo, TranslationConsumer,
};
use super::config::SelectionPolicy;
use super::desktop::{CopyOutcome, DesktopIo, DesktopJob, DesktopReply, DesktopWorker};
use super::error::MonitorError;
use super::events::{
    is_dismiss_key, is_show_popup_shortcut, InputEvent, KeyCode, Modifiers, MonitorEvent, MouseButton,
};
use super::geometry::{popup_bounds, Point, Rect};
use super::gesture::{classify_release, Gesture, PointerStamp};
use super::timers::{NamedTimers, TimerFired};
use crate::log_context;
use crate::state_machine::{MonitorPhase, MonitorStateMachine};
use crate::utils::logger::{log_selection, SelectionOutcome};

/// Named timers owned by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionTimer {
    CopyDebounce,
    ClipboardCheck,
    PopupDebounce,
    AutoHide,
}

/// Why the popup went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    OutsideClick,
    Timeout,
    DismissKey,
    Explicit,
    Superseded,
    CtrlPressed,
    Paused,
    ActionClicked,
}

impl DismissReason {
    /// Cancelling a selection clears the clipboard; superseding or consuming it does not
    pub fn clears_clipboard(self) -> bool {
        matches!(
            self,
            DismissReason::OutsideClick
                | DismissReason::Timeout
                | DismissReason::DismissKey
                | DismissReason::Explicit
        )
    }
}

/// The floating translate button currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct PopupHandle {
    pub bounds: Rect,
    pub text: String,
    pub created_at: Instant,
}

/// Mouse, keyboard and clipboard bookkeeping. Reset wholesale on stop.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub enabled: bool,
    pub mouse_down: bool,
    pub mouse_down_at: Option<Instant>,
    pub mouse_down_pos: Point,
    pub last_click: Option<PointerStamp>,
    pub last_seen_clipboard_text: String,
    pub original_clipboard_text: String,
    /// Ctrl, or Cmd on macOS
    pub copy_modifier_held: bool,
    pub copy_modifier_pressed_at: Option<Instant>,
    /// Our own copy shortcut comes back through the hook until this instant
    pub synthetic_keys_until: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyStage {
    /// Copy job queued on the desktop worker
    Sending,
    /// Shortcut sent, waiting for the target app to fill the clipboard
    Settling,
    /// Clipboard read queued
    Reading,
    /// Cancelled while sending; the reply still owes us the baseline
    Abandoned,
}

/// One synthesized copy, from queuing the shortcut to reading the result.
/// At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CopyCycle {
    id: u64,
    stage: CopyStage,
}

fn gesture_label(gesture: Option<Gesture>) -> &'static str {
    match gesture {
        Some(Gesture::DoubleClick) => "double-click",
        Some(Gesture::Drag) => "drag",
        Some(Gesture::Click) => "click",
        None => "shortcut",
    }
}

/// Text selection monitor.
///
/// Owns every piece of selection state and the OS capabilities that answer
/// immediately. Every method is expected to run on a single event loop (see
/// `MonitorService`), which is what serializes transitions. Clipboard,
/// keystroke and ignore-list calls go through the desktop worker and come
/// back through [`SelectionMonitor::handle_desktop`].
pub struct SelectionMonitor {
    input: Box<dyn GlobalInputSource>,
    popup_surface: Box<dyn PopupSurface>,
    screen: Box<dyn ScreenInfo>,
    consumer: Box<dyn TranslationConsumer>,
    desktop: DesktopWorker,
    policy: SelectionPolicy,
    sink: InputSink,
    state: MonitorState,
    paused: bool,
    popup: Option<PopupHandle>,
    pending_popup_text: Option<String>,
    pending_trigger: Option<Gesture>,
    copy: Option<CopyCycle>,
    next_cycle: u64,
    timers: NamedTimers<SelectionTimer>,
    machine: MonitorStateMachine,
}

impl SelectionMonitor {
    /// Must be called from within a tokio runtime. `events` is the loop's own
    /// channel; the monitor only keeps weak senders to it.
    pub fn new(
        caps: Capabilities,
        policy: SelectionPolicy,
        events: &mpsc::UnboundedSender<MonitorEvent>,
        timers: NamedTimers<SelectionTimer>,
    ) -> Self {
        let Capabilities {
            input,
            clipboard,
            keystrokes,
            popup,
            screen,
            consumer,
            gate,
        } = caps;

        let desktop = DesktopWorker::spawn(
            DesktopIo {
                clipboard,
                keystrokes,
                gate,
            },
            events.downgrade(),
        );

        Self {
            input,
            popup_surface: popup,
            screen,
            consumer,
            desktop,
            policy,
            sink: InputSink::new(events),
            state: MonitorState::default(),
            paused: false,
            popup: None,
            pending_popup_text: None,
            pending_trigger: None,
            copy: None,
            next_cycle: 0,
            timers,
            machine: MonitorStateMachine::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn phase(&self) -> MonitorPhase {
        self.machine.current()
    }

    /// Install hooks and record the clipboard baseline. No-op when running.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.state.enabled {
            log::debug!("Selection monitor already running, skipping start");
            return Ok(());
        }

        self.input.install(self.sink.clone())?;

        self.state = MonitorState {
            enabled: true,
            ..MonitorState::default()
        };
        self.desktop.submit(DesktopJob::ReloadGate);
        self.desktop.submit(DesktopJob::ReadBaseline);

        self.sync_phase();
        Ok(())
    }

    /// Uninstall hooks, cancel every timer and forget all selection state
    pub fn stop(&mut self) {
        if !self.state.enabled {
            log::debug!("Selection monitor not running, skipping stop");
            return;
        }

        self.input.uninstall();

        self.abandon_copy();
        self.timers.cancel_all();

        self.pending_popup_text = None;
        self.pending_trigger = None;
        self.teardown_popup();
        self.state = MonitorState::default();

        self.sync_phase();
    }

    /// Stop reacting to the mouse without uninstalling hooks
    pub fn pause(&mut self) {
        self.paused = true;

        self.timers.cancel(SelectionTimer::CopyDebounce);
        self.timers.cancel(SelectionTimer::PopupDebounce);
        self.abandon_copy();
        self.pending_popup_text = None;

        if self.popup.is_some() {
            self.dismiss(DismissReason::Paused);
        }
        self.state.mouse_down = false;

        log::info!("⏸️ Selection monitoring paused");
        self.sync_phase();
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.state.mouse_down = false;
        self.state.last_seen_clipboard_text.clear();

        log::info!("▶️ Selection monitoring resumed");
        self.sync_phase();
    }

    pub fn reload_ignore_config(&mut self) {
        self.desktop.submit(DesktopJob::ReloadGate);
    }

    /// `done` fires once all desktop work queued so far has run
    pub fn flush_desktop(&mut self, done: oneshot::Sender<()>) {
        self.desktop.submit(DesktopJob::Flush(done));
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.state.enabled {
            return;
        }

        match event {
            InputEvent::MouseDown { button, position } => self.on_mouse_down(button, position),
            InputEvent::MouseUp { button, position } => self.on_mouse_up(button, position),
            InputEvent::KeyDown { key, modifiers } => self.on_key_down(key, modifiers),
            InputEvent::KeyUp { key, .. } => self.on_key_up(key),
        }

        self.sync_phase();
    }

    pub fn handle_timer(&mut self, fired: TimerFired<SelectionTimer>) {
        if !self.timers.accept(&fired) {
            return;
        }

        match fired.name {
            SelectionTimer::CopyDebounce => self.run_copy(),
            SelectionTimer::ClipboardCheck => self.read_selection(),
            SelectionTimer::PopupDebounce => self.show_pending_popup(),
            SelectionTimer::AutoHide => {
                log::debug!("Popup auto-hide elapsed");
                self.dismiss(DismissReason::Timeout);
            }
        }

        self.sync_phase();
    }

    /// Results of clipboard and keystroke work done off the loop
    pub fn handle_desktop(&mut self, reply: DesktopReply) {
        match reply {
            DesktopReply::Baseline(text) => {
                if self.state.enabled && self.copy.is_none() {
                    self.state.original_clipboard_text = text.unwrap_or_default();
                }
            }
            DesktopReply::CopyIssued { cycle, result } => self.on_copy_issued(cycle, result),
            DesktopReply::SelectionRead { cycle, result } => self.on_selection_read(cycle, result),
            DesktopReply::ClipboardForShow(result) => self.on_clipboard_for_show(result),
        }

        self.sync_phase();
    }

    /// Forward the popup's text to the consumer exactly once, then tear down
    pub fn popup_clicked(&mut self) {
        let Some(popup) = self.popup.as_ref() else {
            log::debug!("Popup click received without an active popup");
            return;
        };

        let text = popup.text.clone();
        log::info!("🌐 Forwarding {} chars for translation", text.chars().count());
        self.consumer.deliver(&text);
        self.dismiss(DismissReason::ActionClicked);

        self.sync_phase();
    }

    /// Show the popup for text already on the clipboard
    pub fn show_popup_at_cursor(&mut self) {
        if !self.state.enabled {
            return;
        }
        self.desktop.submit(DesktopJob::ReadForShow);
    }

    /// Explicit hide request; treated as a cancellation
    pub fn hide_popup(&mut self) {
        self.dismiss(DismissReason::Explicit);
        self.sync_phase();
    }

    fn on_mouse_down(&mut self, button: MouseButton, position: Point) {
        if button != MouseButton::Left || self.paused {
            return;
        }

        if let Some(popup) = &self.popup {
            if !popup.bounds.contains(position) {
                self.dismiss(DismissReason::OutsideClick);
            }
        }

        self.state.mouse_down = true;
        self.state.mouse_down_at = Some(Instant::now());
        self.state.mouse_down_pos = position;
    }

    fn on_mouse_up(&mut self, button: MouseButton, position: Point) {
        if button != MouseButton::Left || !self.state.mouse_down || self.paused {
            return;
        }
        self.state.mouse_down = false;

        let now = Instant::now();
        let press = PointerStamp::new(
            self.state.mouse_down_at.unwrap_or(now),
            self.state.mouse_down_pos,
        );
        let release = PointerStamp::new(now, position);
        let gesture = classify_release(press, release, self.state.last_click, &self.policy);

        // Always becomes the reference for the next double-click check
        self.state.last_click = Some(release);

        let context = log_context! {
            "gesture" => format!("{:?}", gesture),
            "x" => position.x,
            "y" => position.y,
        };
        log::debug!("Mouse up classified | {:?}", context);

        if gesture.selects_text() {
            self.request_copy(gesture);
        }
    }

    fn on_key_down(&mut self, key: KeyCode, modifiers: Modifiers) {
        let now = Instant::now();
        if self.is_synthetic_key(key, now) {
            return;
        }

        if key.is_copy_modifier() {
            self.on_copy_modifier_pressed(now);
        }

        if is_dismiss_key(key, modifiers) && self.popup.is_some() {
            self.dismiss(DismissReason::DismissKey);
        }

        if is_show_popup_shortcut(key, modifiers) {
            self.show_popup_at_cursor();
        }
    }

    fn on_key_up(&mut self, key: KeyCode) {
        if self.is_synthetic_key(key, Instant::now()) {
            return;
        }
        if key.is_copy_modifier() {
            self.state.copy_modifier_held = false;
        }
    }

    /// A copy-modifier press means the user is driving the clipboard themselves
    fn on_copy_modifier_pressed(&mut self, now: Instant) {
        self.state.copy_modifier_held = true;
        self.state.copy_modifier_pressed_at = Some(now);

        self.timers.cancel(SelectionTimer::CopyDebounce);
        self.timers.cancel(SelectionTimer::PopupDebounce);
        self.pending_popup_text = None;

        if self.popup.is_some() {
            self.dismiss(DismissReason::CtrlPressed);
        }
    }

    fn is_synthetic_key(&self, key: KeyCode, now: Instant) -> bool {
        let in_window = matches!(self.state.synthetic_keys_until, Some(until) if now <= until);
        in_window && (key.is_copy_modifier() || key == KeyCode::C)
    }

    fn copy_modifier_has_priority(&self, now: Instant) -> bool {
        self.state.copy_modifier_held
            || self
                .state
                .copy_modifier_pressed_at
                .map(|at| now.saturating_duration_since(at) < self.policy.ctrl_priority_window)
                .unwrap_or(false)
    }

    fn request_copy(&mut self, gesture: Gesture) {
        if self.state.copy_modifier_held {
            log_selection(
                gesture_label(Some(gesture)),
                SelectionOutcome::Skipped {
                    reason: "copy modifier held".to_string(),
                },
            );
            return;
        }

        self.pending_trigger = Some(gesture);
        self.timers
            .schedule(SelectionTimer::CopyDebounce, self.policy.copy_debounce);
    }

    /// Copy debounce elapsed: queue clear + synthesized copy on the worker
    fn run_copy(&mut self) {
        let trigger = gesture_label(self.pending_trigger);
        let now = Instant::now();

        if self.copy.is_some() {
            log::debug!("Copy cycle still in flight, deferring {}", trigger);
            self.timers
                .schedule(SelectionTimer::CopyDebounce, self.policy.clipboard_settle);
            return;
        }

        if self.copy_modifier_has_priority(now) {
            log_selection(
                trigger,
                SelectionOutcome::Skipped {
                    reason: "copy modifier priority window".to_string(),
                },
            );
            return;
        }

        self.next_cycle += 1;
        let cycle = self.next_cycle;
        self.copy = Some(CopyCycle {
            id: cycle,
            stage: CopyStage::Sending,
        });
        self.state.synthetic_keys_until = Some(now + self.policy.clipboard_settle);
        self.desktop.submit(DesktopJob::Copy { cycle });
    }

    fn on_copy_issued(&mut self, cycle: u64, result: Result<CopyOutcome, MonitorError>) {
        let Some(current) = self.copy.filter(|c| c.id == cycle) else {
            log::debug!("Dropping copy result for stale cycle {}", cycle);
            return;
        };
        let trigger = gesture_label(self.pending_trigger);

        match result {
            Ok(CopyOutcome::Sent { baseline }) if current.stage == CopyStage::Abandoned => {
                self.copy = None;
                if !baseline.is_empty() {
                    self.desktop.submit(DesktopJob::Restore(baseline));
                }
            }
            Ok(CopyOutcome::Sent { baseline }) => {
                self.state.original_clipboard_text = baseline;
                if self.popup.is_some() {
                    self.dismiss(DismissReason::Superseded);
                }

                self.copy = Some(CopyCycle {
                    id: cycle,
                    stage: CopyStage::Settling,
                });
                self.state.synthetic_keys_until = Some(Instant::now() + self.policy.clipboard_settle);
                self.timers
                    .schedule(SelectionTimer::ClipboardCheck, self.policy.clipboard_settle);
            }
            Ok(CopyOutcome::Ignored) => {
                self.copy = None;
                self.state.synthetic_keys_until = None;
                log_selection(
                    trigger,
                    SelectionOutcome::Skipped {
                        reason: "ignored application".to_string(),
                    },
                );
            }
            Err(e) => {
                // The worker already put the baseline back if the shortcut failed
                self.copy = None;
                self.state.synthetic_keys_until = None;
                log_selection(trigger, SelectionOutcome::Abandoned { error: e.to_string() });
            }
        }
    }

    /// Settle delay elapsed: whatever is on the clipboard now was just selected
    fn read_selection(&mut self) {
        let Some(cycle) = self
            .copy
            .as_mut()
            .filter(|c| c.stage == CopyStage::Settling)
        else {
            return;
        };

        cycle.stage = CopyStage::Reading;
        let id = cycle.id;
        self.desktop.submit(DesktopJob::ReadSelection { cycle: id });
    }

    fn on_selection_read(&mut self, cycle: u64, result: Result<Option<String>, MonitorError>) {
        let reading = CopyCycle {
            id: cycle,
            stage: CopyStage::Reading,
        };
        if self.copy != Some(reading) {
            log::debug!("Dropping clipboard read for stale cycle {}", cycle);
            return;
        }
        self.copy = None;

        let trigger = gesture_label(self.pending_trigger.take());
        match result {
            Ok(Some(text)) if !text.trim().is_empty() => {
                let text = text.trim().to_string();
                log_selection(
                    trigger,
                    SelectionOutcome::Captured {
                        chars: text.chars().count(),
                    },
                );
                self.state.last_seen_clipboard_text = text.clone();
                self.schedule_popup(text);
            }
            Ok(_) => {
                log_selection(trigger, SelectionOutcome::Empty);
                self.restore_baseline();
            }
            Err(e) => {
                log_selection(trigger, SelectionOutcome::Abandoned { error: e.to_string() });
                self.restore_baseline();
            }
        }
    }

    fn on_clipboard_for_show(&mut self, result: Result<Option<String>, MonitorError>) {
        if !self.state.enabled {
            return;
        }

        match result {
            Ok(Some(text)) => {
                let text = text.trim();
                if !text.is_empty() && text != self.state.last_seen_clipboard_text {
                    self.state.last_seen_clipboard_text = text.to_string();
                    self.schedule_popup(text.to_string());
                }
            }
            Ok(None) => log::debug!("Show-at-cursor requested with an empty clipboard"),
            Err(e) => log::debug!("Show-at-cursor clipboard read failed: {}", e),
        }
    }

    /// Give up on the copy cycle in flight and put the user's clipboard back
    fn abandon_copy(&mut self) {
        self.timers.cancel(SelectionTimer::ClipboardCheck);

        match self.copy {
            Some(CopyCycle {
                id,
                stage: CopyStage::Sending,
            }) => {
                self.copy = Some(CopyCycle {
                    id,
                    stage: CopyStage::Abandoned,
                });
            }
            Some(CopyCycle {
                stage: CopyStage::Settling | CopyStage::Reading,
                ..
            }) => {
                self.copy = None;
                self.restore_baseline();
            }
            Some(CopyCycle {
                stage: CopyStage::Abandoned,
                ..
            })
            | None => {}
        }
    }

    /// Put back what the user had on the clipboard before we cleared it
    fn restore_baseline(&mut self) {
        let baseline = std::mem::take(&mut self.state.original_clipboard_text);
        if !baseline.is_empty() {
            self.desktop.submit(DesktopJob::Restore(baseline));
        }
    }

    /// Last trigger wins: a pending display is replaced, not queued
    fn schedule_popup(&mut self, text: String) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.pending_popup_text = Some(text.to_string());
        self.timers
            .schedule(SelectionTimer::PopupDebounce, self.policy.popup_debounce);
    }

    fn show_pending_popup(&mut self) {
        let Some(text) = self.pending_popup_text.take() else {
            return;
        };

        let cursor = self.screen.cursor_position();
        let display = self.screen.display_bounds(cursor);
        let bounds = popup_bounds(cursor, display);

        // Only one popup may exist; the old one goes before the new one opens
        self.teardown_popup();

        if let Err(e) = self.popup_surface.open(bounds, &text) {
            log::warn!("Failed to open selection popup: {}", e);
            return;
        }

        log::debug!(
            "Popup shown at ({:.0}, {:.0}) for {} chars",
            bounds.x,
            bounds.y,
            text.chars().count()
        );
        self.popup = Some(PopupHandle {
            bounds,
            text,
            created_at: Instant::now(),
        });
        self.timers
            .schedule(SelectionTimer::AutoHide, self.policy.popup_auto_hide);
    }

    fn teardown_popup(&mut self) -> Option<PopupHandle> {
        self.timers.cancel(SelectionTimer::AutoHide);
        let popup = self.popup.take()?;
        self.popup_surface.close();
        Some(popup)
    }

    fn dismiss(&mut self, reason: DismissReason) {
        let closed = self.teardown_popup();

        if let Some(popup) = &closed {
            log::debug!(
                "Popup dismissed ({:?}) after {}ms",
                reason,
                popup.created_at.elapsed().as_millis()
            );
            if reason.clears_clipboard() {
                self.desktop.submit(DesktopJob::Clear);
            }
        }

        self.state.last_seen_clipboard_text.clear();
    }

    fn derived_phase(&self) -> MonitorPhase {
        let copy_in_flight = matches!(self.copy, Some(c) if c.stage != CopyStage::Abandoned);

        if !self.state.enabled {
            MonitorPhase::Stopped
        } else if self.state.mouse_down {
            MonitorPhase::Pressing
        } else if copy_in_flight
            || self.timers.is_pending(SelectionTimer::CopyDebounce)
            || self.timers.is_pending(SelectionTimer::PopupDebounce)
        {
            MonitorPhase::AwaitingCopy
        } else if self.popup.is_some() {
            MonitorPhase::PopupShown
        } else {
            MonitorPhase::Idle
        }
    }

    fn sync_phase(&mut self) {
        let target = self.derived_phase();
        if let Err(e) = self.machine.transition_to(target) {
            log::error!("[FLOW] {}", e);
            self.machine.force_phase(target);
        }
    }
}
