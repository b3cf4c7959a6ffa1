use rdev::{listen, Button, Event, EventType, Key};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::selection::{
    GlobalInputSource, InputEvent, InputSink, KeyCode, Modifiers, MonitorError, MouseButton,
    Point, Rect,
};

/// How long install waits for `listen` to fail before assuming the hook is up
const HOOK_STARTUP_GRACE: Duration = Duration::from_millis(250);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Last pointer position seen by the hook thread
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    inner: Arc<Mutex<Point>>,
}

impl CursorTracker {
    pub fn get(&self) -> Point {
        *lock(&self.inner)
    }

    pub fn set(&self, position: Point) {
        *lock(&self.inner) = position;
    }
}

/// Screen area currently covered by the popup button
#[derive(Debug, Clone, Default)]
pub struct PopupRegion {
    inner: Arc<Mutex<Option<Rect>>>,
}

impl PopupRegion {
    pub fn set(&self, bounds: Rect) {
        *lock(&self.inner) = Some(bounds);
    }

    pub fn clear(&self) {
        *lock(&self.inner) = None;
    }

    pub fn current(&self) -> Option<Rect> {
        *lock(&self.inner)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.current().map(|r| r.contains(point)).unwrap_or(false)
    }
}

fn map_button(button: Button) -> MouseButton {
    match button {
        Button::Left => MouseButton::Left,
        Button::Right => MouseButton::Right,
        Button::Middle => MouseButton::Middle,
        Button::Unknown(_) => MouseButton::Other,
    }
}

fn map_key(key: Key) -> KeyCode {
    match key {
        Key::ControlLeft => KeyCode::ControlLeft,
        Key::ControlRight => KeyCode::ControlRight,
        Key::ShiftLeft => KeyCode::ShiftLeft,
        Key::ShiftRight => KeyCode::ShiftRight,
        Key::Alt => KeyCode::AltLeft,
        Key::AltGr => KeyCode::AltRight,
        Key::MetaLeft => KeyCode::MetaLeft,
        Key::MetaRight => KeyCode::MetaRight,
        Key::Tab => KeyCode::Tab,
        Key::Escape => KeyCode::Escape,
        Key::KeyC => KeyCode::C,
        _ => KeyCode::Other,
    }
}

fn apply_modifier(modifiers: &mut Modifiers, key: KeyCode, pressed: bool) {
    match key {
        KeyCode::ControlLeft | KeyCode::ControlRight => modifiers.ctrl = pressed,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => modifiers.shift = pressed,
        KeyCode::AltLeft | KeyCode::AltRight => modifiers.alt = pressed,
        KeyCode::MetaLeft | KeyCode::MetaRight => modifiers.meta = pressed,
        _ => {}
    }
}

/// State shared between the hook thread and the owning `RdevInputSource`
struct HookShared {
    active: AtomicBool,
    sink: Mutex<Option<InputSink>>,
    cursor: CursorTracker,
    region: PopupRegion,
    modifiers: Mutex<Modifiers>,
    /// Set while a left press that landed on the popup is held
    swallowing_press: AtomicBool,
}

impl HookShared {
    fn forward(&self, event: InputEvent) {
        if let Some(sink) = lock(&self.sink).as_ref() {
            sink.send(event);
        }
    }

    fn handle(&self, event: Event) {
        // Cursor and modifiers are tracked even while inactive so they are
        // correct the moment monitoring starts
        match event.event_type {
            EventType::MouseMove { x, y } => {
                self.cursor.set(Point::new(x, y));
                return;
            }
            EventType::KeyPress(key) => apply_modifier(&mut lock(&self.modifiers), map_key(key), true),
            EventType::KeyRelease(key) => apply_modifier(&mut lock(&self.modifiers), map_key(key), false),
            _ => {}
        }

        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        let position = self.cursor.get();
        match event.event_type {
            EventType::ButtonPress(button) => {
                let button = map_button(button);
                if button == MouseButton::Left && self.region.contains(position) {
                    self.swallowing_press.store(true, Ordering::SeqCst);
                    return;
                }
                self.forward(InputEvent::MouseDown { button, position });
            }
            EventType::ButtonRelease(button) => {
                let button = map_button(button);
                if button == MouseButton::Left && self.swallowing_press.swap(false, Ordering::SeqCst) {
                    if self.region.contains(position) {
                        if let Some(sink) = lock(&self.sink).as_ref() {
                            sink.popup_clicked();
                        }
                    }
                    return;
                }
                self.forward(InputEvent::MouseUp { button, position });
            }
            EventType::KeyPress(key) => {
                let modifiers = *lock(&self.modifiers);
                self.forward(InputEvent::KeyDown {
                    key: map_key(key),
                    modifiers,
                });
            }
            EventType::KeyRelease(key) => {
                let modifiers = *lock(&self.modifiers);
                self.forward(InputEvent::KeyUp {
                    key: map_key(key),
                    modifiers,
                });
            }
            _ => {}
        }
    }
}

/// Global hook built on `rdev::listen`.
///
/// `listen` cannot be stopped once running, so the listener thread is started
/// on the first install and uninstall only detaches it from the monitor.
pub struct RdevInputSource {
    shared: Arc<HookShared>,
    listener_started: bool,
}

impl RdevInputSource {
    pub fn new(cursor: CursorTracker, region: PopupRegion) -> Self {
        Self {
            shared: Arc::new(HookShared {
                active: AtomicBool::new(false),
                sink: Mutex::new(None),
                cursor,
                region,
                modifiers: Mutex::new(Modifiers::NONE),
                swallowing_press: AtomicBool::new(false),
            }),
            listener_started: false,
        }
    }

    fn spawn_listener(&self) -> Result<(), MonitorError> {
        let shared = self.shared.clone();
        let (err_tx, err_rx) = mpsc::channel::<String>();

        thread::Builder::new()
            .name("selection-input-hook".to_string())
            .spawn(move || {
                if let Err(e) = listen(move |event| shared.handle(event)) {
                    log::error!("Global input hook stopped: {:?}", e);
                    let _ = err_tx.send(format!("{:?}", e));
                }
            })
            .map_err(|e| MonitorError::HookInstall(e.to_string()))?;

        match err_rx.recv_timeout(HOOK_STARTUP_GRACE) {
            Ok(error) => Err(MonitorError::HookInstall(error)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(()),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(MonitorError::HookInstall(
                "input listener exited".to_string(),
            )),
        }
    }
}

impl GlobalInputSource for RdevInputSource {
    fn install(&mut self, sink: InputSink) -> Result<(), MonitorError> {
        *lock(&self.shared.sink) = Some(sink);

        if !self.listener_started {
            if let Err(e) = self.spawn_listener() {
                *lock(&self.shared.sink) = None;
                return Err(e);
            }
            self.listener_started = true;
            log::info!("🖱️ Global input hook installed");
        }

        self.shared.swallowing_press.store(false, Ordering::SeqCst);
        self.shared.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn uninstall(&mut self) {
        self.shared.active.store(false, Ordering::SeqCst);
        *lock(&self.shared.sink) = None;
        log::debug!("Global input hook detached");
    }
}
