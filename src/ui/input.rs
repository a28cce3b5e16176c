/// Keyboard and mouse input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Held actions (movement, use, cycle) that keep firing while down
///   - Edge-triggered actions (pick up, drop, stow, menu) on the initial press
///   - Left clicks, reported in terminal cells for the renderer to map
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};

use crate::sim::action::ActionSnapshot;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

const KEYS_UP: &[KeyCode] = &[KeyCode::Up];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down];
const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right];
const KEYS_USE: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_PICK_UP: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_DROP: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const KEYS_STOW: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
const KEYS_CYCLE: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_LIGHT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_CHEST: &[KeyCode] = &[KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_MENU: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A'), KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];
const SLOT_KEYS: [char; 5] = ['1', '2', '3', '4', '5'];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Left-button presses this drain, as (column, row) terminal cells.
    pub clicks: Vec<(u16, u16)>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(2),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    self.raw_events.push(key);
                    match key.kind {
                        KeyEventKind::Release if self.honor_release => {
                            self.last_active.remove(&key.code);
                        }
                        KeyEventKind::Release => {}
                        _ => {
                            let was_held = self.is_held(key.code);
                            self.last_active.insert(key.code, Instant::now());
                            if !was_held {
                                self.fresh_presses.push(key.code);
                            }
                        }
                    }
                }
                Ok(Event::Mouse(m)) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                    self.clicks.push((m.column, m.row));
                }
                _ => {}
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Keyboard half of the action snapshot. Clicks are mapped separately,
    /// since only the renderer knows the cell scale.
    pub fn snapshot(&self) -> ActionSnapshot {
        ActionSnapshot {
            up: self.any_held(KEYS_UP),
            down: self.any_held(KEYS_DOWN),
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            use_item: self.any_held(KEYS_USE),
            cycle: self.any_held(KEYS_CYCLE),
            toggle_chest: self.any_held(KEYS_CHEST),
            toggle_light: self.any_held(KEYS_LIGHT),
            pick_up: self.any_pressed(KEYS_PICK_UP),
            drop: self.any_pressed(KEYS_DROP),
            stow: self.any_pressed(KEYS_STOW),
            toggle_menu: self.any_pressed(KEYS_MENU),
            confirm: self.any_pressed(KEYS_CONFIRM),
            quit: self.any_pressed(KEYS_QUIT),
            select: SLOT_KEYS.iter().position(|c| self.was_pressed(KeyCode::Char(*c))),
            click: None,
        }
    }
}
