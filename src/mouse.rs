//! Mouse reporting mode.
//!
//! Tracks which of the mutually-exclusive xterm mouse tracking modes (if
//! any) is active, and answers whether a given mouse event should be
//! reported to the host. Encoding the report itself (X10, SGR, UTF-8 coordinate
//! extension) is an embedder/host-output concern and lives in `terminal.rs`.

/// Which mouse-tracking mode is active, if any.
///
/// Modes 1000/1002/1003 are mutually exclusive in real terminals: setting one
/// replaces whichever was previously active, and clearing the active one
/// returns to `Off`. [`MouseMode::apply`] encodes that precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    #[default]
    Off,
    /// Mode 1000: report button press/release only.
    Click,
    /// Mode 1002: also report motion while a button is held.
    ButtonEvent,
    /// Mode 1003: report all motion, button held or not.
    AnyEvent,
}

/// The kind of mouse event a host is asking the terminal to consider
/// reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    ButtonPress,
    ButtonRelease,
    Wheel,
    Motion,
}

impl MouseMode {
    /// Numeric precedence among the three tracking modes: higher wins when
    /// more than one is requested as active simultaneously (which a
    /// well-behaved host never does, but a fuzzed/adversarial stream might).
    fn rank(self) -> u8 {
        match self {
            MouseMode::Off => 0,
            MouseMode::Click => 1,
            MouseMode::ButtonEvent => 2,
            MouseMode::AnyEvent => 3,
        }
    }

    /// Apply a DEC private mode set/reset for one of the three mouse mode
    /// codes (1000, 1002, 1003), returning the resulting mode.
    ///
    /// When `enabled` is true for a given code, that mode becomes active
    /// regardless of what was active before (xterm's modes are not
    /// additive — the most recently enabled one wins). When `enabled` is
    /// false, the mode is cleared only if it was the active one; clearing
    /// an inactive mode is a no-op, matching real terminal behavior where
    /// `CSI ?1000l` while mode 1002 is active does not disturb tracking.
    #[must_use]
    pub fn apply(self, code: u16, enabled: bool) -> Self {
        let Some(target) = mode_for_code(code) else {
            return self;
        };
        if enabled {
            target
        } else if self == target {
            MouseMode::Off
        } else {
            self
        }
    }

    /// Pick the resulting mode from a batch of DEC private mode codes
    /// applied in order, as a CSI sequence may carry several parameters at
    /// once (`CSI ?1000;1002;1003h`). The numerically highest requested
    /// mode wins, matching xterm's behavior for redundant/conflicting
    /// simultaneous sets.
    #[must_use]
    pub fn apply_batch(self, codes: &[(u16, bool)]) -> Self {
        let mut result = self;
        let mut highest_enable: Option<Self> = None;
        for &(code, enabled) in codes {
            let Some(target) = mode_for_code(code) else {
                continue;
            };
            if enabled {
                highest_enable = Some(match highest_enable {
                    Some(current) if current.rank() >= target.rank() => current,
                    _ => target,
                });
            } else if result == target {
                result = MouseMode::Off;
            }
        }
        if let Some(winner) = highest_enable {
            return winner;
        }
        result
    }

    /// Whether an event of this kind should be reported to the host under
    /// the current mode.
    #[must_use]
    pub fn should_report(self, kind: MouseEventKind, any_button_down: bool) -> bool {
        match self {
            MouseMode::Off => false,
            MouseMode::Click => matches!(
                kind,
                MouseEventKind::ButtonPress | MouseEventKind::ButtonRelease | MouseEventKind::Wheel
            ),
            MouseMode::ButtonEvent => match kind {
                MouseEventKind::Motion => any_button_down,
                _ => true,
            },
            MouseMode::AnyEvent => true,
        }
    }
}

fn mode_for_code(code: u16) -> Option<MouseMode> {
    match code {
        1000 => Some(MouseMode::Click),
        1002 => Some(MouseMode::ButtonEvent),
        1003 => Some(MouseMode::AnyEvent),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_reports_nothing() {
        let mode = MouseMode::Off;
        assert!(!mode.should_report(MouseEventKind::ButtonPress, false));
        assert!(!mode.should_report(MouseEventKind::Motion, true));
    }

    #[test]
    fn click_mode_ignores_motion() {
        let mode = MouseMode::Click;
        assert!(mode.should_report(MouseEventKind::ButtonPress, true));
        assert!(mode.should_report(MouseEventKind::ButtonRelease, false));
        assert!(!mode.should_report(MouseEventKind::Motion, true));
    }

    #[test]
    fn button_event_mode_reports_motion_only_while_held() {
        let mode = MouseMode::ButtonEvent;
        assert!(mode.should_report(MouseEventKind::Motion, true));
        assert!(!mode.should_report(MouseEventKind::Motion, false));
        assert!(mode.should_report(MouseEventKind::ButtonPress, false));
    }

    #[test]
    fn any_event_mode_reports_all_motion() {
        let mode = MouseMode::AnyEvent;
        assert!(mode.should_report(MouseEventKind::Motion, false));
        assert!(mode.should_report(MouseEventKind::Motion, true));
    }

    #[test]
    fn wheel_is_reported_in_every_mode_but_off() {
        assert!(!MouseMode::Off.should_report(MouseEventKind::Wheel, false));
        assert!(MouseMode::Click.should_report(MouseEventKind::Wheel, false));
        assert!(MouseMode::ButtonEvent.should_report(MouseEventKind::Wheel, false));
        assert!(MouseMode::AnyEvent.should_report(MouseEventKind::Wheel, false));
    }

    #[test]
    fn apply_sets_and_clears_single_mode() {
        let mode = MouseMode::Off.apply(1000, true);
        assert_eq!(mode, MouseMode::Click);
        let mode = mode.apply(1000, false);
        assert_eq!(mode, MouseMode::Off);
    }

    #[test]
    fn apply_switching_modes_replaces_active_one() {
        let mode = MouseMode::Off.apply(1000, true).apply(1003, true);
        assert_eq!(mode, MouseMode::AnyEvent);
    }

    #[test]
    fn apply_clearing_inactive_mode_is_noop() {
        let mode = MouseMode::Off.apply(1003, true);
        let mode = mode.apply(1000, false);
        assert_eq!(mode, MouseMode::AnyEvent);
    }

    #[test]
    fn apply_batch_picks_highest_requested_mode() {
        let mode = MouseMode::Off.apply_batch(&[(1000, true), (1002, true), (1003, true)]);
        assert_eq!(mode, MouseMode::AnyEvent);
    }

    #[test]
    fn apply_batch_unknown_codes_ignored() {
        let mode = MouseMode::Off.apply_batch(&[(42, true), (1000, true)]);
        assert_eq!(mode, MouseMode::Click);
    }
}
