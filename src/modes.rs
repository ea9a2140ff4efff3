//! Terminal modal flags: DEC private modes and ANSI standard modes.
//!
//! These are tracked separately from [`crate::cursor::Cursor`] because they
//! affect how the terminal core dispatches commands (e.g. origin mode
//! reinterprets cursor-motion coordinates) rather than the cursor's own
//! position.

use bitflags::bitflags;

bitflags! {
    /// ANSI standard modes (`CSI Pn h`/`l` without a `?` prefix).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnsiModes: u8 {
        /// IRM — insert/replace mode (`CSI 4 h`/`l`).
        const INSERT = 1 << 0;
        /// LNM — line feed/new line mode (`CSI 20 h`/`l`): when set, LF also
        /// performs a carriage return.
        const LINEFEED_NEWLINE = 1 << 1;
    }
}

bitflags! {
    /// DEC private modes (`CSI ? Pn h`/`l`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecModes: u32 {
        /// DECCKM — cursor keys send application sequences.
        const CURSOR_KEYS_APPLICATION = 1 << 0;
        /// DECSCNM — reverse video (whole screen).
        const REVERSE_VIDEO = 1 << 1;
        /// DECOM — origin mode.
        const ORIGIN = 1 << 2;
        /// DECAWM — auto-wrap.
        const AUTOWRAP = 1 << 3;
        /// Cursor blink.
        const CURSOR_BLINK = 1 << 4;
        /// DECTCEM — cursor visible.
        const CURSOR_VISIBLE = 1 << 5;
        /// Mouse: click reporting (mode 1000).
        const MOUSE_CLICK = 1 << 6;
        /// Mouse: button-event reporting (mode 1002).
        const MOUSE_BUTTON = 1 << 7;
        /// Mouse: any-event reporting (mode 1003).
        const MOUSE_ANY = 1 << 8;
        /// Bracketed paste mode (2004).
        const BRACKETED_PASTE = 1 << 9;
        /// Focus in/out reporting (1004).
        const FOCUS_REPORTING = 1 << 10;
        /// DECKPAM — keypad application mode.
        const KEYPAD_APPLICATION = 1 << 11;
    }
}

/// Aggregate mode state for a terminal instance.
///
/// Default matches a freshly reset (RIS) terminal: origin mode off
/// (absolute addressing), auto-wrap **on** (xterm's factory default),
/// cursor visible, everything else off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    pub ansi: AnsiModes,
    pub dec: DecModes,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            ansi: AnsiModes::empty(),
            dec: DecModes::AUTOWRAP | DecModes::CURSOR_VISIBLE,
        }
    }
}

impl Modes {
    /// Construct modes at their power-on default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to power-on defaults (used by RIS and, partially, DECSTR).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set (`h`) or reset (`l`) a DEC private mode by its numeric code.
    ///
    /// Unknown codes are ignored (per the error-handling discipline: no
    /// panics, best-effort dispatch).
    pub fn set_dec_mode(&mut self, code: u16, enabled: bool) {
        let Some(flag) = dec_mode_flag(code) else {
            return;
        };
        self.dec.set(flag, enabled);
    }

    /// Set (`h`) or reset (`l`) an ANSI standard mode by its numeric code.
    pub fn set_ansi_mode(&mut self, code: u16, enabled: bool) {
        let flag = match code {
            4 => AnsiModes::INSERT,
            20 => AnsiModes::LINEFEED_NEWLINE,
            _ => return,
        };
        self.ansi.set(flag, enabled);
    }

    /// Query whether a DEC private mode is currently set.
    pub fn dec_mode(&self, code: u16) -> bool {
        dec_mode_flag(code).is_some_and(|flag| self.dec.contains(flag))
    }

    pub fn origin_mode(&self) -> bool {
        self.dec.contains(DecModes::ORIGIN)
    }

    pub fn autowrap(&self) -> bool {
        self.dec.contains(DecModes::AUTOWRAP)
    }

    pub fn insert_mode(&self) -> bool {
        self.ansi.contains(AnsiModes::INSERT)
    }

    pub fn cursor_visible(&self) -> bool {
        self.dec.contains(DecModes::CURSOR_VISIBLE)
    }

    pub fn reverse_video(&self) -> bool {
        self.dec.contains(DecModes::REVERSE_VIDEO)
    }
}

fn dec_mode_flag(code: u16) -> Option<DecModes> {
    Some(match code {
        1 => DecModes::CURSOR_KEYS_APPLICATION,
        5 => DecModes::REVERSE_VIDEO,
        6 => DecModes::ORIGIN,
        7 => DecModes::AUTOWRAP,
        12 => DecModes::CURSOR_BLINK,
        25 => DecModes::CURSOR_VISIBLE,
        1000 => DecModes::MOUSE_CLICK,
        1002 => DecModes::MOUSE_BUTTON,
        1003 => DecModes::MOUSE_ANY,
        1004 => DecModes::FOCUS_REPORTING,
        1048 => return None, // handled by the terminal core directly (save/restore, not a flag)
        2004 => DecModes::BRACKETED_PASTE,
        66 => DecModes::KEYPAD_APPLICATION,
        _ => return None,
    })
}
