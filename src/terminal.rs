//! The terminal core: owns the primary/alternate grids, cursor, modes,
//! scrollback, and hyperlink registry, and drives them from a byte stream via
//! [`Parser`](crate::parser::Parser).
//!
//! `feed_bytes` is the sole mutation entry point. All state changes and event
//! emissions happen synchronously, in the order the bytes were consumed — no
//! background threads, no async. Optional [`TraceSink`]/[`RpcSink`] observers
//! are invoked inline during dispatch and must not change terminal behavior
//! whether or not one is attached.

use crate::cell::{Cell, Color, HyperlinkId, HyperlinkRegistry};
use crate::cursor::{translate_charset, Charset, Cursor, SavedCursor};
use crate::grid::Grid;
use crate::modes::Modes;
use crate::mouse::MouseMode;
use crate::observer::{
    canonical_bytes, RpcFormatViolation, RpcSink, TraceKind, TraceRecord, TraceSink,
};
use crate::osc::{self, ClipboardData, ColorSlot, OscCommand};
use crate::parser::{Action, Params, Parser};
use crate::scrollback::Scrollback;

/// An externally-observable effect of feeding bytes into the terminal.
///
/// Emitted synchronously, in byte order, from [`Terminal::feed_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Bell,
    TitleChanged(String),
    IconNameChanged(String),
    ClipboardRequest {
        selection: char,
        data: Option<Vec<u8>>,
        is_query: bool,
    },
    /// Bytes the host should write back to the pty/socket (query responses).
    HostOutput(Vec<u8>),
    SizeChanged { rows: u16, cols: u16 },
    ScrollbackChanged,
}

/// Default scrollback depth for [`Terminal::new`].
const DEFAULT_SCROLLBACK_LINES: usize = 1000;

/// The terminal core.
pub struct Terminal {
    primary: Grid,
    alternate: Grid,
    active_is_alternate: bool,
    cursor: Cursor,
    saved_cursor: SavedCursor,
    scrollback: Scrollback,
    modes: Modes,
    mouse_mode: MouseMode,
    hyperlinks: HyperlinkRegistry,
    current_hyperlink: HyperlinkId,
    last_graphic_char: Option<char>,
    parser: Parser,
    trace_sink: Option<Box<dyn TraceSink>>,
    rpc_sink: Option<Box<dyn RpcSink>>,
}

impl Terminal {
    /// Create a terminal with the default scrollback capacity.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self::with_scrollback_capacity(rows, cols, DEFAULT_SCROLLBACK_LINES)
    }

    /// Create a terminal with an explicit scrollback line capacity.
    #[must_use]
    pub fn with_scrollback_capacity(rows: u16, cols: u16, capacity: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            primary: Grid::new(cols, rows),
            alternate: Grid::new(cols, rows),
            active_is_alternate: false,
            cursor: Cursor::new(rows, cols),
            saved_cursor: SavedCursor::default(),
            scrollback: Scrollback::new(capacity),
            modes: Modes::new(),
            mouse_mode: MouseMode::Off,
            hyperlinks: HyperlinkRegistry::new(),
            current_hyperlink: 0,
            last_graphic_char: None,
            parser: Parser::new(),
            trace_sink: None,
            rpc_sink: None,
        }
    }

    /// Attach (or detach) a trace sink. Does not affect dispatch behavior.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace_sink = sink;
    }

    /// Attach (or detach) an RPC sink. Does not affect dispatch behavior.
    pub fn set_rpc_sink(&mut self, sink: Option<Box<dyn RpcSink>>) {
        self.rpc_sink = sink;
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.active_grid().rows()
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.active_grid().cols()
    }

    #[must_use]
    pub fn cursor_position(&self) -> (u16, u16) {
        self.cursor.position()
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.active_grid()
    }

    #[must_use]
    pub fn is_alternate_screen(&self) -> bool {
        self.active_is_alternate
    }

    #[must_use]
    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    #[must_use]
    pub fn hyperlinks(&self) -> &HyperlinkRegistry {
        &self.hyperlinks
    }

    #[must_use]
    pub fn mouse_mode(&self) -> MouseMode {
        self.mouse_mode
    }

    #[must_use]
    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    /// Scroll the scrollback viewport back by `n` lines. Host-driven, not
    /// escape-sequence driven (e.g. PageUp).
    pub fn scroll_viewport_up(&mut self, n: usize) {
        self.scrollback.scroll_up(n);
    }

    /// Scroll the scrollback viewport forward by `n` lines.
    pub fn scroll_viewport_down(&mut self, n: usize) {
        self.scrollback.scroll_down(n);
    }

    fn active_grid(&self) -> &Grid {
        if self.active_is_alternate {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn active_grid_mut(&mut self) -> &mut Grid {
        if self.active_is_alternate {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    /// Resize both buffers and the cursor. Rejects degenerate sizes by
    /// clamping to a 1x1 minimum.
    pub fn resize(&mut self, rows: u16, cols: u16) -> Vec<Event> {
        let rows = rows.max(1);
        let cols = cols.max(1);
        self.primary.resize(cols, rows);
        self.alternate.resize(cols, rows);
        self.cursor.resize(cols, rows);
        vec![Event::SizeChanged { rows, cols }]
    }

    /// Feed a chunk of bytes through the parser, dispatching each resulting
    /// action in order and returning the events produced.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<Event> {
        let mut parser = std::mem::take(&mut self.parser);
        let actions = parser.feed(bytes);
        self.parser = parser;

        let mut events = Vec::new();
        for action in actions {
            self.trace_action(&action);
            self.dispatch(action, &mut events);
        }
        events
    }

    fn dispatch(&mut self, action: Action, events: &mut Vec<Event>) {
        match action {
            Action::Print(ch) => self.write_char(ch),
            Action::Execute(b) => self.dispatch_execute(b, events),
            Action::Esc {
                intermediates,
                final_byte,
            } => self.dispatch_esc(&intermediates, final_byte, events),
            Action::Csi {
                prefix,
                params,
                intermediates,
                final_byte,
            } => self.dispatch_csi(prefix, &params, &intermediates, final_byte, events),
            Action::Osc { command, payload } => self.dispatch_osc(command, &payload, events),
            Action::Dcs { .. } => {}
            Action::Rpc { pn, pv, pc } => self.dispatch_rpc(pn, pv, pc),
        }
    }

    // ── Printing ─────────────────────────────────────────────────────

    fn write_char(&mut self, raw: char) {
        let charset = if self.cursor.single_shift.is_some() {
            self.cursor.consume_single_shift()
        } else {
            self.cursor.effective_charset()
        };
        let ch = translate_charset(raw, charset);
        let width = Cell::display_width(ch);
        if width == 0 {
            return;
        }

        let cols = self.active_grid().cols();

        if self.modes.autowrap() && self.cursor.pending_wrap {
            self.cursor.pending_wrap = false;
            self.cursor.col = 0;
            self.index();
        }

        if width == 2 && self.cursor.col + 1 >= cols && self.modes.autowrap() {
            self.cursor.col = 0;
            self.index();
        }

        if self.modes.insert_mode() {
            let bg = self.cursor.attrs.bg;
            let (row, col) = (self.cursor.row, self.cursor.col);
            self.active_grid_mut().insert_chars(row, col, width as u16, bg);
        }

        let attrs = self.cursor.attrs;
        let hyperlink = self.current_hyperlink;
        let (row, col) = (self.cursor.row, self.cursor.col);
        let grid = self.active_grid_mut();
        let written = grid.write_printable(row, col, ch, attrs);
        if written == 0 {
            return;
        }
        if let Some(cell) = grid.cell_mut(row, col) {
            cell.hyperlink = hyperlink;
        }
        if written == 2 {
            if let Some(cell) = grid.cell_mut(row, col + 1) {
                cell.hyperlink = hyperlink;
            }
        }
        self.last_graphic_char = Some(ch);

        let new_col = self.cursor.col + u16::from(written);
        if new_col >= cols {
            self.cursor.col = cols.saturating_sub(1);
            self.cursor.pending_wrap = true;
        } else {
            self.cursor.col = new_col;
        }
    }

    /// Move down within the scroll region, scrolling (and, on the primary
    /// buffer with a full-screen region, pushing to scrollback) when already
    /// at the bottom.
    fn index(&mut self) {
        let top = self.cursor.scroll_top();
        let bottom = self.cursor.scroll_bottom();
        if self.cursor.row == bottom {
            self.scroll_region_up(top, bottom, 1);
        } else {
            let rows = self.active_grid().rows();
            self.cursor.row = (self.cursor.row + 1).min(rows.saturating_sub(1));
        }
    }

    /// Move up within the scroll region, scrolling down when already at top.
    fn reverse_index(&mut self) {
        let top = self.cursor.scroll_top();
        let bottom = self.cursor.scroll_bottom();
        if self.cursor.row == top {
            self.scroll_region_down(top, bottom, 1);
        } else {
            self.cursor.row = self.cursor.row.saturating_sub(1);
        }
    }

    /// Scroll `[top, bottom]` (inclusive) up by `n`. On the primary buffer
    /// with a full-screen region, evicted rows are pushed to scrollback.
    fn scroll_region_up(&mut self, top: u16, bottom: u16, n: u16) {
        let bg = self.cursor.attrs.bg;
        let rows = self.active_grid().rows();
        let full_screen = top == 0 && bottom + 1 >= rows;
        if full_screen && !self.active_is_alternate {
            let mut scrollback = std::mem::take(&mut self.scrollback);
            self.primary.scroll_up_into(top, bottom + 1, n, &mut scrollback, bg);
            self.scrollback = scrollback;
        } else {
            self.active_grid_mut().scroll_up(top, bottom + 1, n, bg);
        }
    }

    /// Scroll `[top, bottom]` (inclusive) down by `n`. Never touches
    /// scrollback: content scrolling down pulls in blank lines, it does not
    /// resurrect history (that's `scroll_viewport_*`, a separate concept).
    fn scroll_region_down(&mut self, top: u16, bottom: u16, n: u16) {
        let bg = self.cursor.attrs.bg;
        self.active_grid_mut().scroll_down(top, bottom + 1, n, bg);
    }

    // ── C0 control dispatch ─────────────────────────────────────────

    fn dispatch_execute(&mut self, b: u8, events: &mut Vec<Event>) {
        match b {
            0x07 => events.push(Event::Bell),
            0x08 => self.cursor.move_left(1),
            0x09 => {
                let stop = self.cursor.next_tab_stop();
                self.cursor.col = stop;
                self.cursor.pending_wrap = false;
            }
            0x0A | 0x0B | 0x0C => {
                self.index();
                if self.modes.ansi.contains(crate::modes::AnsiModes::LINEFEED_NEWLINE) {
                    self.cursor.carriage_return();
                }
            }
            0x0D => self.cursor.carriage_return(),
            0x0E => self.cursor.invoke_gl(1),
            0x0F => self.cursor.invoke_gl(0),
            _ => {}
        }
    }

    // ── ESC dispatch ─────────────────────────────────────────────────

    fn dispatch_esc(&mut self, intermediates: &[u8], final_byte: u8, events: &mut Vec<Event>) {
        match intermediates {
            [] => match final_byte {
                b'7' => {
                    self.saved_cursor = SavedCursor::save(&self.cursor, self.modes.origin_mode());
                }
                b'8' => {
                    self.saved_cursor.restore(&mut self.cursor);
                    self.modes.set_dec_mode(6, self.saved_cursor.origin_mode());
                }
                b'D' => self.index(),
                b'E' => {
                    self.cursor.carriage_return();
                    self.index();
                }
                b'H' => self.cursor.set_tab_stop(),
                b'M' => self.reverse_index(),
                b'c' => self.full_reset(),
                b'=' => self.modes.set_dec_mode(66, true),
                b'>' => self.modes.set_dec_mode(66, false),
                b'N' => self.cursor.single_shift = Some(2),
                b'O' => self.cursor.single_shift = Some(3),
                _ => {}
            },
            [b'#'] if final_byte == b'8' => self.active_grid_mut().fill_all('E'),
            [b'('] | [b')'] | [b'*'] | [b'+'] => {
                let slot = match intermediates[0] {
                    b'(' => 0,
                    b')' => 1,
                    b'*' => 2,
                    _ => 3,
                };
                let charset = match final_byte {
                    b'0' => Charset::DecSpecialGraphics,
                    _ => Charset::Ascii,
                };
                self.cursor.designate_charset(slot, charset);
            }
            _ => {}
        }
        let _ = events;
    }

    fn full_reset(&mut self) {
        let rows = self.primary.rows();
        let cols = self.primary.cols();
        self.primary = Grid::new(cols, rows);
        self.alternate = Grid::new(cols, rows);
        self.active_is_alternate = false;
        self.cursor = Cursor::new(rows, cols);
        self.saved_cursor = SavedCursor::default();
        self.modes.reset();
        self.mouse_mode = MouseMode::Off;
        self.scrollback.clear();
        self.hyperlinks.clear();
        self.current_hyperlink = 0;
        self.last_graphic_char = None;
    }

    fn soft_reset(&mut self) {
        self.modes.reset();
        self.cursor.attrs.reset();
        self.cursor.reset_charset();
        self.cursor.reset_scroll_region();
        self.cursor.move_to(0, 0, false);
        self.mouse_mode = MouseMode::Off;
        self.current_hyperlink = 0;
    }

    // ── CSI dispatch ─────────────────────────────────────────────────

    fn dispatch_csi(
        &mut self,
        prefix: Option<u8>,
        params: &Params,
        intermediates: &[u8],
        final_byte: u8,
        events: &mut Vec<Event>,
    ) {
        if intermediates == [b'!'] && final_byte == b'p' {
            self.soft_reset();
            return;
        }

        if prefix == Some(b'?') {
            match final_byte {
                b'h' => {
                    for group in params {
                        if let Some(&code) = group.first() {
                            self.set_dec_private(code, true);
                        }
                    }
                }
                b'l' => {
                    for group in params {
                        if let Some(&code) = group.first() {
                            self.set_dec_private(code, false);
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        if prefix == Some(b'>') {
            if final_byte == b'c' {
                events.push(Event::HostOutput(b"\x1b[>0;100;0c".to_vec()));
            }
            return;
        }

        if prefix.is_some() {
            return;
        }

        match final_byte {
            b'A' => self.cursor.move_up(count(params, 0)),
            b'B' => self.cursor.move_down(count(params, 0)),
            b'C' => self.cursor.move_right(count(params, 0)),
            b'D' => self.cursor.move_left(count(params, 0)),
            b'E' => {
                self.cursor.move_down(count(params, 0));
                self.cursor.col = 0;
                self.cursor.pending_wrap = false;
            }
            b'F' => {
                self.cursor.move_up(count(params, 0));
                self.cursor.col = 0;
                self.cursor.pending_wrap = false;
            }
            b'G' | b'`' => self.cursor.move_to_col(count(params, 0).saturating_sub(1)),
            b'H' | b'f' => {
                let row = count(params, 0).saturating_sub(1);
                let col = count(params, 1).saturating_sub(1);
                self.cursor.move_to(row, col, self.modes.origin_mode());
            }
            b'J' => self.erase_in_display(mode(params, 0), events),
            b'K' => self.erase_in_line(mode(params, 0)),
            b'L' => self.csi_insert_lines(count(params, 0)),
            b'M' => self.csi_delete_lines(count(params, 0)),
            b'@' => {
                let (row, col) = (self.cursor.row, self.cursor.col);
                let bg = self.cursor.attrs.bg;
                self.active_grid_mut().insert_chars(row, col, count(params, 0), bg);
            }
            b'P' => {
                let (row, col) = (self.cursor.row, self.cursor.col);
                let bg = self.cursor.attrs.bg;
                self.active_grid_mut().delete_chars(row, col, count(params, 0), bg);
            }
            b'X' => {
                let (row, col) = (self.cursor.row, self.cursor.col);
                let bg = self.cursor.attrs.bg;
                self.active_grid_mut().erase_chars(row, col, count(params, 0), bg);
            }
            b'S' => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.scroll_region_up(top, bottom, count(params, 0));
            }
            b'T' => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.scroll_region_down(top, bottom, count(params, 0));
            }
            b'r' => self.set_scroll_region(params),
            b'm' => self.cursor.attrs.apply_sgr_params(params),
            b'g' => match mode(params, 0) {
                0 => self.cursor.clear_tab_stop(),
                3 => self.cursor.clear_all_tab_stops(),
                _ => {}
            },
            b'b' => {
                if let Some(ch) = self.last_graphic_char {
                    for _ in 0..count(params, 0) {
                        self.write_char(ch);
                    }
                }
            }
            b'c' => events.push(Event::HostOutput(b"\x1b[?1;2c".to_vec())),
            b'n' => match mode(params, 0) {
                5 => events.push(Event::HostOutput(b"\x1b[0n".to_vec())),
                6 => {
                    let (row, col) = (self.cursor.row + 1, self.cursor.col + 1);
                    events.push(Event::HostOutput(
                        format!("\x1b[{row};{col}R").into_bytes(),
                    ));
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn set_scroll_region(&mut self, params: &Params) {
        let top_raw = params.first().and_then(|g| g.first()).copied().unwrap_or(0);
        let top = if top_raw > 0 { top_raw - 1 } else { 0 };
        let rows = self.active_grid().rows();
        let bottom_raw = params.get(1).and_then(|g| g.first()).copied().unwrap_or(0);
        let bottom = if bottom_raw > 0 {
            bottom_raw - 1
        } else {
            rows.saturating_sub(1)
        };
        self.cursor.set_scroll_region(top, bottom);
        self.cursor.move_to(0, 0, self.modes.origin_mode());
    }

    fn csi_insert_lines(&mut self, n: u16) {
        let row = self.cursor.row;
        let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
        let bg = self.cursor.attrs.bg;
        self.active_grid_mut().insert_lines(row, n, top, bottom + 1, bg);
    }

    fn csi_delete_lines(&mut self, n: u16) {
        let row = self.cursor.row;
        let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
        let bg = self.cursor.attrs.bg;
        self.active_grid_mut().delete_lines(row, n, top, bottom + 1, bg);
    }

    fn erase_in_display(&mut self, mode: u16, events: &mut Vec<Event>) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let bg = self.cursor.attrs.bg;
        match mode {
            0 => self.active_grid_mut().erase_below(row, col, bg),
            1 => self.active_grid_mut().erase_above(row, col, bg),
            2 => self.active_grid_mut().erase_all(bg),
            3 => {
                self.scrollback.clear();
                events.push(Event::ScrollbackChanged);
            }
            _ => {}
        }
    }

    fn erase_in_line(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let bg = self.cursor.attrs.bg;
        match mode {
            0 => self.active_grid_mut().erase_line_right(row, col, bg),
            1 => self.active_grid_mut().erase_line_left(row, col, bg),
            2 => self.active_grid_mut().erase_line(row, bg),
            _ => {}
        }
    }

    fn set_dec_private(&mut self, code: u16, enabled: bool) {
        match code {
            47 => self.switch_alternate(enabled, false),
            1047 => self.switch_alternate(enabled, true),
            1049 => self.switch_alternate_1049(enabled),
            1048 => {
                if enabled {
                    self.saved_cursor = SavedCursor::save(&self.cursor, self.modes.origin_mode());
                } else {
                    self.saved_cursor.restore(&mut self.cursor);
                    self.modes.set_dec_mode(6, self.saved_cursor.origin_mode());
                }
            }
            1000 | 1002 | 1003 => {
                self.mouse_mode = self.mouse_mode.apply(code, enabled);
                self.modes.set_dec_mode(code, enabled);
            }
            _ => self.modes.set_dec_mode(code, enabled),
        }
    }

    fn switch_alternate(&mut self, enabled: bool, clear_on_enter: bool) {
        if enabled {
            if !self.active_is_alternate {
                if clear_on_enter {
                    self.alternate.clear();
                }
                self.active_is_alternate = true;
            }
        } else if self.active_is_alternate {
            self.active_is_alternate = false;
        }
    }

    fn switch_alternate_1049(&mut self, enabled: bool) {
        if enabled {
            if !self.active_is_alternate {
                self.saved_cursor = SavedCursor::save(&self.cursor, self.modes.origin_mode());
                self.alternate.clear();
                self.active_is_alternate = true;
                self.cursor.move_to(0, 0, false);
            }
        } else if self.active_is_alternate {
            self.alternate.clear();
            self.active_is_alternate = false;
            self.saved_cursor.restore(&mut self.cursor);
        }
    }

    // ── OSC dispatch ─────────────────────────────────────────────────

    fn dispatch_osc(&mut self, command: u32, payload: &str, events: &mut Vec<Event>) {
        let Some(cmd) = osc::decode(command, payload) else {
            return;
        };
        match cmd {
            OscCommand::SetIconNameAndTitle(title) => {
                events.push(Event::TitleChanged(title.clone()));
                events.push(Event::IconNameChanged(title));
            }
            OscCommand::SetIconName(name) => events.push(Event::IconNameChanged(name)),
            OscCommand::SetTitle(title) => events.push(Event::TitleChanged(title)),
            OscCommand::Hyperlink { uri, .. } => {
                if self.current_hyperlink != 0 {
                    self.hyperlinks.release_id(self.current_hyperlink);
                }
                self.current_hyperlink = if uri.is_empty() {
                    0
                } else {
                    self.hyperlinks.acquire(&uri)
                };
            }
            OscCommand::Clipboard { selection, data } => {
                let (data, is_query) = match data {
                    ClipboardData::Query => (None, true),
                    ClipboardData::Clear => (None, false),
                    ClipboardData::Set(bytes) => (Some(bytes), false),
                };
                events.push(Event::ClipboardRequest {
                    selection,
                    is_query,
                    data,
                });
            }
            OscCommand::ColorQuery { which, is_query } => {
                if is_query {
                    let response: &[u8] = match which {
                        ColorSlot::Foreground => b"\x1b]10;rgb:ffff/ffff/ffff\x07",
                        ColorSlot::Background => b"\x1b]11;rgb:0000/0000/0000\x07",
                    };
                    events.push(Event::HostOutput(response.to_vec()));
                }
            }
            OscCommand::Unknown { .. } => {}
        }
    }

    // ── RPC dispatch ─────────────────────────────────────────────────

    fn dispatch_rpc(&mut self, pn: u16, pv: u16, pc: u8) {
        let Some(sink) = self.rpc_sink.as_mut() else {
            return;
        };
        match crate::observer::validate_rpc(pn, pv, pc) {
            Ok(msg) => sink.message(msg),
            Err(violation) if violation != RpcFormatViolation::Valid => sink.malformed(violation),
            Err(_) => {}
        }
    }

    // ── Tracing ──────────────────────────────────────────────────────

    fn trace_action(&mut self, action: &Action) {
        let Some(sink) = self.trace_sink.as_mut() else {
            return;
        };
        let record = match action {
            Action::Print(ch) => TraceRecord {
                kind: if Cell::display_width(*ch) == 2 {
                    TraceKind::Wide
                } else {
                    TraceKind::Printable
                },
                escape_seq: ch.to_string(),
                printable: Some(ch.to_string()),
                direction: crate::observer::Direction::Input,
                row: None,
                col: None,
            },
            Action::Execute(b) => TraceRecord {
                kind: TraceKind::Control,
                escape_seq: canonical_bytes(&[*b]),
                printable: None,
                direction: crate::observer::Direction::Input,
                row: None,
                col: None,
            },
            Action::Esc {
                intermediates,
                final_byte,
            } => {
                let mut seq = String::from("\\x1b");
                seq.push_str(&canonical_bytes(intermediates));
                seq.push(*final_byte as char);
                TraceRecord {
                    kind: TraceKind::Esc,
                    escape_seq: seq,
                    printable: None,
                    direction: crate::observer::Direction::Input,
                    row: None,
                    col: None,
                }
            }
            Action::Csi {
                prefix,
                params,
                intermediates,
                final_byte,
            } => {
                let kind = if *final_byte == b'm' {
                    TraceKind::Sgr
                } else {
                    TraceKind::Csi
                };
                TraceRecord {
                    kind,
                    escape_seq: render_csi(prefix, params, intermediates, *final_byte),
                    printable: None,
                    direction: crate::observer::Direction::Input,
                    row: None,
                    col: None,
                }
            }
            Action::Osc { command, payload } => TraceRecord {
                kind: TraceKind::Osc,
                escape_seq: format!("\\x1b]{command};{payload}"),
                printable: None,
                direction: crate::observer::Direction::Input,
                row: None,
                col: None,
            },
            Action::Dcs { .. } => TraceRecord {
                kind: TraceKind::Dcs,
                escape_seq: "\\x1bP".to_string(),
                printable: None,
                direction: crate::observer::Direction::Input,
                row: None,
                col: None,
            },
            Action::Rpc { .. } => return,
        };
        sink.record(record);
    }
}

/// A parameter read as a *count*: missing or zero defaults to 1, matching
/// the VT convention that `CSI A` and `CSI 0A` both move by one row.
fn count(params: &Params, idx: usize) -> u16 {
    params
        .get(idx)
        .and_then(|g| g.first())
        .copied()
        .filter(|&v| v > 0)
        .unwrap_or(1)
}

/// A parameter read as a *mode selector*: missing defaults to 0, and 0 is a
/// meaningful value in its own right (e.g. `CSI J` == `CSI 0J`).
fn mode(params: &Params, idx: usize) -> u16 {
    params.get(idx).and_then(|g| g.first()).copied().unwrap_or(0)
}

fn render_csi(prefix: &Option<u8>, params: &Params, intermediates: &[u8], final_byte: u8) -> String {
    let mut s = String::from("\\x1b[");
    if let Some(p) = prefix {
        s.push(*p as char);
    }
    let parts: Vec<String> = params
        .iter()
        .map(|g| {
            g.iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect();
    s.push_str(&parts.join(";"));
    for &b in intermediates {
        s.push(b as char);
    }
    s.push(final_byte as char);
    s
}
