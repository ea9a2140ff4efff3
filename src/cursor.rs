//! Cursor position, pen attributes, tab stops, scroll region, and G0-G3
//! character-set state.
//!
//! Kept as a single struct (rather than splitting tab stops / charset state
//! into their own types) because all of it shares the same lifecycle: it is
//! saved and restored together by DECSC/DECRC and the CSI `?1048` private
//! mode, and reset together by RIS.

use crate::cell::SgrAttrs;

/// One of the four G-banks a character can be designated into (`ESC ( X`,
/// `ESC ) X`, `ESC * X`, `ESC + X` designate G0-G3 respectively).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Ascii,
    /// DEC Special Graphics and Line Drawing set (designated with `0`).
    DecSpecialGraphics,
}

/// Cursor state: position, pen, tab stops, scroll region, and charset banks.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub row: u16,
    pub col: u16,
    /// Current rendition pen applied to newly written cells.
    pub attrs: SgrAttrs,
    /// DECAWM "deferred wrap" latch: set when a printable character was
    /// placed in the last column; the *next* printable character triggers
    /// the actual wrap rather than this one.
    pub pending_wrap: bool,
    /// Pending single-shift bank (`SS2`/`SS3`), consumed by the next
    /// printable character only.
    pub single_shift: Option<u8>,

    rows: u16,
    cols: u16,
    scroll_top: u16,
    scroll_bottom: u16,
    tab_stops: Vec<bool>,

    /// G0-G3 charset designations.
    g: [Charset; 4],
    /// Which bank (0 or 1) is currently invoked into GL via SI/SO.
    gl: u8,
}

impl Cursor {
    /// Create a cursor at the origin for a grid of the given size, with
    /// default tab stops every 8 columns and a full-screen scroll region.
    pub fn new(rows: u16, cols: u16) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            row: 0,
            col: 0,
            attrs: SgrAttrs::default(),
            pending_wrap: false,
            single_shift: None,
            rows,
            cols,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
            g: [Charset::Ascii; 4],
            gl: 0,
        }
    }

    /// Current `(row, col)` position.
    pub fn position(&self) -> (u16, u16) {
        (self.row, self.col)
    }

    pub fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> u16 {
        self.scroll_bottom
    }

    /// Set the DECSTBM scroll region (0-based, inclusive bounds). Invalid
    /// regions (top >= bottom, or out of grid range) are ignored.
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        if top < bottom && bottom < self.rows {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        }
    }

    /// Reset the scroll region to the full screen.
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows.saturating_sub(1);
    }

    /// Carriage return: column to 0, clears pending wrap.
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    pub fn move_left(&mut self, n: u16) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    pub fn move_right(&mut self, n: u16) {
        self.col = (self.col + n).min(self.cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn move_up(&mut self, n: u16) {
        self.row = self.row.saturating_sub(n);
        self.pending_wrap = false;
    }

    pub fn move_down(&mut self, n: u16) {
        self.row = (self.row + n).min(self.rows.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Absolute cursor placement. When `origin_mode` is true, `row` is
    /// relative to the top of the scroll region and clamped to stay inside
    /// it; otherwise `row` is absolute within the whole grid.
    pub fn move_to(&mut self, row: u16, col: u16, origin_mode: bool) {
        self.pending_wrap = false;
        self.col = col.min(self.cols.saturating_sub(1));
        if origin_mode {
            let height = self.scroll_bottom.saturating_sub(self.scroll_top);
            self.row = self.scroll_top + row.min(height);
        } else {
            self.row = row.min(self.rows.saturating_sub(1));
        }
    }

    /// Horizontal absolute positioning (`CSI G`), preserving row.
    pub fn move_to_col(&mut self, col: u16) {
        self.col = col.min(self.cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Clamp the cursor into the current grid bounds. Used after external
    /// mutation (e.g. scroll-region changes) that might leave it stale.
    pub fn clamp(&mut self) {
        self.row = self.row.min(self.rows.saturating_sub(1));
        self.col = self.col.min(self.cols.saturating_sub(1));
    }

    /// Adjust to a new grid size: resets the scroll region to full screen,
    /// rebuilds default tab stops, and clamps the cursor into bounds.
    /// Pending wrap is cleared since the geometry it referred to changed.
    pub fn resize(&mut self, new_cols: u16, new_rows: u16) {
        self.rows = new_rows.max(1);
        self.cols = new_cols.max(1);
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.tab_stops = default_tab_stops(self.cols);
        self.pending_wrap = false;
        self.clamp();
    }

    /// Smallest tab stop strictly greater than the current column, or the
    /// last column if none remains.
    pub fn next_tab_stop(&self) -> u16 {
        let last = self.cols.saturating_sub(1);
        for col in (self.col + 1)..self.cols {
            if self.tab_stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
        }
        last
    }

    /// Largest tab stop strictly less than the current column, or 0 if none.
    pub fn prev_tab_stop(&self) -> u16 {
        for col in (0..self.col).rev() {
            if self.tab_stops.get(col as usize).copied().unwrap_or(false) {
                return col;
            }
        }
        0
    }

    /// HTS: set a tab stop at the current column.
    pub fn set_tab_stop(&mut self) {
        if let Some(slot) = self.tab_stops.get_mut(self.col as usize) {
            *slot = true;
        }
    }

    /// TBC 0: clear the tab stop at the current column.
    pub fn clear_tab_stop(&mut self) {
        if let Some(slot) = self.tab_stops.get_mut(self.col as usize) {
            *slot = false;
        }
    }

    /// TBC 3: clear all tab stops.
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|slot| *slot = false);
    }

    /// Designate a charset into one of the G0-G3 banks.
    pub fn designate_charset(&mut self, slot: u8, charset: Charset) {
        if let Some(bank) = self.g.get_mut(slot as usize) {
            *bank = charset;
        }
    }

    /// Invoke G0 or G1 into GL (SI/SO).
    pub fn invoke_gl(&mut self, bank: u8) {
        if bank <= 1 {
            self.gl = bank;
        }
    }

    /// The charset that applies to the *next* printable character, taking
    /// any pending single-shift into account but not consuming it.
    pub fn effective_charset(&self) -> Charset {
        if let Some(bank) = self.single_shift {
            self.g.get(bank as usize).copied().unwrap_or_default()
        } else {
            self.g.get(self.gl as usize).copied().unwrap_or_default()
        }
    }

    /// Consume a pending single-shift (SS2/SS3), returning the charset that
    /// applied to the character it was consumed for.
    pub fn consume_single_shift(&mut self) -> Charset {
        let charset = self.effective_charset();
        self.single_shift = None;
        charset
    }

    /// Reset all charset/tab-stop/scroll-region state to power-on defaults.
    /// Used by RIS; DECSTR additionally calls this alongside an attrs reset.
    pub fn reset_charset(&mut self) {
        self.g = [Charset::Ascii; 4];
        self.gl = 0;
        self.single_shift = None;
    }
}

fn default_tab_stops(cols: u16) -> Vec<bool> {
    (0..cols).map(|col| col > 0 && col % 8 == 0).collect()
}

/// DEC Special Graphics / line-drawing translation for the current charset.
///
/// Only the DEC Special Graphics set (designated via `ESC ( 0` etc.) remaps
/// characters; ASCII passes through unchanged.
pub fn translate_charset(ch: char, charset: Charset) -> char {
    if charset != Charset::DecSpecialGraphics {
        return ch;
    }
    match ch {
        '`' => '\u{25c6}', // diamond
        'a' => '\u{2592}', // checkerboard
        'b' => '\u{2409}', // HT symbol
        'c' => '\u{240c}', // FF symbol
        'd' => '\u{240d}', // CR symbol
        'e' => '\u{240a}', // LF symbol
        'f' => '\u{00b0}', // degree
        'g' => '\u{00b1}', // plus/minus
        'h' => '\u{2424}', // NL symbol
        'i' => '\u{240b}', // VT symbol
        'j' => '\u{2518}', // bottom-right corner
        'k' => '\u{2510}', // top-right corner
        'l' => '\u{250c}', // top-left corner
        'm' => '\u{2514}', // bottom-left corner
        'n' => '\u{253c}', // crossing lines
        'o' => '\u{23ba}', // scan line 1
        'p' => '\u{23bb}', // scan line 3
        'q' => '\u{2500}', // horizontal line
        'r' => '\u{23bc}', // scan line 7
        's' => '\u{23bd}', // scan line 9
        't' => '\u{251c}', // left tee
        'u' => '\u{2524}', // right tee
        'v' => '\u{2534}', // bottom tee
        'w' => '\u{252c}', // top tee
        'x' => '\u{2502}', // vertical line
        'y' => '\u{2264}', // less-than-or-equal
        'z' => '\u{2265}', // greater-than-or-equal
        '{' => '\u{03c0}', // pi
        '|' => '\u{2260}', // not-equal
        '}' => '\u{00a3}', // pound sterling
        '~' => '\u{00b7}', // centered dot
        _ => ch,
    }
}

/// Snapshot of cursor position/attrs/charset state, as captured by DECSC
/// (`ESC 7`) or the CSI `?1048` private mode, and restored by DECRC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedCursor {
    row: u16,
    col: u16,
    attrs: SgrAttrs,
    origin_mode: bool,
    g: [Charset; 4],
    gl: u8,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            attrs: SgrAttrs::default(),
            origin_mode: false,
            g: [Charset::Ascii; 4],
            gl: 0,
        }
    }
}

impl SavedCursor {
    /// Capture the cursor's position, pen, and charset state.
    pub fn save(cursor: &Cursor, origin_mode: bool) -> Self {
        Self {
            row: cursor.row,
            col: cursor.col,
            attrs: cursor.attrs,
            origin_mode,
            g: cursor.g,
            gl: cursor.gl,
        }
    }

    /// Restore a previously saved snapshot onto `cursor`, clamping the
    /// position into its current bounds (in case the grid was resized in
    /// between save and restore).
    pub fn restore(&self, cursor: &mut Cursor) {
        cursor.row = self.row;
        cursor.col = self.col;
        cursor.attrs = self.attrs;
        cursor.g = self.g;
        cursor.gl = self.gl;
        cursor.single_shift = None;
        cursor.pending_wrap = false;
        cursor.clamp();
    }

    /// The origin-mode flag captured at save time.
    pub fn origin_mode(&self) -> bool {
        self.origin_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_is_at_origin() {
        let cursor = Cursor::new(24, 80);
        assert_eq!(cursor.position(), (0, 0));
        assert_eq!(cursor.scroll_top(), 0);
        assert_eq!(cursor.scroll_bottom(), 23);
    }

    #[test]
    fn move_right_clamps_at_last_column() {
        let mut cursor = Cursor::new(24, 80);
        cursor.move_right(200);
        assert_eq!(cursor.col, 79);
    }

    #[test]
    fn move_left_clamps_at_zero() {
        let mut cursor = Cursor::new(24, 80);
        cursor.move_left(5);
        assert_eq!(cursor.col, 0);
    }

    #[test]
    fn carriage_return_clears_pending_wrap() {
        let mut cursor = Cursor::new(24, 80);
        cursor.col = 79;
        cursor.pending_wrap = true;
        cursor.carriage_return();
        assert_eq!(cursor.col, 0);
        assert!(!cursor.pending_wrap);
    }

    #[test]
    fn move_to_absolute_ignores_origin_mode() {
        let mut cursor = Cursor::new(24, 80);
        cursor.set_scroll_region(5, 10);
        cursor.move_to(2, 3, false);
        assert_eq!(cursor.position(), (2, 3));
    }

    #[test]
    fn move_to_relative_to_scroll_region_under_origin_mode() {
        let mut cursor = Cursor::new(24, 80);
        cursor.set_scroll_region(5, 10);
        cursor.move_to(0, 0, true);
        assert_eq!(cursor.position(), (5, 0));
        cursor.move_to(100, 0, true);
        assert_eq!(cursor.row, 10);
    }

    #[test]
    fn tab_stops_default_every_eight_columns() {
        let cursor = Cursor::new(24, 80);
        assert_eq!(cursor.next_tab_stop(), 8);
    }

    #[test]
    fn set_and_clear_tab_stop() {
        let mut cursor = Cursor::new(24, 80);
        cursor.col = 3;
        cursor.set_tab_stop();
        cursor.col = 0;
        assert_eq!(cursor.next_tab_stop(), 3);
        cursor.col = 3;
        cursor.clear_tab_stop();
        cursor.col = 0;
        assert_eq!(cursor.next_tab_stop(), 8);
    }

    #[test]
    fn clear_all_tab_stops_leaves_only_right_edge_fallback() {
        let mut cursor = Cursor::new(24, 80);
        cursor.clear_all_tab_stops();
        assert_eq!(cursor.next_tab_stop(), 79);
    }

    #[test]
    fn prev_tab_stop_walks_backward() {
        let cursor = Cursor::new(24, 80);
        let mut cursor = cursor;
        cursor.col = 20;
        assert_eq!(cursor.prev_tab_stop(), 16);
        cursor.col = 5;
        assert_eq!(cursor.prev_tab_stop(), 0);
    }

    #[test]
    fn resize_resets_scroll_region_and_clamps() {
        let mut cursor = Cursor::new(24, 80);
        cursor.set_scroll_region(2, 10);
        cursor.move_to(23, 79, false);
        cursor.resize(40, 10);
        assert_eq!(cursor.scroll_top(), 0);
        assert_eq!(cursor.scroll_bottom(), 9);
        assert_eq!(cursor.row, 9);
        assert_eq!(cursor.col, 39);
    }

    #[test]
    fn charset_designation_and_single_shift() {
        let mut cursor = Cursor::new(24, 80);
        cursor.designate_charset(1, Charset::DecSpecialGraphics);
        assert_eq!(cursor.effective_charset(), Charset::Ascii);
        cursor.invoke_gl(1);
        assert_eq!(cursor.effective_charset(), Charset::DecSpecialGraphics);
        cursor.invoke_gl(0);
        cursor.single_shift = Some(1);
        assert_eq!(cursor.effective_charset(), Charset::DecSpecialGraphics);
        assert_eq!(cursor.consume_single_shift(), Charset::DecSpecialGraphics);
        assert_eq!(cursor.single_shift, None);
        assert_eq!(cursor.effective_charset(), Charset::Ascii);
    }

    #[test]
    fn translate_charset_line_drawing() {
        assert_eq!(translate_charset('q', Charset::DecSpecialGraphics), '\u{2500}');
        assert_eq!(translate_charset('q', Charset::Ascii), 'q');
    }

    #[test]
    fn saved_cursor_round_trip() {
        let mut cursor = Cursor::new(24, 80);
        cursor.move_to(5, 10, false);
        cursor.attrs.flags = crate::cell::SgrFlags::BOLD;
        cursor.designate_charset(0, Charset::DecSpecialGraphics);
        let saved = SavedCursor::save(&cursor, true);
        assert!(saved.origin_mode());

        cursor.move_to(0, 0, false);
        cursor.attrs.reset();
        cursor.designate_charset(0, Charset::Ascii);
        saved.restore(&mut cursor);

        assert_eq!(cursor.position(), (5, 10));
        assert!(cursor.attrs.flags.contains(crate::cell::SgrFlags::BOLD));
        assert_eq!(cursor.g[0], Charset::DecSpecialGraphics);
    }

    #[test]
    fn saved_cursor_restore_clamps_after_resize() {
        let mut cursor = Cursor::new(24, 80);
        cursor.move_to(20, 70, false);
        let saved = SavedCursor::save(&cursor, false);
        cursor.resize(10, 10);
        saved.restore(&mut cursor);
        assert_eq!(cursor.row, 9);
        assert_eq!(cursor.col, 9);
    }
}
