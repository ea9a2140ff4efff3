//! VT/ANSI byte-stream parser.
//!
//! A table-driven state machine loosely modeled on Paul Flo Williams' VT500
//! parser, extended with a streaming UTF-8 decoder. Converts an output byte
//! stream into a sequence of [`Action`]s for the terminal engine to dispatch.
//! The parser itself holds no terminal state (grid, cursor, modes) — it is a
//! pure lexer/tokenizer.

/// A single SGR-style parameter group: the leading value followed by any
/// colon-separated sub-parameters (e.g. `4:3` becomes `[4, 3]`, `38:2:1:2:3`
/// becomes `[38, 2, 1, 2, 3]`). Top-level parameters are semicolon
/// separated; each becomes its own group.
pub type ParamGroup = Vec<u16>;

/// The parameter vector of a CSI/DCS sequence.
pub type Params = Vec<ParamGroup>;

/// Parser output actions: structured tokens consumed by the terminal core.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A single printable character (already UTF-8 decoded).
    Print(char),
    /// A C0 control byte dispatched immediately (BEL, BS, HT, LF, VT, FF, CR,
    /// SO, SI). `CAN`/`SUB` abort in-progress sequences but are not
    /// surfaced as actions.
    Execute(u8),
    /// A single-byte (or charset-designator) ESC sequence: `intermediates`
    /// holds any bytes in 0x20-0x2F (e.g. `(` for charset designation),
    /// `final_byte` is the dispatching byte.
    Esc { intermediates: Vec<u8>, final_byte: u8 },
    /// A CSI sequence: `ESC [ [prefix] params [intermediates] final`.
    Csi {
        prefix: Option<u8>,
        params: Params,
        intermediates: Vec<u8>,
        final_byte: u8,
    },
    /// An OSC sequence, already split into its numeric command and payload.
    Osc { command: u32, payload: String },
    /// A DCS sequence. The core has no defined semantics for DCS payloads
    /// (out of scope); it is surfaced so observers can see it, but normal
    /// dispatch ignores it.
    Dcs {
        params: Params,
        intermediates: Vec<u8>,
        data: Vec<u8>,
    },
    /// The private-use RPC extension: `ESC [ > Pn ; Pv Pc` where
    /// `Pc in {F, Q, R, E}` is the CSI final byte itself.
    Rpc { pn: u16, pv: u16, pc: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Esc,
    EscIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
    OscEsc,
    DcsEntry,
    DcsParam,
    DcsIntermediate,
    DcsPassthrough,
    DcsPassthroughEsc,
    DcsIgnore,
    SosPmApcString,
}

const OSC_PAYLOAD_LIMIT: usize = 1024;
const MAX_PARAM_VALUE: u32 = 65535;

/// VT/ANSI parser state.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    prefix: Option<u8>,
    params: Params,
    intermediates: Vec<u8>,
    osc_command: Option<u32>,
    osc_payload: Vec<u8>,
    osc_discarded: bool,
    dcs_data: Vec<u8>,

    // Streaming UTF-8 decoder state.
    utf8_need: u8,
    utf8_seen: u8,
    utf8_codepoint: u32,
    utf8_min: u32,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            prefix: None,
            params: Vec::new(),
            intermediates: Vec::new(),
            osc_command: None,
            osc_payload: Vec::new(),
            osc_discarded: false,
            dcs_data: Vec::new(),
            utf8_need: 0,
            utf8_seen: 0,
            utf8_codepoint: 0,
            utf8_min: 0,
        }
    }

    /// Feed a chunk of bytes and return the resulting actions.
    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut out = Vec::new();
        for &b in bytes {
            self.advance(b, &mut out);
        }
        out
    }

    /// Advance the parser by one byte, pushing any resulting actions.
    pub fn advance(&mut self, b: u8, out: &mut Vec<Action>) {
        // CAN/SUB abort any in-progress escape/string sequence unconditionally.
        if (b == 0x18 || b == 0x1A) && self.state != State::Ground {
            self.abort();
            return;
        }
        // ESC re-enters the escape state from almost anywhere except inside
        // an OSC/DCS string, where it may instead be the start of an ST.
        if b == 0x1B
            && !matches!(
                self.state,
                State::OscString | State::DcsPassthrough | State::DcsPassthroughEsc | State::OscEsc
            )
        {
            self.enter_esc();
            return;
        }

        match self.state {
            State::Ground => self.advance_ground(b, out),
            State::Esc => self.advance_esc(b, out),
            State::EscIntermediate => self.advance_esc_intermediate(b, out),
            State::CsiEntry => self.advance_csi_entry(b, out),
            State::CsiParam => self.advance_csi_param(b, out),
            State::CsiIntermediate => self.advance_csi_intermediate(b, out),
            State::CsiIgnore => self.advance_csi_ignore(b),
            State::OscString => self.advance_osc_string(b, out),
            State::OscEsc => self.advance_osc_esc(b, out),
            State::DcsEntry => self.advance_dcs_entry(b),
            State::DcsParam => self.advance_dcs_param(b),
            State::DcsIntermediate => self.advance_dcs_intermediate(b),
            State::DcsPassthrough => self.advance_dcs_passthrough(b, out),
            State::DcsPassthroughEsc => self.advance_dcs_passthrough_esc(b, out),
            State::DcsIgnore => self.advance_dcs_ignore(b),
            State::SosPmApcString => self.advance_sos_pm_apc(b),
        }
    }

    fn abort(&mut self) {
        self.state = State::Ground;
        self.reset_sequence_buffers();
        self.utf8_need = 0;
    }

    fn enter_esc(&mut self) {
        self.state = State::Esc;
        self.reset_sequence_buffers();
    }

    fn reset_sequence_buffers(&mut self) {
        self.prefix = None;
        self.params.clear();
        self.intermediates.clear();
        self.osc_command = None;
        self.osc_payload.clear();
        self.osc_discarded = false;
        self.dcs_data.clear();
    }

    // ---- GROUND ---------------------------------------------------------

    fn advance_ground(&mut self, b: u8, out: &mut Vec<Action>) {
        if self.utf8_need > 0 {
            self.advance_utf8_continuation(b, out);
            return;
        }
        match b {
            0x07 | 0x08 | 0x09 | 0x0A | 0x0B | 0x0C | 0x0D | 0x0E | 0x0F => {
                out.push(Action::Execute(b));
            }
            0x00..=0x06 | 0x10..=0x1A | 0x1C..=0x1F => {
                // Other C0 controls have no core semantics; consumed silently.
            }
            0x20..=0x7E => out.push(Action::Print(b as char)),
            0x7F => {} // DEL: ignored, no-op per xterm default.
            0xC2..=0xDF => self.begin_utf8(b, 1, 0x80),
            0xE0..=0xEF => self.begin_utf8(b, 2, 0x800),
            0xF0..=0xF4 => self.begin_utf8(b, 3, 0x10000),
            _ => out.push(Action::Print('\u{FFFD}')),
        }
    }

    fn begin_utf8(&mut self, first: u8, need: u8, min: u32) {
        let mask: u32 = match need {
            1 => 0x1F,
            2 => 0x0F,
            _ => 0x07,
        };
        self.utf8_codepoint = (first as u32) & mask;
        self.utf8_need = need;
        self.utf8_seen = 0;
        self.utf8_min = min;
    }

    fn advance_utf8_continuation(&mut self, b: u8, out: &mut Vec<Action>) {
        if !(0x80..=0xBF).contains(&b) {
            // Invalid continuation: emit replacement and reprocess this byte
            // as if we were back in ground state.
            self.utf8_need = 0;
            out.push(Action::Print('\u{FFFD}'));
            self.advance_ground(b, out);
            return;
        }
        self.utf8_codepoint = (self.utf8_codepoint << 6) | (b as u32 & 0x3F);
        self.utf8_seen += 1;
        if self.utf8_seen == self.utf8_need {
            let cp = self.utf8_codepoint;
            self.utf8_need = 0;
            let ch = if cp < self.utf8_min || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
                '\u{FFFD}'
            } else {
                char::from_u32(cp).unwrap_or('\u{FFFD}')
            };
            out.push(Action::Print(ch));
        }
    }

    // ---- ESC --------------------------------------------------------------

    fn advance_esc(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x20..=0x2F => {
                self.intermediates.push(b);
                self.state = State::EscIntermediate;
            }
            b'[' => self.state = State::CsiEntry,
            b']' => self.state = State::OscString,
            b'P' => self.state = State::DcsEntry,
            b'X' | b'^' | b'_' => self.state = State::SosPmApcString,
            0x30..=0x7E => {
                out.push(Action::Esc {
                    intermediates: std::mem::take(&mut self.intermediates),
                    final_byte: b,
                });
                self.state = State::Ground;
            }
            _ => self.state = State::Ground,
        }
    }

    fn advance_esc_intermediate(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x20..=0x2F => self.intermediates.push(b),
            0x30..=0x7E => {
                out.push(Action::Esc {
                    intermediates: std::mem::take(&mut self.intermediates),
                    final_byte: b,
                });
                self.state = State::Ground;
            }
            _ => self.state = State::Ground,
        }
    }

    // ---- CSI --------------------------------------------------------------

    fn advance_csi_entry(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            b'<' | b'=' | b'>' | b'?' => {
                self.prefix = Some(b);
                self.state = State::CsiParam;
            }
            b'0'..=b'9' | b';' | b':' => {
                self.state = State::CsiParam;
                self.advance_csi_param(b, out);
            }
            0x20..=0x2F => {
                self.intermediates.push(b);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(b, out),
            _ => self.state = State::CsiIgnore,
        }
    }

    fn advance_csi_param(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            b'0'..=b'9' => self.push_digit(b),
            b':' => self.push_subparam(),
            b';' => self.advance_param(),
            0x20..=0x2F => {
                self.intermediates.push(b);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(b, out),
            _ => self.state = State::CsiIgnore,
        }
    }

    fn advance_csi_intermediate(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x20..=0x2F => self.intermediates.push(b),
            0x40..=0x7E => self.dispatch_csi(b, out),
            _ => self.state = State::CsiIgnore,
        }
    }

    fn advance_csi_ignore(&mut self, b: u8) {
        if (0x40..=0x7E).contains(&b) {
            self.state = State::Ground;
            self.reset_sequence_buffers();
        }
    }

    fn push_digit(&mut self, b: u8) {
        if self.params.is_empty() {
            self.params.push(vec![0]);
        }
        let group = self.params.last_mut().expect("just ensured non-empty");
        if group.is_empty() {
            group.push(0);
        }
        let slot = group.last_mut().expect("just ensured non-empty");
        let digit = (b - b'0') as u32;
        *slot = (*slot as u32 * 10 + digit).min(MAX_PARAM_VALUE) as u16;
    }

    fn push_subparam(&mut self) {
        if self.params.is_empty() {
            self.params.push(vec![0]);
        }
        self.params.last_mut().expect("non-empty").push(0);
    }

    fn advance_param(&mut self) {
        self.params.push(vec![0]);
    }

    fn dispatch_csi(&mut self, final_byte: u8, out: &mut Vec<Action>) {
        self.state = State::Ground;
        let params = std::mem::take(&mut self.params);
        let prefix = self.prefix.take();
        let intermediates = std::mem::take(&mut self.intermediates);

        if prefix == Some(b'>') && intermediates.is_empty() && matches!(final_byte, b'F' | b'Q' | b'R' | b'E') {
            if let Some(rpc) = decode_rpc(&params, final_byte) {
                out.push(rpc);
                return;
            }
        }

        out.push(Action::Csi {
            prefix,
            params,
            intermediates,
            final_byte,
        });
    }

    // ---- OSC ----------------------------------------------------------

    fn advance_osc_string(&mut self, b: u8, out: &mut Vec<Action>) {
        match b {
            0x07 => {
                self.dispatch_osc(out);
                self.state = State::Ground;
            }
            0x1B => self.state = State::OscEsc,
            _ => {
                if self.osc_command.is_none() {
                    if b.is_ascii_digit() {
                        let cmd = self.osc_command.unwrap_or(0) * 10 + (b - b'0') as u32;
                        self.osc_command = Some(cmd);
                        return;
                    }
                    if b == b';' {
                        self.osc_command = Some(0);
                        return;
                    }
                    // Non-numeric OSC command byte: the whole sequence is
                    // unsupported; discard until its terminator.
                    self.osc_discarded = true;
                    return;
                }
                if self.osc_payload.len() >= OSC_PAYLOAD_LIMIT {
                    self.osc_discarded = true;
                    return;
                }
                self.osc_payload.push(b);
            }
        }
    }

    fn advance_osc_esc(&mut self, b: u8, out: &mut Vec<Action>) {
        if b == b'\\' {
            self.dispatch_osc(out);
            self.state = State::Ground;
        } else {
            // Not a real ST; resume the OSC string, reprocessing this byte.
            self.state = State::OscString;
            self.advance_osc_string(b, out);
        }
    }

    fn dispatch_osc(&mut self, out: &mut Vec<Action>) {
        let command = self.osc_command.take();
        let discarded = std::mem::replace(&mut self.osc_discarded, false);
        let payload = std::mem::take(&mut self.osc_payload);
        if discarded {
            return;
        }
        let Some(command) = command else { return };
        let payload = String::from_utf8_lossy(&payload).into_owned();
        out.push(Action::Osc { command, payload });
    }

    // ---- DCS --------------------------------------------------------------

    fn advance_dcs_entry(&mut self, b: u8) {
        match b {
            b'<' | b'=' | b'>' | b'?' => {
                self.prefix = Some(b);
                self.state = State::DcsParam;
            }
            b'0'..=b'9' | b';' | b':' => {
                self.state = State::DcsParam;
                self.advance_dcs_param(b);
            }
            0x20..=0x2F => {
                self.intermediates.push(b);
                self.state = State::DcsIntermediate;
            }
            0x40..=0x7E => self.state = State::DcsPassthrough,
            _ => self.state = State::DcsIgnore,
        }
    }

    fn advance_dcs_param(&mut self, b: u8) {
        match b {
            b'0'..=b'9' => self.push_digit(b),
            b':' => self.push_subparam(),
            b';' => self.advance_param(),
            0x20..=0x2F => {
                self.intermediates.push(b);
                self.state = State::DcsIntermediate;
            }
            0x40..=0x7E => self.state = State::DcsPassthrough,
            _ => self.state = State::DcsIgnore,
        }
    }

    fn advance_dcs_intermediate(&mut self, b: u8) {
        match b {
            0x20..=0x2F => self.intermediates.push(b),
            0x40..=0x7E => self.state = State::DcsPassthrough,
            _ => self.state = State::DcsIgnore,
        }
    }

    fn advance_dcs_passthrough(&mut self, b: u8, out: &mut Vec<Action>) {
        if b == 0x1B {
            self.state = State::DcsPassthroughEsc;
            return;
        }
        self.dcs_data.push(b);
        let _ = out;
    }

    fn advance_dcs_passthrough_esc(&mut self, b: u8, out: &mut Vec<Action>) {
        if b == b'\\' {
            let params = std::mem::take(&mut self.params);
            let intermediates = std::mem::take(&mut self.intermediates);
            let data = std::mem::take(&mut self.dcs_data);
            self.prefix = None;
            out.push(Action::Dcs {
                params,
                intermediates,
                data,
            });
            self.state = State::Ground;
        } else {
            self.state = State::DcsPassthrough;
            self.dcs_data.push(0x1B);
            self.advance_dcs_passthrough(b, out);
        }
    }

    fn advance_dcs_ignore(&mut self, b: u8) {
        if b == 0x1B {
            self.state = State::Ground;
            self.reset_sequence_buffers();
        }
    }

    fn advance_sos_pm_apc(&mut self, b: u8) {
        if b == 0x1B {
            self.state = State::Ground;
            self.reset_sequence_buffers();
        }
    }
}

fn decode_rpc(params: &Params, pc: u8) -> Option<Action> {
    if params.len() != 2 {
        return None;
    }
    let pn = *params[0].first()?;
    let pv = *params[1].first()?;
    if (1000..=9999).contains(&pn) && (1..=99).contains(&pv) {
        Some(Action::Rpc { pn, pv, pc })
    } else {
        None
    }
}
