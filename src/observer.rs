//! Optional observer hooks: a structured trace sink and a private-use RPC
//! sink.
//!
//! Both are pure plug-in points. A terminal with no sink configured must
//! behave byte-for-byte identically, in dispatch order, to one with a sink
//! attached — the modularity invariant. Sinks are invoked synchronously,
//! one record at a time; any internal synchronization needed for a sink
//! shared across threads is the sink's own responsibility.

/// The category of a traced event, matching the tabular record layout
/// embedders may persist (`time, type, escape_seq, printable, direction,
/// row?, col?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Csi,
    Osc,
    Esc,
    Dcs,
    Sgr,
    Printable,
    Control,
    Utf8,
    Wide,
}

/// Direction of a traced byte sequence relative to the terminal core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// One traced dispatch event, carrying a canonical human-readable encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub kind: TraceKind,
    /// Canonical encoding: control bytes and ESC as `\xNN`, e.g. `\x1b[1;31m`.
    pub escape_seq: String,
    /// The printable text carried by the event, if any (e.g. the character
    /// for a `Printable`/`Wide` record).
    pub printable: Option<String>,
    pub direction: Direction,
    pub row: Option<u16>,
    pub col: Option<u16>,
}

/// Receives [`TraceRecord`]s as the terminal core dispatches actions.
///
/// Implementations must not panic; a sink that can fail internally should
/// swallow its own errors (e.g. log and drop) rather than propagate them
/// into the terminal core, which has no error channel for this path.
pub trait TraceSink {
    fn record(&mut self, record: TraceRecord);

    /// Flush any buffered records so tests can observe them deterministically.
    /// Default no-op for sinks that write through immediately.
    fn flush(&mut self) {}
}

/// A validated private-use RPC message recognized by the parser:
/// `ESC [ > Pn ; Pv ; Pc` with `Pn in [1000, 9999]`, `Pv in [1, 99]`, and
/// `Pc in {F, Q, R, E}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcMessage {
    pub command_id: u16,
    pub version: u16,
    pub kind: RpcKind,
}

/// The meaning of an RPC message's final byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcKind {
    /// `F`: fire-and-forget request.
    Fire,
    /// `Q`: query, expects a response.
    Query,
    /// `R`: response to a prior query.
    Response,
    /// `E`: error response.
    Error,
}

impl RpcKind {
    #[must_use]
    pub fn from_final_byte(b: u8) -> Option<Self> {
        match b {
            b'F' => Some(RpcKind::Fire),
            b'Q' => Some(RpcKind::Query),
            b'R' => Some(RpcKind::Response),
            b'E' => Some(RpcKind::Error),
            _ => None,
        }
    }
}

/// Classification of an RPC-shaped CSI sequence that failed validation, for
/// reporting to the RPC sink as a malformed-record diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcFormatViolation {
    Valid,
    InvalidCommandId,
    InvalidFinalCharacter,
    Malformed,
    None,
}

/// Validate an `ESC [ > Pn ; Pv` sequence plus its candidate final byte,
/// producing either an [`RpcMessage`] or a classification of why it was
/// rejected.
#[must_use]
pub fn validate_rpc(pn: u16, pv: u16, final_byte: u8) -> Result<RpcMessage, RpcFormatViolation> {
    let Some(kind) = RpcKind::from_final_byte(final_byte) else {
        return Err(RpcFormatViolation::InvalidFinalCharacter);
    };
    if !(1000..=9999).contains(&pn) {
        return Err(RpcFormatViolation::InvalidCommandId);
    }
    if !(1..=99).contains(&pv) {
        return Err(RpcFormatViolation::Malformed);
    }
    Ok(RpcMessage {
        command_id: pn,
        version: pv,
        kind,
    })
}

/// Receives validated [`RpcMessage`]s (and, optionally, malformed-RPC
/// diagnostics) recognized by the parser.
pub trait RpcSink {
    fn message(&mut self, message: RpcMessage);

    /// Called for an RPC-shaped sequence that failed validation. Default
    /// no-op: most embedders only care about valid messages.
    fn malformed(&mut self, _violation: RpcFormatViolation) {}
}

/// Render a byte as its canonical trace encoding: printable ASCII as
/// itself, everything else as `\xNN`.
#[must_use]
pub fn canonical_byte(b: u8) -> String {
    if b.is_ascii_graphic() || b == b' ' {
        (b as char).to_string()
    } else {
        format!("\\x{b:02x}")
    }
}

/// Render a full byte sequence in canonical trace notation.
#[must_use]
pub fn canonical_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| canonical_byte(b)).collect()
}
