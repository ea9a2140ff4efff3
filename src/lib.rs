#![forbid(unsafe_code)]

//! Host-agnostic VT/ANSI terminal engine.
//!
//! `vterm-core` is the platform-independent terminal model: grid state,
//! VT/ANSI parsing, cursor positioning, scrollback, and the dispatch loop
//! that ties them together — all without any host I/O dependencies.
//!
//! # Primary responsibilities
//!
//! - **Grid**: 2D cell matrix representing the visible terminal viewport.
//! - **Cell**: character content + SGR attributes (colors, bold, italic, etc.).
//! - **Parser**: VT/ANSI state machine (Paul Flo Williams model, 12 states).
//! - **Cursor**: position, visibility, origin/autowrap mode, tab stops, charsets.
//! - **Modes**: DEC private modes and ANSI standard modes.
//! - **Terminal**: the dispatch loop binding parser output to grid/cursor/mode
//!   mutation, alternate-screen switching, and host-visible events.
//! - **Scrollback**: ring buffer for lines scrolled off the top of the viewport,
//!   plus the viewport-offset bookkeeping for host-driven scrollback navigation.
//! - **Selection**: copy/paste extraction over the combined scrollback+viewport
//!   buffer.
//! - **Observer**: optional structured tracing and private-use RPC hooks.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; the host adapter supplies bytes.
//! - **Deterministic**: identical byte sequences always produce identical state.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod cell;
pub mod cursor;
pub mod grid;
pub mod modes;
pub mod mouse;
pub mod observer;
pub mod osc;
pub mod parser;
pub mod scrollback;
pub mod selection;
pub mod terminal;

pub use cell::{Cell, CellFlags, Color, HyperlinkId, HyperlinkRegistry, SgrAttrs, SgrFlags};
pub use cursor::{Charset, Cursor, SavedCursor};
pub use grid::Grid;
pub use modes::{AnsiModes, DecModes, Modes};
pub use mouse::{MouseEventKind, MouseMode};
pub use observer::{
    canonical_byte, canonical_bytes, Direction, RpcFormatViolation, RpcKind, RpcMessage, RpcSink,
    TraceKind, TraceRecord, TraceSink,
};
pub use osc::{ClipboardData, ColorSlot, OscCommand};
pub use parser::{Action, ParamGroup, Params, Parser};
pub use scrollback::{Scrollback, ScrollbackLine, ViewportRow};
pub use selection::{BufferPos, Selection};
pub use terminal::{Event, Terminal};
