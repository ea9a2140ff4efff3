//! Operating System Command (OSC) payload decoding.
//!
//! The parser only splits an OSC sequence into its numeric command and raw
//! payload string; this module gives the common commands (window title,
//! icon name, hyperlinks, clipboard, color queries) their semantic meaning.

use base64::Engine;

/// A decoded OSC command, ready for the terminal core to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OscCommand {
    /// OSC 0: set both icon name and window title.
    SetIconNameAndTitle(String),
    /// OSC 1: set icon name only.
    SetIconName(String),
    /// OSC 2: set window title only.
    SetTitle(String),
    /// OSC 8: hyperlink. `params` is the raw `key=value:...` params string
    /// (commonly `id=...`); `uri` is empty to close the currently open link.
    Hyperlink { params: String, uri: String },
    /// OSC 52: clipboard access. `selection` is the selection-buffer letter
    /// (`c` for clipboard, `p` for primary, etc).
    Clipboard {
        selection: char,
        data: ClipboardData,
    },
    /// OSC 10/11: query or set the default foreground/background color.
    /// `is_query` is true when the payload was `?`.
    ColorQuery { which: ColorSlot, is_query: bool },
    /// Recognized command number but a payload this module doesn't give
    /// further meaning to.
    Unknown { command: u32, payload: String },
}

/// Which color OSC 10/11 refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Foreground,
    Background,
}

/// The three distinct shapes an OSC 52 payload can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardData {
    /// Payload was `?`: host is asking the terminal to report clipboard contents.
    Query,
    /// Payload was empty: host is asking the terminal to clear the selection.
    Clear,
    /// Payload was valid base64: host is setting the selection to these bytes.
    Set(Vec<u8>),
}

/// Decode a parsed OSC `(command, payload)` pair into a semantic command.
///
/// Never panics; unrecognized commands degrade to [`OscCommand::Unknown`].
/// An OSC 52 clipboard payload that is neither `?`, empty, nor valid base64
/// is malformed and produces no command at all (`None`) — the terminal
/// drops the sequence rather than guessing at the host's intent.
#[must_use]
pub fn decode(command: u32, payload: &str) -> Option<OscCommand> {
    Some(match command {
        0 => OscCommand::SetIconNameAndTitle(payload.to_string()),
        1 => OscCommand::SetIconName(payload.to_string()),
        2 => OscCommand::SetTitle(payload.to_string()),
        8 => decode_hyperlink(payload),
        52 => return decode_clipboard(payload),
        10 => OscCommand::ColorQuery {
            which: ColorSlot::Foreground,
            is_query: payload == "?",
        },
        11 => OscCommand::ColorQuery {
            which: ColorSlot::Background,
            is_query: payload == "?",
        },
        _ => OscCommand::Unknown {
            command,
            payload: payload.to_string(),
        },
    })
}

fn decode_hyperlink(payload: &str) -> OscCommand {
    // Format: `params;uri`, e.g. `id=abc123;https://example.com`.
    match payload.split_once(';') {
        Some((params, uri)) => OscCommand::Hyperlink {
            params: params.to_string(),
            uri: uri.to_string(),
        },
        None => OscCommand::Hyperlink {
            params: String::new(),
            uri: payload.to_string(),
        },
    }
}

fn decode_clipboard(payload: &str) -> Option<OscCommand> {
    let (selection, rest) = match payload.split_once(';') {
        Some((sel, rest)) => (sel.chars().next().unwrap_or('c'), rest),
        None => ('c', ""),
    };
    let data = if rest == "?" {
        ClipboardData::Query
    } else if rest.is_empty() {
        ClipboardData::Clear
    } else {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(rest.as_bytes())
            .ok()?;
        ClipboardData::Set(bytes)
    };
    Some(OscCommand::Clipboard { selection, data })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_title_and_icon() {
        assert_eq!(
            decode(0, "my title"),
            Some(OscCommand::SetIconNameAndTitle("my title".to_string()))
        );
        assert_eq!(
            decode(1, "icon"),
            Some(OscCommand::SetIconName("icon".to_string()))
        );
        assert_eq!(
            decode(2, "title"),
            Some(OscCommand::SetTitle("title".to_string()))
        );
    }

    #[test]
    fn decodes_hyperlink_with_params() {
        let cmd = decode(8, "id=42;https://example.com/page");
        assert_eq!(
            cmd,
            Some(OscCommand::Hyperlink {
                params: "id=42".to_string(),
                uri: "https://example.com/page".to_string(),
            })
        );
    }

    #[test]
    fn decodes_hyperlink_close_with_empty_uri() {
        let cmd = decode(8, "id=42;");
        assert_eq!(
            cmd,
            Some(OscCommand::Hyperlink {
                params: "id=42".to_string(),
                uri: String::new(),
            })
        );
    }

    #[test]
    fn decodes_clipboard_set() {
        let cmd = decode(52, "c;aGVsbG8=");
        assert_eq!(
            cmd,
            Some(OscCommand::Clipboard {
                selection: 'c',
                data: ClipboardData::Set(b"hello".to_vec()),
            })
        );
    }

    #[test]
    fn decodes_clipboard_query() {
        let cmd = decode(52, "c;?");
        assert_eq!(
            cmd,
            Some(OscCommand::Clipboard {
                selection: 'c',
                data: ClipboardData::Query,
            })
        );
    }

    #[test]
    fn decodes_clipboard_clear() {
        let cmd = decode(52, "c;");
        assert_eq!(
            cmd,
            Some(OscCommand::Clipboard {
                selection: 'c',
                data: ClipboardData::Clear,
            })
        );
    }

    #[test]
    fn clipboard_invalid_base64_is_dropped() {
        assert_eq!(decode(52, "c;not valid base64!!"), None);
    }

    #[test]
    fn decodes_color_query_foreground_and_background() {
        assert_eq!(
            decode(10, "?"),
            Some(OscCommand::ColorQuery {
                which: ColorSlot::Foreground,
                is_query: true,
            })
        );
        assert_eq!(
            decode(11, "rgb:ff/ff/ff"),
            Some(OscCommand::ColorQuery {
                which: ColorSlot::Background,
                is_query: false,
            })
        );
    }

    #[test]
    fn unrecognized_command_is_unknown() {
        assert_eq!(
            decode(999, "whatever"),
            Some(OscCommand::Unknown {
                command: 999,
                payload: "whatever".to_string(),
            })
        );
    }
}
