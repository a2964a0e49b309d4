//! bottompin Platform Win32
//!
//! Windows-specific window manipulation using Win32 APIs.
//!
//! This crate handles:
//! - Stacking depth queries via the `GetWindow(GW_HWNDNEXT)` chain
//! - Window rectangles via `GetWindowRect`
//! - Bottom-of-stack placement via `SetWindowPos(HWND_BOTTOM, ...)`
//! - Taskbar / Alt-Tab exclusion via `SetWindowLongW`
//! - Resolving a target window from a handle string or a title
//!
//! The Win32 backend only exists on Windows targets.

use bottompin_core::WindowId;
use thiserror::Error;

#[cfg(windows)]
mod win32;

#[cfg(windows)]
pub use win32::{find_window_by_title, Win32WindowSystem};

/// Errors that can occur while resolving a target window.
#[derive(Debug, Error)]
pub enum Win32Error {
    #[error("Invalid window handle {0:?}: expected a decimal or 0x-prefixed hex value")]
    InvalidWindowId(String),

    #[error("No window titled {0:?}")]
    WindowNotFound(String),
}

/// Parse a window handle given as decimal (`4660`) or hex (`0x1234`).
///
/// Zero is rejected: it is never a valid HWND.
pub fn parse_window_id(text: &str) -> Result<WindowId, Win32Error> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => WindowId::from_str_radix(hex, 16),
        None => trimmed.parse::<WindowId>(),
    };

    match parsed {
        Ok(0) | Err(_) => Err(Win32Error::InvalidWindowId(text.to_string())),
        Ok(id) => Ok(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_id_decimal() {
        assert_eq!(parse_window_id("4660").unwrap(), 0x1234);
        assert_eq!(parse_window_id("  42 ").unwrap(), 42);
    }

    #[test]
    fn test_parse_window_id_hex() {
        assert_eq!(parse_window_id("0x1234").unwrap(), 4660);
        assert_eq!(parse_window_id("0XABCDEF").unwrap(), 0xabcdef);
    }

    #[test]
    fn test_parse_window_id_rejects_garbage() {
        assert!(matches!(parse_window_id("0"), Err(Win32Error::InvalidWindowId(_))));
        assert!(matches!(parse_window_id("0x"), Err(Win32Error::InvalidWindowId(_))));
        assert!(matches!(parse_window_id("notepad"), Err(Win32Error::InvalidWindowId(_))));
        assert!(matches!(parse_window_id("-5"), Err(Win32Error::InvalidWindowId(_))));
    }
}
