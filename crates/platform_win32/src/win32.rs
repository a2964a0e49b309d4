//! [`WindowSystem`] backed by user32.

use crate::Win32Error;
use bottompin_core::{
    ExtendedStyle, Placement, Rect, WindowId, WindowStyle, WindowSystem, WindowSystemError, ZOrder,
};
use std::ffi::c_void;
use windows::core::{HSTRING, PCWSTR};
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowW, GetWindow, GetWindowRect, SetWindowLongW, SetWindowPos, GWL_EXSTYLE, GWL_STYLE,
    GW_HWNDNEXT, HWND_BOTTOM, SET_WINDOW_POS_FLAGS, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
    SWP_SHOWWINDOW, WS_EX_TOOLWINDOW,
};

fn to_hwnd(window: WindowId) -> HWND {
    HWND(window as usize as *mut c_void)
}

fn to_window_id(hwnd: HWND) -> WindowId {
    hwnd.0 as usize as WindowId
}

/// The real Win32 windowing backend.
///
/// Stateless: every call goes straight to user32 with the HWND encoded in
/// the [`WindowId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32WindowSystem;

impl WindowSystem for Win32WindowSystem {
    fn stacking_depth(&self, window: WindowId) -> Result<usize, WindowSystemError> {
        if window == 0 {
            return Err(WindowSystemError::InvalidWindow(window));
        }

        let mut depth = 0;
        let mut hwnd = to_hwnd(window);
        loop {
            depth += 1;
            match unsafe { GetWindow(hwnd, GW_HWNDNEXT) } {
                Ok(next) if !next.0.is_null() => hwnd = next,
                _ => break,
            }
        }
        Ok(depth)
    }

    fn window_rect(&self, window: WindowId) -> Result<Rect, WindowSystemError> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(to_hwnd(window), &mut rect) }
            .map_err(|e| WindowSystemError::QueryFailed(e.to_string()))?;
        Ok(Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn set_placement(
        &self,
        window: WindowId,
        placement: &Placement,
    ) -> Result<(), WindowSystemError> {
        let insert_after = match placement.insert_after {
            ZOrder::Bottom => HWND_BOTTOM,
        };

        let mut flags = SET_WINDOW_POS_FLAGS(0);
        if placement.flags.show {
            flags = flags | SWP_SHOWWINDOW;
        }
        if placement.flags.no_activate {
            flags = flags | SWP_NOACTIVATE;
        }
        if placement.flags.no_move {
            flags = flags | SWP_NOMOVE;
        }
        if placement.flags.no_size {
            flags = flags | SWP_NOSIZE;
        }

        let rect = placement.rect;
        unsafe {
            SetWindowPos(
                to_hwnd(window),
                Some(insert_after),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                flags,
            )
        }
        .map_err(|e| WindowSystemError::SetPositionFailed(e.to_string()))
    }

    fn set_extended_style(
        &self,
        window: WindowId,
        style: ExtendedStyle,
    ) -> Result<(), WindowSystemError> {
        let value = match style {
            ExtendedStyle::ToolWindow => WS_EX_TOOLWINDOW.0 as i32,
        };
        // SetWindowLongW returns the previous value, so 0 is not a failure
        // signal on its own. Nothing downstream acts on a failure here.
        let _ = unsafe { SetWindowLongW(to_hwnd(window), GWL_EXSTYLE, value) };
        tracing::debug!("Set extended style {:?} on window {:#x}", style, window);
        Ok(())
    }

    fn set_style(&self, window: WindowId, style: WindowStyle) -> Result<(), WindowSystemError> {
        let value = match style {
            WindowStyle::Bare => 0,
        };
        let _ = unsafe { SetWindowLongW(to_hwnd(window), GWL_STYLE, value) };
        tracing::debug!("Set style {:?} on window {:#x}", style, window);
        Ok(())
    }
}

/// Find a top-level window by its exact title.
pub fn find_window_by_title(title: &str) -> Result<WindowId, Win32Error> {
    let hwnd = unsafe { FindWindowW(PCWSTR::null(), &HSTRING::from(title)) }
        .map_err(|_| Win32Error::WindowNotFound(title.to_string()))?;

    if hwnd.0.is_null() {
        return Err(Win32Error::WindowNotFound(title.to_string()));
    }
    Ok(to_window_id(hwnd))
}
