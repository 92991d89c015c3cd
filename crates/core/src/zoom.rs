//! Zoom synchronisation between the slider and the browser view
//!
//! The slider is the source of truth. Slider changes always go to the view;
//! view changes go back to the slider only when they carry a new value and
//! are not the echo of a slider change being applied.

pub const ZOOM_MIN: u32 = 10;
pub const ZOOM_MAX: u32 = 300;
pub const ZOOM_STEP: u32 = 10;
pub const ZOOM_DEFAULT: u32 = 100;

#[derive(Debug, Clone)]
pub struct ZoomSync {
    percent: u32,
    applying: bool,
}

impl ZoomSync {
    pub fn new(percent: u32) -> Self {
        Self {
            percent: clamp(percent),
            applying: false,
        }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// View zoom level for the current percent (1.0 = 100%)
    pub fn level(&self) -> f64 {
        f64::from(self.percent) / 100.0
    }

    /// Slider moved; returns the zoom level to apply to the view
    ///
    /// Call [`ZoomSync::finish_apply`] once the view has been updated.
    pub fn slider_changed(&mut self, percent: u32) -> f64 {
        self.percent = clamp(percent);
        self.applying = true;
        self.level()
    }

    pub fn finish_apply(&mut self) {
        self.applying = false;
    }

    /// View zoom changed (e.g. ctrl+wheel); returns a new slider value
    pub fn view_changed(&mut self, level: f64) -> Option<u32> {
        if self.applying || !level.is_finite() {
            return None;
        }

        let percent = clamp((level * 100.0).round().max(0.0) as u32);
        if percent == self.percent {
            return None;
        }
        self.percent = percent;
        Some(percent)
    }

    pub fn zoom_in(&self) -> u32 {
        clamp(self.percent + ZOOM_STEP)
    }

    pub fn zoom_out(&self) -> u32 {
        clamp(self.percent.saturating_sub(ZOOM_STEP))
    }
}

impl Default for ZoomSync {
    fn default() -> Self {
        Self::new(ZOOM_DEFAULT)
    }
}

fn clamp(percent: u32) -> u32 {
    percent.clamp(ZOOM_MIN, ZOOM_MAX)
}
