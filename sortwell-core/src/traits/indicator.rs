//! Tri-color indicator trait

/// Three-channel color, each channel a normalized intensity in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const OFF: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const PURPLE: Color = Color::rgb(1.0, 0.0, 1.0);

    const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Create a color, clamping each channel into [0, 1]
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red: clamp_unit(red),
            green: clamp_unit(green),
            blue: clamp_unit(blue),
        }
    }

    pub fn is_off(&self) -> bool {
        self.red <= 0.0 && self.green <= 0.0 && self.blue <= 0.0
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v > 1.0 {
        1.0
    } else if v > 0.0 {
        v
    } else {
        // Negative and NaN both land here
        0.0
    }
}

/// Trait for the tri-color indicator
pub trait Indicator {
    /// Drive all three channels
    fn set_color(&mut self, color: Color);

    /// Turn every channel off
    fn off(&mut self) {
        self.set_color(Color::OFF);
    }
}
