//! Three-channel RGB indicator

use sortwell_core::traits::{Color, Indicator};

use super::channel::Channel;

/// RGB LED built from three independent channels
pub struct RgbIndicator<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Color,
}

impl<R: Channel, G: Channel, B: Channel> RgbIndicator<R, G, B> {
    /// Create an indicator, initially off
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut indicator = Self {
            red,
            green,
            blue,
            current: Color::OFF,
        };
        indicator.set_color(Color::OFF);
        indicator
    }

    /// Last color applied
    pub fn color(&self) -> Color {
        self.current
    }

    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

impl<R: Channel, G: Channel, B: Channel> Indicator for RgbIndicator<R, G, B> {
    fn set_color(&mut self, color: Color) {
        self.red.set_intensity(color.red);
        self.green.set_intensity(color.green);
        self.blue.set_intensity(color.blue);
        self.current = color;
    }
}
