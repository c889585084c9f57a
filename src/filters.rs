use crate::surface::PixelBuf;

/// Non-destructive color adjustments applied over a captured surface.
///
/// All three are percentages with 100 = no change. Values are clamped into
/// their slider ranges at construction and mutation, never rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilterSettings {
    brightness: u16, // 50..=150
    contrast: u16,   // 50..=150
    saturation: u16, // 0..=200
}

pub const BRIGHTNESS_RANGE: std::ops::RangeInclusive<u16> = 50..=150;
pub const CONTRAST_RANGE: std::ops::RangeInclusive<u16> = 50..=150;
pub const SATURATION_RANGE: std::ops::RangeInclusive<u16> = 0..=200;

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
        }
    }
}

impl FilterSettings {
    pub fn new(brightness: u16, contrast: u16, saturation: u16) -> Self {
        Self {
            brightness: clamp_into(brightness, BRIGHTNESS_RANGE),
            contrast: clamp_into(contrast, CONTRAST_RANGE),
            saturation: clamp_into(saturation, SATURATION_RANGE),
        }
    }

    pub fn brightness(&self) -> u16 {
        self.brightness
    }

    pub fn contrast(&self) -> u16 {
        self.contrast
    }

    pub fn saturation(&self) -> u16 {
        self.saturation
    }

    pub fn set_brightness(&mut self, v: u16) {
        self.brightness = clamp_into(v, BRIGHTNESS_RANGE);
    }

    pub fn set_contrast(&mut self, v: u16) {
        self.contrast = clamp_into(v, CONTRAST_RANGE);
    }

    pub fn set_saturation(&mut self, v: u16) {
        self.saturation = clamp_into(v, SATURATION_RANGE);
    }

    /// Restore the neutral `{100, 100, 100}` triple.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Apply brightness, then contrast, then saturation over straight-alpha
    /// RGBA8 pixels. Alpha is untouched.
    pub fn apply(&self, buf: &mut PixelBuf) {
        if self.is_neutral() {
            return;
        }

        let b = f32::from(self.brightness) / 100.0;
        let c = f32::from(self.contrast) / 100.0;
        let s = f32::from(self.saturation) / 100.0;

        for px in buf.data.chunks_exact_mut(4) {
            let mut r = f32::from(px[0]);
            let mut g = f32::from(px[1]);
            let mut bl = f32::from(px[2]);

            r *= b;
            g *= b;
            bl *= b;

            r = (r - 128.0) * c + 128.0;
            g = (g - 128.0) * c + 128.0;
            bl = (bl - 128.0) * c + 128.0;

            // Rec.601 luma as the desaturation target.
            let luma = 0.299 * r + 0.587 * g + 0.114 * bl;
            r = luma + (r - luma) * s;
            g = luma + (g - luma) * s;
            bl = luma + (bl - luma) * s;

            px[0] = r.round().clamp(0.0, 255.0) as u8;
            px[1] = g.round().clamp(0.0, 255.0) as u8;
            px[2] = bl.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn clamp_into(v: u16, range: std::ops::RangeInclusive<u16>) -> u16 {
    v.clamp(*range.start(), *range.end())
}

/// A named filter preset as shown in the editor's preset strip.
#[derive(Clone, Copy, Debug)]
pub struct FilterPreset {
    pub name: &'static str,
    pub settings: FilterSettings,
}

/// Preset catalog. The neutral preset is "طبيعي" (natural).
pub const PRESETS: &[FilterPreset] = &[
    FilterPreset {
        name: "طبيعي",
        settings: FilterSettings {
            brightness: 100,
            contrast: 100,
            saturation: 100,
        },
    },
    FilterPreset {
        name: "دافئ",
        settings: FilterSettings {
            brightness: 110,
            contrast: 105,
            saturation: 120,
        },
    },
    FilterPreset {
        name: "بارد",
        settings: FilterSettings {
            brightness: 95,
            contrast: 105,
            saturation: 80,
        },
    },
    FilterPreset {
        name: "حيوي",
        settings: FilterSettings {
            brightness: 105,
            contrast: 120,
            saturation: 150,
        },
    },
    FilterPreset {
        name: "أبيض وأسود",
        settings: FilterSettings {
            brightness: 100,
            contrast: 110,
            saturation: 0,
        },
    },
];

pub fn preset(name: &str) -> Option<FilterSettings> {
    PRESETS.iter().find(|p| p.name == name).map(|p| p.settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> PixelBuf {
        PixelBuf {
            width: w,
            height: h,
            data: rgba.repeat((w * h) as usize),
        }
    }

    #[test]
    fn natural_preset_then_reset_is_neutral() {
        let mut f = preset("طبيعي").unwrap();
        assert_eq!((f.brightness(), f.contrast(), f.saturation()), (100, 100, 100));
        f.reset();
        assert_eq!((f.brightness(), f.contrast(), f.saturation()), (100, 100, 100));
        assert!(f.is_neutral());
    }

    #[test]
    fn setters_clamp_into_slider_ranges() {
        let mut f = FilterSettings::default();
        f.set_brightness(10);
        f.set_contrast(900);
        f.set_saturation(500);
        assert_eq!(f.brightness(), 50);
        assert_eq!(f.contrast(), 150);
        assert_eq!(f.saturation(), 200);
    }

    #[test]
    fn neutral_apply_is_noop() {
        let mut buf = solid(2, 2, [10, 100, 200, 255]);
        let before = buf.data.clone();
        FilterSettings::default().apply(&mut buf);
        assert_eq!(buf.data, before);
    }

    #[test]
    fn zero_saturation_is_grayscale() {
        let mut buf = solid(1, 1, [255, 0, 0, 255]);
        FilterSettings::new(100, 100, 0).apply(&mut buf);
        assert_eq!(buf.data[0], buf.data[1]);
        assert_eq!(buf.data[1], buf.data[2]);
        assert_eq!(buf.data[3], 255);
    }

    #[test]
    fn brightness_scales_channels() {
        let mut buf = solid(1, 1, [100, 100, 100, 128]);
        FilterSettings::new(150, 100, 100).apply(&mut buf);
        assert_eq!(buf.data[0], 150);
        assert_eq!(buf.data[3], 128); // alpha untouched
    }

    #[test]
    fn contrast_pivots_midpoint() {
        let mut buf = solid(1, 1, [128, 128, 128, 255]);
        FilterSettings::new(100, 150, 100).apply(&mut buf);
        assert_eq!(&buf.data[..3], &[128, 128, 128]);
    }

    #[test]
    fn all_presets_are_within_ranges() {
        for p in PRESETS {
            let clamped = FilterSettings::new(
                p.settings.brightness(),
                p.settings.contrast(),
                p.settings.saturation(),
            );
            assert_eq!(p.settings, clamped, "preset '{}' out of range", p.name);
        }
    }
}
