//! Conversions between ratio strings, `image_size` presets and pixel dimensions.

/// Preset used when nothing better can be derived.
pub const DEFAULT_PRESET: &str = "square_hd";

/// Ratio to preset table, in ascending width/height order.
///
/// The order doubles as the tie-break for [`preset_for_dimensions`].
const RATIO_PRESETS: [(&str, &str, f64); 5] = [
    ("9:16", "portrait_16_9", 9.0 / 16.0),
    ("3:4", "portrait_4_3", 3.0 / 4.0),
    ("1:1", "square_hd", 1.0),
    ("4:3", "landscape_4_3", 4.0 / 3.0),
    ("16:9", "landscape_16_9", 16.0 / 9.0),
];

/// Literal values accepted by the `aspect_ratio` request field.
pub const ASPECT_RATIO_VALUES: [&str; 11] = [
    "21:9", "16:9", "3:2", "4:3", "5:4", "1:1", "4:5", "3:4", "2:3", "9:16", "auto",
];

/// Maps a ratio like `16:9` to its preset. Anything else passes through,
/// on the assumption it is already a preset name or `auto`.
pub fn ratio_to_preset(value: &str) -> &str {
    RATIO_PRESETS
        .iter()
        .find(|(ratio, _, _)| *ratio == value)
        .map(|(_, preset, _)| *preset)
        .unwrap_or(value)
}

/// Inverse of [`ratio_to_preset`]; unknown presets fall back to `1:1`.
pub fn preset_to_ratio(preset: &str) -> &'static str {
    RATIO_PRESETS
        .iter()
        .find(|(_, candidate, _)| *candidate == preset)
        .map(|(ratio, _, _)| *ratio)
        .unwrap_or("1:1")
}

/// Picks the preset whose ratio is nearest to `width / height`.
pub fn preset_for_dimensions(width: u32, height: u32) -> &'static str {
    if width == 0 || height == 0 {
        return DEFAULT_PRESET;
    }
    let target = f64::from(width) / f64::from(height);

    let mut best = DEFAULT_PRESET;
    let mut best_delta = f64::MAX;
    for (_, preset, ratio) in RATIO_PRESETS {
        let delta = (target - ratio).abs();
        if delta < best_delta {
            best = preset;
            best_delta = delta;
        }
    }
    best
}

/// Nearest ratio string for the given dimensions, e.g. `1920x1080` → `16:9`.
pub fn closest_ratio(width: u32, height: u32) -> &'static str {
    preset_to_ratio(preset_for_dimensions(width, height))
}

pub fn is_supported_aspect_ratio(value: &str) -> bool {
    ASPECT_RATIO_VALUES.contains(&value)
}
