//! Location details derived from a raw sample.

use serde_json::Value;

use crate::platform::LocationSample;

/// Maximum significant digits shown for horizontal accuracy.
pub const ACCURACY_SIGNIFICANT_DIGITS: u32 = 5;

const KEY_POSITION_SOURCE: &str = "positionSource";
const KEY_FLOOR: &str = "floor";
const KEY_SATELLITE_COUNT: &str = "satelliteCount";
const KEY_TRANSMITTER_COUNT: &str = "transmitterCount";

/// Technology that produced a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Gnss,
    Ble,
    Wifi,
    Unknown,
}

impl PositionSource {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("GNSS") => PositionSource::Gnss,
            Some("BLE") => PositionSource::Ble,
            Some("WIFI") => PositionSource::Wifi,
            _ => PositionSource::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSource::Gnss => "GNSS",
            PositionSource::Ble => "BLE",
            PositionSource::Wifi => "WIFI",
            PositionSource::Unknown => "unknown",
        }
    }
}

/// What the sender count counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderKind {
    Satellites,
    Transmitters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderCount {
    pub kind: SenderKind,
    pub count: u64,
}

/// Renderable details for the latest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDetails {
    /// `None` renders as "unknown".
    pub floor: Option<i64>,
    pub position_source: PositionSource,
    /// `None` when the sample reported the 0.0 "unset" sentinel.
    pub horizontal_accuracy: Option<f64>,
    /// `None` when the relevant count is absent.
    pub sender_count: Option<SenderCount>,
    pub visible: bool,
}

impl LocationDetails {
    /// Derive details from a raw sample. Pure; the same sample always yields
    /// the same details.
    pub fn from_sample(sample: &LocationSample) -> Self {
        let props = &sample.source_properties;
        let position_source =
            PositionSource::parse(props.get(KEY_POSITION_SOURCE).and_then(Value::as_str));

        let (kind, key) = if position_source == PositionSource::Gnss {
            (SenderKind::Satellites, KEY_SATELLITE_COUNT)
        } else {
            (SenderKind::Transmitters, KEY_TRANSMITTER_COUNT)
        };
        let sender_count = props
            .get(key)
            .and_then(coerce_count)
            .map(|count| SenderCount { kind, count });

        let horizontal_accuracy =
            (sample.horizontal_accuracy != 0.0).then_some(sample.horizontal_accuracy);

        Self {
            floor: props.get(KEY_FLOOR).and_then(coerce_integer),
            position_source,
            horizontal_accuracy,
            sender_count,
            visible: true,
        }
    }

    /// Lines shown in the details panel, in display order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);

        lines.push(match self.floor {
            Some(floor) => format!("Floor: {}", floor),
            None => "Floor: unknown".to_string(),
        });
        lines.push(format!("Position source: {}", self.position_source.as_str()));

        if let Some(accuracy) = self.horizontal_accuracy {
            lines.push(format!(
                "Horizontal accuracy: {} m",
                format_significant(accuracy, ACCURACY_SIGNIFICANT_DIGITS)
            ));
        }

        if let Some(sender) = self.sender_count {
            lines.push(match sender.kind {
                SenderKind::Satellites => format!("Number of satellites: {}", sender.count),
                SenderKind::Transmitters => format!("Number of transmitters: {}", sender.count),
            });
        }

        lines
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn coerce_count(value: &Value) -> Option<u64> {
    coerce_integer(value).and_then(|n| u64::try_from(n).ok())
}

/// Format `value` with at most `digits` significant digits, dropping
/// trailing zeros. Very large or very small magnitudes use exponent form.
pub fn format_significant(value: f64, digits: u32) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }

    let digits = digits.max(1) as i32;
    let magnitude = value.abs().log10().floor() as i32;

    if !(-5..15).contains(&magnitude) {
        let text = format!("{:.*e}", (digits - 1) as usize, value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_fraction(mantissa), exponent),
            None => text,
        };
    }

    let decimals = digits - 1 - magnitude;
    let text = if decimals > 0 {
        format!("{:.*}", decimals as usize, value)
    } else {
        let factor = 10f64.powi(-decimals);
        format!("{:.0}", (value / factor).round() * factor)
    };
    trim_fraction(&text).to_string()
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
