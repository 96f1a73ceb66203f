//! Syntax and range checks for numeric parameters.
//!
//! Values are checked but never rewritten: the builder emits the caller's
//! original text so identical requests give identical arguments.

use cf_core::Error;

use crate::operation::{PRESETS, QUALITY_LEVELS};

/// Parse a timestamp given as seconds (`90`, `12.5`) or as
/// `[HH:]MM:SS[.fff]`, returning seconds.
pub(crate) fn timestamp(name: &str, value: &str) -> cf_core::Result<f64> {
    let bad = || {
        Error::invalid(
            name,
            format!("expected seconds or [HH:]MM:SS[.fff], got '{value}'"),
        )
    };

    if value.starts_with('-') {
        return Err(Error::invalid(name, format!("must not be negative, got '{value}'")));
    }

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() > 3 {
        return Err(bad());
    }

    let mut total = 0.0;
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(bad());
        }
        // Only the seconds field may be fractional.
        if i != last && part.contains('.') {
            return Err(bad());
        }
        let n: f64 = part.parse().map_err(|_| bad())?;
        if i != 0 && n >= 60.0 {
            return Err(bad());
        }
        total = total * 60.0 + n;
    }
    Ok(total)
}

/// A strictly positive timestamp, for durations.
pub(crate) fn duration(name: &str, value: &str) -> cf_core::Result<f64> {
    let secs = timestamp(name, value)?;
    if secs <= 0.0 {
        return Err(Error::invalid(name, format!("must be greater than zero, got '{value}'")));
    }
    Ok(secs)
}

/// Constant rate factor, an integer in 0..=51.
pub(crate) fn crf(value: &str) -> cf_core::Result<u32> {
    let n: i64 = value
        .parse()
        .map_err(|_| Error::invalid("crf", format!("expected an integer, got '{value}'")))?;
    if !(0..=51).contains(&n) {
        return Err(Error::invalid(
            "crf",
            format!("must be between 0 and 51, got {n}"),
        ));
    }
    Ok(n as u32)
}

/// x264 preset name.
pub(crate) fn preset(value: &str) -> cf_core::Result<&'static str> {
    let lower = value.to_ascii_lowercase();
    PRESETS
        .iter()
        .copied()
        .find(|p| *p == lower)
        .ok_or_else(|| {
            Error::invalid(
                "preset",
                format!("'{value}' is not one of {}", PRESETS.join(", ")),
            )
        })
}

/// Named quality level, returning the crf it implies.
pub(crate) fn quality(value: &str) -> cf_core::Result<u32> {
    let lower = value.to_ascii_lowercase();
    QUALITY_LEVELS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, crf)| *crf)
        .ok_or_else(|| {
            let names: Vec<&str> = QUALITY_LEVELS.iter().map(|(n, _)| *n).collect();
            Error::invalid("quality", format!("'{value}' is not one of {}", names.join(", ")))
        })
}

/// A scale dimension: a positive integer, or `-1` to keep the aspect ratio.
pub(crate) fn dimension(name: &str, value: &str) -> cf_core::Result<i64> {
    let n: i64 = value
        .parse()
        .map_err(|_| Error::invalid(name, format!("expected an integer, got '{value}'")))?;
    if n == -1 || n > 0 {
        Ok(n)
    } else {
        Err(Error::invalid(
            name,
            format!("must be a positive integer or -1, got {n}"),
        ))
    }
}

/// A positive, finite scale factor.
pub(crate) fn factor(value: &str) -> cf_core::Result<f64> {
    let n: f64 = value
        .parse()
        .map_err(|_| Error::invalid("factor", format!("expected a number, got '{value}'")))?;
    if !n.is_finite() || n <= 0.0 {
        return Err(Error::invalid("factor", format!("must be greater than zero, got '{value}'")));
    }
    Ok(n)
}

/// An `x:y` pixel offset with integer components.
pub(crate) fn position(value: &str) -> cf_core::Result<(i64, i64)> {
    let bad = || Error::invalid("position", format!("expected x:y pixel offsets, got '{value}'"));
    let (x, y) = value.split_once(':').ok_or_else(bad)?;
    let x: i64 = x.trim().parse().map_err(|_| bad())?;
    let y: i64 = y.trim().parse().map_err(|_| bad())?;
    Ok((x, y))
}

/// Audio bitrate such as `128k`, `192000` or `1.5M`.
pub(crate) fn bitrate(value: &str) -> cf_core::Result<()> {
    let digits = value.trim_end_matches(['k', 'K', 'm', 'M']);
    let ok = !digits.is_empty()
        && digits.len() + 1 >= value.len()
        && digits.parse::<f64>().map(|n| n > 0.0).unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(Error::invalid(
            "audio_bitrate",
            format!("expected a bitrate like 128k, got '{value}'"),
        ))
    }
}

/// An encoder or codec name: letters, digits, `_` and `-` only.
pub(crate) fn codec_name(name: &str, value: &str) -> cf_core::Result<()> {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("'{value}' is not a codec name")))
    }
}
