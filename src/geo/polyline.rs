use crate::foundation::error::{StoryplateError, StoryplateResult};
use crate::geo::projector::LatLng;

/// Decimal digits kept by the standard encoding.
pub const DEFAULT_PRECISION: u32 = 5;

/// Decode an encoded polyline into `(lat, lng)` points.
///
/// Fails on characters outside the `?`..`~` alphabet, on a value cut off mid-chunk, on a
/// latitude without its longitude and on running totals that leave the `i64` range.
pub fn decode(encoded: &str, precision: u32) -> StoryplateResult<Vec<LatLng>> {
    let factor = factor(precision)?;
    let bytes = encoded.trim().as_bytes();
    let mut index = 0usize;
    let (mut lat, mut lng) = (0i64, 0i64);
    let mut out = Vec::new();
    while index < bytes.len() {
        lat = accumulate(lat, next_value(bytes, &mut index)?)?;
        if index >= bytes.len() {
            return Err(StoryplateError::polyline(format!(
                "latitude at byte {index} has no longitude"
            )));
        }
        lng = accumulate(lng, next_value(bytes, &mut index)?)?;
        out.push(LatLng::new(lat as f64 / factor, lng as f64 / factor));
    }
    Ok(out)
}

fn accumulate(total: i64, delta: i64) -> StoryplateResult<i64> {
    total
        .checked_add(delta)
        .ok_or_else(|| StoryplateError::polyline("coordinate overflows"))
}

fn next_value(bytes: &[u8], index: &mut usize) -> StoryplateResult<i64> {
    let mut result: i64 = 0;
    let mut shift = 0u32;
    loop {
        let Some(&b) = bytes.get(*index) else {
            return Err(StoryplateError::polyline("input ends inside a value"));
        };
        if !(63..=126).contains(&b) {
            return Err(StoryplateError::polyline(format!(
                "invalid character {:?} at byte {}",
                b as char, *index
            )));
        }
        if shift > 60 {
            return Err(StoryplateError::polyline("value overflows 64 bits"));
        }
        *index += 1;
        let chunk = i64::from(b - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode points with the standard algorithm.
pub fn encode(points: &[LatLng], precision: u32) -> StoryplateResult<String> {
    let factor = factor(precision)?;
    let mut out = String::new();
    let (mut prev_lat, mut prev_lng) = (0i64, 0i64);
    for p in points {
        let lat = scaled(p.lat, factor)?;
        let lng = scaled(p.lng, factor)?;
        push_value(&mut out, delta(lat, prev_lat)?);
        push_value(&mut out, delta(lng, prev_lng)?);
        prev_lat = lat;
        prev_lng = lng;
    }
    Ok(out)
}

// Bound on a delta whose zig-zag form fits in an i64.
const MAX_DELTA: i64 = 1 << 62;

fn scaled(v: f64, factor: f64) -> StoryplateResult<i64> {
    let x = v * factor;
    if !x.is_finite() || x.abs() >= (MAX_DELTA / 2) as f64 {
        return Err(StoryplateError::polyline(format!(
            "coordinate {v} cannot be encoded"
        )));
    }
    Ok(round_half_away(x))
}

fn delta(cur: i64, prev: i64) -> StoryplateResult<i64> {
    cur.checked_sub(prev)
        .filter(|d| d.abs() < MAX_DELTA)
        .ok_or_else(|| StoryplateError::polyline("coordinate delta overflows"))
}

fn push_value(out: &mut String, delta: i64) {
    let mut v = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while v >= 0x20 {
        out.push(char::from((0x20 | (v & 0x1f)) as u8 + 63));
        v >>= 5;
    }
    out.push(char::from(v as u8 + 63));
}

fn round_half_away(x: f64) -> i64 {
    (x.abs() + 0.5).floor().copysign(x) as i64
}

fn factor(precision: u32) -> StoryplateResult<f64> {
    if precision > 10 {
        return Err(StoryplateError::polyline(format!(
            "precision {precision} is out of range (0..=10)"
        )));
    }
    Ok(10f64.powi(precision as i32))
}

#[cfg(test)]
#[path = "../../tests/unit/geo/polyline.rs"]
mod tests;
