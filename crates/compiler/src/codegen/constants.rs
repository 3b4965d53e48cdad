//! Constant rendering for the textual IR
//!
//! Integer constants render as the decimal value of the stored bit
//! pattern interpreted signed at the slot width, which is how LLVM
//! prints them (`u8` 200 stores as `-56`). Float constants follow
//! LLVM's printing rule: `%e` scientific form when that string parses
//! back to the exact bits, otherwise the hex form of the f64 pattern.

/// Render an integer constant for a slot of `bits` width.
///
/// The value is wrapped to the width and sign-extended, so unsigned
/// values above the signed midpoint come out negative.
pub(super) fn render_int(value: i128, bits: u32) -> String {
    let mask: u128 = if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    };
    let wrapped = (value as u128) & mask;
    let sign_bit = 1u128 << (bits - 1);
    let rendered = if wrapped >= sign_bit {
        wrapped as i128 - (1i128 << bits)
    } else {
        wrapped as i128
    };
    rendered.to_string()
}

/// C-style `%.6e` formatting (two-digit exponent with explicit sign),
/// which is the decimal spelling LLVM uses for float constants.
fn format_scientific(value: f64) -> String {
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => formatted,
    }
}

/// Render a float constant of the given precision.
///
/// `float` constants are printed through their f64 extension, so an
/// inexact f32 value like `3.14` falls back to the hex form with the
/// low mantissa bits zero.
pub(super) fn render_float(value: f64, is_f32: bool) -> String {
    let v = if is_f32 {
        (value as f32) as f64
    } else {
        value
    };
    let decimal = format_scientific(v);
    let round_trips = decimal
        .parse::<f64>()
        .map(|parsed| parsed.to_bits() == v.to_bits())
        .unwrap_or(false);
    if round_trips {
        decimal
    } else {
        format!("0x{:016X}", v.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_values_wrap_to_signed_rendering() {
        assert_eq!(render_int(200, 8), "-56");
        assert_eq!(render_int(3_000_000_000, 32), "-1294967296");
        assert_eq!(render_int(255, 8), "-1");
        assert_eq!(render_int(127, 8), "127");
    }

    #[test]
    fn test_signed_values_render_unchanged() {
        assert_eq!(render_int(-5, 32), "-5");
        assert_eq!(render_int(0, 64), "0");
        assert_eq!(render_int(42, 16), "42");
        assert_eq!(render_int(i64::MIN as i128, 64), i64::MIN.to_string());
    }

    #[test]
    fn test_exact_doubles_render_in_scientific_form() {
        assert_eq!(render_float(5.0, false), "5.000000e+00");
        assert_eq!(render_float(0.5, false), "5.000000e-01");
        assert_eq!(render_float(-1000.9, false), "-1.000900e+03");
        assert_eq!(render_float(3.14, false), "3.140000e+00");
        assert_eq!(render_float(0.0, false), "0.000000e+00");
    }

    #[test]
    fn test_inexact_floats_render_in_hex_form() {
        // 3.14 as float extends to 3.1400001049041748; the decimal form
        // would parse back to plain 3.14, so the bits are printed.
        assert_eq!(render_float(3.14, true), "0x40091EB860000000");
    }

    #[test]
    fn test_exact_f32_values_render_in_scientific_form() {
        assert_eq!(render_float(0.5, true), "5.000000e-01");
        assert_eq!(render_float(2.0, true), "2.000000e+00");
    }
}
