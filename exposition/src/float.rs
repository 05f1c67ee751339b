//! Shortest round-trip float formatting in Go's `%g` style.
//!
//! Scrapers compare exposition output produced by the Go client, so values
//! follow `strconv.FormatFloat(v, 'g', -1, 64)`: integral values carry no
//! trailing `.0`, and exponents below -4 or at or above 6 switch to the
//! `1.5e+06` form.

const POSITIVE_INF: &str = "+Inf";
const NEGATIVE_INF: &str = "-Inf";
const NAN: &str = "NaN";

/// Format a sample value for the text exposition format.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return NAN.to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { POSITIVE_INF } else { NEGATIVE_INF }.to_owned();
    }
    format_finite(v)
}

fn format_finite(v: f64) -> String {
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. `-1.2345e6`.
    let sci = format!("{:e}", v);
    let (mantissa, exp) = match sci.find('e') {
        Some(idx) => (&sci[..idx], &sci[idx + 1..]),
        None => return sci,
    };
    let exp: i32 = match exp.parse() {
        Ok(exp) => exp,
        Err(_) => return sci,
    };
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: Vec<u8> = mantissa.bytes().filter(|b| *b != b'.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }

    if exp < -4 || exp >= 6 {
        out.push(digits[0] as char);
        if digits.len() > 1 {
            out.push('.');
            out.extend(digits[1..].iter().map(|b| *b as char));
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        let abs = exp.abs();
        if abs < 10 {
            out.push('0');
        }
        out.push_str(&abs.to_string());
    } else if exp < 0 {
        out.push_str("0.");
        for _ in 0..(-exp - 1) {
            out.push('0');
        }
        out.extend(digits.iter().map(|b| *b as char));
    } else {
        let int_len = exp as usize + 1;
        for i in 0..int_len {
            out.push(digits.get(i).map_or('0', |b| *b as char));
        }
        if digits.len() > int_len {
            out.push('.');
            out.extend(digits[int_len..].iter().map(|b| *b as char));
        }
    }
    out
}
