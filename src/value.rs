use std::{fmt, ops};

/// A runtime value. Only numbers exist at this layer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Value(pub f64);

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Value(n)
	}
}

impl ops::Add for Value {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Value(self.0 + rhs.0)
	}
}

impl ops::Sub for Value {
	type Output = Self;

	fn sub(self, rhs: Self) -> Self {
		Value(self.0 - rhs.0)
	}
}

impl ops::Mul for Value {
	type Output = Self;

	fn mul(self, rhs: Self) -> Self {
		Value(self.0 * rhs.0)
	}
}

impl ops::Div for Value {
	type Output = Self;

	fn div(self, rhs: Self) -> Self {
		Value(self.0 / rhs.0)
	}
}

impl ops::Neg for Value {
	type Output = Self;

	fn neg(self) -> Self {
		Value(-self.0)
	}
}

/// Significant digits used when printing numbers.
const PRECISION: i32 = 6;

/// Prints numbers the way C's `%g` does: six significant digits, trailing zeros
/// dropped, exponent notation for very large or very small magnitudes.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let n = self.0;
		if n.is_nan() {
			return f.write_str("nan");
		}
		if n.is_infinite() {
			return f.write_str(if n > 0.0 { "inf" } else { "-inf" });
		}
		if n == 0.0 {
			return f.write_str(if n.is_sign_negative() { "-0" } else { "0" });
		}

		// Round first, the rounded exponent decides the notation.
		let sci = format!("{:.*e}", (PRECISION - 1) as usize, n);
		let Some((mantissa, exp)) = sci.split_once('e') else {
			return write!(f, "{n}");
		};
		let Ok(exp) = exp.parse::<i32>() else {
			return write!(f, "{n}");
		};

		if exp < -4 || exp >= PRECISION {
			let sign = if exp < 0 { '-' } else { '+' };
			write!(f, "{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
		} else {
			let fixed = format!("{:.*}", (PRECISION - 1 - exp) as usize, n);
			f.write_str(trim_fraction(&fixed))
		}
	}
}

fn trim_fraction(digits: &str) -> &str {
	if digits.contains('.') {
		digits.trim_end_matches('0').trim_end_matches('.')
	} else {
		digits
	}
}
