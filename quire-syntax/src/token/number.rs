//! Numeric tokens.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// The largest number of fractional digits a [`Decimal`] keeps.
pub const MAX_SCALE: u32 = 18;

/// A fixed-point decimal number.
///
/// The value is `mantissa / 10^scale`. PDF coordinates are decimal
/// literals, so storing them this way keeps them exact: `0.1` is really
/// `0.1` and writes back out as `0.1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decimal {
    mantissa: i64,
    scale: u32,
}

impl Decimal {
    /// Zero.
    pub const ZERO: Self = Self {
        mantissa: 0,
        scale: 0,
    };

    /// Create a decimal from a mantissa and a scale. Fails if the scale is
    /// larger than [`MAX_SCALE`].
    pub fn new(mantissa: i64, scale: u32) -> Option<Self> {
        (scale <= MAX_SCALE).then_some(Self { mantissa, scale })
    }

    /// Create a decimal with the value of an integer.
    pub fn from_integer(value: i64) -> Self {
        Self {
            mantissa: value,
            scale: 0,
        }
    }

    /// The unscaled value.
    pub fn mantissa(&self) -> i64 {
        self.mantissa
    }

    /// The number of fractional decimal digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Remove trailing fractional zeros.
    pub fn normalize(self) -> Self {
        let mut d = self;

        while d.scale > 0 && d.mantissa % 10 == 0 {
            d.mantissa /= 10;
            d.scale -= 1;
        }

        d
    }

    /// Whether the value has no fractional part.
    pub fn is_integral(&self) -> bool {
        self.normalize().scale == 0
    }

    /// The value truncated towards zero.
    pub fn trunc(&self) -> i64 {
        self.mantissa / pow10(self.scale)
    }

    /// The value as a `f64`.
    pub fn as_f64(&self) -> f64 {
        self.mantissa as f64 / pow10(self.scale) as f64
    }

    /// Parse a decimal literal like `-12.5`, `.5` or `1e-3`.
    pub fn parse(text: &[u8]) -> Option<Self> {
        parse_literal(text).map(|(d, _)| d)
    }

    fn widened(&self, scale: u32) -> i128 {
        i128::from(self.mantissa) * i128::from(pow10(scale - self.scale))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.widened(scale).cmp(&other.widened(scale))
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalize();
        n.mantissa.hash(state);
        n.scale.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }

        let divisor = pow10(self.scale).unsigned_abs();
        let abs = self.mantissa.unsigned_abs();
        let sign = if self.mantissa < 0 { "-" } else { "" };

        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / divisor,
            abs % divisor,
            width = self.scale as usize
        )
    }
}

/// A PDF number, keeping apart integers and reals.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    /// A literal without a decimal point or exponent.
    Integer(i64),
    /// Any other literal.
    Real(Decimal),
}

impl Number {
    /// Parse a numeric literal, as found after the numeric tokenizer.
    ///
    /// A literal made up only of sign characters and a decimal point, such
    /// as a lone `-` or `.`, is zero.
    pub fn parse(text: &[u8]) -> Option<Self> {
        let (d, real) = parse_literal(text)?;

        Some(if real {
            Self::Real(d)
        } else {
            Self::Integer(d.mantissa)
        })
    }

    /// Returns `true` for integer literals.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    /// The exact value.
    pub fn as_decimal(&self) -> Decimal {
        match self {
            Self::Integer(i) => Decimal::from_integer(*i),
            Self::Real(d) => *d,
        }
    }

    /// The value as a `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(i) => *i as f64,
            Self::Real(d) => d.as_f64(),
        }
    }

    /// The value as a `f32`.
    pub fn as_f32(&self) -> f32 {
        self.as_f64() as f32
    }

    /// The value truncated towards zero.
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Integer(i) => *i,
            Self::Real(d) => d.trunc(),
        }
    }

    /// The value truncated towards zero and saturated to the `i32` range.
    pub fn as_i32(&self) -> i32 {
        self.as_i64().clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.as_decimal() == other.as_decimal()
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.as_decimal().cmp(&other.as_decimal()))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Self::Real(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(d) => write!(f, "{d}"),
        }
    }
}

fn pow10(exp: u32) -> i64 {
    10_i64.pow(exp)
}

/// Returns the decimal and whether the literal had a fractional part or an
/// exponent.
fn parse_literal(text: &[u8]) -> Option<(Decimal, bool)> {
    let mut i = 0;
    let mut negative = false;

    // Some writers emit doubled signs like `--5`.
    while let Some(b @ (b'+' | b'-')) = text.get(i) {
        negative |= *b == b'-';
        i += 1;
    }

    let mut mantissa: i64 = 0;
    let mut scale = 0;
    let mut digits = 0;
    let mut real = false;

    while let Some(b) = text.get(i).filter(|b| b.is_ascii_digit()) {
        mantissa = mantissa.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        digits += 1;
        i += 1;
    }

    if text.get(i) == Some(&b'.') {
        real = true;
        i += 1;

        let mut truncated = false;

        while let Some(b) = text.get(i).filter(|b| b.is_ascii_digit()) {
            let next = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i64::from(b - b'0')));

            match next {
                Some(m) if !truncated && scale < MAX_SCALE => {
                    mantissa = m;
                    scale += 1;
                }
                // Digits beyond the representable precision are dropped.
                _ => truncated = true,
            }

            digits += 1;
            i += 1;
        }
    }

    if digits == 0 {
        return (i == text.len()).then_some((Decimal::ZERO, real));
    }

    if let Some(b'e' | b'E') = text.get(i) {
        real = true;
        i += 1;

        let mut exp_negative = false;

        if let Some(b @ (b'+' | b'-')) = text.get(i) {
            exp_negative = *b == b'-';
            i += 1;
        }

        let start = i;
        let mut exponent: u32 = 0;

        while let Some(b) = text.get(i).filter(|b| b.is_ascii_digit()) {
            exponent = exponent.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
            i += 1;
        }

        if i == start {
            return None;
        }

        if exp_negative {
            let shift = scale.saturating_add(exponent).saturating_sub(MAX_SCALE);

            // Any shift past the range of `i64` leaves nothing of the mantissa.
            mantissa = 10_i64.checked_pow(shift).map_or(0, |divisor| mantissa / divisor);
            scale = scale.saturating_add(exponent).min(MAX_SCALE);
        } else if exponent <= scale {
            scale -= exponent;
        } else {
            let factor = 10_i64.checked_pow(exponent - scale)?;
            mantissa = mantissa.checked_mul(factor)?;
            scale = 0;
        }
    }

    if i != text.len() {
        return None;
    }

    if negative {
        mantissa = -mantissa;
    }

    Some((Decimal { mantissa, scale }, real))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(mantissa: i64, scale: u32) -> Decimal {
        Decimal::new(mantissa, scale).unwrap()
    }

    #[test]
    fn integers() {
        assert_eq!(Number::parse(b"12"), Some(Number::Integer(12)));
        assert_eq!(Number::parse(b"+17"), Some(Number::Integer(17)));
        assert_eq!(Number::parse(b"-98"), Some(Number::Integer(-98)));
        assert_eq!(Number::parse(b"0"), Some(Number::Integer(0)));
        assert!(Number::parse(b"00987").unwrap().is_integer());
    }

    #[test]
    fn reals() {
        assert_eq!(Number::parse(b"34.5"), Some(Number::Real(dec(345, 1))));
        assert_eq!(Number::parse(b"-3.62"), Some(Number::Real(dec(-362, 2))));
        assert_eq!(Number::parse(b"+123.6"), Some(Number::Real(dec(1236, 1))));
        assert_eq!(Number::parse(b"4."), Some(Number::Real(dec(4, 0))));
        assert_eq!(Number::parse(b"-.002"), Some(Number::Real(dec(-2, 3))));
        assert_eq!(Number::parse(b"0.0"), Some(Number::Integer(0)));
        assert!(!Number::parse(b"0.0").unwrap().is_integer());
    }

    #[test]
    fn exponents() {
        assert_eq!(Number::parse(b"1.5e3").unwrap().as_decimal(), dec(1500, 0));
        assert_eq!(Number::parse(b"25E-2").unwrap().as_decimal(), dec(25, 2));
        assert!(Number::parse(b"1e").is_none());
    }

    #[test]
    fn small_exponents_lose_precision() {
        assert_eq!(Number::parse(b"12345e-20").unwrap().as_decimal(), dec(123, 18));
        assert_eq!(Number::parse(b"-7e-30").unwrap().as_decimal(), Decimal::ZERO);
        assert_eq!(
            Number::parse(b"1e-4000000000"),
            Some(Number::Real(Decimal::ZERO))
        );
        assert!(Number::parse(b"1e-99999999999").is_none());
    }

    #[test]
    fn lone_signs_are_zero() {
        assert_eq!(Number::parse(b"-"), Some(Number::Integer(0)));
        assert_eq!(Number::parse(b"."), Some(Number::Real(Decimal::ZERO)));
        assert_eq!(Number::parse(b"-.").unwrap().as_i64(), 0);
    }

    #[test]
    fn malformed() {
        assert!(Number::parse(b"1-2").is_none());
        assert!(Number::parse(b"1.2.3").is_none());
        assert!(Number::parse(b"99999999999999999999999").is_none());
        assert_eq!(Number::parse(b"--5"), Some(Number::Integer(-5)));
    }

    #[test]
    fn excess_precision_is_truncated() {
        let n = Number::parse(b"0.12345678901234567891234").unwrap();
        assert_eq!(n.as_decimal().scale(), MAX_SCALE);
        assert_eq!(n.as_decimal(), dec(123456789012345678, 18));
    }

    #[test]
    fn display() {
        assert_eq!(dec(-5, 2).to_string(), "-0.05");
        assert_eq!(dec(12345, 3).to_string(), "12.345");
        assert_eq!(Number::Integer(-7).to_string(), "-7");
    }

    #[test]
    fn value_equality() {
        assert_eq!(dec(50, 2), dec(5, 1));
        assert!(dec(-1, 0) < dec(5, 3));
        assert_eq!(Number::Integer(3), Number::Real(dec(300, 2)));
        assert_eq!(dec(1200, 2).trunc(), 12);
        assert!(dec(1200, 2).is_integral());
    }
}
