use serde::{Deserialize, Deserializer};

// a run of digits too long for i64 still names a page, just one past any real end
fn parse_page(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(page) = value.parse::<i64>() {
        return Some(page);
    }
    let (negative, digits) = match value.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

// `?page=abc` falls back to the default page instead of rejecting the request
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(parse_page))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Float(f64),
    String(String),
}

// clients keep ids they have seen as they received them, which is sometimes a string
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "NumberOrString")]
pub struct Stri64(pub i64);

impl TryFrom<NumberOrString> for Stri64 {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value {
            NumberOrString::Number(v) => Ok(Stri64(v)),
            // `i64::MAX as f64` rounds up to 2^63, which is already out of range
            NumberOrString::Float(v)
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 =>
            {
                Ok(Stri64(v as i64))
            }
            NumberOrString::Float(v) => Err(format!("Wrong value {v}, not a whole number")),
            NumberOrString::String(s) => match s.parse::<i64>() {
                Ok(v) => Ok(Stri64(v)),
                Err(_) => Err(format!("Wrong value {s}, can not parse to i64")),
            },
        }
    }
}

/// `deserialize_with` form of [`Stri64`] for plain `i64` fields.
pub fn deserialize_stri64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Stri64::deserialize(deserializer).map(|v| v.0)
}
