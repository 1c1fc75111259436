use serde_json::{Map, Value};

use crate::error::ScoutError;

/// How much of an unparsable body is kept for diagnostics
pub const BODY_PREFIX_CHARS: usize = 200;

/// Parsed WFS response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// One parking spot record. Geometry is dropped on parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub properties: Map<String, Value>,
}

impl FeatureCollection {
    /// Parse a raw response body.
    ///
    /// Fails with [`ScoutError::MalformedResponse`] when the body is not JSON and
    /// with [`ScoutError::MissingFeatures`] when there is no `features` array.
    pub fn from_json(body: &str) -> Result<Self, ScoutError> {
        let payload: Value =
            serde_json::from_str(body).map_err(|source| ScoutError::MalformedResponse {
                body_prefix: body.chars().take(BODY_PREFIX_CHARS).collect(),
                source,
            })?;

        Self::from_value(payload)
    }

    pub fn from_value(payload: Value) -> Result<Self, ScoutError> {
        let items = match payload {
            Value::Object(mut root) => match root.remove("features") {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(ScoutError::MissingFeatures {
                        found: json_type_name(&other),
                    })
                }
                None => return Err(ScoutError::MissingFeatures { found: "nothing" }),
            },
            other => {
                return Err(ScoutError::MissingFeatures {
                    found: json_type_name(&other),
                })
            }
        };

        Ok(Self {
            features: items.into_iter().map(Feature::from_value).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Feature {
    /// Build a feature from any JSON value. Anything without an object under
    /// `properties` becomes a feature with no properties, which never matches.
    pub fn from_value(value: Value) -> Self {
        let properties = match value {
            Value::Object(mut feature) => match feature.remove("properties") {
                Some(Value::Object(properties)) => properties,
                _ => Map::new(),
            },
            _ => Map::new(),
        };

        Self { properties }
    }

    pub fn with_properties(properties: Value) -> Self {
        Self::from_value(serde_json::json!({ "properties": properties }))
    }

    /// `cod_parcare`, only when it is a JSON string
    pub fn facility_code(&self) -> Option<&str> {
        self.properties.get("cod_parcare").and_then(Value::as_str)
    }

    /// `ocupat` after numeric coercion
    pub fn occupancy(&self) -> f64 {
        coerce_number(self.properties.get("ocupat"))
    }

    pub fn is_free(&self) -> bool {
        self.occupancy() == 0.0
    }

    /// Printable form of a property, `n/a` when absent
    pub fn display_field(&self, key: &str) -> String {
        match self.properties.get(key) {
            None => "n/a".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => format_number(n),
            Some(other) => other.to_string(),
        }
    }
}

/// Integers print without a fraction, so `0.0` reads `0` like `String(0.0)`
fn format_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }

    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        // f64's Display drops a zero fraction: 1.0 prints as "1"
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Numeric coercion with ECMAScript `Number()` semantics.
///
/// A missing value, arrays and objects are NaN. `null` and `false` are 0 and
/// `true` is 1. Strings go through [`string_to_number`].
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// String to number the way `Number("...")` does it: surrounding whitespace is
/// ignored, an empty string is 0, and `0x`/`0o`/`0b` prefixes and `Infinity` are
/// understood. Everything else that is not a plain decimal literal is NaN.
pub fn string_to_number(raw: &str) -> f64 {
    let s = raw.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // f64::from_str also takes "inf" and "nan", which Number() does not
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// ECMAScript WhiteSpace and LineTerminator code points
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000A}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    let mut total = 0.0_f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => total = total * f64::from(radix) + f64::from(d),
            None => return f64::NAN,
        }
    }
    total
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
