//! Query parameters for API requests

use url::Url;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Marker for a parameter that must not appear in the URL
    Unset,
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl QueryValue {
    /// Canonical string form, or `None` for [`QueryValue::Unset`]
    pub fn to_query_string(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::Text(text) => Some(text.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Unsigned(value) => Some(value.to_string()),
            Self::Float(value) => Some(format_float(*value)),
            Self::Bool(value) => Some(value.to_string()),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Drops the sign of negative zero
        return "0".to_string();
    }

    // Shortest round-trip digits, e.g. "1.25e-7"
    let scientific = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if value.is_sign_negative() { "-" } else { "" };

    // Digits before the decimal point; exponent form outside 1e-7 < |value| < 1e21
    let point = exponent + 1;
    let body = match usize::try_from(point) {
        Ok(point) if point <= 21 && digits.len() <= point => {
            format!("{digits}{}", "0".repeat(point - digits.len()))
        }
        Ok(point) if (1..=21).contains(&point) => {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
        _ if (-5..=0).contains(&point) => {
            format!("0.{}{digits}", "0".repeat(usize::try_from(-point).unwrap_or(0)))
        }
        _ => {
            let (lead, rest) = digits.split_at(1);
            let fraction = if rest.is_empty() {
                String::new()
            } else {
                format!(".{rest}")
            };
            let exponent_sign = if exponent < 0 { '-' } else { '+' };
            format!("{lead}{fraction}e{exponent_sign}{}", exponent.unsigned_abs())
        }
    };

    format!("{sign}{body}")
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for QueryValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

macro_rules! impl_from_integer {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for QueryValue {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(Integer as i64: i8, i16, i32, i64);
impl_from_integer!(Unsigned as u64: u8, u16, u32, u64);

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        Self::Unsigned(value as u64)
    }
}

impl<T: Into<Self>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Into::into)
    }
}

/// Ordered set of query parameters
///
/// Entries keep insertion order. Setting a key that is already present
/// replaces its value in place, the same way it replaces a parameter that was
/// already part of the request path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    entries: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Query::insert`]
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters that will be sent, with their string form
    pub fn pairs(&self) -> impl Iterator<Item = (&str, String)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| Some((key.as_str(), value.to_query_string()?)))
    }

    /// Write the present parameters into `url`
    pub(crate) fn apply(&self, url: &mut Url) {
        let present: Vec<(&str, String)> = self.pairs().collect();
        if present.is_empty() {
            return;
        }

        let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        for (key, value) in present {
            match pairs.iter().position(|(existing, _)| existing == key) {
                Some(first) => {
                    pairs[first].1 = value;
                    let mut index = 0;
                    pairs.retain(|(existing, _)| {
                        let keep = index <= first || existing != key;
                        index += 1;
                        keep
                    });
                }
                None => pairs.push((key.to_string(), value)),
            }
        }

        let mut serializer = url.query_pairs_mut();
        serializer.clear();
        for (key, value) in &pairs {
            serializer.append_pair(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(base: &str, query: &Query) -> String {
        let mut url = Url::parse(base).unwrap();
        query.apply(&mut url);
        url.to_string()
    }

    #[test]
    fn unset_values_are_omitted() {
        let query = Query::new()
            .set("search", None::<&str>)
            .set("page", 2)
            .set("location_id", QueryValue::Unset);

        assert_eq!(
            applied("http://localhost:8000/items", &query),
            "http://localhost:8000/items?page=2"
        );
    }

    #[test]
    fn values_use_canonical_strings() {
        let query = Query::new()
            .set("active", true)
            .set("min", 1.0)
            .set("ratio", 0.25)
            .set("offset", -3)
            .set("name", "rice 5kg");

        let pairs: Vec<(&str, String)> = query.pairs().collect();
        assert_eq!(
            pairs,
            vec![
                ("active", "true".to_string()),
                ("min", "1".to_string()),
                ("ratio", "0.25".to_string()),
                ("offset", "-3".to_string()),
                ("name", "rice 5kg".to_string()),
            ]
        );
        assert_eq!(
            applied("http://localhost:8000/items", &query),
            "http://localhost:8000/items?active=true&min=1&ratio=0.25&offset=-3&name=rice+5kg"
        );
    }

    #[test]
    fn special_floats_match_display_conventions() {
        assert_eq!(QueryValue::from(f64::INFINITY).to_query_string().unwrap(), "Infinity");
        assert_eq!(QueryValue::from(-0.0).to_query_string().unwrap(), "0");
        assert_eq!(QueryValue::from(f64::NAN).to_query_string().unwrap(), "NaN");
    }

    #[test]
    fn large_and_tiny_floats_use_exponent_form() {
        let text = |value: f64| QueryValue::from(value).to_query_string().unwrap();

        assert_eq!(text(1e21), "1e+21");
        assert_eq!(text(1.5e21), "1.5e+21");
        assert_eq!(text(1e20), "100000000000000000000");
        assert_eq!(text(1e-7), "1e-7");
        assert_eq!(text(-2.5e-8), "-2.5e-8");
        assert_eq!(text(0.000_001), "0.000001");
        assert_eq!(text(123.456), "123.456");
        assert_eq!(text(-1500.0), "-1500");
    }

    #[test]
    fn order_is_insertion_order() {
        let query: Query = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        assert_eq!(
            applied("http://localhost:8000/x", &query),
            "http://localhost:8000/x?b=2&a=1&c=3"
        );
    }

    #[test]
    fn repeated_key_replaces_value_in_place() {
        let mut query = Query::new().set("page", 1).set("size", 50);
        query.insert("page", 3);
        assert_eq!(
            applied("http://localhost:8000/x", &query),
            "http://localhost:8000/x?page=3&size=50"
        );
    }

    #[test]
    fn existing_parameters_in_path_are_replaced() {
        let query = Query::new().set("status", "ACK").set("page", 1);
        assert_eq!(
            applied("http://localhost:8000/alerts?status=OPEN&sort=new&status=DONE", &query),
            "http://localhost:8000/alerts?status=ACK&sort=new&page=1"
        );
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let query = Query::new().set("search", None::<String>);
        assert_eq!(applied("http://localhost:8000/items", &query), "http://localhost:8000/items");
        assert_eq!(
            applied("http://localhost:8000/items?x=1", &Query::new()),
            "http://localhost:8000/items?x=1"
        );
    }
}
