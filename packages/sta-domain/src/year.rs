use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Error, Result};

pub const UNKNOWN_YEAR_LABEL: &str = "unknown";

/// Academic year of an archived test.
///
/// `Unknown` is a real, comparable facet value: choosing it narrows to records whose year was
/// never recorded. It never acts as a wildcard and never equals `Known(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Year {
	Known(i32),
	Unknown,
}
impl Year {
	pub fn from_db(value: Option<i32>) -> Self {
		match value {
			Some(year) => Self::Known(year),
			None => Self::Unknown,
		}
	}

	pub fn to_db(self) -> Option<i32> {
		match self {
			Self::Known(year) => Some(year),
			Self::Unknown => None,
		}
	}

	pub fn is_unknown(self) -> bool {
		matches!(self, Self::Unknown)
	}

	/// Most recent first, `Unknown` last.
	pub fn facet_cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Self::Known(left), Self::Known(right)) => right.cmp(left),
			(Self::Known(_), Self::Unknown) => Ordering::Less,
			(Self::Unknown, Self::Known(_)) => Ordering::Greater,
			(Self::Unknown, Self::Unknown) => Ordering::Equal,
		}
	}
}
impl fmt::Display for Year {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Known(year) => write!(f, "{year}"),
			Self::Unknown => f.write_str(UNKNOWN_YEAR_LABEL),
		}
	}
}
impl FromStr for Year {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		let trimmed = raw.trim();

		if trimmed.eq_ignore_ascii_case(UNKNOWN_YEAR_LABEL) {
			return Ok(Self::Unknown);
		}

		match trimmed.parse::<i32>() {
			Ok(year) if year >= 0 => Ok(Self::Known(year)),
			_ => Err(Error::InvalidYear { raw: raw.to_string() }),
		}
	}
}
impl Serialize for Year {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::Known(year) => serializer.serialize_i32(*year),
			Self::Unknown => serializer.serialize_str(UNKNOWN_YEAR_LABEL),
		}
	}
}
impl<'de> Deserialize<'de> for Year {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(YearVisitor)
	}
}

struct YearVisitor;
impl de::Visitor<'_> for YearVisitor {
	type Value = Year;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a non-negative year or \"unknown\"")
	}

	fn visit_i64<E>(self, value: i64) -> std::result::Result<Year, E>
	where
		E: de::Error,
	{
		i32::try_from(value)
			.ok()
			.filter(|year| *year >= 0)
			.map(Year::Known)
			.ok_or_else(|| E::custom(format!("year {value} is out of range")))
	}

	fn visit_u64<E>(self, value: u64) -> std::result::Result<Year, E>
	where
		E: de::Error,
	{
		i32::try_from(value)
			.map(Year::Known)
			.map_err(|_| E::custom(format!("year {value} is out of range")))
	}

	fn visit_str<E>(self, value: &str) -> std::result::Result<Year, E>
	where
		E: de::Error,
	{
		value.parse().map_err(E::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_labels_and_numbers() {
		assert_eq!("2023".parse::<Year>(), Ok(Year::Known(2023)));
		assert_eq!(" Unknown ".parse::<Year>(), Ok(Year::Unknown));
		assert!("".parse::<Year>().is_err());
		assert_eq!("0".parse::<Year>(), Ok(Year::Known(0)));
		assert!("-1".parse::<Year>().is_err());
		assert!("twenty".parse::<Year>().is_err());
	}

	#[test]
	fn zero_is_not_unknown() {
		assert_ne!(Year::Known(0), Year::Unknown);
		assert_eq!(Year::Known(0).to_db(), Some(0));
		assert_eq!(Year::Unknown.to_db(), None);
	}

	#[test]
	fn facet_order_is_descending_with_unknown_last() {
		let mut years = vec![Year::Known(2021), Year::Unknown, Year::Known(2024), Year::Known(0)];

		years.sort_by(Year::facet_cmp);

		assert_eq!(
			years,
			vec![Year::Known(2024), Year::Known(2021), Year::Known(0), Year::Unknown]
		);
	}
}
