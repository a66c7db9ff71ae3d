use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Year, display_facet, normalize_facet};

/// The four dependent narrowing dimensions, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetLevel {
	University,
	Year,
	Semester,
	Type,
}
impl FacetLevel {
	pub const ALL: [Self; 4] = [Self::University, Self::Year, Self::Semester, Self::Type];

	pub fn index(self) -> usize {
		match self {
			Self::University => 0,
			Self::Year => 1,
			Self::Semester => 2,
			Self::Type => 3,
		}
	}

	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}

	pub fn next(self) -> Option<Self> {
		Self::from_index(self.index() + 1)
	}

	pub fn previous(self) -> Option<Self> {
		self.index().checked_sub(1).and_then(Self::from_index)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::University => "university",
			Self::Year => "year",
			Self::Semester => "semester",
			Self::Type => "type",
		}
	}
}
impl fmt::Display for FacetLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One chosen or offered value at some facet level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetValue {
	Text(String),
	Year(Year),
}
impl FacetValue {
	pub fn text(raw: impl Into<String>) -> Self {
		Self::Text(raw.into())
	}

	/// Whether this value can be chosen at `level` at all.
	pub fn fits(&self, level: FacetLevel) -> bool {
		matches!(
			(self, level),
			(Self::Year(_), FacetLevel::Year)
				| (Self::Text(_), FacetLevel::University | FacetLevel::Semester | FacetLevel::Type)
		)
	}

	/// Normalized equality; text values compare through [`normalize_facet`].
	pub fn same_as(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Text(left), Self::Text(right)) => normalize_facet(left) == normalize_facet(right),
			(Self::Year(left), Self::Year(right)) => left == right,
			_ => false,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text.as_str()),
			Self::Year(_) => None,
		}
	}

	pub fn as_year(&self) -> Option<Year> {
		match self {
			Self::Year(year) => Some(*year),
			Self::Text(_) => None,
		}
	}
}
impl fmt::Display for FacetValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text(text) => f.write_str(text),
			Self::Year(year) => year.fmt(f),
		}
	}
}
impl From<Year> for FacetValue {
	fn from(year: Year) -> Self {
		Self::Year(year)
	}
}

/// Raw distinct facet combination stored for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetRow {
	pub university: String,
	pub year: Year,
	pub semester: String,
	#[serde(rename = "type")]
	pub exam_type: String,
}
impl FacetRow {
	pub fn value(&self, level: FacetLevel) -> FacetValue {
		match level {
			FacetLevel::University => FacetValue::Text(self.university.clone()),
			FacetLevel::Year => FacetValue::Year(self.year),
			FacetLevel::Semester => FacetValue::Text(self.semester.clone()),
			FacetLevel::Type => FacetValue::Text(self.exam_type.clone()),
		}
	}
}

/// Facet values chosen so far, in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetPrefix {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub university: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub year: Option<Year>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub semester: Option<String>,
}
impl FacetPrefix {
	pub fn with_university(mut self, university: impl Into<String>) -> Self {
		self.university = Some(university.into());

		self
	}

	pub fn with_year(mut self, year: Year) -> Self {
		self.year = Some(year);

		self
	}

	pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
		self.semester = Some(semester.into());

		self
	}

	/// Rejects gaps (a year without a university, a semester without a year) and blank text.
	pub fn validate(&self) -> Result<()> {
		let chosen = [self.university.is_some(), self.year.is_some(), self.semester.is_some()];

		for (index, is_set) in chosen.iter().enumerate().skip(1) {
			if *is_set && !chosen[index - 1] {
				let level = FacetLevel::ALL[index];

				return Err(Error::NonContiguousPrefix { level, missing: FacetLevel::ALL[index - 1] });
			}
		}

		for (level, value) in [
			(FacetLevel::University, self.university.as_deref()),
			(FacetLevel::Semester, self.semester.as_deref()),
		] {
			if value.is_some_and(|text| normalize_facet(text).is_empty()) {
				return Err(Error::MissingFacet { level });
			}
		}

		Ok(())
	}

	pub fn len(&self) -> usize {
		[self.university.is_some(), self.year.is_some(), self.semester.is_some()]
			.into_iter()
			.take_while(|is_set| *is_set)
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// First level without a chosen value. Never beyond [`FacetLevel::Type`].
	pub fn next_level(&self) -> FacetLevel {
		FacetLevel::ALL[self.len()]
	}

	/// Whether `row` agrees with every chosen value strictly above `level`.
	pub fn matches_above(&self, row: &FacetRow, level: FacetLevel) -> bool {
		let text_matches = |chosen: &Option<String>, actual: &str| {
			chosen.as_deref().is_none_or(|chosen| normalize_facet(chosen) == normalize_facet(actual))
		};

		if level > FacetLevel::University && !text_matches(&self.university, &row.university) {
			return false;
		}
		if level > FacetLevel::Year && self.year.is_some_and(|year| year != row.year) {
			return false;
		}
		if level > FacetLevel::Semester && !text_matches(&self.semester, &row.semester) {
			return false;
		}

		true
	}

	pub fn matches(&self, row: &FacetRow) -> bool {
		self.matches_above(row, FacetLevel::Type)
	}
}

/// Distinct valid values at one facet level, already ordered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSet {
	pub level: FacetLevel,
	pub values: Vec<FacetValue>,
}
impl FacetSet {
	pub fn empty(level: FacetLevel) -> Self {
		Self { level, values: Vec::new() }
	}

	/// Collects the distinct values of `level` across `rows`.
	///
	/// Text values are deduplicated by normalized key and keep the first spelling seen; blank
	/// values are skipped since they can never resolve. Text sorts alphabetically, years most
	/// recent first with the unknown sentinel last.
	pub fn collect<'a>(level: FacetLevel, rows: impl IntoIterator<Item = &'a FacetRow>) -> Self {
		match level {
			FacetLevel::Year => {
				let mut seen = HashSet::new();
				let mut values = Vec::new();

				for row in rows {
					if seen.insert(row.year) {
						values.push(row.year);
					}
				}

				values.sort_by(Year::facet_cmp);

				Self { level, values: values.into_iter().map(FacetValue::Year).collect() }
			},
			_ => {
				let mut seen = HashSet::new();
				let mut keyed = Vec::new();

				for row in rows {
					let FacetValue::Text(raw) = row.value(level) else {
						continue;
					};
					let key = normalize_facet(&raw);

					if key.is_empty() || !seen.insert(key.clone()) {
						continue;
					}

					keyed.push((key, display_facet(&raw)));
				}

				keyed.sort();

				Self {
					level,
					values: keyed.into_iter().map(|(_, text)| FacetValue::Text(text)).collect(),
				}
			},
		}
	}

	/// FacetSet for the first unchosen level of `prefix`, restricted to rows matching it.
	pub fn next_level<'a>(
		rows: impl IntoIterator<Item = &'a FacetRow>,
		prefix: &FacetPrefix,
	) -> Result<Self> {
		prefix.validate()?;

		let level = prefix.next_level();

		Ok(Self::collect(level, rows.into_iter().filter(|row| prefix.matches(row))))
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// The offered value equal to `candidate` under normalization, if any.
	pub fn find(&self, candidate: &FacetValue) -> Option<&FacetValue> {
		self.values.iter().find(|value| value.same_as(candidate))
	}
}

/// Every facet level at once, each narrowed by the chosen values above it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCascade {
	pub universities: Vec<String>,
	pub years: Vec<Year>,
	pub semesters: Vec<String>,
	pub types: Vec<String>,
}
impl FacetCascade {
	pub fn derive(rows: &[FacetRow], prefix: &FacetPrefix) -> Result<Self> {
		prefix.validate()?;

		let level_rows = |level: FacetLevel| {
			FacetSet::collect(level, rows.iter().filter(|row| prefix.matches_above(row, level)))
		};
		let text_values = |set: FacetSet| {
			set.values
				.into_iter()
				.filter_map(|value| value.as_text().map(str::to_string))
				.collect::<Vec<_>>()
		};

		Ok(Self {
			universities: text_values(level_rows(FacetLevel::University)),
			years: level_rows(FacetLevel::Year)
				.values
				.into_iter()
				.filter_map(|value| value.as_year())
				.collect(),
			semesters: text_values(level_rows(FacetLevel::Semester)),
			types: text_values(level_rows(FacetLevel::Type)),
		})
	}

	pub fn level(&self, level: FacetLevel) -> FacetSet {
		let values = match level {
			FacetLevel::University => self.universities.iter().cloned().map(FacetValue::Text).collect(),
			FacetLevel::Year => self.years.iter().copied().map(FacetValue::Year).collect(),
			FacetLevel::Semester => self.semesters.iter().cloned().map(FacetValue::Text).collect(),
			FacetLevel::Type => self.types.iter().cloned().map(FacetValue::Text).collect(),
		};

		FacetSet { level, values }
	}
}
