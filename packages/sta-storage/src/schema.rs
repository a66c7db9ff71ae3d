pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

/// Statements in execution order, without empty fragments.
pub fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_subjects.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_subjects.sql")),
				"tables/002_tests.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_tests.sql")),
				"tables/003_test_ratings.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_test_ratings.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
