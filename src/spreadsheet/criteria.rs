use glob::Pattern;

/// Criteria for picking which sheets a batch conversion processes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Criteria {
    /// Sheet name patterns, None accepts every sheet.
    pub(crate) sheet_name_patterns: Option<Vec<Pattern>>,
}

impl Criteria {
    /// Parses a comma separated list of glob patterns, e.g. `"Data*,Summary"`.
    pub(crate) fn parse(patterns: Option<&str>) -> Result<Self, glob::PatternError> {
        let sheet_name_patterns = patterns
            .map(|patterns| {
                patterns
                    .split(',')
                    .map(str::trim)
                    .filter(|pattern| !pattern.is_empty())
                    .map(Pattern::new)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Criteria { sheet_name_patterns })
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}
