use calamine::{Data, ExcelDateTime};
use chrono::TimeDelta;

/// Largest magnitude printed as an integer when a float has no fractional part.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e15;

/// Converts a resolved cell value to its display text.
///
/// Formula cells arrive here as their cached result, so no formula text is ever produced.
/// Empty cells become the empty string.
pub(crate) fn to_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            value.to_owned()
        }
        Data::Int(value) => value.to_string(),
        Data::Float(value) => float_to_text(*value),
        Data::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_owned(),
        Data::DateTime(value) => datetime_to_text(value),
        Data::Error(error) => error.to_string(),
    }
}

/// Formats a number the way a spreadsheet shows it in a general cell:
/// whole numbers without a trailing ".0", everything else in shortest round-trip form.
pub(crate) fn float_to_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < INTEGRAL_FLOAT_LIMIT {
        // Bounded by INTEGRAL_FLOAT_LIMIT, fits in i64
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Converts an Excel date serial to ISO text.
/// Time-only serials (< 1) print as a time, whole serials as a date, the rest as a timestamp.
fn datetime_to_text(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        return value
            .as_duration()
            .map(duration_to_text)
            .unwrap_or_else(|| float_to_text(value.as_f64()));
    }
    let serial = value.as_f64();
    match value.as_datetime() {
        Some(datetime) if serial < 1.0 => datetime.time().format("%H:%M:%S").to_string(),
        Some(datetime) if serial.fract() == 0.0 => datetime.date().format("%Y-%m-%d").to_string(),
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => float_to_text(serial),
    }
}

/// Formats a duration as `[h]:mm:ss`, hours are not wrapped at 24.
fn duration_to_text(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let seconds = duration.num_seconds().abs();
    let hours = seconds / 3600;
    let minutes = seconds % 3600 / 60;
    let seconds = seconds % 60;
    format!("{sign}{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn empty_and_text_cells() {
        assert_eq!(to_text(&Data::Empty), "");
        assert_eq!(to_text(&Data::String("Ann".to_owned())), "Ann");
        assert_eq!(to_text(&Data::String(" ".to_owned())), " ");
    }

    #[test]
    fn numbers_print_like_a_general_cell() {
        assert_eq!(to_text(&Data::Float(30.0)), "30");
        assert_eq!(to_text(&Data::Float(-2.0)), "-2");
        assert_eq!(to_text(&Data::Float(0.1)), "0.1");
        assert_eq!(to_text(&Data::Float(1234.5)), "1234.5");
        assert_eq!(to_text(&Data::Int(42)), "42");
        assert_eq!(float_to_text(1e20), "100000000000000000000");
    }

    #[test]
    fn booleans_and_errors() {
        assert_eq!(to_text(&Data::Bool(true)), "TRUE");
        assert_eq!(to_text(&Data::Bool(false)), "FALSE");
        assert_eq!(to_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }

    #[test]
    fn durations_keep_hours_past_a_day() {
        assert_eq!(duration_to_text(TimeDelta::seconds(90_061)), "25:01:01");
        assert_eq!(duration_to_text(TimeDelta::seconds(-61)), "-0:01:01");
    }

    #[test]
    fn iso_strings_pass_through() {
        assert_eq!(
            to_text(&Data::DateTimeIso("2024-01-01T10:00:00".to_owned())),
            "2024-01-01T10:00:00"
        );
        assert_eq!(to_text(&Data::DurationIso("PT1H".to_owned())), "PT1H");
    }
}
