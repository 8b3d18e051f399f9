//! Filter contract and built-in filters
//!
//! A filter is a pure transform of the text displayed in a control. Filters
//! are chained in insertion order: the output of one is the input of the
//! next, and the final output replaces the displayed value.

/// Pure text transform applied on change and on programmatic set.
///
/// Implementations must accept any text a control can produce and must not
/// panic.
pub trait Filter {
	/// Transform the given value.
	fn filter(&self, value: &str) -> String;
}

impl<F> Filter for F
where
	F: Fn(&str) -> String,
{
	fn filter(&self, value: &str) -> String {
		self(value)
	}
}

/// Thread a value through a filter pipeline in order.
///
/// # Examples
///
/// ```
/// use formbind_core::filter::{Filter, StringToUpper, StringTrim, apply_pipeline};
///
/// let pipeline: Vec<Box<dyn Filter>> = vec![Box::new(StringTrim), Box::new(StringToUpper)];
/// assert_eq!(apply_pipeline(&pipeline, "  abc "), "ABC");
/// ```
pub fn apply_pipeline(filters: &[Box<dyn Filter>], value: &str) -> String {
	filters
		.iter()
		.fold(value.to_string(), |current, filter| filter.filter(&current))
}

/// Coerce to an integer the way a lenient `parseInt` does.
///
/// Leading whitespace and an optional sign are accepted, a `0x` prefix
/// switches to hexadecimal, and parsing stops at the first non-digit.
/// Anything that does not start with a digit becomes `0`.
///
/// # Examples
///
/// ```
/// use formbind_core::filter::{Filter, IntFilter};
///
/// assert_eq!(IntFilter.filter("42abc"), "42");
/// assert_eq!(IntFilter.filter(" -7"), "-7");
/// assert_eq!(IntFilter.filter("0x1A"), "26");
/// assert_eq!(IntFilter.filter("abc"), "0");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IntFilter;

impl Filter for IntFilter {
	fn filter(&self, value: &str) -> String {
		parse_leading_int(value).unwrap_or_else(|| "0".to_string())
	}
}

fn parse_leading_int(value: &str) -> Option<String> {
	let trimmed = value.trim_start();
	let (negative, unsigned) = match trimmed.as_bytes().first() {
		Some(b'-') => (true, &trimmed[1..]),
		Some(b'+') => (false, &trimmed[1..]),
		_ => (false, trimmed),
	};

	let (radix, body) = match unsigned.get(..2) {
		Some("0x") | Some("0X") => (16, &unsigned[2..]),
		_ => (10, unsigned),
	};

	let digits: String = body.chars().take_while(|c| c.is_digit(radix)).collect();
	if digits.is_empty() {
		return None;
	}

	let magnitude = match u128::from_str_radix(&digits, radix) {
		Ok(parsed) => parsed.to_string(),
		// Out of range: keep the decimal digits as written
		Err(_) if radix == 10 => digits.trim_start_matches('0').to_string(),
		Err(_) => return None,
	};

	if magnitude == "0" {
		Some("0".to_string())
	} else if negative {
		Some(format!("-{magnitude}"))
	} else {
		Some(magnitude)
	}
}

/// Upper-case the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToUpper;

impl Filter for StringToUpper {
	fn filter(&self, value: &str) -> String {
		value.to_uppercase()
	}
}

/// Lower-case the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToLower;

impl Filter for StringToLower {
	fn filter(&self, value: &str) -> String {
		value.to_lowercase()
	}
}

/// Strip leading and trailing whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringTrim;

impl Filter for StringTrim {
	fn filter(&self, value: &str) -> String {
		value.trim().to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("12", "12")]
	#[case("12.9", "12")]
	#[case("  +5px", "5")]
	#[case("-0", "0")]
	#[case("", "0")]
	#[case("x12", "0")]
	#[case("0xZZ", "0")]
	#[case("99999999999999999999999999999999999999999", "99999999999999999999999999999999999999999")]
	fn test_int_filter(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(IntFilter.filter(input), expected);
	}

	#[rstest]
	fn test_case_filters() {
		assert_eq!(StringToUpper.filter("Straße"), "STRASSE");
		assert_eq!(StringToLower.filter("ABC"), "abc");
	}

	#[rstest]
	fn test_closure_is_a_filter() {
		let reverse = |value: &str| value.chars().rev().collect::<String>();
		assert_eq!(reverse.filter("abc"), "cba");
	}

	#[rstest]
	fn test_empty_pipeline_is_identity() {
		assert_eq!(apply_pipeline(&[], "  raw "), "  raw ");
	}

	#[rstest]
	fn test_pipeline_order_matters() {
		let trim_then_int: Vec<Box<dyn Filter>> = vec![Box::new(StringTrim), Box::new(IntFilter)];
		let upper_then_int: Vec<Box<dyn Filter>> =
			vec![Box::new(StringToUpper), Box::new(IntFilter)];

		assert_eq!(apply_pipeline(&trim_then_int, " 0xff "), "255");
		assert_eq!(apply_pipeline(&upper_then_int, "0xff"), "255");
	}
}
