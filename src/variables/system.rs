//! Built-in dynamic variables.
//!
//! Placeholders whose content starts with `$` are directives such as
//! `{{$guid}}`, `{{$timestamp -1 d}}` or `{{$randomInt 1 100}}`. Directive
//! names are matched case-insensitively. Every function here is pure apart
//! from reading the clock, the random number generator and the process
//! environment.

use chrono::{DateTime, Duration, Local, SecondsFormat, TimeZone, Utc};
use rand::Rng;
use std::env;
use uuid::Uuid;

/// Inclusive range used by `$randomInt` when no valid bounds are given.
pub const DEFAULT_RANDOM_INT_RANGE: (i64, i64) = (0, 999_999);

/// Offsets beyond this many milliseconds are treated as malformed.
const MAX_OFFSET_MILLIS: f64 = 1.0e15;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A parsed built-in invocation such as `$localDatetime rfc1123 -1 d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive token exactly as written, e.g. `$env:HOME` or `$randomInt`.
    pub raw_name: String,
    /// Lower-cased directive token.
    pub name: String,
    /// Whitespace-separated parameters following the token.
    pub params: Vec<String>,
}

impl Directive {
    /// Parses placeholder content into a directive.
    ///
    /// The first whitespace-delimited token is the name, the rest are
    /// parameters. Returns `None` when the content is blank or the token does
    /// not start with `$`.
    pub fn parse(content: &str) -> Option<Self> {
        let mut parts = content.split_whitespace();
        let raw_name = parts.next()?;
        if !raw_name.starts_with('$') {
            return None;
        }

        Some(Self {
            raw_name: raw_name.to_string(),
            name: raw_name.to_ascii_lowercase(),
            params: parts.map(str::to_string).collect(),
        })
    }

    /// Evaluates the directive, returning `None` when it is not recognized.
    pub fn resolve(&self) -> Option<String> {
        let params: Vec<&str> = self.params.iter().map(String::as_str).collect();
        resolve_directive(&self.raw_name, &params)
    }
}

/// Output format selectable on `$localDatetime` and `$datetime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFormat {
    Iso8601,
    Rfc1123,
}

impl DateFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "iso8601" => Some(DateFormat::Iso8601),
            "rfc1123" => Some(DateFormat::Rfc1123),
            _ => None,
        }
    }
}

/// Resolves a built-in directive by name and parameters.
///
/// Returns `None` ("not applicable") for unknown directives, so the caller
/// can leave the placeholder unresolved.
///
/// # Examples
///
/// ```
/// use rest_chain::variables::system::resolve_directive;
///
/// assert_eq!(resolve_directive("$randomInt", &["5", "5"]), Some("5".to_string()));
/// assert_eq!(resolve_directive("$GUID", &[]).map(|g| g.len()), Some(36));
/// assert_eq!(resolve_directive("$unknown", &[]), None);
/// ```
pub fn resolve_directive(name: &str, params: &[&str]) -> Option<String> {
    if let Some(var_name) = strip_prefix_ignore_ascii_case(name, "$env:") {
        return resolve_env(var_name);
    }

    match name.to_ascii_lowercase().as_str() {
        "$timestamp" => Some(format_utc(apply_offset(Utc::now(), params), DateFormat::Iso8601)),
        "$datetime" => {
            let (format, offset) = split_format(params);
            let format = format.unwrap_or(DateFormat::Iso8601);
            Some(format_utc(apply_offset(Utc::now(), offset), format))
        }
        "$timestamp_unix" | "$unix" => {
            Some(apply_offset(Utc::now(), params).timestamp().to_string())
        }
        "$date" => Some(
            apply_offset(Utc::now(), params)
                .format("%Y-%m-%d")
                .to_string(),
        ),
        "$time" => Some(
            apply_offset(Utc::now(), params)
                .format("%H:%M:%S")
                .to_string(),
        ),
        "$localdatetime" => {
            let (format, offset) = split_format(params);
            let datetime = apply_offset(Local::now(), offset);
            Some(match format.unwrap_or(DateFormat::Iso8601) {
                DateFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, false),
                DateFormat::Rfc1123 => datetime.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
            })
        }
        "$guid" | "$uuid" => Some(Uuid::new_v4().to_string()),
        "$randomint" => Some(resolve_random_int(params)),
        "$processenv" => resolve_process_env(params),
        _ => None,
    }
}

/// Renders a UTC time in one of the supported wire formats.
fn format_utc(datetime: DateTime<Utc>, format: DateFormat) -> String {
    match format {
        DateFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
        DateFormat::Rfc1123 => datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
    }
}

/// Splits an optional leading format keyword off the parameter list.
fn split_format<'a>(params: &'a [&'a str]) -> (Option<DateFormat>, &'a [&'a str]) {
    match params.first().and_then(|p| DateFormat::parse(p)) {
        Some(format) => (Some(format), &params[1..]),
        None => (None, params),
    }
}

/// Shifts `base` by an offset given as exactly two params: `<integer> <unit>`.
///
/// Any other shape, or an offset that cannot be represented, leaves `base`
/// unchanged.
fn apply_offset<Tz: TimeZone>(base: DateTime<Tz>, params: &[&str]) -> DateTime<Tz> {
    match parse_offset(params) {
        Some(offset) => base.clone().checked_add_signed(offset).unwrap_or(base),
        None => base,
    }
}

/// Parses `<integer> <unit>` into a duration.
///
/// Units: `y` (365.25 days), `M` (30.44 days), `w`, `d`, `h`, `m`, `s`, `ms`.
/// Units are case-sensitive so that `M` (months) and `m` (minutes) differ.
fn parse_offset(params: &[&str]) -> Option<Duration> {
    let [amount, unit] = params else {
        return None;
    };

    let amount: i64 = amount.parse().ok()?;
    let unit_millis = match *unit {
        "y" => 365.25 * MILLIS_PER_DAY,
        "M" => 30.44 * MILLIS_PER_DAY,
        "w" => 7.0 * MILLIS_PER_DAY,
        "d" => MILLIS_PER_DAY,
        "h" => 3_600_000.0,
        "m" => 60_000.0,
        "s" => 1_000.0,
        "ms" => 1.0,
        _ => return None,
    };

    let millis = (amount as f64 * unit_millis).round();
    if !millis.is_finite() || millis.abs() > MAX_OFFSET_MILLIS {
        return None;
    }

    Some(Duration::milliseconds(millis as i64))
}

/// Generates a random integer in an inclusive range.
///
/// Format: `{{$randomInt min max}}`. Reversed bounds are swapped; missing or
/// malformed bounds fall back to [`DEFAULT_RANDOM_INT_RANGE`].
fn resolve_random_int(params: &[&str]) -> String {
    let (min, max) = match params {
        [min, max] => match (min.parse::<i64>(), max.parse::<i64>()) {
            (Ok(min), Ok(max)) if min <= max => (min, max),
            (Ok(min), Ok(max)) => (max, min),
            _ => DEFAULT_RANDOM_INT_RANGE,
        },
        _ => DEFAULT_RANDOM_INT_RANGE,
    };

    rand::thread_rng().gen_range(min..=max).to_string()
}

/// Reads `$env:NAME` from the process environment.
fn resolve_env(var_name: &str) -> Option<String> {
    if var_name.is_empty() {
        return None;
    }
    env::var(var_name).ok()
}

/// Reads a process environment variable.
///
/// Formats:
/// - `{{$processEnv VAR_NAME}}` - unresolved if not set
/// - `{{$processEnv %VAR_NAME}}` - empty string if not set (optional)
fn resolve_process_env(params: &[&str]) -> Option<String> {
    let var_name = params.first()?;

    match var_name.strip_prefix('%') {
        Some(optional) => Some(env::var(optional).unwrap_or_default()),
        None => env::var(var_name).ok(),
    }
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
