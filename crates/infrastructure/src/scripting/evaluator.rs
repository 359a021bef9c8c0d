//! Values and conditions as a script sees them.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use courier_domain::environment::VariableMap;
use courier_domain::scripting::ScriptContext;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("valid regex"));

/// Comparison operators, longest first so `>=` is not read as `>`.
const OPERATORS: [&str; 7] = [" contains ", "==", "!=", ">=", "<=", ">", "<"];

/// Reads script values out of a `ScriptContext`.
///
/// Names a script may use, bare or as `{{name}}`:
///
/// | name | value |
/// |------|-------|
/// | `status` | response status code, empty before the response |
/// | `body` | response body |
/// | `duration` | response time in milliseconds |
/// | `header.<Name>` | response header, case-insensitive |
/// | `env.<name>` or `<name>` | environment variable |
///
/// Variables written by `set` earlier in the same script are visible to
/// later lines.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    context: &'a ScriptContext,
    variables: VariableMap,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator over a context snapshot.
    #[must_use]
    pub fn new(context: &'a ScriptContext) -> Self {
        Self {
            context,
            variables: context.environment.clone(),
        }
    }

    /// Makes a variable visible to later lookups.
    pub fn set(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    /// Looks up a single name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<String> {
        let response = self.context.response.as_ref();
        match name {
            "status" | "$status" => Some(response.map(|r| r.status.to_string()).unwrap_or_default()),
            "body" | "$body" => Some(response.map(|r| r.body.clone()).unwrap_or_default()),
            "duration" | "$duration" => {
                Some(response.map(|r| r.elapsed_ms().to_string()).unwrap_or_default())
            }
            _ => {
                if let Some(header) = name.strip_prefix("header.") {
                    return response.and_then(|r| r.get_header(header)).map(str::to_string);
                }
                let key = name.strip_prefix("env.").unwrap_or(name);
                self.variables.get(key).cloned()
            }
        }
    }

    /// Replaces every `{{name}}` this evaluator knows. Unknown names are
    /// left in place.
    #[must_use]
    pub fn interpolate(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures<'_>| {
                self.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Resolves one operand of a condition: a known bare name, else the
    /// interpolated text itself.
    fn operand(&self, raw: &str) -> String {
        let raw = raw.trim();
        self.lookup(raw).unwrap_or_else(|| self.interpolate(raw))
    }

    /// Evaluates a condition.
    ///
    /// Supports `contains`, `==`, `!=` and the numeric comparisons
    /// `>=`, `<=`, `>`, `<`. A bare operand is truthy unless it is empty,
    /// `false` or `0`.
    #[must_use]
    pub fn evaluate(&self, condition: &str) -> bool {
        let condition = condition.trim();

        for op in OPERATORS {
            let Some((left, right)) = condition.split_once(op) else {
                continue;
            };
            let (left, right) = (self.operand(left), self.operand(right));
            return match op.trim() {
                "contains" => left.contains(&right),
                "==" => left == right,
                "!=" => left != right,
                ">=" => compare_numeric(&left, &right, |a, b| a >= b),
                "<=" => compare_numeric(&left, &right, |a, b| a <= b),
                ">" => compare_numeric(&left, &right, |a, b| a > b),
                _ => compare_numeric(&left, &right, |a, b| a < b),
            };
        }

        let value = self.operand(condition);
        !value.is_empty() && value != "false" && value != "0"
    }
}

fn compare_numeric(left: &str, right: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => cmp(l, r),
        _ => false,
    }
}
