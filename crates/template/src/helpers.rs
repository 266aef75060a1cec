use chrono::NaiveDate;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use serde_json::Value;
use std::fmt::Write;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn register(registry: &mut Handlebars<'static>) {
    registry.register_helper("date", Box::new(DateHelper));
    registry.register_helper("sum", Box::new(SumHelper));
    registry.register_helper("formatCurrency", Box::new(format_currency_helper));
}

/// `{{date value format="..."}}`
struct DateHelper;

impl HelperDef for DateHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let raw = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("date", 0))?
            .value();
        let raw = raw.as_str().ok_or_else(|| {
            RenderErrorReason::ParamTypeMismatchForName("date", "0".into(), "string".into())
        })?;
        let format = match h.hash_get("format") {
            Some(format) => format.value().as_str().ok_or_else(|| {
                RenderErrorReason::Other("date: format must be a string".into())
            })?,
            None => ISO_DATE_FORMAT,
        };

        let date = parse_iso_date(raw)?;
        let mut formatted = String::new();
        // chrono reports an invalid format string as a fmt::Error during Display.
        write!(formatted, "{}", date.format(format)).map_err(|_| {
            RenderErrorReason::Other(format!("date: invalid format string '{format}'"))
        })?;
        Ok(ScopedJson::Derived(Value::String(formatted)))
    }
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate, RenderErrorReason> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT).map_err(|e| {
        RenderErrorReason::Other(format!("date: '{raw}' is not a YYYY-MM-DD date: {e}"))
    })
}

/// `{{sum list}}`, `{{sum list "attr"}}` or `{{sum list attribute="attr"}}`
struct SumHelper;

impl HelperDef for SumHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let items = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("sum", 0))?
            .value();
        let items = items.as_array().ok_or_else(|| {
            RenderErrorReason::ParamTypeMismatchForName("sum", "0".into(), "array".into())
        })?;

        let attribute = match (h.param(1), h.hash_get("attribute")) {
            (Some(param), _) => Some(param.value()),
            (None, Some(hash)) => Some(hash.value()),
            (None, None) => None,
        };
        let attribute = match attribute {
            Some(value) => Some(value.as_str().ok_or_else(|| {
                RenderErrorReason::Other("sum: attribute name must be a string".into())
            })?),
            None => None,
        };

        Ok(ScopedJson::Derived(sum_values(items, attribute)?))
    }
}

/// Sums `items` (or `item[attribute]` for each item). Integer inputs give an
/// integer result so `{{sum [1, 2, 3]}}` renders `6`, not `6.0`.
fn sum_values(items: &[Value], attribute: Option<&str>) -> Result<Value, RenderErrorReason> {
    let mut float_total = 0.0;
    let mut int_total: Option<i64> = Some(0);

    for (index, item) in items.iter().enumerate() {
        let value = match attribute {
            Some(attr) => item.get(attr).ok_or_else(|| {
                RenderErrorReason::Other(format!("sum: item {index} has no attribute '{attr}'"))
            })?,
            None => item,
        };
        let number = value.as_f64().ok_or_else(|| {
            RenderErrorReason::Other(format!("sum: item {index} is not a number: {value}"))
        })?;
        float_total += number;
        int_total = match (int_total, value.as_i64()) {
            (Some(total), Some(n)) => total.checked_add(n),
            _ => None,
        };
    }

    Ok(match int_total {
        Some(total) => Value::from(total),
        None => Value::from(float_total),
    })
}

fn format_currency_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let amount = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("formatCurrency", 0))?
        .value()
        .as_f64()
        .ok_or_else(|| {
            RenderErrorReason::ParamTypeMismatchForName(
                "formatCurrency",
                "0".into(),
                "number".into(),
            )
        })?;
    out.write(&format_currency(amount))?;
    Ok(())
}

/// Two decimals with comma thousands separators: `-1234567.891` → `-1,234,567.89`.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReportTemplate, TemplateError};
    use serde_json::json;

    fn render(source: &str, context: Value) -> Result<String, TemplateError> {
        ReportTemplate::compile(source)?.render(&context)
    }

    #[test]
    fn date_defaults_to_iso_output() {
        assert_eq!(render("{{date d}}", json!({"d": "2024-03-05"})).unwrap(), "2024-03-05");
    }

    #[test]
    fn date_applies_format_hash() {
        let out = render(r#"{{date d format="%B %d, %Y"}}"#, json!({"d": "2024-03-05"})).unwrap();
        assert_eq!(out, "March 05, 2024");
    }

    #[test]
    fn date_rejects_non_iso_strings() {
        let err = render("{{date d}}", json!({"d": "05/03/2024"})).err().unwrap();
        assert!(matches!(err, TemplateError::Render(_)));
    }

    #[test]
    fn sum_of_plain_numbers() {
        assert_eq!(render("{{sum xs}}", json!({"xs": [1, 2, 3.5]})).unwrap(), "6.5");
        assert_eq!(render("{{sum xs}}", json!({"xs": []})).unwrap(), "0");
    }

    #[test]
    fn sum_extracts_attribute_positionally_or_by_hash() {
        let context = json!({"items": [{"amount": 100}, {"amount": 250}]});
        assert_eq!(render(r#"{{sum items "amount"}}"#, context.clone()).unwrap(), "350");
        assert_eq!(render(r#"{{sum items attribute="amount"}}"#, context).unwrap(), "350");
    }

    #[test]
    fn sum_feeds_format_currency_as_subexpression() {
        let context = json!({"items": [{"amount": 1000.5}, {"amount": 234}]});
        let out = render(r#"{{formatCurrency (sum items "amount")}}"#, context).unwrap();
        assert_eq!(out, "1,234.50");
    }

    #[test]
    fn sum_rejects_items_without_the_attribute() {
        let context = json!({"items": [{"amount": 1}, {"cost": 2}]});
        assert!(render(r#"{{sum items "amount"}}"#, context).is_err());
    }

    #[test]
    fn sum_rejects_non_numeric_items() {
        assert!(render("{{sum xs}}", json!({"xs": [1, "two"]})).is_err());
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(999.999), "1,000.00");
        assert_eq!(format_currency(1234567.891), "1,234,567.89");
        assert_eq!(format_currency(-42.5), "-42.50");
        assert_eq!(format_currency(-0.001), "0.00");
    }
}
