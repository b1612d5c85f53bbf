//! The closed, representative grammar catalogue (spec §9: "the appendix is
//! implementation data, not design"). Covers every intent kind spec.md §3
//! names explicitly with at least one rule.

use regex::Captures;

use crate::error::{Error, ParseErrorKind, Result};
use crate::intent::builder::GrammarRuleBuilder;
use crate::intent::grammar::GrammarRegistry;
use crate::intent::types::{Intent, IntentKind, IntentOptionsExt, IntentValue};

fn group(caps: &Captures, name: &str) -> String {
    caps.name(name).map(|m| m.as_str().to_string()).unwrap_or_default()
}

macro_rules! rule {
    ($registry:expr, $pattern:expr, $kind:expr, $priority:expr, $page_level:expr, $extractor:expr) => {
        $registry.register_rule(
            GrammarRuleBuilder::new()
                .pattern($pattern)
                .intent_kind($kind)
                .priority($priority)
                .page_level($page_level)
                .extractor($extractor)
                .build()?,
        )?;
    };
}

/// Build the default, closed grammar registry.
pub fn default_registry() -> Result<GrammarRegistry> {
    let mut r = GrammarRegistry::new();

    // --- Action family ---
    rule!(
        r,
        r#"^(?i)navigate to ['"](?P<url>[^'"]+)['"]$"#,
        IntentKind::Navigate,
        10,
        true,
        |caps| Ok(Intent::new(IntentKind::Navigate).with_value(IntentValue::Url(group(caps, "url"))))
    );
    rule!(
        r,
        r#"^(?i)click the (?P<target>.+) button$"#,
        IntentKind::Click,
        20,
        false,
        |caps| Ok(Intent::new(IntentKind::Click).with_target(format!("the {} button", group(caps, "target"))))
    );
    rule!(
        r,
        r#"^(?i)click (?P<target>.+)$"#,
        IntentKind::Click,
        30,
        false,
        |caps| Ok(Intent::new(IntentKind::Click).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)type ['"](?P<value>[^'"]*)['"] (?:in|into) (?:the )?(?P<target>.+)$"#,
        IntentKind::Type,
        40,
        false,
        |caps| Ok(Intent::new(IntentKind::Type)
            .with_target(group(caps, "target"))
            .with_value(IntentValue::Text(group(caps, "value"))))
    );
    rule!(
        r,
        r#"^(?i)select ['"](?P<value>[^'"]*)['"] from (?:the )?(?P<target>.+)$"#,
        IntentKind::Select,
        50,
        false,
        |caps| Ok(Intent::new(IntentKind::Select)
            .with_target(group(caps, "target"))
            .with_value(IntentValue::Text(group(caps, "value"))))
    );
    rule!(
        r,
        r#"^(?i)hover (?:over )?(?:the )?(?P<target>.+)$"#,
        IntentKind::Hover,
        60,
        false,
        |caps| Ok(Intent::new(IntentKind::Hover).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)scroll to (?:the )?(?P<target>.+)$"#,
        IntentKind::Scroll,
        70,
        false,
        |caps| Ok(Intent::new(IntentKind::Scroll).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)press (?P<combo>[A-Za-z0-9+]+)$"#,
        IntentKind::PressKey,
        80,
        true,
        |caps| {
            let combo = crate::intent::value::parse_key_combo(&group(caps, "combo"));
            Ok(Intent::new(IntentKind::PressKey).with_value(IntentValue::KeyCombo(combo)))
        }
    );
    rule!(
        r,
        r#"^(?i)wait (?P<secs>\d+) seconds?$"#,
        IntentKind::WaitSeconds,
        90,
        true,
        |caps| {
            let secs: i64 = group(caps, "secs").parse().unwrap_or(0);
            Ok(Intent::new(IntentKind::WaitSeconds).with_value(IntentValue::Int(secs)))
        }
    );
    rule!(
        r,
        r#"^(?i)wait for (?:the )?url to change$"#,
        IntentKind::WaitUrlChange,
        100,
        true,
        |_caps| Ok(Intent::new(IntentKind::WaitUrlChange))
    );
    rule!(
        r,
        r#"^(?i)wait for (?:the )?(?P<target>.+) text to change$"#,
        IntentKind::WaitTextChange,
        110,
        false,
        |caps| Ok(Intent::new(IntentKind::WaitTextChange).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)switch to tab (?P<sel>.+)$"#,
        IntentKind::SwitchTab,
        120,
        true,
        |caps| Ok(Intent::new(IntentKind::SwitchTab).with_value(IntentValue::Text(group(caps, "sel"))))
    );
    rule!(
        r,
        r#"^(?i)open a new tab$"#,
        IntentKind::OpenNewTab,
        130,
        true,
        |_caps| Ok(Intent::new(IntentKind::OpenNewTab))
    );
    rule!(
        r,
        r#"^(?i)close (?:the )?(?:current )?tab$"#,
        IntentKind::CloseTab,
        140,
        true,
        |_caps| Ok(Intent::new(IntentKind::CloseTab))
    );
    rule!(
        r,
        r#"^(?i)switch browser to (?P<browser>chrome|edge|firefox|webkit|safari)$"#,
        IntentKind::SwitchBrowser,
        150,
        true,
        |caps| Ok(Intent::new(IntentKind::SwitchBrowser).with_value(IntentValue::Text(group(caps, "browser"))))
    );
    rule!(
        r,
        r#"^(?i)clear (?:the )?session$"#,
        IntentKind::ClearSession,
        160,
        true,
        |_caps| Ok(Intent::new(IntentKind::ClearSession))
    );
    rule!(
        r,
        r#"^(?i)switch to frame ['"](?P<sel>[^'"]+)['"]$"#,
        IntentKind::SwitchFrame,
        170,
        true,
        |caps| Ok(Intent::new(IntentKind::SwitchFrame).with_value(IntentValue::Text(group(caps, "sel"))))
    );
    rule!(
        r,
        r#"^(?i)switch to (?:the )?main frame$"#,
        IntentKind::SwitchMainFrame,
        180,
        true,
        |_caps| Ok(Intent::new(IntentKind::SwitchMainFrame))
    );
    rule!(
        r,
        r#"^(?i)set variable ['"](?P<name>[^'"]+)['"] to ['"](?P<value>[^'"]*)['"]$"#,
        IntentKind::SetVariable,
        190,
        true,
        |caps| Ok(Intent::new(IntentKind::SetVariable)
            .with_option("name", group(caps, "name"))
            .with_value(IntentValue::Text(group(caps, "value"))))
    );
    rule!(
        r,
        r#"^(?i)take a screenshot$"#,
        IntentKind::TakeScreenshot,
        200,
        true,
        |_caps| Ok(Intent::new(IntentKind::TakeScreenshot))
    );
    rule!(
        r,
        r#"^(?i)clear (?:all )?cookies$"#,
        IntentKind::ClearCookies,
        210,
        true,
        |_caps| Ok(Intent::new(IntentKind::ClearCookies))
    );
    rule!(
        r,
        r#"^(?i)set cookie ['"](?P<key>[^'"]+)['"] to ['"](?P<value>[^'"]*)['"]$"#,
        IntentKind::SetCookie,
        220,
        true,
        |caps| Ok(Intent::new(IntentKind::SetCookie)
            .with_option("key", group(caps, "key"))
            .with_value(IntentValue::Text(group(caps, "value"))))
    );
    rule!(
        r,
        r#"^(?i)set (?:local )?storage item ['"](?P<key>[^'"]+)['"] to ['"](?P<value>[^'"]*)['"]$"#,
        IntentKind::SetStorageItem,
        230,
        true,
        |caps| Ok(Intent::new(IntentKind::SetStorageItem)
            .with_option("key", group(caps, "key"))
            .with_value(IntentValue::Text(group(caps, "value"))))
    );
    rule!(
        r,
        r#"^(?i)clear (?:local )?storage$"#,
        IntentKind::ClearStorage,
        240,
        true,
        |_caps| Ok(Intent::new(IntentKind::ClearStorage))
    );
    rule!(
        r,
        r#"^(?i)upload ['"](?P<path>[^'"]+)['"] to (?:the )?(?P<target>.+)$"#,
        IntentKind::Upload,
        250,
        false,
        |caps| Ok(Intent::new(IntentKind::Upload)
            .with_target(group(caps, "target"))
            .with_value(IntentValue::Text(group(caps, "path"))))
    );
    rule!(
        r,
        r#"^(?i)call api (?P<method>GET|POST|PUT|DELETE|PATCH) ['"](?P<url>[^'"]+)['"]$"#,
        IntentKind::ApiCall,
        260,
        true,
        |caps| Ok(Intent::new(IntentKind::ApiCall)
            .with_option("method", group(caps, "method"))
            .with_value(IntentValue::Url(group(caps, "url"))))
    );
    rule!(
        r,
        r#"^(?i)execute script ['"](?P<script>[^'"]+)['"]$"#,
        IntentKind::ExecuteJs,
        270,
        true,
        |caps| Ok(Intent::new(IntentKind::ExecuteJs).with_value(IntentValue::Text(group(caps, "script"))))
    );

    // --- Assertion family ---
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) is (?:displayed|visible)$"#,
        IntentKind::VerifyVisible,
        300,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyVisible).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) is (?:hidden|not visible)$"#,
        IntentKind::VerifyHidden,
        310,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyHidden).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) text is ['"](?P<expected>[^'"]*)['"]$"#,
        IntentKind::VerifyText,
        320,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyText)
            .with_target(group(caps, "target"))
            .with_value(IntentValue::Text(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) value is ['"](?P<expected>[^'"]*)['"]$"#,
        IntentKind::VerifyValue,
        330,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyValue)
            .with_target(group(caps, "target"))
            .with_value(IntentValue::Text(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) is enabled$"#,
        IntentKind::VerifyEnabled,
        340,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyEnabled).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) is checked$"#,
        IntentKind::VerifyChecked,
        350,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyChecked).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) count is (?P<expected>\d+)$"#,
        IntentKind::VerifyCount,
        360,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyCount)
            .with_target(group(caps, "target"))
            .with_value(IntentValue::Int(group(caps, "expected").parse().unwrap_or(0))))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?page contains ['"](?P<expected>[^'"]*)['"]$"#,
        IntentKind::VerifyContains,
        370,
        true,
        |caps| Ok(Intent::new(IntentKind::VerifyContains).with_value(IntentValue::Text(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?url is ['"](?P<expected>[^'"]+)['"]$"#,
        IntentKind::VerifyUrl,
        380,
        true,
        |caps| Ok(Intent::new(IntentKind::VerifyUrl).with_value(IntentValue::Url(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?:page )?title is ['"](?P<expected>[^'"]*)['"]$"#,
        IntentKind::VerifyTitle,
        390,
        true,
        |caps| Ok(Intent::new(IntentKind::VerifyTitle).with_value(IntentValue::Text(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify (?:the )?(?P<target>.+) attribute ['"](?P<attr>[^'"]+)['"] is ['"](?P<expected>[^'"]*)['"]$"#,
        IntentKind::VerifyAttribute,
        400,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyAttribute)
            .with_target(group(caps, "target"))
            .with_option("attribute", group(caps, "attr"))
            .with_value(IntentValue::Text(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify row (?P<row>\d+) column ['"](?P<column>[^'"]+)['"] of (?:the )?(?P<target>.+) is ['"](?P<expected>[^'"]*)['"]$"#,
        IntentKind::VerifyTableCell,
        410,
        false,
        |caps| Ok(Intent::new(IntentKind::VerifyTableCell)
            .with_target(group(caps, "target"))
            .with_option("row", group(caps, "row").parse::<u64>().unwrap_or(0))
            .with_option("column", group(caps, "column"))
            .with_value(IntentValue::Text(group(caps, "expected"))))
    );
    rule!(
        r,
        r#"^(?i)verify api response status is (?P<expected>\d+)$"#,
        IntentKind::VerifyApiResponse,
        420,
        true,
        |caps| Ok(Intent::new(IntentKind::VerifyApiResponse)
            .with_value(IntentValue::Int(group(caps, "expected").parse().unwrap_or(0))))
    );

    // --- Query family (all require a store-as clause, attached later from
    // the wire-format "and store as" suffix; see `intent::wire`) ---
    rule!(
        r,
        r#"^(?i)get (?:the )?(?P<target>.+) text$"#,
        IntentKind::GetText,
        600,
        false,
        |caps| Ok(Intent::new(IntentKind::GetText).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)get (?:the )?(?P<target>.+) value$"#,
        IntentKind::GetValue,
        610,
        false,
        |caps| Ok(Intent::new(IntentKind::GetValue).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)get (?:the )?(?P<target>.+) attribute ['"](?P<attr>[^'"]+)['"]$"#,
        IntentKind::GetAttribute,
        620,
        false,
        |caps| Ok(Intent::new(IntentKind::GetAttribute)
            .with_target(group(caps, "target"))
            .with_option("attribute", group(caps, "attr")))
    );
    rule!(
        r,
        r#"^(?i)get (?:the )?(?P<target>.+) count$"#,
        IntentKind::GetCount,
        630,
        false,
        |caps| Ok(Intent::new(IntentKind::GetCount).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)get (?:the )?(?:current )?url$"#,
        IntentKind::GetUrl,
        640,
        true,
        |_caps| Ok(Intent::new(IntentKind::GetUrl))
    );
    rule!(
        r,
        r#"^(?i)get (?:the )?(?:page )?title$"#,
        IntentKind::GetTitle,
        650,
        true,
        |_caps| Ok(Intent::new(IntentKind::GetTitle))
    );
    rule!(
        r,
        r#"^(?i)check (?:if )?(?:the )?(?P<target>.+) exists$"#,
        IntentKind::CheckExists,
        660,
        false,
        |caps| Ok(Intent::new(IntentKind::CheckExists).with_target(group(caps, "target")))
    );
    rule!(
        r,
        r#"^(?i)get (?:the )?(?:data from )?(?P<target>.+) table$"#,
        IntentKind::GetTableData,
        670,
        false,
        |caps| Ok(Intent::new(IntentKind::GetTableData).with_target(format!("{} table", group(caps, "target"))))
    );
    rule!(
        r,
        r#"^(?i)get row (?P<row>\d+) column ['"](?P<column>[^'"]+)['"] of (?:the )?(?P<target>.+)$"#,
        IntentKind::GetTableCell,
        675,
        false,
        |caps| Ok(Intent::new(IntentKind::GetTableCell)
            .with_target(group(caps, "target"))
            .with_option("row", group(caps, "row").parse::<u64>().unwrap_or(0))
            .with_option("column", group(caps, "column")))
    );
    rule!(
        r,
        r#"^(?i)get column ['"](?P<column>[^'"]+)['"] of (?:the )?(?P<target>.+)$"#,
        IntentKind::GetTableColumn,
        676,
        false,
        |caps| Ok(Intent::new(IntentKind::GetTableColumn)
            .with_target(group(caps, "target"))
            .with_option("column", group(caps, "column")))
    );
    rule!(
        r,
        r#"^(?i)generate (?P<kind>uuid|timestamp|random string|random int|random email)(?: (?P<arg1>-?\d+))?(?: (?P<arg2>-?\d+))?$"#,
        IntentKind::GenerateData,
        680,
        true,
        |caps| {
            let kind = group(caps, "kind");
            let mut intent = Intent::new(IntentKind::GenerateData).with_option("kind", kind.clone());
            match kind.as_str() {
                "random int" => {
                    let parse_bound = |name: &str| -> Result<i64> {
                        caps.name(name)
                            .and_then(|m| m.as_str().parse::<i64>().ok())
                            .ok_or_else(|| {
                                Error::Parse(ParseErrorKind::InvalidParameter {
                                    param: "randomInt".to_string(),
                                    value: group(caps, "arg1") + " " + &group(caps, "arg2"),
                                    reason: "random int requires integer lo and hi bounds".to_string(),
                                })
                            })
                    };
                    let lo = parse_bound("arg1")?;
                    let hi = parse_bound("arg2")?;
                    if lo > hi {
                        return Err(Error::Parse(ParseErrorKind::InvalidParameter {
                            param: "randomInt".to_string(),
                            value: format!("{lo} {hi}"),
                            reason: "lo must not exceed hi".to_string(),
                        }));
                    }
                    intent = intent.with_option("lo", lo).with_option("hi", hi);
                }
                "random string" => {
                    if let Some(len) = caps.name("arg1").and_then(|m| m.as_str().parse::<u64>().ok()) {
                        intent = intent.with_option("len", len);
                    }
                }
                _ => {}
            }
            Ok(intent)
        }
    );

    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_at_least_forty_kinds() {
        let registry = default_registry().unwrap();
        assert!(registry.len() >= 40);
    }

    #[test]
    fn login_scenario_parses() {
        let registry = default_registry().unwrap();
        let navigate = registry.parse(r#"Navigate to 'https://example.test/login'"#).unwrap();
        assert_eq!(navigate.kind, IntentKind::Navigate);

        let click = registry.parse("Click the Log On button").unwrap();
        assert_eq!(click.kind, IntentKind::Click);
        assert_eq!(click.target_description.as_deref(), Some("the Log On button"));
    }

    #[test]
    fn key_combo_parses() {
        let registry = default_registry().unwrap();
        let intent = registry.parse("Press Ctrl+Shift+Delete").unwrap();
        assert_eq!(intent.kind, IntentKind::PressKey);
        assert_eq!(
            intent.value,
            Some(IntentValue::KeyCombo(vec![
                "Control".to_string(),
                "Shift".to_string(),
                "Delete".to_string()
            ]))
        );
    }

    #[test]
    fn table_cell_assertion_parses() {
        let registry = default_registry().unwrap();
        let intent = registry
            .parse(r#"Verify row 1 column 'Trigger Name' of the Job Triggers table is 'DataSyncJobTrigger'"#)
            .unwrap();
        assert_eq!(intent.kind, IntentKind::VerifyTableCell);
        assert_eq!(intent.options.get_str("column"), Some("Trigger Name"));
    }

    #[test]
    fn get_table_cell_and_column_parse() {
        let registry = default_registry().unwrap();
        let cell = registry.parse(r#"Get row 2 column 'Status' of the Job Triggers table"#).unwrap();
        assert_eq!(cell.kind, IntentKind::GetTableCell);
        assert_eq!(cell.options.get_str("column"), Some("Status"));

        let column = registry.parse(r#"Get column 'Status' of the Job Triggers table"#).unwrap();
        assert_eq!(column.kind, IntentKind::GetTableColumn);
        assert_eq!(column.options.get_str("column"), Some("Status"));
    }

    #[test]
    fn generate_random_int_parses_bounds() {
        let registry = default_registry().unwrap();
        let intent = registry.parse("generate random int 5 10").unwrap();
        assert_eq!(intent.kind, IntentKind::GenerateData);
        assert_eq!(intent.options.get_u64("lo", 99), 5);
        assert_eq!(intent.options.get_u64("hi", 99), 10);
    }

    #[test]
    fn generate_random_int_rejects_lo_greater_than_hi() {
        let registry = default_registry().unwrap();
        let err = registry.parse("generate random int 10 5").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseErrorKind::InvalidParameter { .. })));
    }

    #[test]
    fn generate_random_string_parses_length() {
        let registry = default_registry().unwrap();
        let intent = registry.parse("generate random string 12").unwrap();
        assert_eq!(intent.options.get_u64("len", 0), 12);
    }
}
