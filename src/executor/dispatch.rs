//! Per-intent-kind contracts (spec §4.4): what actually happens against the
//! resolved handle (or the page, for page-level kinds) once an intent is
//! ready to run.

use serde_json::{json, Value as JsonValue};

use crate::context::ScenarioContext;
use crate::error::{Error, Result};
use crate::executor::http::HttpClient;
use crate::intent::{Intent, IntentKind, IntentOptionsExt, IntentValue};
use crate::resolver::page::{ElementHandle, Page, TextPredicate, UrlPredicate};

fn text_value(intent: &Intent) -> Result<&str> {
    match &intent.value {
        Some(IntentValue::Text(s)) => Ok(s.as_str()),
        _ => Err(Error::Internal(format!("{:?} requires a text value", intent.kind))),
    }
}

fn key_combo(intent: &Intent) -> Result<&[String]> {
    match &intent.value {
        Some(IntentValue::KeyCombo(keys)) => Ok(keys.as_slice()),
        _ => Err(Error::Internal(format!("{:?} requires a key combo value", intent.kind))),
    }
}

fn need_handle<'a>(handle: Option<&'a ElementHandle>, kind: IntentKind) -> Result<&'a ElementHandle> {
    handle.ok_or_else(|| Error::Internal(format!("{kind:?} requires a resolved element handle")))
}

fn url_predicate(intent: &Intent) -> UrlPredicate {
    match &intent.value {
        Some(IntentValue::Text(s)) if intent.options.get_bool("exact", false) => UrlPredicate::Equals(s.clone()),
        Some(IntentValue::Regex(r)) => UrlPredicate::Matches(r.clone()),
        Some(IntentValue::Text(s)) => UrlPredicate::Contains(s.clone()),
        _ => UrlPredicate::AnyChange,
    }
}

fn text_predicate(intent: &Intent) -> TextPredicate {
    match &intent.value {
        Some(IntentValue::Text(s)) if intent.options.get_bool("exact", false) => TextPredicate::Equals(s.clone()),
        Some(IntentValue::Regex(r)) => TextPredicate::Matches(r.clone()),
        Some(IntentValue::Text(s)) => TextPredicate::Contains(s.clone()),
        _ => TextPredicate::AnyChange,
    }
}

fn assertion_failed(kind: IntentKind, expected: impl Into<String>, actual: impl Into<String>) -> Error {
    Error::AssertionFailed { kind: format!("{kind:?}"), expected: expected.into(), actual: actual.into() }
}

/// Resolve a table's `"column"` option (header name, e.g. `"Trigger Name"`)
/// to a numeric index by reading the header row, falling back to the
/// numeric `"col"` option when no header name was given (spec §3 "table
/// header mapping").
async fn resolve_column_index(page: &dyn Page, h: &ElementHandle, intent: &Intent) -> Result<u64> {
    let Some(name) = intent.options.get_str("column") else {
        return Ok(intent.options.get_u64("col", 0));
    };
    let headers = page
        .evaluate("Array.from(element.rows[0].cells).map(c => c.innerText.trim())", &[json!(h.0.clone())])
        .await?;
    let headers: Vec<String> = serde_json::from_value(headers).unwrap_or_default();
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .map(|i| i as u64)
        .ok_or_else(|| Error::Resolve(crate::error::ResolveErrorKind::NotFound(format!("table column {name:?}"))))
}

/// Generate a synthetic literal for `generate-data` (spec §4.1/§4.3:
/// `kind∈{uuid,timestamp,randomString(len),randomInt(lo,hi),randomEmail}`).
/// Non-deterministic but pure; a seed-configured deterministic mode is an
/// external collaborator's concern.
fn generate_data(kind: &str, intent: &Intent) -> JsonValue {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    match kind {
        "uuid" => json!(uuid::Uuid::new_v4().to_string()),
        "timestamp" => json!(chrono::Utc::now().to_rfc3339()),
        "random string" => {
            let len = intent.options.get_u64("len", 16) as usize;
            let s: String = (&mut rng)
                .sample_iter(rand::distributions::Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            json!(s)
        }
        "random int" => {
            let lo = intent.options.get("lo").and_then(JsonValue::as_i64).unwrap_or(0);
            let hi = intent.options.get("hi").and_then(JsonValue::as_i64).unwrap_or(lo);
            json!(rng.gen_range(lo..=hi))
        }
        "random email" => json!(format!("user{}@example.test", rng.gen_range(100000..999999))),
        _ => json!(uuid::Uuid::new_v4().to_string()),
    }
}

/// Run one intent once against `page`/`handle`. Assertions return
/// `Err(Error::AssertionFailed)` on a failed predicate rather than any other
/// error kind, so the retry wrapper in `executor::run` can distinguish
/// "still waiting" from a hard failure. Queries return `Ok(Some(value))`.
pub async fn run_once(
    page: &dyn Page,
    http: Option<&dyn HttpClient>,
    scenario: &ScenarioContext,
    intent: &Intent,
    handle: Option<&ElementHandle>,
) -> Result<Option<JsonValue>> {
    use IntentKind::*;

    match intent.kind {
        // --- Action family ---
        Navigate => {
            let url = match &intent.value {
                Some(IntentValue::Url(u)) | Some(IntentValue::Text(u)) => u.clone(),
                _ => return Err(Error::Internal("navigate requires a url value".to_string())),
            };
            page.goto(&url).await?;
            Ok(None)
        }
        Click => {
            page.click(need_handle(handle, Click)?, false).await?;
            Ok(None)
        }
        Type => {
            page.type_text(need_handle(handle, Type)?, text_value(intent)?, true).await?;
            Ok(None)
        }
        Select => {
            page.select_option(need_handle(handle, Select)?, text_value(intent)?).await?;
            Ok(None)
        }
        Hover => {
            page.hover(need_handle(handle, Hover)?).await?;
            Ok(None)
        }
        Scroll => {
            page.scroll_into_view(need_handle(handle, Scroll)?).await?;
            Ok(None)
        }
        PressKey => {
            page.press_key(handle, key_combo(intent)?).await?;
            Ok(None)
        }
        WaitSeconds => {
            let ms = match &intent.value {
                Some(IntentValue::Int(n)) => (*n as u64).saturating_mul(1000),
                Some(IntentValue::Float(n)) => (*n * 1000.0) as u64,
                _ => return Err(Error::Internal("wait-seconds requires a numeric value".to_string())),
            };
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
            Ok(None)
        }
        WaitUrlChange => {
            let changed = page.wait_url_change(url_predicate(intent), intent.options.get_u64("timeout_ms", 5_000)).await?;
            if changed {
                Ok(None)
            } else {
                Err(Error::Timeout("url did not change in time".to_string()))
            }
        }
        WaitTextChange => {
            let h = need_handle(handle, WaitTextChange)?;
            let changed = page.wait_text_change(h, text_predicate(intent), intent.options.get_u64("timeout_ms", 5_000)).await?;
            if changed {
                Ok(None)
            } else {
                Err(Error::Timeout("text did not change in time".to_string()))
            }
        }
        SwitchTab => {
            page.switch_tab(text_value(intent)?).await?;
            Ok(None)
        }
        OpenNewTab => {
            let url = match &intent.value {
                Some(IntentValue::Url(u)) | Some(IntentValue::Text(u)) => Some(u.as_str()),
                _ => None,
            };
            page.open_new_tab(url).await?;
            Ok(None)
        }
        CloseTab => {
            let selector = match &intent.value {
                Some(IntentValue::Text(s)) => Some(s.as_str()),
                _ => None,
            };
            page.close_tab(selector).await?;
            Ok(None)
        }
        SwitchBrowser => Err(Error::Integration(
            "switching browser profiles requires an external session manager".to_string(),
        )),
        ClearSession => {
            page.clear_cookies().await?;
            page.clear_storage().await?;
            Ok(None)
        }
        SwitchFrame => {
            page.switch_frame(text_value(intent)?).await?;
            Ok(None)
        }
        SwitchMainFrame => {
            page.switch_main_frame().await?;
            Ok(None)
        }
        SetVariable => {
            let name = intent
                .options
                .get_str("name")
                .ok_or_else(|| Error::Internal("set-variable requires a variable name".to_string()))?;
            scenario.set(name, text_value(intent)?);
            Ok(None)
        }
        TakeScreenshot => {
            let path = page.screenshot(handle).await?;
            Ok(Some(json!(path)))
        }
        ClearCookies => {
            page.clear_cookies().await?;
            Ok(None)
        }
        SetCookie => {
            let name = intent.options.get_str("key").unwrap_or_default();
            page.set_cookie(name, text_value(intent)?).await?;
            Ok(None)
        }
        SetStorageItem => {
            let key = intent.options.get_str("key").unwrap_or_default();
            page.set_storage_item(key, text_value(intent)?).await?;
            Ok(None)
        }
        ClearStorage => {
            page.clear_storage().await?;
            Ok(None)
        }
        Upload => {
            page.upload(need_handle(handle, Upload)?, text_value(intent)?).await?;
            Ok(None)
        }
        ApiCall => {
            let http = http.ok_or_else(|| Error::Integration("no HTTP client capability configured".to_string()))?;
            let method = intent.options.get_str("method").unwrap_or("GET");
            let url = text_value(intent)?;
            http.call(method, url, None).await?;
            Ok(None)
        }
        ExecuteJs => {
            let result = page.evaluate(text_value(intent)?, &[]).await?;
            Ok(Some(result))
        }

        // --- Assertion family ---
        VerifyVisible => {
            let h = need_handle(handle, VerifyVisible)?;
            if page.wait_for_visible(h, 0).await? {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyVisible, "visible", "hidden"))
            }
        }
        VerifyHidden => {
            let h = need_handle(handle, VerifyHidden)?;
            if page.wait_for_hidden(h, 0).await? {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyHidden, "hidden", "visible"))
            }
        }
        VerifyText => {
            let h = need_handle(handle, VerifyText)?;
            let actual = page.features_of(h).await?.text.visible_text;
            let expected = text_value(intent)?;
            if actual == expected {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyText, expected, actual))
            }
        }
        VerifyContains => {
            let h = need_handle(handle, VerifyContains)?;
            let actual = page.features_of(h).await?.text.visible_text;
            let expected = text_value(intent)?;
            if actual.contains(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyContains, expected, actual))
            }
        }
        VerifyValue => {
            let h = need_handle(handle, VerifyValue)?;
            let actual = page.evaluate("element.value", &[json!(h.0.clone())]).await?;
            let expected = text_value(intent)?;
            if actual.as_str() == Some(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyValue, expected, actual.to_string()))
            }
        }
        VerifyEnabled => {
            let h = need_handle(handle, VerifyEnabled)?;
            let features = page.features_of(h).await?;
            if !features.structural.attributes.contains("disabled") {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyEnabled, "enabled", "disabled"))
            }
        }
        VerifyChecked => {
            let h = need_handle(handle, VerifyChecked)?;
            let features = page.features_of(h).await?;
            let checked = features.structural.attributes.contains("checked");
            let expected = intent.options.get_bool("checked", true);
            if checked == expected {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyChecked, expected.to_string(), checked.to_string()))
            }
        }
        VerifyCount => {
            let actual = page.query_accessible().await?.len() as i64;
            let expected = match &intent.value {
                Some(IntentValue::Int(n)) => *n,
                _ => return Err(Error::Internal("verify-count requires an integer value".to_string())),
            };
            if actual == expected {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyCount, expected.to_string(), actual.to_string()))
            }
        }
        VerifyUrl => {
            let actual = page.url().await?;
            let expected = text_value(intent)?;
            if actual.contains(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyUrl, expected, actual))
            }
        }
        VerifyTitle => {
            let actual = page.title().await?;
            let expected = text_value(intent)?;
            if actual == expected {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyTitle, expected, actual))
            }
        }
        VerifyAttribute => {
            let h = need_handle(handle, VerifyAttribute)?;
            let attr = intent.options.get_str("attribute").unwrap_or_default();
            let script = format!("element.getAttribute({attr:?})");
            let actual = page.evaluate(&script, &[json!(h.0.clone())]).await?;
            let expected = text_value(intent)?;
            if actual.as_str() == Some(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyAttribute, expected, actual.to_string()))
            }
        }
        VerifyCss => {
            let h = need_handle(handle, VerifyCss)?;
            let property = intent.options.get_str("property").unwrap_or_default();
            let script = format!("getComputedStyle(element).getPropertyValue({property:?})");
            let actual = page.evaluate(&script, &[json!(h.0.clone())]).await?;
            let expected = text_value(intent)?;
            if actual.as_str() == Some(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyCss, expected, actual.to_string()))
            }
        }
        VerifyMatches => {
            let h = need_handle(handle, VerifyMatches)?;
            let actual = page.features_of(h).await?.text.visible_text;
            let pattern = text_value(intent)?;
            let re = regex::Regex::new(pattern)?;
            if re.is_match(&actual) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyMatches, pattern, actual))
            }
        }
        VerifySelectedOption => {
            let h = need_handle(handle, VerifySelectedOption)?;
            let actual = page.evaluate("element.value", &[json!(h.0.clone())]).await?;
            let expected = text_value(intent)?;
            if actual.as_str() == Some(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifySelectedOption, expected, actual.to_string()))
            }
        }
        VerifyDropdownOptions => {
            let h = need_handle(handle, VerifyDropdownOptions)?;
            let actual = page.evaluate("Array.from(element.options).map(o => o.value)", &[json!(h.0.clone())]).await?;
            let expected = match &intent.value {
                Some(IntentValue::Json(v)) => v.clone(),
                Some(IntentValue::Text(s)) => json!(s.split(',').map(str::trim).collect::<Vec<_>>()),
                _ => return Err(Error::Internal("verify-dropdown-options requires a value".to_string())),
            };
            if actual == expected {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyDropdownOptions, expected.to_string(), actual.to_string()))
            }
        }
        VerifyUrlParam => {
            let name = intent.options.get_str("param").unwrap_or_default();
            let url = page.url().await?;
            let actual = parse_url_param(&url, name);
            let expected = text_value(intent)?;
            if actual.as_deref() == Some(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyUrlParam, expected, actual.unwrap_or_default()))
            }
        }
        VerifyTableCell => {
            let h = need_handle(handle, VerifyTableCell)?;
            let row = intent.options.get_u64("row", 0);
            let col = resolve_column_index(page, h, intent).await?;
            let script = format!("element.rows[{row}].cells[{col}].innerText");
            let actual = page.evaluate(&script, &[json!(h.0.clone())]).await?;
            let expected = text_value(intent)?;
            if actual.as_str() == Some(expected) {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyTableCell, expected, actual.to_string()))
            }
        }
        VerifyDownload => {
            let name = text_value(intent)?;
            if page.download_path(name).await?.is_some() {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyDownload, "present", "absent"))
            }
        }
        VerifyDownloadContent => {
            let name = intent.options.get_str("file").unwrap_or_default();
            let path = page.download_path(name).await?;
            let expected = text_value(intent)?;
            match path {
                Some(p) if p.contains(expected) => Ok(None),
                Some(p) => Err(assertion_failed(VerifyDownloadContent, expected, p)),
                None => Err(assertion_failed(VerifyDownloadContent, expected, "no download")),
            }
        }
        VerifyApiResponse => {
            let http = http.ok_or_else(|| Error::Integration("no HTTP client capability configured".to_string()))?;
            let method = intent.options.get_str("method").unwrap_or("GET");
            let url = text_value(intent)?;
            let response = http.call(method, url, None).await?;
            let expected_status = intent.options.get_u64("status", 200) as u16;
            if response.status == expected_status {
                Ok(None)
            } else {
                Err(assertion_failed(VerifyApiResponse, expected_status.to_string(), response.status.to_string()))
            }
        }

        // --- Query family ---
        GetText => {
            let h = need_handle(handle, GetText)?;
            Ok(Some(json!(page.features_of(h).await?.text.visible_text)))
        }
        GetValue => {
            let h = need_handle(handle, GetValue)?;
            Ok(Some(page.evaluate("element.value", &[json!(h.0.clone())]).await?))
        }
        GetAttribute => {
            let h = need_handle(handle, GetAttribute)?;
            let attr = intent.options.get_str("attribute").unwrap_or_default();
            let script = format!("element.getAttribute({attr:?})");
            Ok(Some(page.evaluate(&script, &[json!(h.0.clone())]).await?))
        }
        GetCount => Ok(Some(json!(page.query_accessible().await?.len()))),
        GetList => {
            let nodes = page.query_accessible().await?;
            Ok(Some(json!(nodes.into_iter().map(|n| n.visible_text).collect::<Vec<_>>())))
        }
        GetUrl => Ok(Some(json!(page.url().await?))),
        GetTitle => Ok(Some(json!(page.title().await?))),
        CheckExists => {
            // A resolved handle already means the ladder found a candidate;
            // the resolver's `NotFound` error is what signals absence, and
            // this arm only runs once resolution already succeeded.
            Ok(Some(json!(handle.is_some())))
        }
        GetUrlParam => {
            let name = intent.options.get_str("param").unwrap_or_default();
            let url = page.url().await?;
            Ok(Some(json!(parse_url_param(&url, name))))
        }
        GetTableData => {
            let h = need_handle(handle, GetTableData)?;
            Ok(Some(page.evaluate("Array.from(element.rows).map(r => Array.from(r.cells).map(c => c.innerText))", &[json!(h.0.clone())]).await?))
        }
        GetTableCell => {
            let h = need_handle(handle, GetTableCell)?;
            let row = intent.options.get_u64("row", 0);
            let col = resolve_column_index(page, h, intent).await?;
            let script = format!("element.rows[{row}].cells[{col}].innerText");
            Ok(Some(page.evaluate(&script, &[json!(h.0.clone())]).await?))
        }
        GetTableColumn => {
            let h = need_handle(handle, GetTableColumn)?;
            let col = resolve_column_index(page, h, intent).await?;
            let script = format!("Array.from(element.rows).map(r => r.cells[{col}].innerText)");
            Ok(Some(page.evaluate(&script, &[json!(h.0.clone())]).await?))
        }
        GetTableRowCount => {
            let h = need_handle(handle, GetTableRowCount)?;
            Ok(Some(page.evaluate("element.rows.length", &[json!(h.0.clone())]).await?))
        }
        GenerateData => {
            let kind = intent.options.get_str("kind").unwrap_or("uuid").to_string();
            Ok(Some(generate_data(&kind, intent)))
        }
        GetCookie => {
            let name = text_value(intent)?;
            Ok(Some(json!(page.get_cookie(name).await?)))
        }
        GetStorageItem => {
            let key = text_value(intent)?;
            Ok(Some(json!(page.get_storage_item(key).await?)))
        }
        GetDownloadPath => {
            let name = text_value(intent)?;
            Ok(Some(json!(page.download_path(name).await?)))
        }
        GetApiResponse => {
            let http = http.ok_or_else(|| Error::Integration("no HTTP client capability configured".to_string()))?;
            let method = intent.options.get_str("method").unwrap_or("GET");
            let url = text_value(intent)?;
            let response = http.call(method, url, None).await?;
            Ok(Some(json!({ "status": response.status, "body": response.body })))
        }
        EvaluateJs => Ok(Some(page.evaluate(text_value(intent)?, &[]).await?)),
    }
}

fn parse_url_param(url: &str, name: &str) -> Option<String> {
    let query = url.split('?').nth(1)?;
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        if key == name {
            Some(parts.next().unwrap_or_default().to_string())
        } else {
            None
        }
    })
}
