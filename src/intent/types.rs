//! The [`Intent`] data model (spec §3) and the closed set of intent kinds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, ParseErrorKind, Result};

/// Which of the three families an [`IntentKind`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentFamily {
    Action,
    Assertion,
    Query,
}

/// The closed set of intent kinds the engine understands.
///
/// This is a representative, fully-enumerated subset of the ~80 kinds
/// spec.md §3 describes by example rather than by exhaustive list; every
/// kind spec.md names explicitly is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentKind {
    // --- Action family ---
    Navigate,
    Click,
    Type,
    Select,
    Hover,
    Scroll,
    PressKey,
    WaitSeconds,
    WaitUrlChange,
    WaitTextChange,
    SwitchTab,
    OpenNewTab,
    CloseTab,
    SwitchBrowser,
    ClearSession,
    SwitchFrame,
    SwitchMainFrame,
    SetVariable,
    TakeScreenshot,
    ClearCookies,
    SetCookie,
    SetStorageItem,
    ClearStorage,
    Upload,
    ApiCall,
    ExecuteJs,

    // --- Assertion family ---
    VerifyVisible,
    VerifyHidden,
    VerifyText,
    VerifyValue,
    VerifyEnabled,
    VerifyChecked,
    VerifyCount,
    VerifyContains,
    VerifyUrl,
    VerifyTitle,
    VerifyAttribute,
    VerifyCss,
    VerifyMatches,
    VerifySelectedOption,
    VerifyDropdownOptions,
    VerifyUrlParam,
    VerifyTableCell,
    VerifyDownload,
    VerifyDownloadContent,
    VerifyApiResponse,

    // --- Query family ---
    GetText,
    GetValue,
    GetAttribute,
    GetCount,
    GetList,
    GetUrl,
    GetTitle,
    CheckExists,
    GetUrlParam,
    GetTableData,
    GetTableCell,
    GetTableColumn,
    GetTableRowCount,
    GenerateData,
    GetCookie,
    GetStorageItem,
    GetDownloadPath,
    GetApiResponse,
    EvaluateJs,
}

impl IntentKind {
    pub fn family(self) -> IntentFamily {
        use IntentKind::*;
        match self {
            Navigate | Click | Type | Select | Hover | Scroll | PressKey | WaitSeconds
            | WaitUrlChange | WaitTextChange | SwitchTab | OpenNewTab | CloseTab
            | SwitchBrowser | ClearSession | SwitchFrame | SwitchMainFrame | SetVariable
            | TakeScreenshot | ClearCookies | SetCookie | SetStorageItem | ClearStorage
            | Upload | ApiCall | ExecuteJs => IntentFamily::Action,

            VerifyVisible | VerifyHidden | VerifyText | VerifyValue | VerifyEnabled
            | VerifyChecked | VerifyCount | VerifyContains | VerifyUrl | VerifyTitle
            | VerifyAttribute | VerifyCss | VerifyMatches | VerifySelectedOption
            | VerifyDropdownOptions | VerifyUrlParam | VerifyTableCell | VerifyDownload
            | VerifyDownloadContent | VerifyApiResponse => IntentFamily::Assertion,

            GetText | GetValue | GetAttribute | GetCount | GetList | GetUrl | GetTitle
            | CheckExists | GetUrlParam | GetTableData | GetTableCell | GetTableColumn
            | GetTableRowCount | GenerateData | GetCookie | GetStorageItem | GetDownloadPath
            | GetApiResponse | EvaluateJs => IntentFamily::Query,
        }
    }

    /// Page-level intents act on the page/session rather than a specific
    /// element; the resolver is bypassed entirely for these (spec §4.2,
    /// "Page-level intents").
    pub fn is_page_level(self) -> bool {
        use IntentKind::*;
        matches!(
            self,
            Navigate
                | WaitSeconds
                | WaitUrlChange
                | SwitchTab
                | OpenNewTab
                | CloseTab
                | SwitchBrowser
                | ClearSession
                | SwitchFrame
                | SwitchMainFrame
                | SetVariable
                | TakeScreenshot
                | ClearCookies
                | SetCookie
                | SetStorageItem
                | ClearStorage
                | ApiCall
                | ExecuteJs
                | VerifyUrl
                | VerifyTitle
                | VerifyApiResponse
                | GetUrl
                | GetTitle
                | GetUrlParam
                | GenerateData
                | GetCookie
                | GetStorageItem
                | GetDownloadPath
                | GetApiResponse
                | EvaluateJs
        )
    }

    /// Query-family kinds must be accompanied by a "store as" clause
    /// (spec §4.4, "A missing store-as clause is a parse error").
    pub fn requires_store_as(self) -> bool {
        self.family() == IntentFamily::Query
    }
}

/// A typed literal value carried by an [`Intent]` (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntentValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    KeyCombo(Vec<String>),
    Url(String),
    Regex(String),
    Json(JsonValue),
}

/// The `options` mapping recognised for a given intent kind (spec §3).
///
/// Kept as a generic JSON-valued map rather than one struct-per-kind: the
/// option set varies per kind and spec.md defines it by example, not by an
/// exhaustive per-kind schema.
pub type IntentOptions = HashMap<String, JsonValue>;

/// Helpers for reading typed values out of an [`IntentOptions`] map with a
/// default when the key is absent.
pub trait IntentOptionsExt {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_u64(&self, key: &str, default: u64) -> u64;
    fn get_str(&self, key: &str) -> Option<&str>;
}

impl IntentOptionsExt for IntentOptions {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(JsonValue::as_bool).unwrap_or(default)
    }

    fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(JsonValue::as_u64).unwrap_or(default)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }
}

/// The structured meaning of one natural-language instruction (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub target_description: Option<String>,
    pub value: Option<IntentValue>,
    pub options: IntentOptions,
    /// The name under which a query intent must store its result
    /// (the wire format's `and store as "<name>"` clause).
    pub store_as: Option<String>,
}

impl Intent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            target_description: None,
            value: None,
            options: IntentOptions::new(),
            store_as: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_description = Some(target.into());
        self
    }

    pub fn with_value(mut self, value: IntentValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_store_as(mut self, name: impl Into<String>) -> Self {
        self.store_as = Some(name.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Validate this intent's signature (spec §8, "Intent signature"):
    /// page-level kinds must not carry a target description, and query-family
    /// kinds must carry a store-as clause.
    pub fn validate_signature(&self) -> Result<()> {
        if self.kind.is_page_level() && self.target_description.is_some() {
            return Err(Error::Parse(ParseErrorKind::InvalidParameter {
                param: "targetDescription".to_string(),
                value: self.target_description.clone().unwrap_or_default(),
                reason: format!("{:?} is page-level and must not carry a target", self.kind),
            }));
        }
        if self.kind.requires_store_as() && self.store_as.is_none() {
            return Err(Error::Parse(ParseErrorKind::InvalidParameter {
                param: "storeAs".to_string(),
                value: String::new(),
                reason: format!("{:?} is a query and requires a store-as clause", self.kind),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_level_kinds_reject_targets() {
        let intent = Intent::new(IntentKind::Navigate).with_target("the Login button");
        assert!(intent.validate_signature().is_err());
    }

    #[test]
    fn query_kinds_require_store_as() {
        let intent = Intent::new(IntentKind::GetText).with_target("the heading");
        assert!(intent.validate_signature().is_err());
        let ok = intent.with_store_as("heading_text");
        assert!(ok.validate_signature().is_ok());
    }

    #[test]
    fn families_partition_kinds() {
        assert_eq!(IntentKind::Click.family(), IntentFamily::Action);
        assert_eq!(IntentKind::VerifyVisible.family(), IntentFamily::Assertion);
        assert_eq!(IntentKind::GetCount.family(), IntentFamily::Query);
    }
}
