//! The `Page` capability trait (spec §6): the abstraction any modern browser
//! automation library can satisfy. This crate implements no DOM engine of
//! its own — `Page` is the seam.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::resolver::features::ElementFeatures;

/// An opaque, live reference to a DOM element in the current page frame
/// (glossary: "Element handle").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

/// A node surfaced by an accessibility-tree query: enough to run the
/// resolver's ladder rungs 1-5 without extracting the full feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessibleNode {
    pub handle: ElementHandle,
    pub accessible_name: String,
    pub role: String,
    pub visible_text: String,
    pub attributes: std::collections::HashMap<String, String>,
    pub in_viewport: bool,
}

/// Predicate for `wait_url_change` (spec §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum UrlPredicate {
    AnyChange,
    Contains(String),
    Equals(String),
    Matches(String),
}

/// Predicate for `wait_text_change` (spec §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum TextPredicate {
    AnyChange,
    Equals(String),
    Contains(String),
    Matches(String),
}

/// The external page/browser-session capability the resolver and executor
/// consume (spec §6). An async trait so a real implementation can await
/// real I/O; this crate only ever holds `&dyn Page` or `Box<dyn Page>`.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;
    async fn url(&self) -> Result<String>;
    async fn title(&self) -> Result<String>;

    /// Accessibility-tree scan of all visible, interactive elements
    /// (resolver ladder rungs 1-5 and the feature-similarity candidate pool).
    async fn query_accessible(&self) -> Result<Vec<AccessibleNode>>;

    /// Extract the full feature vector for one candidate (ladder rung 6).
    async fn features_of(&self, handle: &ElementHandle) -> Result<ElementFeatures>;

    async fn click(&self, handle: &ElementHandle, force: bool) -> Result<()>;
    async fn type_text(&self, handle: &ElementHandle, text: &str, clear_first: bool) -> Result<()>;
    async fn press_key(&self, handle: Option<&ElementHandle>, combo: &[String]) -> Result<()>;
    async fn hover(&self, handle: &ElementHandle) -> Result<()>;
    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<()>;
    async fn select_option(&self, handle: &ElementHandle, value: &str) -> Result<()>;
    async fn upload(&self, handle: &ElementHandle, path: &str) -> Result<()>;

    async fn wait_for_visible(&self, handle: &ElementHandle, timeout_ms: u64) -> Result<bool>;
    async fn wait_for_hidden(&self, handle: &ElementHandle, timeout_ms: u64) -> Result<bool>;
    async fn wait_for_detached(&self, handle: &ElementHandle, timeout_ms: u64) -> Result<bool>;
    async fn wait_url_change(&self, predicate: UrlPredicate, timeout_ms: u64) -> Result<bool>;
    async fn wait_text_change(
        &self,
        handle: &ElementHandle,
        predicate: TextPredicate,
        timeout_ms: u64,
    ) -> Result<bool>;

    /// Evaluate `script` in page context. Callers that need the script bound
    /// to a specific element pass its handle id as `args[0]`; by convention
    /// the script may then refer to it as `element` (mirroring how
    /// element-scoped evaluate works in mainstream browser automation APIs).
    async fn evaluate(&self, script: &str, args: &[JsonValue]) -> Result<JsonValue>;
    async fn screenshot(&self, handle: Option<&ElementHandle>) -> Result<String>;

    async fn set_cookie(&self, name: &str, value: &str) -> Result<()>;
    async fn clear_cookies(&self) -> Result<()>;
    async fn get_cookie(&self, name: &str) -> Result<Option<String>>;
    async fn set_storage_item(&self, key: &str, value: &str) -> Result<()>;
    async fn clear_storage(&self) -> Result<()>;
    async fn get_storage_item(&self, key: &str) -> Result<Option<String>>;

    async fn switch_tab(&self, selector: &str) -> Result<()>;
    async fn open_new_tab(&self, url: Option<&str>) -> Result<()>;
    async fn close_tab(&self, selector: Option<&str>) -> Result<()>;
    async fn switch_frame(&self, selector: &str) -> Result<()>;
    async fn switch_main_frame(&self) -> Result<()>;

    async fn download_path(&self, name: &str) -> Result<Option<String>>;
}
