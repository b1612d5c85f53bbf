//! Failure diagnostics (spec §4.4: "On failure, capture a diagnostic
//! record"), built with the same chained-builder shape the teacher uses for
//! its confidence breakdowns.

/// Everything attached to a step's outcome for later debugging: what ran,
/// how long it took, whether healing kicked in, and a screenshot if the
/// configured [`crate::config::ScreenshotPolicy`] calls for one.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticRecord {
    pub instruction_text: String,
    pub intent_kind: String,
    pub target_description: Option<String>,
    pub page_url: Option<String>,
    pub screenshot_path: Option<String>,
    pub healing_attempts: usize,
    pub healing_strategy: Option<String>,
    pub duration_ms: u64,
    pub error_message: Option<String>,
}

#[derive(Debug, Default)]
pub struct DiagnosticRecordBuilder {
    record: DiagnosticRecord,
}

impl DiagnosticRecordBuilder {
    pub fn new(instruction_text: impl Into<String>, intent_kind: impl Into<String>) -> Self {
        Self {
            record: DiagnosticRecord {
                instruction_text: instruction_text.into(),
                intent_kind: intent_kind.into(),
                ..Default::default()
            },
        }
    }

    pub fn target(mut self, target: Option<String>) -> Self {
        self.record.target_description = target;
        self
    }

    pub fn page_url(mut self, url: Option<String>) -> Self {
        self.record.page_url = url;
        self
    }

    pub fn screenshot(mut self, path: Option<String>) -> Self {
        self.record.screenshot_path = path;
        self
    }

    pub fn healing(mut self, attempts: usize, strategy: Option<String>) -> Self {
        self.record.healing_attempts = attempts;
        self.record.healing_strategy = strategy;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.record.duration_ms = duration_ms;
        self
    }

    pub fn error(mut self, message: Option<String>) -> Self {
        self.record.error_message = message;
        self
    }

    pub fn build(self) -> DiagnosticRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_in_fields() {
        let record = DiagnosticRecordBuilder::new("Click the Submit button", "click")
            .target(Some("the Submit button".to_string()))
            .healing(2, Some("alternative-locators".to_string()))
            .duration_ms(120)
            .build();
        assert_eq!(record.instruction_text, "Click the Submit button");
        assert_eq!(record.healing_attempts, 2);
        assert_eq!(record.healing_strategy.as_deref(), Some("alternative-locators"));
    }
}
