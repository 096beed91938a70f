use serde::Serialize;

/// Render-ready description of one step of the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub value: String,
    pub label: String,
    /// The committed value of the controlling field.
    pub is_current: bool,
    /// The step the user has selected. May coincide with `is_current`.
    pub is_active: bool,
    /// Ordered before the current value and not selected.
    pub is_complete: bool,
}

impl StepView {
    pub fn is_incomplete(&self) -> bool {
        !self.is_current && !self.is_active && !self.is_complete
    }
}

/// Guidance and key fields configured for the selected step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coaching<'a> {
    pub guidance: Option<&'a str>,
    pub key_fields: &'a [String],
}

impl Coaching<'_> {
    pub fn shows_guidance(&self) -> bool {
        self.guidance.is_some()
    }

    pub fn shows_key_fields(&self) -> bool {
        !self.key_fields.is_empty()
    }
}
