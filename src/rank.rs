use std::path::PathBuf;

/// One detected label and the provider's confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub description: String,
    pub confidence: f32,
}

impl Label {
    pub fn new(description: impl Into<String>, confidence: f32) -> Self {
        Self {
            description: description.into(),
            confidence,
        }
    }
}

/// Ranked labels for one file, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationResult {
    pub path: PathBuf,
    pub labels: Vec<Label>,
}

impl AnnotationResult {
    pub fn new(path: PathBuf, labels: Vec<Label>) -> Self {
        Self {
            path,
            labels: rank(labels),
        }
    }

    /// `<filename>: [label label ...]`
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.path.display(), render(&self.labels))
    }
}

/// Sort labels by ascending confidence. Equal confidences keep their
/// original order.
pub fn rank(mut labels: Vec<Label>) -> Vec<Label> {
    labels.sort_by(|a, b| a.confidence.total_cmp(&b.confidence));
    labels
}

/// Render descriptions as a bracketed, space-separated list.
pub fn render(labels: &[Label]) -> String {
    let descriptions: Vec<&str> = labels.iter().map(|l| l.description.as_str()).collect();
    format!("[{}]", descriptions.join(" "))
}
