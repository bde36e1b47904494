use std::fmt;

use crate::language::TargetLanguage;

/// What the model is asked to do with the media.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaskSelection {
    #[default]
    Summary,
    FullTranscription,
    MainPoints,
    BriefExplanation,
}

const INSTRUCTIONS: [(TaskSelection, &str); 4] = [
    (
        TaskSelection::Summary,
        "Summarize this video in a few concise paragraphs.",
    ),
    (
        TaskSelection::FullTranscription,
        "Transcribe the full audio of this video word for word.",
    ),
    (
        TaskSelection::MainPoints,
        "What are the key points or takeaways from this video?",
    ),
    (
        TaskSelection::BriefExplanation,
        "Briefly explain what this video is about in two or three sentences.",
    ),
];

impl TaskSelection {
    pub const ALL: [TaskSelection; 4] = [
        TaskSelection::Summary,
        TaskSelection::FullTranscription,
        TaskSelection::MainPoints,
        TaskSelection::BriefExplanation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskSelection::Summary => "Summary",
            TaskSelection::FullTranscription => "Full transcription",
            TaskSelection::MainPoints => "Main points",
            TaskSelection::BriefExplanation => "Brief explanation",
        }
    }

    /// Base instruction sent to the model for this task.
    pub fn instruction(&self) -> &'static str {
        INSTRUCTIONS
            .iter()
            .find(|(task, _)| task == self)
            .map(|(_, text)| *text)
            .unwrap_or(INSTRUCTIONS[0].1)
    }

    /// Parses a task label. Case, spaces, dashes and underscores are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "summary" => Some(TaskSelection::Summary),
            "fulltranscription" | "transcription" => Some(TaskSelection::FullTranscription),
            "mainpoints" => Some(TaskSelection::MainPoints),
            "briefexplanation" => Some(TaskSelection::BriefExplanation),
            _ => None,
        }
    }

    /// Like [`TaskSelection::from_label`], but unknown labels become `Summary`.
    pub fn from_label_or_default(label: &str) -> Self {
        Self::from_label(label).unwrap_or_else(|| {
            tracing::debug!(label, "unknown task label, falling back to summary");
            TaskSelection::default()
        })
    }
}

impl fmt::Display for TaskSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the full instruction for a task, adding a translation clause when
/// the target language is not the default.
pub fn build_instruction(task: TaskSelection, language: Option<TargetLanguage>) -> String {
    let base = task.instruction();
    match language {
        Some(lang) if !lang.is_default() => {
            format!("{} Then translate the output into {}.", base, lang.name())
        }
        _ => base.to_string(),
    }
}
