use secq_core::{
    AnonymizedView, AppViewModel, ComposerView, FileKind, FileRowView, Page, ResultsPanel,
    ResultsView, UploadListView,
};

const UPLOADS_TITLE: &str = "Uploaded documents";
const ANONYMIZED_TITLE: &str = "Anonymised documents";
const QUESTIONS_TITLE: &str = "Security questions";
const RESULTS_TITLE: &str = "Analysis results";
const CLEAR_HINT: &str = "Clear with `secq results --clear`.";

/// Text lines for the current page; empty before any page is loaded.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    match view.page {
        Some(Page::Upload) => render_uploads(&view.uploads, &mut lines),
        Some(Page::Questions) => {
            render_anonymized(&view.anonymized, &mut lines);
            lines.push(String::new());
            render_composer(&view.composer, &mut lines);
        }
        Some(Page::Results) | None => {}
    }
    if let Some(results) = &view.results {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        render_results(results, &mut lines);
    }
    lines
}

fn render_uploads(uploads: &UploadListView, lines: &mut Vec<String>) {
    lines.push(UPLOADS_TITLE.to_string());
    if uploads.drop_highlight {
        lines.push("  (drop files here)".to_string());
    }
    if uploads.files.is_empty() {
        lines.push("  No files uploaded yet.".to_string());
    }
    lines.extend(uploads.files.iter().map(file_line));
    if uploads.uploading > 0 {
        lines.push(format!("  Uploading {} file(s)...", uploads.uploading));
    }
}

fn render_anonymized(anonymized: &AnonymizedView, lines: &mut Vec<String>) {
    lines.push(ANONYMIZED_TITLE.to_string());
    match anonymized {
        AnonymizedView::Loading => lines.push("  Loading...".to_string()),
        AnonymizedView::Files(files) => lines.extend(files.iter().map(file_line)),
        AnonymizedView::Empty => lines.push(format!("  {}", secq_core::NO_ANONYMIZED_FILES)),
        AnonymizedView::Failed => lines.push(format!("  {}", secq_core::ANONYMIZED_FILES_ERROR)),
    }
}

fn render_composer(composer: &ComposerView, lines: &mut Vec<String>) {
    lines.push(QUESTIONS_TITLE.to_string());
    for (index, question) in composer.questions.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, question.text));
        for suggestion in question.suggestions.iter().flatten() {
            lines.push(format!("       > {suggestion}"));
        }
    }

    let model = if composer.free_model_select_visible {
        let name = composer
            .free_models
            .iter()
            .find(|model| model.value == composer.selected_free_model)
            .map_or(composer.selected_free_model.as_str(), |model| model.name);
        format!("Model: {name} (free)")
    } else {
        format!("Model: {} (API key required)", composer.model.value())
    };
    lines.push(model);

    let mut button = format!("[{}]", composer.run_button.label);
    if composer.spinner_visible {
        button.push_str(" ...");
    }
    lines.push(button);
}

/// The results panel, shared by the questions and results pages.
pub fn render_results(results: &ResultsView, lines: &mut Vec<String>) {
    lines.push(RESULTS_TITLE.to_string());
    match &results.panel {
        ResultsPanel::Empty { title, message } => {
            lines.push(format!("  {title}"));
            lines.push(format!("  {message}"));
        }
        ResultsPanel::Populated { summary, blocks } => {
            lines.push(format!("  {summary}"));
            for block in blocks {
                lines.push(String::new());
                lines.push(format!("  {}", block.heading));
                lines.push(format!("    Question: {}", block.question));
                lines.push(format!("    Answer:   {}", block.answer));
                lines.push(format!("    Source:   {}", block.source));
                lines.push(format!("    Citation: {}", block.citation));
            }
        }
    }
    if results.show_clear {
        lines.push(String::new());
        lines.push(CLEAR_HINT.to_string());
    }
}

fn file_line(file: &FileRowView) -> String {
    format!("  {:<6} {}", icon(file.kind), file.name)
}

fn icon(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Pdf => "[PDF]",
        FileKind::Eml => "[EML]",
        FileKind::Msg => "[MSG]",
        FileKind::Other => "[FILE]",
    }
}
