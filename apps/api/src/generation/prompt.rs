//! Prompt assembly — loads the prompt template from disk and fills in
//! placeholders. The template lives next to the project's documents so it
//! can be edited without touching code.

use std::path::Path;

use crate::errors::AppError;

/// Everything substituted into the prompt template.
pub struct PromptInputs<'a> {
    pub resume_content: &'a str,
    pub cover_letter_content: &'a str,
    pub company: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub slug: &'a str,
}

/// Reads the template at `path` and fills its `{{...}}` placeholders.
/// An unreadable template is a configuration error (500, no job created).
pub async fn build_prompt(path: &Path, inputs: PromptInputs<'_>) -> Result<String, AppError> {
    let template = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Template(format!(
            "Failed to read prompt template {}: {e}",
            path.display()
        ))
    })?;

    Ok(fill(&template, inputs))
}

fn fill(template: &str, inputs: PromptInputs<'_>) -> String {
    template
        .replace("{{RESUME_CONTENT}}", inputs.resume_content)
        .replace("{{COVER_LETTER_CONTENT}}", inputs.cover_letter_content)
        .replace("{{COMPANY}}", inputs.company)
        .replace("{{TITLE}}", inputs.title)
        .replace("{{DESCRIPTION}}", inputs.description)
        .replace("{{SLUG}}", inputs.slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_substitutes_every_placeholder() {
        let template = "Resume:\n{{RESUME_CONTENT}}\nLetter:\n{{COVER_LETTER_CONTENT}}\n\
                        Apply to {{COMPANY}} for {{TITLE}} ({{SLUG}}):\n{{DESCRIPTION}}";
        let filled = fill(
            template,
            PromptInputs {
                resume_content: "RES",
                cover_letter_content: "CL",
                company: "Acme",
                title: "Engineer",
                description: "Build things",
                slug: "acme",
            },
        );
        assert!(filled.contains("Resume:\nRES"));
        assert!(filled.contains("Letter:\nCL"));
        assert!(filled.contains("Apply to Acme for Engineer (acme):\nBuild things"));
        assert!(!filled.contains("{{"));
    }

    #[test]
    fn test_fill_replaces_repeated_placeholders() {
        let filled = fill(
            "{{SLUG}}/{{SLUG}}",
            PromptInputs {
                resume_content: "",
                cover_letter_content: "",
                company: "",
                title: "",
                description: "",
                slug: "acme",
            },
        );
        assert_eq!(filled, "acme/acme");
    }
}
