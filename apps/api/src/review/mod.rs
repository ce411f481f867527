//! Review & compile — serves generated documents back for editing, drives
//! PDF compilation, and records completed applications.

pub mod handlers;
pub mod latex;

/// Derived document names for a job slug.
pub fn resume_tex(slug: &str) -> String {
    format!("resume-{slug}.tex")
}

pub fn cover_letter_tex(slug: &str) -> String {
    format!("cover-letter-{slug}.tex")
}

pub fn resume_pdf(slug: &str) -> String {
    format!("resume-{slug}.pdf")
}

pub fn cover_letter_pdf(slug: &str) -> String {
    format!("cover-letter-{slug}.pdf")
}

pub const EMAIL_DRAFT_FILE: &str = "email-draft.md";
