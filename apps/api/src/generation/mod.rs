//! Document generation — turns a job posting into tailored `.tex` documents
//! by prompting an external AI CLI and parsing its delimited output.

pub mod generator;
pub mod handlers;
pub mod output;
pub mod prompt;
pub mod slug;
