//! Prompt construction for agent sessions.
//!
//! Preferences (`preferences.md` in the space) are always included.
//! Resources (`resources/*.md`) are included when keyword-relevant to the
//! task text, and any absolute paths they mention are collected so the
//! agent can be granted access to those directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use chai_core::config::{implementation_logs_dir, preferences_path, resources_dir};

/// Words shorter than this never count toward relevance.
const MIN_KEYWORD_LEN: usize = 4;

/// A fully built prompt plus the directories to grant the agent.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub prompt: String,
    pub add_dirs: Vec<String>,
}

/// Read `preferences.md` if present; unreadable is treated as absent.
#[must_use]
pub fn load_preferences(space: &Path) -> String {
    fs::read_to_string(preferences_path(space)).unwrap_or_default()
}

/// Keyword relevance of a resource to a task: any significant word of the
/// task text appears in the resource name or content.
#[must_use]
pub fn resource_is_relevant(task_text: &str, resource_name: &str, content: &str) -> bool {
    let haystack = format!(
        "{} {}",
        resource_name.to_lowercase(),
        content.to_lowercase()
    );
    significant_words(task_text)
        .iter()
        .any(|word| haystack.contains(word.as_str()))
}

fn significant_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Gather relevant resource sections and the paths they mention.
#[must_use]
pub fn load_relevant_resources(space: &Path, task_text: &str) -> (String, Vec<String>) {
    let dir = resources_dir(space);
    let Ok(entries) = fs::read_dir(&dir) else {
        return (String::new(), Vec::new());
    };

    let mut sections = Vec::new();
    let mut paths = BTreeSet::new();

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort();

    for file in files {
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        if resource_is_relevant(task_text, &name, &content) {
            debug!(resource = %name, "resource matched task");
            sections.push(format!(
                "## Context from {}\n{content}",
                file.file_name()
                    .map(|f| f.to_string_lossy().to_string())
                    .unwrap_or_default()
            ));
            for path in extract_paths(&content) {
                paths.insert(path);
            }
        }
    }

    (sections.join("\n\n"), paths.into_iter().collect())
}

/// Extract absolute directory paths mentioned in text.
///
/// Paths that point at files contribute their parent directory; paths
/// that do not exist are dropped.
#[must_use]
pub fn extract_paths(text: &str) -> Vec<String> {
    #[allow(clippy::unwrap_used)] // literal pattern, cannot fail to compile
    let pattern = Regex::new(r"(/[\w/.-]+)").unwrap();

    let mut dirs = BTreeSet::new();
    for capture in pattern.find_iter(text) {
        let path = Path::new(capture.as_str());
        if path.is_dir() {
            dirs.insert(capture.as_str().to_string());
        } else if path.is_file() {
            if let Some(parent) = path.parent() {
                dirs.insert(parent.to_string_lossy().to_string());
            }
        }
    }
    dirs.into_iter().collect()
}

/// Build the prompt sent to the agent for a task.
///
/// Planning mode asks for decomposition into small verified steps; do
/// mode asks for step-by-step completion.
#[must_use]
pub fn build_prompt(space: &Path, task_text: &str, planning: bool) -> BuiltPrompt {
    let preferences = load_preferences(space);
    let prefs_section = if preferences.is_empty() {
        String::new()
    } else {
        format!("\n\n# User Preferences\n{preferences}\n")
    };

    let (resources, add_dirs) = load_relevant_resources(space, task_text);
    let resources_section = if resources.is_empty() {
        String::new()
    } else {
        format!("\n\n# Relevant Context\n{resources}\n")
    };

    let prompt = if planning {
        format!(
            "I need help planning this task: {task_text}\n\
             {prefs_section}{resources_section}\n\
             This is a new type of task. Please:\n\
             1. Analyze what information is needed\n\
             2. Break it down into smaller, concrete steps\n\
             3. Suggest starting with the smallest possible first step\n\
             4. Ask clarifying questions if anything is unclear\n\
             \n\
             Be conservative - start small and verify the approach works before scaling up."
        )
    } else {
        format!(
            "Please help me complete this task: {task_text}\n\
             {prefs_section}{resources_section}\n\
             Work on this task step by step. If you need any clarification, ask me."
        )
    };

    BuiltPrompt { prompt, add_dirs }
}

/// Write the planning prompt to a dated log file and return its path.
///
/// # Errors
///
/// Returns an error when the log directory or file cannot be written.
pub fn save_planning_log(
    space: &Path,
    slug: &str,
    display_text: &str,
    prompt: &str,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let logs_dir = implementation_logs_dir(space);
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("failed to create {}", logs_dir.display()))?;

    let filename = format!("{}_plan_{slug}.md", now.format("%Y-%m-%d"));
    let log_file = logs_dir.join(filename);

    let content = format!(
        "# Planning: {display_text}\n\n\
         Started: {}\n\n\
         ## Prompt Sent to Agent\n\n\
         {prompt}\n\n\
         ## Planning Notes\n\n\
         (Add notes here after planning session)\n",
        now.format("%Y-%m-%d %H:%M"),
    );

    fs::write(&log_file, content)
        .with_context(|| format!("failed to write {}", log_file.display()))?;

    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, extract_paths, resource_is_relevant};
    use std::fs;

    #[test]
    fn relevance_matches_on_significant_words() {
        assert!(resource_is_relevant(
            "deploy the billing service",
            "billing-notes",
            "how invoices work"
        ));
        assert!(resource_is_relevant(
            "fix login timeout",
            "auth",
            "the login flow uses short-lived sessions"
        ));
        // Short words like "the" and "fix" never match on their own.
        assert!(!resource_is_relevant(
            "fix the bug",
            "cooking",
            "the best pasta recipes"
        ));
    }

    #[test]
    fn extract_paths_keeps_existing_directories_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sub = dir.path().join("project");
        fs::create_dir(&sub).expect("mkdir");
        let file = sub.join("notes.txt");
        fs::write(&file, "x").expect("write");

        let text = format!(
            "see {} and {} plus /definitely/not/a/real/path",
            sub.display(),
            file.display()
        );
        let paths = extract_paths(&text);

        // Both mentions collapse to the directory; the bogus path is gone.
        assert_eq!(paths, vec![sub.to_string_lossy().to_string()]);
    }

    #[test]
    fn build_prompt_includes_preferences_and_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("preferences.md"),
            "Always write tests first.",
        )
        .expect("write prefs");

        let planning = build_prompt(dir.path(), "refactor the scheduler", true);
        assert!(planning.prompt.contains("planning this task"));
        assert!(planning.prompt.contains("Always write tests first."));

        let doing = build_prompt(dir.path(), "refactor the scheduler", false);
        assert!(doing.prompt.contains("complete this task"));
    }

    #[test]
    fn build_prompt_pulls_in_matching_resources() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resources = dir.path().join("resources");
        fs::create_dir(&resources).expect("mkdir");
        fs::write(
            resources.join("scheduler.md"),
            "The scheduler design doc.",
        )
        .expect("write resource");
        fs::write(resources.join("unrelated.md"), "Grocery list.").expect("write resource");

        let built = build_prompt(dir.path(), "refactor the scheduler", false);
        assert!(built.prompt.contains("Context from scheduler.md"));
        assert!(!built.prompt.contains("Grocery list."));
    }
}
