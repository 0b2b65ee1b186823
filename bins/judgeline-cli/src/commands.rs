// CLI commands for Judgeline
use anyhow::{bail, Context, Result};
use judgeline_common::config::Config;
use judgeline_common::languages::{LanguageEntry, LanguageTable, LanguagesFile};
use judgeline_common::types::{BatchVerdict, TestCase};
use judgeline_engine::{GeminiGenerator, GenerationBackend, Harness, JdoodleEngine};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// A submission file as accepted by `run`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

fn default_language() -> String {
    "java".to_string()
}

fn load_submission(path: &Path) -> Result<Submission> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_language_table(config: &Config) -> Result<LanguageTable> {
    match &config.execution.languages_file {
        Some(path) => LanguageTable::load(path)
            .with_context(|| format!("Failed to load languages from {}", path.display())),
        None => Ok(LanguageTable::default()),
    }
}

fn build_harness(config: &Config) -> Result<Harness> {
    let languages = load_language_table(config)?;
    let engine = JdoodleEngine::new(&config.execution)?;
    Ok(Harness::new(Arc::new(engine), languages, &config.execution))
}

fn print_verdict(verdict: &BatchVerdict) {
    println!("→ Evaluated {} test cases", verdict.total_count);
    println!();

    for (idx, outcome) in verdict.outcomes.iter().enumerate() {
        if outcome.passed {
            println!("  Test {} ✓ passed", idx + 1);
        } else {
            println!("  Test {} ✗ failed", idx + 1);
            println!("    Input:    \"{}\"", outcome.input);
            println!("    Expected: \"{}\"", outcome.expected_output);
            println!("    Got:      \"{}\"", outcome.actual_output);
        }
    }

    println!();
    println!(
        "  Score: {} / {} ({:.2}%)",
        verdict.passed_count, verdict.total_count, verdict.score_percent
    );
}

/// Evaluate every test case of a submission file
pub async fn run_submission(path: &Path, json: bool) -> Result<()> {
    let submission = load_submission(path)?;
    let config = Config::from_env()?;
    let harness = build_harness(&config)?;

    let verdict = harness
        .run_batch(&submission.code, &submission.language, &submission.test_cases)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }
    Ok(())
}

/// Run a source file once and compare its output
pub async fn check(path: &Path, language: &str, expected: &str) -> Result<()> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = Config::from_env()?;
    let harness = build_harness(&config)?;

    let result = harness.run_with_expected(&code, language, expected).await?;

    println!("  Expected: \"{}\"", result.expected_output.trim());
    println!("  Got:      \"{}\"", result.actual_output);
    if let Some(cpu_time) = &result.cpu_time {
        println!("  CPU time: {}", cpu_time);
    }
    if let Some(memory) = &result.memory {
        println!("  Memory:   {}", memory);
    }

    if result.is_correct {
        println!("✓ Output matched");
        Ok(())
    } else {
        bail!("Output mismatch")
    }
}

/// Send one prompt to the generation backend
pub async fn generate(prompt: &str) -> Result<()> {
    let config = Config::from_env()?;
    let generator = GeminiGenerator::new(&config.generation)?;
    let text = generator.generate(prompt).await?;
    println!("{}", text);
    Ok(())
}

/// Print the effective language table
pub fn list_languages() -> Result<()> {
    let config = Config::from_env()?;
    let table = load_language_table(&config)?;

    println!("{:<12} VERSION INDEX", "LANGUAGE");
    for entry in table.entries() {
        println!("{:<12} {}", entry.name, entry.version_index);
    }
    println!();
    println!("Unknown languages use version index \"0\"");
    Ok(())
}

fn load_languages_file(path: &Path) -> Result<LanguagesFile> {
    if !path.exists() {
        return Ok(LanguagesFile::default());
    }

    let content = fs::read_to_string(path).context("Failed to read languages.json")?;
    serde_json::from_str(&content).context("Failed to parse languages.json")
}

fn save_languages_file(path: &Path, file: &LanguagesFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json_content =
        serde_json::to_string_pretty(file).context("Failed to serialize languages.json")?;
    fs::write(path, json_content).context("Failed to write languages.json")?;
    Ok(())
}

/// Add a language to languages.json, replacing its version index if present
pub fn add_language(path: &Path, name: &str, version_index: &str) -> Result<()> {
    let name = name.trim().to_lowercase();
    let version_index = version_index.trim();
    if name.is_empty() || version_index.is_empty() {
        bail!("Language name and version index cannot be empty");
    }

    let mut file = load_languages_file(path)?;

    match file.languages.iter_mut().find(|l| l.name.to_lowercase() == name) {
        Some(existing) => {
            println!(
                "Updating {}: version index {} → {}",
                name, existing.version_index, version_index
            );
            existing.version_index = version_index.to_string();
        }
        None => {
            println!("Adding {} with version index {}", name, version_index);
            file.languages.push(LanguageEntry {
                name: name.clone(),
                version_index: version_index.to_string(),
            });
        }
    }

    save_languages_file(path, &file)?;
    println!("✅ {} updated", path.display());
    Ok(())
}
