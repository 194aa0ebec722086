//! Prompt text for the direct, extraction, and synthesis calls.

use crate::models::PartialAnalysis;

/// System prompt for the single direct summarization call.
pub const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a code repository analyst. You will receive the directory tree and key files \
from a GitHub repository. Produce a structured analysis of it.

Respond with a JSON object containing exactly these fields:
- \"summary\": A clear, human-readable description of what this project does. 2-4 sentences. \
Start with the project name in bold markdown.
- \"technologies\": An array of strings listing the main languages, frameworks, libraries, and \
tools used. Be specific (e.g. \"Axum\" rather than just \"Rust\"). Include only technologies \
the project actually uses.
- \"structure\": A brief description of how the project is organized. Mention key directories \
and their purposes. 1-3 sentences.

Respond ONLY with the JSON object, no markdown fences, no extra text.";

/// System prompt for one map-step extraction over a chunk of files.
pub const EXTRACT_SYSTEM_PROMPT: &str = "\
You are analyzing a portion of a GitHub repository's source code. Extract the key \
information from these files.

Respond with a JSON object:
- \"purpose\": What does the code in these files do? 1-2 sentences.
- \"technologies\": Array of specific technologies, libraries, and frameworks seen in these files.
- \"structure_notes\": Any notable structural patterns. 1 sentence.

Respond ONLY with the JSON object, no markdown fences, no extra text.";

/// System prompt for the reduce step.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "\
You are a code repository analyst. You will receive the directory tree of a GitHub \
repository, its README if it has one, and partial analyses of different sections of the \
codebase.

Synthesize everything into a single coherent analysis.

Respond with a JSON object containing exactly these fields:
- \"summary\": A clear, human-readable description of what this project does. 2-4 sentences. \
Start with the project name in bold markdown.
- \"technologies\": An array of strings listing ALL main languages, frameworks, libraries, and \
tools identified across the partial analyses. Deduplicate. Be specific.
- \"structure\": A brief description of how the project is organized. Mention key directories \
and their purposes. 1-3 sentences.

Respond ONLY with the JSON object, no markdown fences, no extra text.";

/// User prompt for the direct call.
pub fn summary_prompt(context: &str) -> String {
    format!("Analyze this GitHub repository:\n\n{context}")
}

/// Render partial analyses as numbered sections, preserving order.
pub fn format_partials(partials: &[PartialAnalysis]) -> String {
    partials
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "### Partial Analysis {}\nPurpose: {}\nTechnologies: {}\nStructure notes: {}\n",
                i + 1,
                or_na(&p.purpose),
                p.technologies.join(", "),
                or_na(&p.structure_notes),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for the reduce step.
pub fn synthesis_prompt(tree_and_readme: &str, partials: &[PartialAnalysis]) -> String {
    format!(
        "{tree_and_readme}\n\n## Partial Analyses\n\n{}",
        format_partials(partials)
    )
}

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() { "N/A" } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(purpose: &str, techs: &[&str]) -> PartialAnalysis {
        PartialAnalysis {
            purpose: purpose.to_string(),
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            structure_notes: String::new(),
        }
    }

    #[test]
    fn partials_are_numbered_in_order() {
        let text = format_partials(&[partial("first", &["Rust", "Tokio"]), partial("second", &[])]);
        let first = text.find("### Partial Analysis 1\nPurpose: first").unwrap();
        let second = text.find("### Partial Analysis 2\nPurpose: second").unwrap();
        assert!(first < second);
        assert!(text.contains("Technologies: Rust, Tokio\n"));
        assert!(text.contains("Structure notes: N/A\n"));
    }

    #[test]
    fn synthesis_prompt_layout() {
        let prompt = synthesis_prompt("TREE", &[partial("p", &[])]);
        assert!(prompt.starts_with("TREE\n\n## Partial Analyses\n\n### Partial Analysis 1"));
    }

    #[test]
    fn summary_prompt_wraps_context() {
        assert_eq!(summary_prompt("CTX"), "Analyze this GitHub repository:\n\nCTX");
    }
}
