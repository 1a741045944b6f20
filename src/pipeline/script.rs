//! Structured script produced by the generation stage.
//!
//! The model is asked for a JSON object; what comes back is sometimes wrapped
//! in a Markdown code fence or surrounded by a sentence of prose, so parsing
//! first isolates the outermost `{ ... }` block before deserializing and
//! validating it.

use serde::{Deserialize, Serialize};

use crate::error::{HookyError, Result};

/// Every generated script carries exactly this many hook variants.
pub const HOOK_COUNT: usize = 7;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Hook {
    /// Hook style label, e.g. "Curiosity" or "Controversy".
    pub category: String,
    pub text: String,
    /// Display glyph shown next to the hook card.
    pub emoji: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptSections {
    pub conflict: String,
    pub climax: String,
    pub solution: String,
    #[serde(alias = "callToAction")]
    pub cta: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptMetadata {
    /// Human-readable estimate such as "45-60s".
    pub duration: String,
    pub tone: String,
    pub platform: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratedScript {
    pub hooks: Vec<Hook>,
    pub sections: ScriptSections,
    pub metadata: ScriptMetadata,
}

impl GeneratedScript {
    /// Check the shape the UI depends on. Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.hooks.len() != HOOK_COUNT {
            return Err(HookyError::pipeline(format!(
                "expected {} hooks, got {}",
                HOOK_COUNT,
                self.hooks.len()
            )));
        }
        for (i, hook) in self.hooks.iter().enumerate() {
            if hook.text.trim().is_empty() {
                return Err(HookyError::pipeline(format!("hook {} has no text", i + 1)));
            }
            if hook.category.trim().is_empty() {
                return Err(HookyError::pipeline(format!(
                    "hook {} has no category",
                    i + 1
                )));
            }
        }

        let sections = [
            ("conflict", &self.sections.conflict),
            ("climax", &self.sections.climax),
            ("solution", &self.sections.solution),
            ("cta", &self.sections.cta),
        ];
        if let Some((name, _)) = sections.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(HookyError::pipeline(format!("section '{}' is empty", name)));
        }

        let metadata = [
            ("duration", &self.metadata.duration),
            ("tone", &self.metadata.tone),
            ("platform", &self.metadata.platform),
        ];
        if let Some((name, _)) = metadata.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(HookyError::pipeline(format!("metadata '{}' is missing", name)));
        }
        Ok(())
    }
}

/// Parse and validate the raw completion text from the generation stage.
pub fn parse_generated_script(raw: &str) -> Result<GeneratedScript> {
    let json = isolate_json_object(raw)
        .ok_or_else(|| HookyError::pipeline("the generated script was not valid JSON"))?;
    let script: GeneratedScript = serde_json::from_str(json)
        .map_err(|e| HookyError::pipeline(format!("could not read the generated script: {}", e)))?;
    script.validate()?;
    Ok(script)
}

/// Slice out the outermost JSON object, skipping fences and prose around it.
fn isolate_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

#[cfg(test)]
pub(crate) fn sample_script() -> GeneratedScript {
    let hooks = (1..=HOOK_COUNT)
        .map(|i| Hook {
            category: format!("Style {}", i),
            text: format!("Hook number {}", i),
            emoji: "🔥".to_string(),
        })
        .collect();
    GeneratedScript {
        hooks,
        sections: ScriptSections {
            conflict: "Nobody watches past three seconds.".to_string(),
            climax: "Then I changed the first line.".to_string(),
            solution: "Lead with the payoff.".to_string(),
            cta: "Follow for part two.".to_string(),
        },
        metadata: ScriptMetadata {
            duration: "45-60s".to_string(),
            tone: "energetic".to_string(),
            platform: "reels".to_string(),
        },
    }
}
