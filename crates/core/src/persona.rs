//! Chat persona presets and system-prompt construction.

/// Built-in persona descriptions offered by the UI dropdown.
pub const PERSONA_PRESETS: &[&str] = &[
    "helpful general assistant",
    "expert in physics, including quantum physics",
    "funny and helpful teacher",
    "text proofreader",
    "kind and helpful primary school teacher, explaining in terms that a child can understand",
    "code assistant and code reviewer",
    "food recipes expert",
];

/// Topics that get the LaTeX-equation instruction appended.
const EQUATION_TOPICS: &[&str] = &["school", "physics", "math", "maths", "mathematics"];

/// Build the chat system prompt for a persona selection.
///
/// A non-empty `custom_role` overrides the preset. Personas touching
/// teaching or the exact sciences are told to emit equations as LaTeX
/// blocks; the proofreader persona gets its correction instruction.
pub fn system_prompt(preset: &str, custom_role: Option<&str>) -> String {
    let role = match custom_role {
        Some(custom) if !custom.is_empty() => custom,
        _ => preset,
    };
    let mut prompt = format!("You are {role}.");

    if EQUATION_TOPICS.iter().any(|t| prompt.contains(t)) {
        prompt.push_str(
            " If you answer with equations, write them as separate blocks in LaTeX and delimit them with $$.",
        );
    } else if preset.contains("proofreader") {
        prompt.push_str(" Proofread and correct this text: ");
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_role_overrides_preset() {
        let prompt = system_prompt(PERSONA_PRESETS[0], Some("pirate captain"));
        assert_eq!(prompt, "You are pirate captain.");
    }

    #[test]
    fn empty_custom_role_falls_back_to_preset() {
        let prompt = system_prompt("food recipes expert", Some(""));
        assert_eq!(prompt, "You are food recipes expert.");
    }

    #[test]
    fn physics_persona_gets_latex_instruction() {
        let prompt = system_prompt("expert in physics, including quantum physics", None);
        assert!(prompt.contains("LaTeX"));
    }

    #[test]
    fn custom_math_role_gets_latex_instruction() {
        let prompt = system_prompt(PERSONA_PRESETS[0], Some("maths tutor"));
        assert!(prompt.contains("LaTeX"));
    }

    #[test]
    fn proofreader_gets_correction_instruction() {
        let prompt = system_prompt("text proofreader", None);
        assert!(prompt.ends_with("Proofread and correct this text: "));
    }

    #[test]
    fn plain_persona_gets_no_addendum() {
        let prompt = system_prompt("helpful general assistant", None);
        assert_eq!(prompt, "You are helpful general assistant.");
    }
}
