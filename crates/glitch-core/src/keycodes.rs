// ABOUTME: Character codes for the named keys the terminal cares about.
// ABOUTME: ENTER and TAB are the keys that set off a glitch.

pub const TAB: u32 = 9;
pub const ENTER: u32 = 13;
pub const ESCAPE: u32 = 27;
pub const BACKSPACE: u32 = 127;

/// Character code of the first character in `data`
pub fn first_code(data: &str) -> Option<u32> {
    data.chars().next().map(u32::from)
}

/// Whether a unit of input starts with a key that triggers a glitch
pub fn is_glitch_trigger(data: &str) -> bool {
    matches!(first_code(data), Some(ENTER) | Some(TAB))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_tab_trigger() {
        assert!(is_glitch_trigger("\r"));
        assert!(is_glitch_trigger("\t"));
        assert!(is_glitch_trigger("\rls -la"));
    }

    #[test]
    fn other_input_does_not_trigger() {
        assert!(!is_glitch_trigger("a"));
        assert!(!is_glitch_trigger(""));
        assert!(!is_glitch_trigger("\n"));
        assert!(!is_glitch_trigger("echo\r"));
    }

    #[test]
    fn first_code_reads_first_char() {
        assert_eq!(first_code("\x1b[A"), Some(ESCAPE));
        assert_eq!(first_code("\x7f"), Some(BACKSPACE));
        assert_eq!(first_code(""), None);
    }
}
