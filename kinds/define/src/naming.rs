//! Name conversions shared by the model and the generator.

/// Uppercases the first character of `name`, leaving the rest untouched.
///
/// ## Examples
///
/// ```
/// use kinds_define::naming::capitalize;
///
/// assert_eq!(capitalize("widget"), "Widget");
/// assert_eq!(capitalize("hostName"), "HostName");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_single_char() {
        assert_eq!(capitalize("a"), "A");
    }

    #[test]
    fn capitalize_keeps_existing_case() {
        assert_eq!(capitalize("ID"), "ID");
        assert_eq!(capitalize("podSecurityPolicy"), "PodSecurityPolicy");
    }

    #[test]
    fn capitalize_non_ascii() {
        assert_eq!(capitalize("ärger"), "Ärger");
    }
}
