//! Positional `{name}` prompt templating (spec §4.2 step 1).

use std::collections::HashMap;

/// Renders `template` by substituting every `{key}` occurrence with its
/// value from `variables`. Unknown placeholders are left verbatim — the
/// caller is expected to supply every variable the template references.
pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < template.len() {
        if template.as_bytes()[i] == b'{' {
            if let Some(end) = template[i + 1..].find('}') {
                let key = &template[i + 1..i + 1 + end];
                if let Some(value) = variables.get(key) {
                    out.push_str(value);
                    i = i + 1 + end + 1;
                    continue;
                }
            }
        }
        let ch = template[i..].chars().next().expect("i is a char boundary");
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("wine_name".to_string(), "Grand Cru".to_string());
        vars.insert("style".to_string(), "classic".to_string());

        let rendered = render("Design a {style} label for {wine_name}.", &vars);
        assert_eq!(rendered, "Design a classic label for Grand Cru.");
    }

    #[test]
    fn leaves_unknown_placeholders_verbatim() {
        let vars = HashMap::new();
        let rendered = render("Hello {name}", &vars);
        assert_eq!(rendered, "Hello {name}");
    }
}
