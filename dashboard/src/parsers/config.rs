//! `config:show`

use crate::models::env_var::EnvironmentVariable;

/// Variables in report order; a repeated key keeps its first position and
/// takes the last value
pub fn parse_config(output: &str) -> Vec<EnvironmentVariable> {
    let mut vars: Vec<EnvironmentVariable> = Vec::new();

    for line in output.lines() {
        if line.starts_with('=') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.starts_with("====") || key.starts_with("----->") {
            continue;
        }

        let var = EnvironmentVariable::new(key, value.trim());
        match vars.iter_mut().find(|existing| existing.key == var.key) {
            Some(existing) => *existing = var,
            None => vars.push(var),
        }
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let output = "\
=====> blog env vars
DATABASE_URL:    postgres://u:p@dokku-postgres-db:5432/db
GREETING:        hello: world
SECRET_KEY:      abc123
";
        let vars = parse_config(output);
        let keys: Vec<&str> = vars.iter().map(|v| v.key.as_str()).collect();

        assert_eq!(keys, vec!["DATABASE_URL", "GREETING", "SECRET_KEY"]);
        assert_eq!(vars[0].value, "postgres://u:p@dokku-postgres-db:5432/db");
        assert_eq!(vars[1].value, "hello: world");
        assert!(!vars[1].is_sensitive);
        assert!(vars[2].is_sensitive);
    }

    #[test]
    fn test_parse_config_empty_and_noise() {
        assert!(parse_config("").is_empty());
        assert!(parse_config("=====> blog env vars\n").is_empty());
        assert!(parse_config(" !     App blog does not exist").is_empty());
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let vars = parse_config("A: 1\nB: 2\nA: 3\n");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].key, "A");
        assert_eq!(vars[0].value, "3");
    }
}
