use anyhow::{Result, anyhow};

const BLOCKED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "MERGE", "ALTER", "DROP", "CREATE", "TRUNCATE", "GRANT",
    "REVOKE", "EXEC", "EXECUTE", "BACKUP", "RESTORE",
];

/// Reject anything that is not a plain SELECT (or CTE) unless writes were
/// explicitly allowed. Applies to free-form SQL only; the structured DML
/// commands carry their own gate.
pub fn validate_read_only(sql: &str) -> Result<()> {
    let cleaned = strip_leading_comments(sql);
    let lead = first_token(cleaned).ok_or_else(|| anyhow!("Empty SQL input"))?;
    let lead_upper = lead.to_uppercase();

    if lead_upper != "SELECT" && lead_upper != "WITH" {
        return Err(anyhow!(
            "Only read-only queries (SELECT/CTE) are permitted without --allow-write"
        ));
    }

    if let Some(keyword) = find_blocked_keyword(sql) {
        return Err(anyhow!("Blocked keyword detected: {}", keyword));
    }

    Ok(())
}

fn strip_leading_comments(input: &str) -> &str {
    let mut remaining = input;
    loop {
        let trimmed = remaining.trim_start();
        if trimmed.starts_with("--") {
            if let Some(pos) = trimmed.find('\n') {
                remaining = &trimmed[pos + 1..];
                continue;
            }
            return "";
        }
        if trimmed.starts_with("/*") {
            if let Some(pos) = trimmed.find("*/") {
                remaining = &trimmed[pos + 2..];
                continue;
            }
            return "";
        }
        return trimmed;
    }
}

fn first_token(input: &str) -> Option<String> {
    let mut token = String::new();
    for ch in input.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            token.push(ch);
        } else if !token.is_empty() {
            break;
        }
    }
    if token.is_empty() { None } else { Some(token) }
}

fn find_blocked_keyword(input: &str) -> Option<String> {
    let mut token = String::new();
    for ch in input.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            token.push(ch);
        } else if !token.is_empty() {
            if is_blocked(&token) {
                return Some(token.to_uppercase());
            }
            token.clear();
        }
    }
    if !token.is_empty() && is_blocked(&token) {
        return Some(token.to_uppercase());
    }
    None
}

fn is_blocked(token: &str) -> bool {
    let upper = token.to_uppercase();
    BLOCKED_KEYWORDS.iter().any(|kw| *kw == upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_select() {
        assert!(validate_read_only("SELECT * FROM people").is_ok());
    }

    #[test]
    fn allows_cte() {
        assert!(validate_read_only("WITH cte AS (SELECT 1) SELECT * FROM cte").is_ok());
    }

    #[test]
    fn allows_leading_comments() {
        assert!(validate_read_only("-- top 50\nSELECT TOP 50 * FROM people").is_ok());
    }

    #[test]
    fn blocks_trailing_write_statement() {
        let err = validate_read_only("SELECT 1; DROP TABLE people").unwrap_err();
        assert!(err.to_string().contains("Blocked keyword"));
    }

    #[test]
    fn blocks_non_select_prefix() {
        let err = validate_read_only("UPDATE people SET name='x'").unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn blocks_exec() {
        assert!(validate_read_only("EXEC sp_configure").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(validate_read_only("  -- nothing here").is_err());
    }
}
