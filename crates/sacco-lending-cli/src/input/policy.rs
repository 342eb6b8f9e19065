use log::{debug, info};
use sacco_lending_core::evaluation::LendingPolicy;
use std::path::Path;

use super::file;

type PolicyResult = Result<LendingPolicy, Box<dyn std::error::Error>>;

/// Load a lending policy from a JSON or YAML file, or the built-in default
/// when no path is given. The policy is validated before it is returned.
pub fn load_policy(path: Option<&str>) -> PolicyResult {
    let policy = match path {
        None => {
            debug!("no --policy given; using built-in lending policy");
            LendingPolicy::default()
        }
        Some(p) => {
            let contents = file::read_text(p)?;
            let policy = parse_policy(&contents, is_yaml(p), p)?;
            info!(
                "loaded lending policy from {} ({} product override(s))",
                p,
                policy.products.len()
            );
            policy
        }
    };

    policy.validate()?;
    Ok(policy)
}

fn is_yaml(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

fn parse_policy(contents: &str, yaml: bool, source: &str) -> PolicyResult {
    let parsed: Result<LendingPolicy, String> = if yaml {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| format!("Failed to parse policy '{}': {}", source, e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sacco_lending_core::evaluation::LoanType;
    use std::fs;

    const YAML_POLICY: &str = r#"
max_debt_to_income: "0.35"
min_credit_score: 550
products:
  PERSONAL:
    default_rate: "13"
    max_amount: "2000000"
    max_term_months: 24
"#;

    #[test]
    fn test_yaml_policy_overrides_and_keeps_defaults() {
        let policy = parse_policy(YAML_POLICY, true, "policy.yaml").unwrap();
        assert_eq!(policy.max_debt_to_income, dec!(0.35));
        assert_eq!(policy.min_credit_score, 550);
        assert_eq!(policy.product(LoanType::Personal).default_rate, dec!(13));
        assert_eq!(policy.max_loan_to_value, LendingPolicy::default().max_loan_to_value);
    }

    #[test]
    fn test_json_policy_parsed() {
        let policy = parse_policy(r#"{"full_approval_risk": "25"}"#, false, "policy.json").unwrap();
        assert_eq!(policy.full_approval_risk, dec!(25));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = parse_policy("max_debt_to_income: [", true, "broken.yml").unwrap_err();
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn test_extension_selects_format() {
        assert!(is_yaml("rules.YAML"));
        assert!(is_yaml("conf/rules.yml"));
        assert!(!is_yaml("rules.json"));
    }

    #[test]
    fn test_no_path_gives_default_policy() {
        let policy = load_policy(None).unwrap();
        assert_eq!(policy.min_credit_score, LendingPolicy::default().min_credit_score);
    }

    #[test]
    fn test_policy_file_loaded_and_validated() {
        let dir = std::env::temp_dir();

        let good = dir.join(format!("sacco-policy-{}.yml", std::process::id()));
        fs::write(&good, YAML_POLICY).unwrap();
        let policy = load_policy(good.to_str()).unwrap();
        assert_eq!(policy.min_credit_score, 550);

        let bad = dir.join(format!("sacco-policy-{}.json", std::process::id()));
        fs::write(&bad, r#"{"max_debt_to_income": "1.5"}"#).unwrap();
        let err = load_policy(bad.to_str()).unwrap_err();
        assert!(err.to_string().contains("max_debt_to_income"));

        let _ = fs::remove_file(good);
        let _ = fs::remove_file(bad);
    }
}
